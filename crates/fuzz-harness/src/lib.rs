//! SX9 Orbital Fuzz Harness
//!
//! Proptest strategies for ECEF beam-planning scenarios: users on the
//! ground, satellites in a low shell above them and interferers either
//! further out or deliberately placed across a beam.
//!
//! # Usage
//!
//! ```rust
//! use fuzz_harness::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn my_fuzz_test(parts in scenario_parts(8, 2, 1)) {
//!         prop_assert!(parts.users.len() <= 8);
//!     }
//! }
//! ```

pub mod generators;
pub mod runner;

pub mod prelude {
    pub use crate::generators::*;
    pub use crate::runner::FuzzConfig;
    pub use beam_geometry::Position;
    pub use proptest::prelude::*;
}

// Re-export proptest for convenience
pub use proptest;
