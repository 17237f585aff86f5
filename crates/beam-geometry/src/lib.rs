//! Beam Geometry Library
//!
//! ECEF positions and the angle-between-rays kernel used by the beam planner.
//! Everything here is pure: positions never change once built and every
//! angle is a function of three positions.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod angles;
pub mod transforms;

pub use angles::{angle_between, bounded_cosine, clamp_cosine, CLAMP_NOTICE_TOLERANCE};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Degenerate direction: point {point} coincides with vertex {vertex}")]
    DegenerateVector { vertex: Position, point: Position },
    #[error("Non-finite coordinate in {0}")]
    NonFinite(Position),
}

pub type Result<T> = std::result::Result<T, GeometryError>;

/// Earth-centred, Earth-fixed position in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Earth centre, the default reference point for visibility checks.
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Vector pointing from `self` towards `other`.
    pub fn direction_to(&self, other: &Position) -> Vector3<f64> {
        other.to_vector() - self.to_vector()
    }
}

impl From<Vector3<f64>> for Position {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
