//! Scenario generators for property-based testing
//!
//! Everything is drawn inside a small patch of the globe so that most
//! satellites see most users and the allocator has real work to do.

use beam_geometry::transforms::surface_point;
use beam_geometry::Position;
use nalgebra::Vector3;
use proptest::prelude::*;
use proptest::sample::Index;

// ============================================================================
// Angle Generators
// ============================================================================

/// Latitude inside the test patch (degrees)
pub fn patch_latitude_deg() -> impl Strategy<Value = f64> {
    -8.0f64..8.0
}

/// Longitude inside the test patch (degrees)
pub fn patch_longitude_deg() -> impl Strategy<Value = f64> {
    -8.0f64..8.0
}

// ============================================================================
// Altitude Generators (metres above the mean sphere)
// ============================================================================

/// Ground users, sea level to high plateau
pub fn user_altitude_m() -> impl Strategy<Value = f64> {
    0.0f64..5_000.0
}

/// LEO shell (340-1200 km)
pub fn leo_altitude_m() -> impl Strategy<Value = f64> {
    340_000.0f64..1_200_000.0
}

/// MEO to GEO band for external interferers
pub fn interferer_altitude_m() -> impl Strategy<Value = f64> {
    8_000_000.0f64..35_786_000.0
}

// ============================================================================
// Position Generators
// ============================================================================

/// Point in the patch at an altitude drawn from `altitude`
pub fn patch_position(altitude: impl Strategy<Value = f64>) -> impl Strategy<Value = Position> {
    (patch_latitude_deg(), patch_longitude_deg(), altitude)
        .prop_map(|(lat, lon, alt)| surface_point(lat, lon, alt))
}

pub fn user_position() -> impl Strategy<Value = Position> {
    patch_position(user_altitude_m())
}

pub fn satellite_position() -> impl Strategy<Value = Position> {
    patch_position(leo_altitude_m())
}

pub fn interferer_position() -> impl Strategy<Value = Position> {
    patch_position(interferer_altitude_m())
}

/// Point between `from` and `to`, a fraction 0.1-0.9 of the way along,
/// pushed off the line by at most 5 km per axis.
pub fn point_on_line(from: Position, to: Position) -> impl Strategy<Value = Position> {
    (0.1f64..0.9, line_offset_m(), line_offset_m(), line_offset_m()).prop_map(
        move |(t, dx, dy, dz)| {
            let on_line = from.to_vector().lerp(&to.to_vector(), t);
            Position::from(on_line + Vector3::new(dx, dy, dz))
        },
    )
}

fn line_offset_m() -> impl Strategy<Value = f64> {
    -5_000.0f64..5_000.0
}

/// Users packed within roughly a degree of each other, so that same-color
/// separation constantly bites.
pub fn clustered_users(max: usize) -> impl Strategy<Value = Vec<Position>> {
    (patch_latitude_deg(), patch_longitude_deg()).prop_flat_map(move |(lat, lon)| {
        prop::collection::vec(
            (-0.5f64..0.5, -0.5f64..0.5, user_altitude_m())
                .prop_map(move |(dlat, dlon, alt)| surface_point(lat + dlat, lon + dlon, alt)),
            0..=max,
        )
    })
}

// ============================================================================
// Scenario Generators
// ============================================================================

/// Raw positions for a scenario; ids are assigned by the caller
#[derive(Debug, Clone)]
pub struct ScenarioParts {
    pub users: Vec<Position>,
    pub satellites: Vec<Position>,
    pub interferers: Vec<Position>,
}

/// Up to `max_users` users, `max_satellites` satellites and
/// `max_interferers` interferers, all in the test patch
pub fn scenario_parts(
    max_users: usize,
    max_satellites: usize,
    max_interferers: usize,
) -> impl Strategy<Value = ScenarioParts> {
    (
        prop::collection::vec(user_position(), 0..=max_users),
        prop::collection::vec(satellite_position(), 0..=max_satellites),
        prop::collection::vec(interferer_position(), 0..=max_interferers),
    )
        .prop_map(|(users, satellites, interferers)| ScenarioParts {
            users,
            satellites,
            interferers,
        })
}

/// One satellite over a tight user cluster, no interferers
pub fn crowded_single_satellite(max_users: usize) -> impl Strategy<Value = ScenarioParts> {
    (clustered_users(max_users), satellite_position()).prop_map(|(users, satellite)| {
        ScenarioParts {
            users,
            satellites: vec![satellite],
            interferers: Vec::new(),
        }
    })
}

/// Scenario whose interferers each sit between a chosen satellite and user
#[derive(Debug, Clone)]
pub struct ShadowedScenario {
    pub parts: ScenarioParts,
    /// `(satellite index, user index)` shadowed by each interferer, in
    /// interferer order
    pub shadowed: Vec<(usize, usize)>,
}

/// At least one user, satellite and interferer; every interferer lies on
/// (or within a few km of) the line from some satellite to some user.
///
/// The LEO floor keeps the satellite-user range above 335 km, so the offset
/// seen from the satellite stays well under 20°.
pub fn shadowed_scenario(
    max_users: usize,
    max_satellites: usize,
    max_interferers: usize,
) -> impl Strategy<Value = ShadowedScenario> {
    (
        prop::collection::vec(user_position(), 1..=max_users.max(1)),
        prop::collection::vec(satellite_position(), 1..=max_satellites.max(1)),
        prop::collection::vec((any::<Index>(), any::<Index>()), 1..=max_interferers.max(1)),
    )
        .prop_flat_map(|(users, satellites, picks)| {
            let shadowed: Vec<(usize, usize)> = picks
                .iter()
                .map(|(s, u)| (s.index(satellites.len()), u.index(users.len())))
                .collect();
            let interferers: Vec<_> = shadowed
                .iter()
                .map(|&(s, u)| point_on_line(satellites[s], users[u]))
                .collect();
            (Just(users), Just(satellites), Just(shadowed), interferers)
        })
        .prop_map(|(users, satellites, shadowed, interferers)| ShadowedScenario {
            parts: ScenarioParts {
                users,
                satellites,
                interferers,
            },
            shadowed,
        })
}
