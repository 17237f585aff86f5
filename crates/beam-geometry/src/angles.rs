//! Angle between two rays sharing a vertex.

use crate::{GeometryError, Position, Result};
use nalgebra::Vector3;
use tracing::warn;

/// Raw dot products further than this outside [-1, 1] are reported before clamping.
pub const CLAMP_NOTICE_TOLERANCE: f64 = 1e-6;

/// Angle in degrees, within [0, 180], between the rays `vertex -> a` and `vertex -> b`.
///
/// Fails with [`GeometryError::DegenerateVector`] when either point coincides
/// with the vertex, since no direction exists to measure from.
pub fn angle_between(vertex: &Position, a: &Position, b: &Position) -> Result<f64> {
    let unit_a = unit_direction(vertex, a)?;
    let unit_b = unit_direction(vertex, b)?;

    let cosine = bounded_cosine(unit_a.dot(&unit_b));
    Ok(cosine.acos().to_degrees())
}

/// Clamp a cosine into [-1, 1], surfacing a notice when the drift is larger
/// than floating-point noise.
pub fn bounded_cosine(dot: f64) -> f64 {
    let (bounded, drifted) = clamp_cosine(dot);
    if drifted {
        warn!("Dot product {} was bounded to {}", dot, bounded);
    }
    bounded
}

/// Clamped cosine, and whether the clamp moved it by more than
/// [`CLAMP_NOTICE_TOLERANCE`].
pub fn clamp_cosine(dot: f64) -> (f64, bool) {
    let bounded = dot.clamp(-1.0, 1.0);
    (bounded, (bounded - dot).abs() > CLAMP_NOTICE_TOLERANCE)
}

fn unit_direction(vertex: &Position, point: &Position) -> Result<Vector3<f64>> {
    if !vertex.is_finite() {
        return Err(GeometryError::NonFinite(*vertex));
    }
    if !point.is_finite() {
        return Err(GeometryError::NonFinite(*point));
    }

    let delta = vertex.direction_to(point);
    let magnitude = delta.norm();
    if magnitude == 0.0 {
        return Err(GeometryError::DegenerateVector {
            vertex: *vertex,
            point: *point,
        });
    }

    Ok(delta / magnitude)
}
