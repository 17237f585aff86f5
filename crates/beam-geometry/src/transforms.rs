//! Coordinate helpers for building ECEF scenarios.

use crate::Position;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Spherical (latitude, longitude, radius from Earth centre) to ECEF.
pub fn spherical_to_ecef(latitude_deg: f64, longitude_deg: f64, radius_m: f64) -> Position {
    let lat = latitude_deg.to_radians();
    let lon = longitude_deg.to_radians();

    Position::new(
        radius_m * lat.cos() * lon.cos(),
        radius_m * lat.cos() * lon.sin(),
        radius_m * lat.sin(),
    )
}

/// Point on the mean-radius sphere at the given altitude above it.
pub fn surface_point(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Position {
    spherical_to_ecef(latitude_deg, longitude_deg, EARTH_RADIUS_M + altitude_m)
}

/// ECEF back to (latitude_deg, longitude_deg, radius_m).
pub fn ecef_to_spherical(pos: &Position) -> (f64, f64, f64) {
    let r_xy = (pos.x * pos.x + pos.y * pos.y).sqrt();
    let radius = (r_xy * r_xy + pos.z * pos.z).sqrt();
    let latitude = pos.z.atan2(r_xy).to_degrees();
    let longitude = pos.y.atan2(pos.x).to_degrees();
    (latitude, longitude, radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_north_pole() {
        let p = spherical_to_ecef(90.0, 0.0, EARTH_RADIUS_M);
        assert!(p.x.abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
        assert!((p.z - EARTH_RADIUS_M).abs() < 1e-6);
    }

    #[test]
    fn test_spherical_round_trip() {
        let p = surface_point(37.5, -122.25, 550_000.0);
        let (lat, lon, r) = ecef_to_spherical(&p);
        assert!((lat - 37.5).abs() < 1e-9);
        assert!((lon + 122.25).abs() < 1e-9);
        assert!((r - (EARTH_RADIUS_M + 550_000.0)).abs() < 1e-6);
    }
}
