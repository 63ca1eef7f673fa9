//! Great-circle distance between two GPS coordinates.

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in meters between two (latitude, longitude) points
/// given in decimal degrees.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_are_zero_meters_apart() {
        let d = haversine_meters(52.3676, 4.9041, 52.3676, 4.9041);
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn amsterdam_to_paris_is_roughly_430km() {
        // Amsterdam (52.3676, 4.9041) to Paris (48.8566, 2.3522).
        let d = haversine_meters(52.3676, 4.9041, 48.8566, 2.3522);
        assert!((400_000.0..460_000.0).contains(&d), "got {}", d);
    }

    #[test]
    fn far_points_exceed_small_radius() {
        // Roughly 1000 km apart: Berlin to London.
        let d = haversine_meters(52.52, 13.405, 51.5074, -0.1278);
        assert!(d > 900_000.0);
        assert!(d > 1000.0);
    }

    #[test]
    fn crossing_the_antimeridian() {
        // Points just either side of 180° longitude are close, not half a
        // world apart.
        let d = haversine_meters(0.0, 179.9, 0.0, -179.9);
        assert!(d < 30_000.0, "got {}", d);
    }
}
