//! Great-circle distance math and display formatting.

use super::GeoPoint;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two points, in kilometers.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Render a distance for display: whole meters below one kilometer,
/// kilometers with one decimal from there on.
pub fn distance_label(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round() as i64)
    } else {
        format!("{km:.1} km")
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_matches_reference_pair() {
        // Connaught Place to Shastri Bhawan, New Delhi.
        let from = GeoPoint::new(28.6139, 77.2090);
        let to = GeoPoint::new(28.6229, 77.2150);
        let km = haversine_km(from, to);
        assert!(
            (km - 1.1596).abs() < 0.01,
            "expected ~1.16 km, got {km:.4}"
        );
    }

    #[test]
    fn haversine_is_zero_for_identical_points() {
        let p = GeoPoint::new(51.5074, -0.1278);
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = GeoPoint::new(40.7128, -74.0060);
        let b = GeoPoint::new(40.7580, -73.9855);
        let forward = haversine_km(a, b);
        let back = haversine_km(b, a);
        assert!((forward - back).abs() < 1e-9);
    }

    #[test]
    fn haversine_handles_the_antimeridian() {
        let west = GeoPoint::new(0.0, 179.9);
        let east = GeoPoint::new(0.0, -179.9);
        let km = haversine_km(west, east);
        // 0.2 degrees of longitude at the equator, not most of the planet
        assert!(km < 25.0, "got {km}");
    }

    #[test]
    fn label_uses_meters_below_one_kilometer() {
        assert_eq!(distance_label(0.999), "999 m");
        assert_eq!(distance_label(0.25), "250 m");
        assert_eq!(distance_label(0.0), "0 m");
    }

    #[test]
    fn label_uses_kilometers_from_one_up() {
        assert_eq!(distance_label(1.0), "1.0 km");
        assert_eq!(distance_label(2.449), "2.4 km");
        assert_eq!(distance_label(12.35), "12.3 km");
    }
}
