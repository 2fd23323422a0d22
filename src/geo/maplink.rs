//! External map-application links.
//!
//! The crate never computes routes; it hands the user off to the native
//! map application with origin and destination attached. Both a web
//! fallback URL and a `geo:` intent URI are provided so hosts can pick
//! whichever the platform honors.

use super::GeoPoint;

/// Directions link for the platform's map application (web fallback).
pub fn directions_url(origin: GeoPoint, destination: GeoPoint) -> String {
    let origin = format!("{},{}", origin.latitude, origin.longitude);
    let destination = format!("{},{}", destination.latitude, destination.longitude);
    format!(
        "https://www.google.com/maps/dir/?api=1&origin={}&destination={}&travelmode=driving",
        urlencoding::encode(&origin),
        urlencoding::encode(&destination),
    )
}

/// `geo:` intent URI for handsets, with a human-readable pin label.
pub fn geo_uri(destination: GeoPoint, label: &str) -> String {
    format!(
        "geo:{lat},{lon}?q={lat},{lon}({label})",
        lat = destination.latitude,
        lon = destination.longitude,
        label = urlencoding::encode(label),
    )
}

// ── Tests ──────────────────────────────────────────────────────────
