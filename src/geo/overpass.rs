//! Overpass interpreter client.
//!
//! Queries an Overpass-compatible point-of-interest service for medical
//! facilities around an origin. The query is declarative Overpass QL sent
//! as an HTTP form POST; the response is a JSON array of nodes and ways
//! with free-form tags and either direct or centroid coordinates.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use super::GeoPoint;
use crate::config::GeoSettings;
use crate::error::GeoError;

// ── Data source seam ─────────────────────────────────────────────

/// Source of raw facility data around an origin.
///
/// The production implementation talks to an Overpass interpreter; tests
/// substitute canned payloads or failures.
#[async_trait]
pub trait FacilityDataSource: Send + Sync {
    async fn fetch(&self, origin: GeoPoint, radius_m: u32) -> Result<OverpassPayload, GeoError>;
}

// ── Wire types ───────────────────────────────────────────────────

/// Top-level Overpass response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverpassPayload {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// One node or way from the interpreter.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    #[serde(default)]
    pub id: u64,
    /// "node" or "way".
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Direct coordinate (nodes).
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Centroid coordinate (ways queried with `out center`).
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassElement {
    /// Resolve the element's coordinate: direct for nodes, centroid for
    /// area features. `None` when the payload carries neither.
    pub fn position(&self) -> Option<GeoPoint> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => self
                .center
                .as_ref()
                .map(|c| GeoPoint::new(c.lat, c.lon)),
        }
    }

    /// Convenience accessor for a tag value.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

// ── HTTP client ──────────────────────────────────────────────────

/// Overpass interpreter client.
pub struct OverpassClient {
    http: reqwest::Client,
    endpoint: String,
}

impl OverpassClient {
    pub fn new(settings: &GeoSettings) -> Result<Self, GeoError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| GeoError::QueryFailed(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
        })
    }

    /// Build the Overpass QL query for medical points of interest around
    /// the origin. The server-side timeout is declared in the query; the
    /// radius is repeated per clause because `around` is per-statement.
    pub(crate) fn build_query(origin: GeoPoint, radius_m: u32) -> String {
        let GeoPoint {
            latitude: lat,
            longitude: lon,
        } = origin;
        format!(
            "[out:json][timeout:25];\n\
             (\n\
               node[\"amenity\"=\"hospital\"](around:{radius_m},{lat},{lon});\n\
               way[\"amenity\"=\"hospital\"](around:{radius_m},{lat},{lon});\n\
               node[\"amenity\"=\"clinic\"](around:{radius_m},{lat},{lon});\n\
               way[\"amenity\"=\"clinic\"](around:{radius_m},{lat},{lon});\n\
               node[\"amenity\"=\"doctors\"](around:{radius_m},{lat},{lon});\n\
               node[\"healthcare\"](around:{radius_m},{lat},{lon});\n\
               way[\"healthcare\"](around:{radius_m},{lat},{lon});\n\
             );\n\
             out center;"
        )
    }
}

#[async_trait]
impl FacilityDataSource for OverpassClient {
    async fn fetch(&self, origin: GeoPoint, radius_m: u32) -> Result<OverpassPayload, GeoError> {
        let query = Self::build_query(origin, radius_m);

        tracing::debug!(
            endpoint = %self.endpoint,
            radius_m = radius_m,
            "querying facility service"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| GeoError::QueryFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::QueryFailed(format!("HTTP {status}")));
        }

        response
            .json::<OverpassPayload>()
            .await
            .map_err(|e| GeoError::ParseFailed(e.to_string()))
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_covers_all_facility_classes() {
        let query = OverpassClient::build_query(GeoPoint::new(28.6139, 77.2090), 10_000);
        assert!(query.starts_with("[out:json]"));
        assert!(query.contains(r#"node["amenity"="hospital"](around:10000,28.6139,77.209);"#));
        assert!(query.contains(r#""amenity"="clinic""#));
        assert!(query.contains(r#""amenity"="doctors""#));
        assert!(query.contains(r#"node["healthcare"]"#));
        assert!(query.ends_with("out center;"));
    }

    #[test]
    fn node_payload_decodes_with_direct_coordinates() {
        let raw = r#"{
            "elements": [{
                "type": "node",
                "id": 42,
                "lat": 28.62,
                "lon": 77.21,
                "tags": {"amenity": "hospital", "name": "General Hospital"}
            }]
        }"#;
        let payload: OverpassPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.elements.len(), 1);

        let element = &payload.elements[0];
        assert_eq!(element.kind, "node");
        assert_eq!(element.tag("name"), Some("General Hospital"));
        let position = element.position().unwrap();
        assert_eq!(position.latitude, 28.62);
    }

    #[test]
    fn way_payload_falls_back_to_centroid() {
        let raw = r#"{
            "elements": [{
                "type": "way",
                "id": 7,
                "center": {"lat": 28.60, "lon": 77.20},
                "tags": {"healthcare": "clinic"}
            }]
        }"#;
        let payload: OverpassPayload = serde_json::from_str(raw).unwrap();
        let position = payload.elements[0].position().unwrap();
        assert_eq!(position.longitude, 77.20);
    }

    #[test]
    fn element_without_coordinates_has_no_position() {
        let raw = r#"{"elements": [{"type": "way", "id": 9, "tags": {}}]}"#;
        let payload: OverpassPayload = serde_json::from_str(raw).unwrap();
        assert!(payload.elements[0].position().is_none());
    }

    #[test]
    fn empty_and_missing_element_arrays_decode() {
        let payload: OverpassPayload = serde_json::from_str(r#"{"elements": []}"#).unwrap();
        assert!(payload.elements.is_empty());

        let payload: OverpassPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.elements.is_empty());
    }
}
