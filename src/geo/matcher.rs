//! Facility matching: shape, filter, rank, and the synthetic fallback.

use std::sync::Arc;

use super::distance::{distance_label, haversine_km};
use super::overpass::{FacilityDataSource, OverpassClient, OverpassElement, OverpassPayload};
use super::specialty::SpecialtyQuery;
use super::{FacilityCandidate, GeoPoint};
use crate::config::GeoSettings;
use crate::error::GeoError;

// ── Synthetic fallback tables ────────────────────────────────────

/// Coordinate deltas for synthesized candidates, chosen to spread the
/// results between roughly one and seven kilometers from the origin.
const SYNTHETIC_OFFSETS: [(f64, f64); 5] = [
    (0.009, 0.012),
    (-0.018, 0.008),
    (0.027, -0.020),
    (-0.035, 0.030),
    (0.048, -0.042),
];

const SYNTHETIC_ADDRESSES: [&str; 5] = [
    "14 Wellness Avenue",
    "3 Harmony Road",
    "221 Care Street",
    "8 Meadow Lane",
    "52 Riverside Drive",
];

const SYNTHETIC_RATINGS: [f32; 5] = [4.6, 4.4, 4.2, 4.5, 4.1];

// ── Search result ────────────────────────────────────────────────

/// Outcome of one facility search. Always renderable: when the live
/// query failed or came back empty, `facilities` holds synthetic
/// candidates and `used_fallback` is raised so the UI can show a
/// non-blocking notice.
#[derive(Debug, Clone)]
pub struct FacilitySearch {
    pub facilities: Vec<FacilityCandidate>,
    /// True when the results are synthetic stand-ins.
    pub used_fallback: bool,
    /// The recoverable failure that forced the fallback, if one did.
    pub fallback_cause: Option<GeoError>,
}

// ── Matcher ──────────────────────────────────────────────────────

/// Ranks nearby care facilities for an origin and a desired specialty.
pub struct GeoFacilityMatcher {
    source: Arc<dyn FacilityDataSource>,
    settings: GeoSettings,
}

impl GeoFacilityMatcher {
    /// Matcher backed by the live Overpass interpreter.
    pub fn new(settings: GeoSettings) -> Result<Self, GeoError> {
        let client = OverpassClient::new(&settings)?;
        Ok(Self::with_source(Arc::new(client), settings))
    }

    /// Matcher over an explicit data source (tests, offline builds).
    pub fn with_source(source: Arc<dyn FacilityDataSource>, settings: GeoSettings) -> Self {
        Self { source, settings }
    }

    /// Find care facilities near `origin`, preferring the requested
    /// specialty. Never fails: upstream trouble resolves to synthetic
    /// results plus the recoverable cause. No automatic retries; one
    /// failed attempt goes straight to the fallback.
    pub async fn search(&self, origin: GeoPoint, specialty: &str) -> FacilitySearch {
        match self.source.fetch(origin, self.settings.radius_m()).await {
            Ok(payload) => {
                let facilities = self.rank(origin, specialty, &payload);
                if facilities.is_empty() {
                    tracing::info!(
                        specialty = specialty,
                        "facility query returned nothing usable, synthesizing results"
                    );
                    FacilitySearch {
                        facilities: self.synthesize(origin, specialty),
                        used_fallback: true,
                        fallback_cause: None,
                    }
                } else {
                    tracing::debug!(
                        specialty = specialty,
                        count = facilities.len(),
                        "facility search succeeded"
                    );
                    FacilitySearch {
                        facilities,
                        used_fallback: false,
                        fallback_cause: None,
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "facility query failed, synthesizing results");
                FacilitySearch {
                    facilities: self.synthesize(origin, specialty),
                    used_fallback: true,
                    fallback_cause: Some(err),
                }
            }
        }
    }

    /// Shape raw elements into candidates, re-filter by radius, narrow by
    /// specialty (best-effort), sort by distance, cap the count.
    fn rank(
        &self,
        origin: GeoPoint,
        specialty: &str,
        payload: &OverpassPayload,
    ) -> Vec<FacilityCandidate> {
        let query = SpecialtyQuery::parse(specialty);

        let mut shaped: Vec<(FacilityCandidate, bool)> = payload
            .elements
            .iter()
            .filter_map(|element| self.shape(origin, element, &query))
            // The service applies the radius too, but its filter follows
            // the query text, not our math; re-check independently.
            .filter(|(candidate, _)| candidate.distance_km <= self.settings.radius_km)
            .collect();

        shaped.sort_by(|(a, _), (b, _)| a.distance_km.total_cmp(&b.distance_km));

        let narrowed: Vec<FacilityCandidate> = shaped
            .iter()
            .filter(|(_, matched)| *matched)
            .map(|(candidate, _)| candidate.clone())
            .collect();

        // Narrowing is best-effort: an empty narrowed set keeps the
        // distance-sorted originals rather than returning nothing.
        let mut chosen = if narrowed.is_empty() {
            shaped.into_iter().map(|(candidate, _)| candidate).collect()
        } else {
            narrowed
        };
        chosen.truncate(self.settings.max_results);
        chosen
    }

    /// Turn one payload element into a candidate, deciding on the way
    /// whether it matches the requested specialty.
    fn shape(
        &self,
        origin: GeoPoint,
        element: &OverpassElement,
        query: &SpecialtyQuery,
    ) -> Option<(FacilityCandidate, bool)> {
        let location = element.position()?;
        let km = haversine_km(origin, location);

        let name = element
            .tag("name")
            .filter(|n| !n.is_empty())
            .unwrap_or("Medical facility")
            .to_string();

        let specialty_tag = element
            .tag("healthcare:speciality")
            .or_else(|| element.tag("healthcare"))
            .or_else(|| element.tag("amenity"))
            .unwrap_or_default()
            .to_string();

        let description = element.tag("description").unwrap_or_default();
        let matched = query.matches(&name)
            || query.matches(&specialty_tag)
            || query.matches(description);

        let candidate = FacilityCandidate {
            name,
            address: assemble_address(element),
            location,
            distance_km: km,
            distance_label: distance_label(km),
            specialty_tag,
            rating: None,
            is_open: None,
            is_synthetic: false,
        };
        Some((candidate, matched))
    }

    /// Deterministic stand-ins around the origin, distance-sorted and
    /// flagged. Same origin and specialty, same output.
    fn synthesize(&self, origin: GeoPoint, specialty: &str) -> Vec<FacilityCandidate> {
        let query = SpecialtyQuery::parse(specialty);
        let names = query.synthetic_names();
        let tag = if query.normalized().is_empty() {
            "general".to_string()
        } else {
            query.normalized().to_string()
        };

        let mut facilities: Vec<FacilityCandidate> = SYNTHETIC_OFFSETS
            .iter()
            .enumerate()
            .map(|(i, (d_lat, d_lon))| {
                let location =
                    GeoPoint::new(origin.latitude + d_lat, origin.longitude + d_lon);
                let km = haversine_km(origin, location);
                FacilityCandidate {
                    name: names[i].to_string(),
                    address: SYNTHETIC_ADDRESSES[i].to_string(),
                    location,
                    distance_km: km,
                    distance_label: distance_label(km),
                    specialty_tag: tag.clone(),
                    rating: Some(SYNTHETIC_RATINGS[i]),
                    is_open: Some(i != 2),
                    is_synthetic: true,
                }
            })
            .collect();

        facilities.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        facilities
    }
}

/// Assemble a display address from whatever structured fragments exist;
/// missing pieces are omitted, not zero-filled.
fn assemble_address(element: &OverpassElement) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for key in [
        "addr:housenumber",
        "addr:street",
        "addr:suburb",
        "addr:city",
        "addr:postcode",
    ] {
        if let Some(value) = element.tag(key) {
            if !value.is_empty() {
                parts.push(value);
            }
        }
    }
    if parts.is_empty() {
        "Address unavailable".to_string()
    } else {
        parts.join(", ")
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    const ORIGIN: GeoPoint = GeoPoint {
        latitude: 28.6139,
        longitude: 77.2090,
    };

    struct StubSource(Result<OverpassPayload, GeoError>);

    #[async_trait]
    impl FacilityDataSource for StubSource {
        async fn fetch(
            &self,
            _origin: GeoPoint,
            _radius_m: u32,
        ) -> Result<OverpassPayload, GeoError> {
            self.0.clone()
        }
    }

    fn matcher_over(result: Result<OverpassPayload, GeoError>) -> GeoFacilityMatcher {
        GeoFacilityMatcher::with_source(Arc::new(StubSource(result)), GeoSettings::default())
    }

    fn node(lat: f64, lon: f64, tags: &[(&str, &str)]) -> OverpassElement {
        OverpassElement {
            id: 0,
            kind: "node".to_string(),
            lat: Some(lat),
            lon: Some(lon),
            center: None,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn payload(elements: Vec<OverpassElement>) -> OverpassPayload {
        OverpassPayload { elements }
    }

    // ── Live path ─────────────────────────────────────────────────

    #[tokio::test]
    async fn cardiology_nodes_rank_nearest_first() {
        let matcher = matcher_over(Ok(payload(vec![
            node(
                28.6229,
                77.2150,
                &[
                    ("name", "Heart Institute"),
                    ("healthcare:speciality", "cardiology"),
                ],
            ),
            node(
                28.6700,
                77.2500,
                &[
                    ("name", "Northern Cardiac Hospital"),
                    ("healthcare:speciality", "cardiology"),
                ],
            ),
            node(
                28.6180,
                77.2110,
                &[
                    ("name", "Pulse Centre"),
                    ("healthcare:speciality", "cardiology"),
                ],
            ),
            node(28.6150, 77.2095, &[("name", "City Clinic"), ("amenity", "clinic")]),
            node(28.6300, 77.2200, &[("name", "Family Clinic"), ("amenity", "clinic")]),
        ])));

        let result = matcher.search(ORIGIN, "cardiologist").await;
        assert!(!result.used_fallback);

        let names: Vec<&str> = result
            .facilities
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Pulse Centre", "Heart Institute", "Northern Cardiac Hospital"]
        );

        // nearest is inside the one-kilometer band, the next just above
        assert_eq!(result.facilities[0].distance_label, "496 m");
        assert_eq!(result.facilities[1].distance_label, "1.2 km");
        assert!(result.facilities.iter().all(|f| !f.is_synthetic));
        assert!(result
            .facilities
            .windows(2)
            .all(|pair| pair[0].distance_km <= pair[1].distance_km));
    }

    #[tokio::test]
    async fn beyond_radius_results_are_discarded() {
        let matcher = matcher_over(Ok(payload(vec![
            node(28.6180, 77.2110, &[("name", "Near Clinic"), ("amenity", "clinic")]),
            // ~23 km out; whatever the service thought, our math decides
            node(28.8000, 77.4000, &[("name", "Far Hospital"), ("amenity", "hospital")]),
        ])));

        let result = matcher.search(ORIGIN, "").await;
        assert!(!result.used_fallback);
        assert_eq!(result.facilities.len(), 1);
        assert_eq!(result.facilities[0].name, "Near Clinic");
    }

    #[tokio::test]
    async fn specialty_narrowing_never_empties_a_result_set() {
        let matcher = matcher_over(Ok(payload(vec![
            node(28.6180, 77.2110, &[("name", "City Clinic"), ("amenity", "clinic")]),
            node(28.6200, 77.2150, &[("name", "Family Health"), ("amenity", "doctors")]),
        ])));

        let result = matcher.search(ORIGIN, "cardiologist").await;
        assert!(!result.used_fallback);
        assert_eq!(result.facilities.len(), 2);
        assert_eq!(result.facilities[0].name, "City Clinic");
    }

    #[tokio::test]
    async fn result_count_is_capped() {
        let elements: Vec<OverpassElement> = (0..25)
            .map(|i| {
                node(
                    28.6150 + 0.001 * f64::from(i),
                    77.2095,
                    &[("amenity", "clinic")],
                )
            })
            .collect();
        let matcher = matcher_over(Ok(payload(elements)));

        let result = matcher.search(ORIGIN, "").await;
        assert_eq!(result.facilities.len(), 15);
    }

    #[tokio::test]
    async fn unnamed_facilities_get_a_generic_label_and_address() {
        let matcher = matcher_over(Ok(payload(vec![node(
            28.6180,
            77.2110,
            &[("amenity", "hospital")],
        )])));

        let result = matcher.search(ORIGIN, "").await;
        assert_eq!(result.facilities[0].name, "Medical facility");
        assert_eq!(result.facilities[0].address, "Address unavailable");
    }

    #[tokio::test]
    async fn address_fragments_join_in_order() {
        let matcher = matcher_over(Ok(payload(vec![node(
            28.6180,
            77.2110,
            &[
                ("amenity", "hospital"),
                ("addr:street", "Ring Road"),
                ("addr:city", "New Delhi"),
            ],
        )])));

        let result = matcher.search(ORIGIN, "").await;
        assert_eq!(result.facilities[0].address, "Ring Road, New Delhi");
    }

    // ── Fallback path ─────────────────────────────────────────────

    #[tokio::test]
    async fn empty_live_results_synthesize_five_candidates() {
        let matcher = matcher_over(Ok(payload(vec![])));

        let result = matcher.search(ORIGIN, "cardiologist").await;
        assert!(result.used_fallback);
        assert!(result.fallback_cause.is_none());
        assert_eq!(result.facilities.len(), 5);
        assert!(result.facilities.iter().all(|f| f.is_synthetic));
        assert!(result
            .facilities
            .windows(2)
            .all(|pair| pair[0].distance_km <= pair[1].distance_km));
        // plausible spread around the origin
        assert!(result.facilities[0].distance_km > 1.0);
        assert!(result.facilities[4].distance_km < 8.0);
    }

    #[tokio::test]
    async fn failed_query_synthesizes_and_reports_the_cause() {
        let matcher = matcher_over(Err(GeoError::QueryFailed("HTTP 504".into())));

        let result = matcher.search(ORIGIN, "dentist").await;
        assert!(result.used_fallback);
        assert_eq!(
            result.fallback_cause,
            Some(GeoError::QueryFailed("HTTP 504".into()))
        );
        assert_eq!(result.facilities.len(), 5);
        // specialty-keyed synthetic names
        assert!(result
            .facilities
            .iter()
            .any(|f| f.name.to_lowercase().contains("dental")));
        assert!(result
            .facilities
            .iter()
            .all(|f| f.specialty_tag == "dentist"));
    }

    #[tokio::test]
    async fn synthetic_results_are_deterministic() {
        let matcher = matcher_over(Ok(payload(vec![])));

        let first = matcher.search(ORIGIN, "pediatrician").await;
        let second = matcher.search(ORIGIN, "pediatrician").await;

        let names = |r: &FacilitySearch| {
            r.facilities
                .iter()
                .map(|f| f.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(
            first.facilities[0].distance_km,
            second.facilities[0].distance_km
        );
    }

    #[tokio::test]
    async fn parse_failure_also_falls_back() {
        let matcher = matcher_over(Err(GeoError::ParseFailed("bad json".into())));

        let result = matcher.search(ORIGIN, "").await;
        assert!(result.used_fallback);
        assert!(matches!(
            result.fallback_cause,
            Some(GeoError::ParseFailed(_))
        ));
        assert_eq!(result.facilities.len(), 5);
        assert!(result
            .facilities
            .iter()
            .all(|f| f.specialty_tag == "general"));
    }
}
