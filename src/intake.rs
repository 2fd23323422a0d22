//! Symptom intake orchestration.
//!
//! Thin glue between the transcript (typed or dictated), the AI analysis
//! collaborator, and the facility matcher. The analysis backend is an
//! opaque service behind [`SymptomAnalyzer`]; this module defines the
//! shape it must return and forwards symptom text to it verbatim.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::geo::{FacilitySearch, GeoFacilityMatcher, GeoPoint};

// ── Analysis data model ──────────────────────────────────────────

/// Coarse severity grading from the analysis backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    /// Anything the backend says that we do not recognize.
    #[serde(other)]
    Unknown,
}

/// Structured result of one symptom analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomAnalysis {
    pub severity: Severity,
    /// The kind of practitioner to look for; feeds the facility search.
    #[serde(rename = "doctorType")]
    pub doctor_type: String,
    #[serde(default)]
    pub precautions: Vec<String>,
    #[serde(rename = "doActions", default)]
    pub do_actions: Vec<String>,
    #[serde(rename = "avoidActions", default)]
    pub avoid_actions: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

// ── Analyzer seam ────────────────────────────────────────────────

/// The AI analysis collaborator. Consumes free-text symptoms, returns a
/// structured assessment. Transport and prompting are the host's
/// business.
#[async_trait]
pub trait SymptomAnalyzer: Send + Sync {
    async fn analyze(&self, symptoms: &str) -> anyhow::Result<SymptomAnalysis>;
}

// ── Orchestrator ─────────────────────────────────────────────────

/// Combined outcome of an intake round.
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub analysis: SymptomAnalysis,
    /// Facility results, when the user shared a location.
    pub facilities: Option<FacilitySearch>,
}

/// Wires symptom text through analysis and on to facility discovery.
pub struct SymptomIntakeOrchestrator {
    analyzer: Arc<dyn SymptomAnalyzer>,
    matcher: GeoFacilityMatcher,
}

impl SymptomIntakeOrchestrator {
    pub fn new(analyzer: Arc<dyn SymptomAnalyzer>, matcher: GeoFacilityMatcher) -> Self {
        Self { analyzer, matcher }
    }

    /// Run one intake round. The transcript goes to the analyzer
    /// verbatim; when an origin is provided, the recommended specialty
    /// drives a facility search (which itself never fails).
    pub async fn run(
        &self,
        symptoms: &str,
        origin: Option<GeoPoint>,
    ) -> anyhow::Result<IntakeOutcome> {
        let symptoms = symptoms.trim();
        if symptoms.is_empty() {
            anyhow::bail!("no symptoms provided");
        }

        let analysis = self.analyzer.analyze(symptoms).await?;
        tracing::info!(
            severity = ?analysis.severity,
            doctor_type = %analysis.doctor_type,
            "symptom analysis complete"
        );

        let facilities = match origin {
            Some(origin) => Some(self.matcher.search(origin, &analysis.doctor_type).await),
            None => None,
        };

        Ok(IntakeOutcome {
            analysis,
            facilities,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────
