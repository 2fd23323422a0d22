//! # carescout
//!
//! Assisted care discovery for consumer health apps: hands-free symptom
//! capture over the platform speech recognizer, and geo-aware matching of
//! nearby medical facilities against the specialty an analysis backend
//! recommends.
//!
//! The crate is a library; it owns no ports, files, or CLI. Hosts wire
//! the pieces together:
//!
//! ```text
//! SpeechRecognizer (platform glue, host-provided)
//!        │
//! VoiceCaptureController ──transcript──▸ SymptomIntakeOrchestrator
//!                                              │            │
//!                                    SymptomAnalyzer   GeoFacilityMatcher
//!                                    (AI backend)      (Overpass + fallback)
//! ```
//!
//! Two hard guarantees hold throughout:
//! - at most one recognition session is live per process, and
//! - a facility search always returns something renderable.

pub mod config;
pub mod error;
pub mod geo;
pub mod intake;
pub mod telemetry;
pub mod voice;

pub use config::{CareScoutConfig, GeoSettings, VoiceSettings};
pub use error::{GeoError, VoiceError};
pub use geo::{
    FacilityCandidate, FacilitySearch, GeoFacilityMatcher, GeoPoint, OverpassClient,
    SpecialtyQuery,
};
pub use intake::{IntakeOutcome, Severity, SymptomAnalysis, SymptomAnalyzer,
    SymptomIntakeOrchestrator};
pub use voice::{
    CaptureNotice, CaptureState, RecognitionEvent, RecognizerConfig, RecognizerHandle,
    RecognizerLease, SpeechRecognizer, VoiceCaptureController,
};
