//! Error taxonomies for the capture and matching pipelines.
//!
//! Voice errors mirror the failure codes reported by platform speech
//! recognizers and are always recovered locally: the session is wound down
//! cleanly and the caller receives a user-facing message, never a panic.
//! Geo errors are soft by construction; the matcher converts them into the
//! synthetic-fallback path and reports them as a flag on the result.

use thiserror::Error;

// ── Voice errors ───────────────────────────────────────────────────

/// Failure categories for a voice capture session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    /// The platform has no speech-recognition capability at all.
    #[error("speech recognition is not available on this device")]
    CapabilityUnavailable,

    /// The recognizer gave up without hearing any speech.
    #[error("no speech was detected")]
    NoSpeechDetected,

    /// Microphone capture could not be started or was lost mid-session.
    #[error("microphone capture is unavailable")]
    AudioCaptureUnavailable,

    /// The user (or a policy) denied microphone access.
    #[error("microphone permission was denied")]
    PermissionDenied,

    /// The recognizer lost its network backend.
    #[error("network error during speech recognition")]
    NetworkError,

    /// The platform reported an abort. Expected during an intentional
    /// stop, in which case the controller swallows it instead of
    /// surfacing it as a failure.
    #[error("speech recognition was aborted")]
    IntentionalAbort,

    /// The configured recognition language is not supported.
    #[error("the configured language is not supported")]
    LanguageUnsupported,

    /// The speech service refused the request (policy or quota).
    #[error("the speech service is not allowed")]
    ServiceDisallowed,

    /// Anything the platform reports that we do not have a category for.
    #[error("speech recognition failed: {0}")]
    Unknown(String),
}

impl VoiceError {
    /// Map a low-level platform error code onto the taxonomy.
    ///
    /// Codes follow the conventional recognizer naming ("no-speech",
    /// "audio-capture", ...); anything unrecognized lands in `Unknown`.
    pub fn from_platform_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeechDetected,
            "audio-capture" => Self::AudioCaptureUnavailable,
            "not-allowed" => Self::PermissionDenied,
            "network" => Self::NetworkError,
            "aborted" => Self::IntentionalAbort,
            "language-not-supported" => Self::LanguageUnsupported,
            "service-not-allowed" => Self::ServiceDisallowed,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Human-readable message suitable for direct display in a UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::CapabilityUnavailable => {
                "Voice input is not supported on this device. Please type your symptoms instead."
                    .to_string()
            }
            Self::NoSpeechDetected => {
                "We could not hear anything. Please try speaking again.".to_string()
            }
            Self::AudioCaptureUnavailable => {
                "The microphone could not be accessed. Check that no other app is using it."
                    .to_string()
            }
            Self::PermissionDenied => {
                "Microphone access was denied. Enable it in your settings to use voice input."
                    .to_string()
            }
            Self::NetworkError => {
                "Voice recognition needs a network connection. Please check yours and retry."
                    .to_string()
            }
            Self::IntentionalAbort => "Voice input was cancelled.".to_string(),
            Self::LanguageUnsupported => {
                "The selected language is not supported for voice input.".to_string()
            }
            Self::ServiceDisallowed => {
                "The speech service is currently unavailable. Please try again later.".to_string()
            }
            Self::Unknown(code) => format!("Voice input failed ({code}). Please try again."),
        }
    }
}

// ── Geo errors ─────────────────────────────────────────────────────

/// Recoverable failures while querying the live facility source.
///
/// Neither variant ever reaches the caller as a hard error; the matcher
/// substitutes synthetic results and carries the cause along as a flag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    /// The transport failed or the service answered with a non-success
    /// status.
    #[error("facility query failed: {0}")]
    QueryFailed(String),

    /// The service answered, but the payload did not decode.
    #[error("facility data could not be parsed: {0}")]
    ParseFailed(String),
}

// ── Tests ──────────────────────────────────────────────────────────
