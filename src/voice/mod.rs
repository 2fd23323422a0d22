//! Voice capture pipeline.
//!
//! Provides hands-free symptom dictation on top of a platform speech
//! recognizer, with automatic silence detection and a hard guarantee that
//! at most one recognition session is live per process.
//!
//! ## Design
//! - Trait-driven recognizer abstraction (`SpeechRecognizer`) so hosts
//!   plug in whatever the platform offers and tests plug in fakes
//! - A single tagged event stream per session, consumed by one
//!   state-machine loop (no scattered callbacks)
//! - Exclusive ownership of the recognition resource through an injected
//!   lease; the run loop holds the permit and releases it on every exit
//! - One centralized inactivity deadline, re-armed on each event

pub mod capture;
pub mod recognizer;
pub mod transcript;

use crate::error::VoiceError;

// ── Shared session types ─────────────────────────────────────────

/// Event emitted by a live recognition session.
///
/// Implementations of [`recognizer::SpeechRecognizer`] translate whatever
/// the platform delivers into this union; the capture controller consumes
/// it in a single loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// The platform acknowledged the session and is listening.
    Started,
    /// An in-progress hypothesis that may still change.
    Interim(String),
    /// A finalized utterance segment that will not be revised.
    Final(String),
    /// The recognizer heard the speaker fall silent.
    SpeechEnd,
    /// A platform failure, identified by its raw error code.
    Error(String),
    /// The platform closed the session on its own.
    Ended,
}

/// Lifecycle state of the capture controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    /// No session; the recognition resource is free.
    #[default]
    Idle,
    /// A session was requested and the resource is being acquired.
    Starting,
    /// Live recognition is in progress.
    Listening,
    /// The session is winding down (flushing, releasing the resource).
    Stopping,
}

/// Terminal notification delivered by the controller to its consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureNotice {
    /// The accumulated final transcript, delivered once per session when
    /// it ends (explicit stop, silence timeout, or forced termination).
    Transcript(String),
    /// A recognition failure, already mapped onto the taxonomy.
    Error(VoiceError),
}

pub use capture::VoiceCaptureController;
pub use recognizer::{RecognizerConfig, RecognizerHandle, RecognizerLease, SpeechRecognizer};
pub use transcript::TranscriptBuffer;
