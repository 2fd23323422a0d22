//! Voice capture controller.
//!
//! One controller fronts the platform speech recognizer for a hosting
//! view. A capture session runs as a background task that consumes the
//! recognizer's event stream, maintains the transcript, and winds itself
//! down on silence, on explicit stop, on platform errors, or when the
//! host reports backgrounding / focus loss.
//!
//! ## Architecture
//!
//! ```text
//! host UI ─▸ start()/stop()/reset_transcript()
//!               │
//!               ▼                      RecognitionEvent
//! VoiceCaptureController ◂── run loop ◂─────────────── SpeechRecognizer
//!     │            │
//!     │            └─ watch: state, live transcript
//!     └─ mpsc: CaptureNotice (final transcript, errors)
//! ```
//!
//! The run loop is the only consumer of recognizer events and the only
//! writer of session state, so every timer decision happens in one place:
//! a single inactivity deadline, re-armed on each event.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch, Mutex as AsyncMutex, OwnedSemaphorePermit};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::VoiceSettings;
use crate::error::VoiceError;

use super::recognizer::{RecognizerConfig, RecognizerHandle, RecognizerLease, SpeechRecognizer};
use super::transcript::TranscriptBuffer;
use super::{CaptureNotice, CaptureState, RecognitionEvent};

// ── Constants ──────────────────────────────────────────────────────

/// Wait after a detected end of speech before wrapping the session up.
/// Much shorter than the inactivity timeout: once the speaker has audibly
/// stopped there is no reason to sit out the full silence window.
const POST_SPEECH_TIMEOUT: Duration = Duration::from_millis(1_000);

/// How long the stopping flag stays raised after a stop completes. An
/// `aborted` error from the platform inside this window is treated as the
/// echo of our own cancellation. The exact width is an implementation
/// choice, not a contract; under very fast start/stop cycles it may
/// suppress a genuine abort or let a spurious one through.
const STOP_COOLDOWN: Duration = Duration::from_millis(250);

// ── Controller ─────────────────────────────────────────────────────

/// Start/stop control over spoken input with automatic silence detection.
///
/// All controllers in a process share one [`RecognizerLease`], so at most
/// one recognition session is ever live regardless of how many views have
/// mounted a controller.
pub struct VoiceCaptureController {
    recognizer: Arc<dyn SpeechRecognizer>,
    lease: RecognizerLease,
    settings: VoiceSettings,
    shared: Arc<SessionShared>,
    /// Serializes `start` calls so rapid repeated starts line up cleanly.
    start_gate: AsyncMutex<()>,
    task: AsyncMutex<Option<JoinHandle<()>>>,
    notices: AsyncMutex<mpsc::Receiver<CaptureNotice>>,
    state_rx: watch::Receiver<CaptureState>,
    live_rx: watch::Receiver<String>,
}

/// State shared between the controller facade and the session task.
struct SessionShared {
    state_tx: watch::Sender<CaptureState>,
    live_tx: watch::Sender<String>,
    transcript: Mutex<TranscriptBuffer>,
    notice_tx: mpsc::Sender<CaptureNotice>,
    /// Raised while an intentional stop is in flight (plus a short
    /// cooldown afterwards); gates re-entrant stops and abort-echo
    /// suppression.
    stopping: AtomicBool,
    /// Stop signal for the currently running session task, if any.
    stop_tx: Mutex<Option<mpsc::Sender<()>>>,
}

impl VoiceCaptureController {
    /// Create a controller over the given recognizer backend.
    ///
    /// The lease must be the process-wide one; cloning it here is what
    /// ties every controller to the same exclusive resource.
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        lease: RecognizerLease,
        settings: VoiceSettings,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(CaptureState::Idle);
        let (live_tx, live_rx) = watch::channel(String::new());
        let (notice_tx, notice_rx) = mpsc::channel(32);

        Self {
            recognizer,
            lease,
            settings,
            shared: Arc::new(SessionShared {
                state_tx,
                live_tx,
                transcript: Mutex::new(TranscriptBuffer::new()),
                notice_tx,
                stopping: AtomicBool::new(false),
                stop_tx: Mutex::new(None),
            }),
            start_gate: AsyncMutex::new(()),
            task: AsyncMutex::new(None),
            notices: AsyncMutex::new(notice_rx),
            state_rx,
            live_rx,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CaptureState {
        *self.state_rx.borrow()
    }

    /// Watch lifecycle state changes (for UI binding).
    pub fn watch_state(&self) -> watch::Receiver<CaptureState> {
        self.state_rx.clone()
    }

    /// Current live display text: confirmed segments plus the in-flight
    /// interim hypothesis.
    pub fn live_text(&self) -> String {
        self.live_rx.borrow().clone()
    }

    /// Watch the live display text. Latest-value semantics: a consumer
    /// that falls behind sees only the newest revision.
    pub fn watch_live_text(&self) -> watch::Receiver<String> {
        self.live_rx.clone()
    }

    /// Receive the next terminal notification (final transcript or
    /// session error).
    pub async fn next_notice(&self) -> Option<CaptureNotice> {
        self.notices.lock().await.recv().await
    }

    /// Non-blocking variant of [`next_notice`](Self::next_notice).
    pub async fn try_next_notice(&self) -> Option<CaptureNotice> {
        self.notices.lock().await.try_recv().ok()
    }

    /// Begin a capture session.
    ///
    /// Fails fast with [`VoiceError::CapabilityUnavailable`] when the
    /// platform has no recognizer. If a session is already in flight it
    /// is fully stopped first, the platform is given a short settling
    /// delay, and only then is the resource reacquired.
    pub async fn start(&self) -> Result<(), VoiceError> {
        if !self.recognizer.is_available() {
            return Err(VoiceError::CapabilityUnavailable);
        }
        let _gate = self.start_gate.lock().await;

        if self.state() != CaptureState::Idle {
            self.stop().await;
            tokio::time::sleep(self.settings.settle_delay()).await;
        }

        // Exclusive ownership: blocks until whoever holds the resource
        // has released it, including sessions owned by other controllers.
        let permit = self.lease.acquire().await?;

        let session_id = Uuid::new_v4();
        self.shared.state_tx.send_replace(CaptureState::Starting);
        self.shared.transcript.lock().clear();
        self.shared.live_tx.send_replace(String::new());

        let config = RecognizerConfig {
            language: self.settings.language.clone(),
            continuous: true,
            interim_results: true,
        };

        let handle = match self.recognizer.open(&config).await {
            Ok(handle) => handle,
            Err(err) => {
                // Immediate acquisition failure: back to Idle, permit
                // drops right here and the resource stays free.
                self.shared.state_tx.send_replace(CaptureState::Idle);
                tracing::warn!(
                    session_id = %session_id,
                    error = %err,
                    "recognizer failed to open"
                );
                return Err(err);
            }
        };

        let (stop_tx, stop_rx) = mpsc::channel(1);
        *self.shared.stop_tx.lock() = Some(stop_tx);

        tracing::info!(
            session_id = %session_id,
            language = %config.language,
            "voice capture starting"
        );

        let shared = Arc::clone(&self.shared);
        let silence_timeout = self.settings.silence_timeout();
        let task = tokio::spawn(async move {
            run_session(session_id, handle, permit, shared, stop_rx, silence_timeout).await;
        });
        *self.task.lock().await = Some(task);

        // A fresh session obsoletes any lingering stop context.
        self.shared.stopping.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// End the current session, flushing the accumulated transcript to
    /// the notice channel before the resource is released.
    ///
    /// Idempotent: a second call while a stop is already in flight is a
    /// no-op. Safe to call from any state.
    pub async fn stop(&self) {
        if self.shared.stopping.swap(true, Ordering::SeqCst) {
            return;
        }

        let task = self.task.lock().await.take();
        match task {
            Some(task) => {
                if let Some(stop_tx) = self.shared.stop_tx.lock().take() {
                    let _ = stop_tx.try_send(());
                }
                let _ = task.await;
            }
            None => {
                self.shared.state_tx.send_replace(CaptureState::Idle);
            }
        }

        // Keep the flag raised briefly so a late abort echo from the
        // platform is still recognized as ours, then clear it for the
        // next clean start.
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(STOP_COOLDOWN).await;
            shared.stopping.store(false, Ordering::SeqCst);
        });
    }

    /// Clear the transcript without touching session state.
    ///
    /// Honored while Idle or Listening; mid-transition the buffer is
    /// being handed off and the request is ignored.
    pub fn reset_transcript(&self) {
        match self.state() {
            CaptureState::Idle | CaptureState::Listening => {
                self.shared.transcript.lock().clear();
                self.shared.live_tx.send_replace(String::new());
            }
            other => {
                tracing::debug!(state = ?other, "transcript reset ignored mid-transition");
            }
        }
    }

    /// The hosting view went hidden. Capture never continues unattended:
    /// the session is flushed and stopped immediately.
    pub async fn on_backgrounded(&self) {
        self.interrupt("backgrounded").await;
    }

    /// The hosting view lost input focus; handled like backgrounding.
    pub async fn on_focus_lost(&self) {
        self.interrupt("focus-lost").await;
    }

    async fn interrupt(&self, reason: &str) {
        if matches!(
            self.state(),
            CaptureState::Starting | CaptureState::Listening
        ) {
            tracing::info!(reason = reason, "voice capture interrupted by environment");
            self.stop().await;
        }
    }
}

impl Drop for VoiceCaptureController {
    fn drop(&mut self) {
        // Force-release the platform resource even when the host tears
        // the controller down mid-session.
        self.shared.stopping.store(true, Ordering::SeqCst);
        if let Some(stop_tx) = self.shared.stop_tx.lock().take() {
            let _ = stop_tx.try_send(());
        }
    }
}

// ── Session run loop ───────────────────────────────────────────────

/// Consume one session's event stream until something ends it, then
/// flush, release, and go back to Idle.
async fn run_session(
    session_id: Uuid,
    mut handle: RecognizerHandle,
    permit: OwnedSemaphorePermit,
    shared: Arc<SessionShared>,
    mut stop_rx: mpsc::Receiver<()>,
    silence_timeout: Duration,
) {
    let mut deadline = Instant::now() + silence_timeout;
    let mut fault: Option<VoiceError> = None;

    loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(RecognitionEvent::Started) => {
                    shared.state_tx.send_replace(CaptureState::Listening);
                    deadline = Instant::now() + silence_timeout;
                    tracing::debug!(session_id = %session_id, "recognizer acknowledged start");
                }
                Some(RecognitionEvent::Interim(text)) => {
                    let live = {
                        let mut transcript = shared.transcript.lock();
                        transcript.set_interim(&text);
                        transcript.live_text()
                    };
                    shared.live_tx.send_replace(live);
                    deadline = Instant::now() + silence_timeout;
                }
                Some(RecognitionEvent::Final(text)) => {
                    let live = {
                        let mut transcript = shared.transcript.lock();
                        transcript.push_final(&text);
                        transcript.live_text()
                    };
                    shared.live_tx.send_replace(live);
                    deadline = Instant::now() + silence_timeout;
                }
                Some(RecognitionEvent::SpeechEnd) => {
                    // The speaker audibly stopped; shorten the wait, but
                    // never push an already-nearer deadline out.
                    deadline = deadline.min(Instant::now() + POST_SPEECH_TIMEOUT);
                    tracing::debug!(session_id = %session_id, "end of speech detected");
                }
                Some(RecognitionEvent::Error(code)) => {
                    let err = VoiceError::from_platform_code(&code);
                    if suppress_fault(&err, shared.stopping.load(Ordering::SeqCst)) {
                        tracing::debug!(
                            session_id = %session_id,
                            code = %code,
                            "abort echo suppressed during intentional stop"
                        );
                    } else {
                        tracing::warn!(
                            session_id = %session_id,
                            code = %code,
                            "recognition error"
                        );
                        fault = Some(err);
                    }
                    break;
                }
                Some(RecognitionEvent::Ended) | None => {
                    tracing::debug!(session_id = %session_id, "recognizer session ended");
                    break;
                }
            },
            _ = tokio::time::sleep_until(deadline) => {
                tracing::debug!(session_id = %session_id, "inactivity timeout reached");
                break;
            }
            _ = stop_rx.recv() => {
                tracing::debug!(session_id = %session_id, "stop requested");
                break;
            }
        }
    }

    shared.state_tx.send_replace(CaptureState::Stopping);

    // Flush before releasing the resource. Partial text survives even a
    // no-speech failure, and the error notice follows the transcript.
    let final_text = shared.transcript.lock().take_final_text();
    if !final_text.is_empty() {
        if shared
            .notice_tx
            .send(CaptureNotice::Transcript(final_text))
            .await
            .is_err()
        {
            tracing::debug!(session_id = %session_id, "notice receiver gone, transcript dropped");
        }
    }
    if let Some(err) = fault {
        let _ = shared.notice_tx.send(CaptureNotice::Error(err)).await;
    }

    handle.abort();
    shared.live_tx.send_replace(String::new());
    shared.state_tx.send_replace(CaptureState::Idle);
    drop(permit);

    tracing::info!(session_id = %session_id, "voice capture session closed");
}

/// An abort reported while we are stopping on purpose is cancellation
/// noise, not a failure.
fn suppress_fault(err: &VoiceError, stopping: bool) -> bool {
    stopping && matches!(err, VoiceError::IntentionalAbort)
}

// ── Tests ──────────────────────────────────────────────────────────
