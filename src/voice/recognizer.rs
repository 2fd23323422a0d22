//! Platform speech-recognizer abstraction.
//!
//! The recognition resource is a process-wide singleton on every platform
//! this crate targets, so acquisition is modeled as an explicit lease: the
//! capture controller takes the single permit before opening a session and
//! the permit travels with the session task, which releases it on every
//! exit path. Platform glue implements [`SpeechRecognizer`] and feeds
//! events through the handle's channel.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::RecognitionEvent;
use crate::error::VoiceError;

// ── Session configuration ────────────────────────────────────────

/// Settings handed to the platform when a recognition session opens.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// BCP-47 language tag (e.g. "en-US").
    pub language: String,
    /// Keep recognizing across pauses instead of closing after the first
    /// utterance.
    pub continuous: bool,
    /// Emit in-progress hypotheses, not only finalized segments.
    pub interim_results: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            continuous: true,
            interim_results: true,
        }
    }
}

// ── Recognizer trait ─────────────────────────────────────────────

/// A platform speech-recognition backend.
///
/// Implementations translate native callbacks into [`RecognitionEvent`]s
/// on the handle's channel. Opening a session must hand back a
/// [`RecognizerHandle`] whose release hook tears the native session down;
/// the controller guarantees the hook runs exactly once, on every exit
/// path including task teardown.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Whether the capability exists at all on this platform.
    fn is_available(&self) -> bool;

    /// Open a live recognition session.
    async fn open(&self, config: &RecognizerConfig) -> Result<RecognizerHandle, VoiceError>;
}

// ── Session handle ───────────────────────────────────────────────

/// A live recognition session: an event stream plus a release hook.
///
/// Dropping the handle (or calling [`abort`](Self::abort)) runs the
/// release hook synchronously, which detaches the platform's event
/// delivery so late events can never reach a discarded session.
pub struct RecognizerHandle {
    events: mpsc::Receiver<RecognitionEvent>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl RecognizerHandle {
    /// Build a handle from an event channel and a release hook.
    pub fn new(
        events: mpsc::Receiver<RecognitionEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            events,
            release: Some(Box::new(release)),
        }
    }

    /// Receive the next session event, or `None` once the platform side
    /// has gone away.
    pub async fn next_event(&mut self) -> Option<RecognitionEvent> {
        self.events.recv().await
    }

    /// Tear the native session down and detach event delivery.
    /// Idempotent; also runs on drop.
    pub fn abort(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
        self.events.close();
    }
}

impl Drop for RecognizerHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

impl std::fmt::Debug for RecognizerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognizerHandle")
            .field("released", &self.release.is_none())
            .finish()
    }
}

// ── Exclusive lease ──────────────────────────────────────────────

/// Process-wide exclusive lease on the recognition resource.
///
/// Create one per process and clone it into every controller; a new
/// session cannot open until the previous session's permit is dropped.
#[derive(Clone)]
pub struct RecognizerLease {
    permits: Arc<Semaphore>,
}

impl RecognizerLease {
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// Wait for exclusive ownership of the resource. The returned permit
    /// releases it when dropped.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, VoiceError> {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| VoiceError::Unknown("recognizer lease closed".to_string()))
    }

    /// Whether the resource is currently free.
    pub fn is_free(&self) -> bool {
        self.permits.available_permits() > 0
    }
}

impl Default for RecognizerLease {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn lease_is_exclusive() {
        let lease = RecognizerLease::new();
        assert!(lease.is_free());

        let permit = lease.acquire().await.unwrap();
        assert!(!lease.is_free());

        drop(permit);
        assert!(lease.is_free());
    }

    #[tokio::test]
    async fn second_acquire_waits_for_release() {
        let lease = RecognizerLease::new();
        let permit = lease.acquire().await.unwrap();

        let waiter = {
            let lease = lease.clone();
            tokio::spawn(async move {
                let _permit = lease.acquire().await.unwrap();
            })
        };

        // the waiter cannot finish while the permit is held
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(permit);
        waiter.await.unwrap();
        assert!(lease.is_free());
    }

    #[tokio::test]
    async fn handle_release_runs_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let (_tx, rx) = mpsc::channel(4);

        let counter = released.clone();
        let mut handle = RecognizerHandle::new(rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        handle.abort();
        handle.abort();
        drop(handle);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropping_handle_releases() {
        let released = Arc::new(AtomicUsize::new(0));
        let (_tx, rx) = mpsc::channel(4);

        let counter = released.clone();
        let handle = RecognizerHandle::new(rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        drop(handle);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handle_delivers_events_in_order() {
        let (tx, rx) = mpsc::channel(4);
        let mut handle = RecognizerHandle::new(rx, || {});

        tx.send(RecognitionEvent::Started).await.unwrap();
        tx.send(RecognitionEvent::Final("hello".into())).await.unwrap();

        assert_eq!(handle.next_event().await, Some(RecognitionEvent::Started));
        assert_eq!(
            handle.next_event().await,
            Some(RecognitionEvent::Final("hello".into()))
        );
    }
}
