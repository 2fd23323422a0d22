//! Transcript accumulation for a single capture session.
//!
//! Finalized utterance segments are appended in arrival order and never
//! revised. The interim hypothesis is coalesced: a newer interim replaces
//! the older one outright, it is never queued. The live display text is
//! whatever has been finalized plus the current interim.

/// Accumulates recognizer output for one session.
#[derive(Debug, Default)]
pub struct TranscriptBuffer {
    /// Confirmed utterance segments, in arrival order.
    finals: Vec<String>,
    /// Latest unconfirmed hypothesis. Replaced on every interim event.
    interim: String,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the in-progress hypothesis.
    pub fn set_interim(&mut self, text: &str) {
        self.interim.clear();
        self.interim.push_str(text.trim());
    }

    /// Append a finalized segment. The interim hypothesis it grew out of
    /// is dropped at the same time.
    pub fn push_final(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.finals.push(text.to_string());
        }
        self.interim.clear();
    }

    /// Confirmed text only, segments joined with single spaces.
    pub fn final_text(&self) -> String {
        self.finals.join(" ")
    }

    /// Confirmed text plus the current interim hypothesis.
    pub fn live_text(&self) -> String {
        let mut text = self.final_text();
        if !self.interim.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&self.interim);
        }
        text
    }

    /// Take the confirmed text out of the buffer, clearing everything.
    pub fn take_final_text(&mut self) -> String {
        let text = self.final_text();
        self.clear();
        text
    }

    pub fn is_empty(&self) -> bool {
        self.finals.is_empty() && self.interim.is_empty()
    }

    pub fn clear(&mut self) {
        self.finals.clear();
        self.interim.clear();
    }
}

// ── Tests ──────────────────────────────────────────────────────────
