//! Library configuration.
//!
//! Hosts embed `CareScoutConfig` directly or load it from a TOML file.
//! Every field has a default so a bare `[voice]` / `[geo]` table (or no
//! file at all) yields a working setup.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

// ── Voice settings ───────────────────────────────────────────────

/// Tunables for the voice capture controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    /// BCP-47 language tag handed to the recognizer (e.g. "en-US").
    pub language: String,
    /// Milliseconds of recognizer inactivity before a session auto-stops.
    pub silence_timeout_ms: u64,
    /// Milliseconds to let a stopped recognizer settle before a restart.
    pub settle_delay_ms: u64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            silence_timeout_ms: 3_000,
            settle_delay_ms: 150,
        }
    }
}

impl VoiceSettings {
    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

// ── Geo settings ─────────────────────────────────────────────────

/// Tunables for the facility matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoSettings {
    /// Overpass-compatible interpreter endpoint.
    pub endpoint: String,
    /// Search radius around the origin, in kilometers.
    pub radius_km: f64,
    /// Maximum number of candidates returned from one search.
    pub max_results: usize,
    /// HTTP client timeout, matching the interpreter's declared budget.
    pub request_timeout_secs: u64,
}

impl Default for GeoSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://overpass-api.de/api/interpreter".to_string(),
            radius_km: 10.0,
            max_results: 15,
            request_timeout_secs: 30,
        }
    }
}

impl GeoSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Radius in whole meters, as the query language wants it.
    pub fn radius_m(&self) -> u32 {
        (self.radius_km * 1000.0).round() as u32
    }
}

// ── Top-level config ─────────────────────────────────────────────

/// Aggregated configuration for the crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CareScoutConfig {
    pub voice: VoiceSettings,
    pub geo: GeoSettings,
}

impl CareScoutConfig {
    /// Parse a TOML document. Unknown keys are ignored, missing keys
    /// take their defaults.
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("invalid carescout configuration")
    }

    /// Load configuration from a TOML file on disk.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
    }
}

// ── Tests ──────────────────────────────────────────────────────────
