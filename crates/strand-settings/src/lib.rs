//! # strand-settings
//!
//! Configuration management with layered sources for the Strand agent.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`StrandSettings::default()`]
//! 2. **User file** — `~/.strand/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `STRAND_*` overrides (highest priority)
//!
//! The core crates never read the global directly: limits and thresholds are
//! passed as explicit immutable values per call, which keeps every component
//! deterministic under test. The [`get_settings`] singleton exists for the
//! surrounding shell's convenience.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::{ContextSettings, MatchingSettings, StrandSettings, WorkspaceSettings};

use std::sync::OnceLock;

/// Global settings singleton.
static SETTINGS: OnceLock<StrandSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.strand/settings.json` with env var
/// overrides. On subsequent calls, returns the cached value. If loading
/// fails, returns compiled defaults.
pub fn get_settings() -> &'static StrandSettings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

/// Initialize the global settings with a specific value.
///
/// # Errors
///
/// Returns the provided settings back if the global was already initialized.
pub fn init_settings(settings: StrandSettings) -> std::result::Result<(), StrandSettings> {
    SETTINGS.set(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
