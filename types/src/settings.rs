//! Resolved prompt settings shared across crates.
//!
//! Raw TOML structs stay private in `ember-config`; the loader resolves them
//! into these types at the parse boundary. A `DialogLimits` value is proof
//! that its thresholds are usable.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("max_successive_dialog_count must be at least 1")]
    ZeroDialogCount,
    #[error("max_successive_dialog_seconds must be at least 1")]
    ZeroDialogWindow,
}

/// Default number of successive dialogs before the page is considered abusive.
pub const MAX_SUCCESSIVE_DIALOG_COUNT: u32 = 2;

/// Default window, in seconds, within which dialogs count as successive.
pub const MAX_SUCCESSIVE_DIALOG_SECONDS: u64 = 3;

#[derive(Deserialize)]
struct RawDialogLimits {
    #[serde(default = "default_dialog_count")]
    max_successive_dialog_count: u32,
    #[serde(default = "default_dialog_seconds")]
    max_successive_dialog_seconds: u64,
}

const fn default_dialog_count() -> u32 {
    MAX_SUCCESSIVE_DIALOG_COUNT
}

const fn default_dialog_seconds() -> u64 {
    MAX_SUCCESSIVE_DIALOG_SECONDS
}

/// Thresholds for the dialog abuse gate.
///
/// Invariant: both limits are non-zero (enforced via `#[serde(try_from)]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDialogLimits")]
pub struct DialogLimits {
    max_successive_dialog_count: u32,
    max_successive_dialog_seconds: u64,
}

impl TryFrom<RawDialogLimits> for DialogLimits {
    type Error = SettingsError;

    fn try_from(raw: RawDialogLimits) -> Result<Self, Self::Error> {
        Self::new(raw.max_successive_dialog_count, raw.max_successive_dialog_seconds)
    }
}

impl DialogLimits {
    pub fn new(count: u32, seconds: u64) -> Result<Self, SettingsError> {
        if count == 0 {
            return Err(SettingsError::ZeroDialogCount);
        }
        if seconds == 0 {
            return Err(SettingsError::ZeroDialogWindow);
        }
        Ok(Self {
            max_successive_dialog_count: count,
            max_successive_dialog_seconds: seconds,
        })
    }

    #[must_use]
    pub fn max_successive_dialog_count(&self) -> u32 {
        self.max_successive_dialog_count
    }

    #[must_use]
    pub fn max_successive_dialog_seconds(&self) -> u64 {
        self.max_successive_dialog_seconds
    }
}

impl Default for DialogLimits {
    fn default() -> Self {
        Self {
            max_successive_dialog_count: MAX_SUCCESSIVE_DIALOG_COUNT,
            max_successive_dialog_seconds: MAX_SUCCESSIVE_DIALOG_SECONDS,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Autofill feature switches consulted on every admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AutofillSettings {
    #[serde(default = "default_true")]
    pub login: bool,
    #[serde(default = "default_true")]
    pub save_login: bool,
    #[serde(default = "default_true")]
    pub credit_card: bool,
    #[serde(default = "default_true")]
    pub address: bool,
}

impl Default for AutofillSettings {
    fn default() -> Self {
        Self {
            login: true,
            save_login: true,
            credit_card: true,
            address: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PasswordSettings {
    /// Open the password generator directly instead of the suggestion bar.
    #[serde(default)]
    pub auto_show_suggested: bool,
}

/// Everything the prompt controller reads from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PromptSettings {
    #[serde(default)]
    pub autofill: AutofillSettings,
    #[serde(default)]
    pub passwords: PasswordSettings,
    #[serde(default)]
    pub dialogs: DialogLimits,
}
