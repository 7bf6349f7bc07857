//! Dialog abuse detection.
//!
//! Pages can loop on `alert()`/`confirm()` to lock the user out of the
//! browser. The detector tracks successive blocking dialogs and, once the user
//! opts out through the "don't show more dialogs" checkbox, closes the gate
//! for the rest of the page view.

use std::time::{Duration, Instant};

use ember_types::DialogLimits;

/// Per-navigation dialog abuse signal.
///
/// Owned by a single controller; reset on controller start and whenever the
/// page settles after a load.
#[derive(Debug, Clone)]
pub struct PromptAbuseDetector {
    limits: DialogLimits,
    /// Dialogs shown in a row, each within the window of the previous one.
    js_alert_count: u32,
    /// Dialogs since the last explicit reset, regardless of spacing.
    dialogs_since_reset: u32,
    last_dialog_shown_at: Option<Instant>,
    user_wants_more_dialogs: bool,
}

impl PromptAbuseDetector {
    #[must_use]
    pub fn new(limits: DialogLimits) -> Self {
        Self {
            limits,
            js_alert_count: 0,
            dialogs_since_reset: 0,
            last_dialog_shown_at: None,
            user_wants_more_dialogs: true,
        }
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.limits.max_successive_dialog_seconds())
    }

    /// Forget past abuse; a new page view starts with a clean slate.
    pub fn reset_js_alert_abuse_state(&mut self) {
        self.js_alert_count = 0;
        self.dialogs_since_reset = 0;
        self.last_dialog_shown_at = None;
        self.user_wants_more_dialogs = true;
    }

    /// Record the "don't show more dialogs" checkbox (`allow == !checked`).
    pub fn user_wants_more_dialogs(&mut self, allow: bool) {
        self.user_wants_more_dialogs = allow;
    }

    /// Advance the successive-dialog counter after a gated display decision.
    pub fn update_js_dialog_abused_state(&mut self) {
        self.update_js_dialog_abused_state_at(Instant::now());
    }

    pub fn update_js_dialog_abused_state_at(&mut self, now: Instant) {
        if !self.abused_by_time(now) {
            self.js_alert_count = 0;
        }
        self.js_alert_count = self.js_alert_count.saturating_add(1);
        self.dialogs_since_reset = self.dialogs_since_reset.saturating_add(1);
        self.last_dialog_shown_at = Some(now);
    }

    /// Gate for abusable dialog kinds. Closes once the user opted out and
    /// the threshold was reached since the last reset; spacing dialogs out
    /// does not reopen it.
    #[must_use]
    pub fn should_show_more_dialogs(&self) -> bool {
        self.user_wants_more_dialogs
            || self.dialogs_since_reset < self.limits.max_successive_dialog_count()
    }

    #[must_use]
    pub fn dialogs_since_reset(&self) -> u32 {
        self.dialogs_since_reset
    }

    /// Whether the opt-out checkbox should be offered on the next dialog.
    #[must_use]
    pub fn are_dialogs_being_abused(&self) -> bool {
        self.are_dialogs_being_abused_at(Instant::now())
    }

    #[must_use]
    pub fn are_dialogs_being_abused_at(&self, now: Instant) -> bool {
        self.abused_by_time(now) || self.abused_by_count()
    }

    /// Successive dialogs still inside the abuse window at `now`.
    #[must_use]
    pub fn successive_dialog_count_at(&self, now: Instant) -> u32 {
        if self.abused_by_time(now) {
            self.js_alert_count
        } else {
            0
        }
    }

    fn abused_by_time(&self, now: Instant) -> bool {
        if self.js_alert_count == 0 {
            return false;
        }
        self.last_dialog_shown_at
            .is_some_and(|last| now.saturating_duration_since(last) < self.window())
    }

    fn abused_by_count(&self) -> bool {
        self.js_alert_count > self.limits.max_successive_dialog_count()
    }
}

impl Default for PromptAbuseDetector {
    fn default() -> Self {
        Self::new(DialogLimits::default())
    }
}
