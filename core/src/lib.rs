//! Prompt policy for Ember.
//!
//! Pure decision logic with no IO and no async: the dialog abuse detector,
//! the admission and display-gate rules, and the picker sub-state machine.
//! The engine crate drives these from store events.

pub mod abuse;
pub mod picker;
pub mod policy;

pub use abuse::PromptAbuseDetector;
pub use picker::{ActivePicker, LoginPickerVariant, PickerPlan, PickerState};
pub use policy::{
    Admission, AdmissionContext, DismissReason, FeatureFlags, IgnoreReason,
    SavedGeneratedPassword, can_show_this_prompt, is_abusable, is_windowed, resolve_admission,
};
