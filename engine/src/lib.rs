//! Prompt engine for Ember.
//!
//! Connects the pure policy in `ember-core` to a session store: the
//! [`PromptController`] state machine, the [`PromptFeature`] task that drives
//! it from store emissions, and the collaborator traits a host implements.

mod command;
mod controller;
mod delegates;
mod error;
mod feature;
mod observe;
mod store;

pub use command::{PromptCommand, Reply};
pub use controller::{PromptController, VisiblePrompt};
pub use delegates::{
    ActivityResult, CreditCardValidation, CreditCardValidationDelegate, ExitFullscreen,
    FileOutcome, FilePicker, FileSelection, LoginValidation, LoginValidationDelegate, Notifier,
    PromptDelegates, ShareCompletion, ShareDelegate,
};
pub use error::{FilePickerError, PromptError};
pub use feature::{PromptFeature, PromptFeatureHandle};
pub use observe::{ObservableCell, Observation, Projection, host_of};
pub use store::{
    BrowserState, ContentState, InMemoryStore, PermissionRequest, SessionStore, TabSessionState,
};

// Re-export the policy types callers need alongside the controller.
pub use ember_core::{ActivePicker, FeatureFlags, LoginPickerVariant};
