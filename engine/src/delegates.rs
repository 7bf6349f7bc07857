//! Host-provided collaborators.
//!
//! Everything the controller cannot do itself (launching a system file
//! chooser, presenting a share sheet, validating a credential against the
//! user's saved data) is injected through these traits. A missing
//! collaborator is supported configuration: the affected requests are
//! dismissed and a diagnostic is logged.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use ember_types::{
    CreditCardEntry, LoginEntry, PromptRequest, PromptUid, PromptValue, ShareData, TabId,
};

use crate::command::PromptCommand;
use crate::error::FilePickerError;

/// Opaque platform callback delivered after a system picker activity ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityResult {
    pub request_code: i32,
    pub result_code: i32,
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Selected(Vec<String>),
    Cancelled,
}

/// A file request the picker finished with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub tab: TabId,
    pub uid: PromptUid,
    pub outcome: FileOutcome,
}

/// Launches system file choosers for `File` requests.
///
/// The picker keeps track of which request it launched for; platform results
/// come back through the controller and are mapped to a [`FileSelection`].
pub trait FilePicker: Send + Sync {
    fn handle_file_request(
        &self,
        tab: &TabId,
        request: &PromptRequest,
    ) -> Result<(), FilePickerError>;

    fn on_activity_result(&self, result: &ActivityResult) -> Option<FileSelection>;

    fn on_permissions_result(&self, permissions: &[String], grants: &[bool]);

    fn on_photo_picker_result(&self, uris: &[String]) -> Option<FileSelection>;
}

/// Presents the platform share surface for `Share` requests.
pub trait ShareDelegate: Send + Sync {
    /// Show the share sheet. Exactly one of the completion's methods should be
    /// called once the sheet closes.
    fn show_share_sheet(&self, tab: &TabId, data: &ShareData, completion: ShareCompletion);
}

/// Routes the outcome of a share sheet back to the controller.
pub struct ShareCompletion {
    tab: TabId,
    uid: PromptUid,
    tx: mpsc::Sender<PromptCommand>,
}

impl ShareCompletion {
    pub(crate) fn new(tab: TabId, uid: PromptUid, tx: mpsc::Sender<PromptCommand>) -> Self {
        Self { tab, uid, tx }
    }

    #[must_use]
    pub fn uid(&self) -> &PromptUid {
        &self.uid
    }

    pub fn succeeded(self) {
        let command = PromptCommand::Confirm {
            tab: self.tab,
            uid: self.uid,
            value: PromptValue::None,
            reply: None,
        };
        Self::post(&self.tx, command);
    }

    pub fn dismissed(self) {
        let command = PromptCommand::Cancel {
            tab: self.tab,
            uid: self.uid,
            value: PromptValue::None,
            reply: None,
        };
        Self::post(&self.tx, command);
    }

    fn post(tx: &mpsc::Sender<PromptCommand>, command: PromptCommand) {
        if let Err(err) = tx.try_send(command) {
            tracing::warn!(error = %err, "Dropping share completion");
        }
    }
}

impl fmt::Debug for ShareCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareCompletion")
            .field("tab", &self.tab)
            .field("uid", &self.uid)
            .finish_non_exhaustive()
    }
}

/// How saving a login would affect the user's stored logins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginValidation {
    Create,
    Update,
    Unchanged,
}

pub trait LoginValidationDelegate: Send + Sync {
    fn validate(&self, entry: &LoginEntry) -> LoginValidation;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditCardValidation {
    Create,
    Update,
}

pub trait CreditCardValidationDelegate: Send + Sync {
    fn validate(&self, entry: &CreditCardEntry) -> CreditCardValidation;
}

/// Transient user-facing notices.
pub trait Notifier: Send + Sync {
    fn show_notice(&self, tab: &TabId, message: &str);
}

pub trait ExitFullscreen: Send + Sync {
    fn exit_fullscreen(&self, tab: &TabId);
}

/// The set of collaborators a controller is built with.
#[derive(Clone, Default)]
pub struct PromptDelegates {
    pub(crate) file_picker: Option<Arc<dyn FilePicker>>,
    pub(crate) share: Option<Arc<dyn ShareDelegate>>,
    pub(crate) login_validator: Option<Arc<dyn LoginValidationDelegate>>,
    pub(crate) credit_card_validator: Option<Arc<dyn CreditCardValidationDelegate>>,
    pub(crate) notifier: Option<Arc<dyn Notifier>>,
    pub(crate) fullscreen: Option<Arc<dyn ExitFullscreen>>,
}

impl PromptDelegates {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_picker(mut self, picker: Arc<dyn FilePicker>) -> Self {
        self.file_picker = Some(picker);
        self
    }

    pub fn with_share(mut self, share: Arc<dyn ShareDelegate>) -> Self {
        self.share = Some(share);
        self
    }

    pub fn with_login_validator(mut self, validator: Arc<dyn LoginValidationDelegate>) -> Self {
        self.login_validator = Some(validator);
        self
    }

    pub fn with_credit_card_validator(
        mut self,
        validator: Arc<dyn CreditCardValidationDelegate>,
    ) -> Self {
        self.credit_card_validator = Some(validator);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_exit_fullscreen(mut self, fullscreen: Arc<dyn ExitFullscreen>) -> Self {
        self.fullscreen = Some(fullscreen);
        self
    }
}

impl fmt::Debug for PromptDelegates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptDelegates")
            .field("file_picker", &self.file_picker.is_some())
            .field("share", &self.share.is_some())
            .field("login_validator", &self.login_validator.is_some())
            .field("credit_card_validator", &self.credit_card_validator.is_some())
            .field("notifier", &self.notifier.is_some())
            .field("fullscreen", &self.fullscreen.is_some())
            .finish()
    }
}
