use ember_types::PromptKindTag;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    /// The renderer answered a prompt with a value of the wrong shape.
    ///
    /// The request is left pending; this is a wiring bug, not a user action.
    #[error("{kind} prompt cannot take a `{found}` value (expected {expected})")]
    ValueMismatch {
        kind: PromptKindTag,
        expected: &'static str,
        found: &'static str,
    },
    #[error("prompt feature is stopped")]
    FeatureStopped,
    #[error("controller is already driven by a prompt feature")]
    AlreadyRunning,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilePickerError {
    #[error("no application can handle the file request")]
    HandlerNotFound,
    #[error("file picker failed: {0}")]
    Failed(String),
}
