//! Commands posted to a running controller.

use tokio::sync::oneshot;

use ember_types::{PromptUid, PromptValue, TabId};

use crate::error::PromptError;

pub type Reply<T> = oneshot::Sender<T>;

/// User actions and collaborator completions, serialised with store events.
///
/// `reply` is `None` for fire-and-forget senders such as share completions.
#[derive(Debug)]
pub enum PromptCommand {
    Confirm {
        tab: TabId,
        uid: PromptUid,
        value: PromptValue,
        reply: Option<Reply<Result<(), PromptError>>>,
    },
    Cancel {
        tab: TabId,
        uid: PromptUid,
        value: PromptValue,
        reply: Option<Reply<Result<(), PromptError>>>,
    },
    Clear {
        tab: TabId,
        uid: PromptUid,
        reply: Option<Reply<()>>,
    },
    BackPressed {
        reply: Reply<bool>,
    },
    /// Replies once every store change and command queued before it has
    /// been applied.
    Flush {
        reply: Reply<()>,
    },
    Stop,
}

impl PromptCommand {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Confirm { .. } => "confirm",
            Self::Cancel { .. } => "cancel",
            Self::Clear { .. } => "clear",
            Self::BackPressed { .. } => "back_pressed",
            Self::Flush { .. } => "flush",
            Self::Stop => "stop",
        }
    }
}
