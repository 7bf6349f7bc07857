//! Async driver for [`PromptController`].
//!
//! One task owns the controller and serialises store emissions with user
//! commands, so no event is processed while another one's teardown or
//! admission is still in flight.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use ember_types::{PromptUid, PromptValue, TabId};

use crate::command::PromptCommand;
use crate::controller::{COMMAND_CHANNEL_CAPACITY, PromptController, VisiblePrompt};
use crate::error::PromptError;

/// A running prompt controller.
///
/// Construction starts the controller; [`PromptFeature::stop`] hands it back.
pub struct PromptFeature {
    handle: PromptFeatureHandle,
    task: JoinHandle<(PromptController, mpsc::Receiver<PromptCommand>)>,
}

impl PromptFeature {
    /// Start `controller` on the current tokio runtime.
    pub fn spawn(mut controller: PromptController) -> Result<Self, PromptError> {
        // Collaborator completions keep using the controller's own queue,
        // which outlives this run. Handle commands get a channel per run so
        // a stale handle fails instead of waiting on a stopped controller.
        let mut queued = controller.take_commands().ok_or(PromptError::AlreadyRunning)?;
        let (tx, mut commands) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let handle = PromptFeatureHandle {
            tx,
            visible: controller.subscribe_visible(),
        };
        let mut states = controller.store().subscribe();

        controller.start();
        let initial = states.borrow_and_update().clone();
        controller.on_state(&initial);

        let task = tokio::spawn(async move {
            loop {
                // Store changes first, so a command always sees every
                // emission that happened before it was sent.
                tokio::select! {
                    biased;
                    changed = states.changed() => {
                        if changed.is_err() {
                            tracing::debug!("Session store closed");
                            break;
                        }
                        let state = states.borrow_and_update().clone();
                        controller.on_state(&state);
                    }
                    Some(command) = queued.recv() => match command {
                        PromptCommand::Stop => break,
                        command => controller.apply(command),
                    },
                    command = commands.recv() => match command {
                        Some(PromptCommand::Stop) | None => break,
                        Some(command) => controller.apply(command),
                    },
                }
            }
            controller.stop();
            (controller, queued)
        });

        Ok(Self { handle, task })
    }

    #[must_use]
    pub fn handle(&self) -> PromptFeatureHandle {
        self.handle.clone()
    }

    /// Stop observing and return the controller, ready to be spawned again.
    /// Pending requests stay in the store.
    pub async fn stop(self) -> Result<PromptController, PromptError> {
        // A closed channel means the task already ended; join it regardless.
        let _ = self.handle.tx.send(PromptCommand::Stop).await;
        let (mut controller, queued) = self.task.await.map_err(|err| {
            tracing::error!(error = %err, "Prompt feature task failed");
            PromptError::FeatureStopped
        })?;
        controller.restore_commands(queued);
        Ok(controller)
    }
}

/// Cloneable front end used by the renderer.
#[derive(Debug, Clone)]
pub struct PromptFeatureHandle {
    tx: mpsc::Sender<PromptCommand>,
    visible: watch::Receiver<Option<VisiblePrompt>>,
}

impl PromptFeatureHandle {
    /// Observe the visible prompt.
    #[must_use]
    pub fn visible_prompt(&self) -> watch::Receiver<Option<VisiblePrompt>> {
        self.visible.clone()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> PromptCommand,
    ) -> Result<T, PromptError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| PromptError::FeatureStopped)?;
        rx.await.map_err(|_| PromptError::FeatureStopped)
    }

    pub async fn confirm(
        &self,
        tab: TabId,
        uid: PromptUid,
        value: PromptValue,
    ) -> Result<(), PromptError> {
        self.request(|reply| PromptCommand::Confirm {
            tab,
            uid,
            value,
            reply: Some(reply),
        })
        .await?
    }

    pub async fn cancel(
        &self,
        tab: TabId,
        uid: PromptUid,
        value: PromptValue,
    ) -> Result<(), PromptError> {
        self.request(|reply| PromptCommand::Cancel {
            tab,
            uid,
            value,
            reply: Some(reply),
        })
        .await?
    }

    pub async fn clear(&self, tab: TabId, uid: PromptUid) -> Result<(), PromptError> {
        self.request(|reply| PromptCommand::Clear {
            tab,
            uid,
            reply: Some(reply),
        })
        .await
    }

    /// Returns `true` if a picker consumed the back press.
    pub async fn back_pressed(&self) -> Result<bool, PromptError> {
        self.request(|reply| PromptCommand::BackPressed { reply }).await
    }

    /// Wait until the controller has caught up with the store.
    pub async fn flush(&self) -> Result<(), PromptError> {
        self.request(|reply| PromptCommand::Flush { reply }).await
    }
}
