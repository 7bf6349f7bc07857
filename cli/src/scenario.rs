//! Scenario files: scripted store mutations and user actions replayed against
//! a running [`PromptFeature`].
//!
//! ```toml
//! [[steps]]
//! action = "open_tab"
//! tab = "t1"
//! url = "https://example.com/"
//!
//! [[steps]]
//! action = "push_prompt"
//! tab = "t1"
//! prompt = { uid = "a1", kind = "alert", message = "hi" }
//!
//! [[steps]]
//! action = "confirm"
//! tab = "t1"
//! uid = "a1"
//! value = { value = "checkbox", checked = false }
//! ```

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::Deserialize;

use ember_engine::{InMemoryStore, PermissionRequest, PromptController, PromptFeature, SessionStore, VisiblePrompt};
use ember_types::{PromptRequest, PromptResponse, PromptSettings, PromptUid, PromptValue, Responder, TabId};

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    OpenTab {
        tab: TabId,
        url: String,
        #[serde(default)]
        custom: bool,
    },
    SelectTab {
        tab: TabId,
    },
    CloseTab {
        tab: TabId,
    },
    Navigate {
        tab: TabId,
        url: String,
    },
    SetLoading {
        tab: TabId,
        loading: bool,
    },
    PushPrompt {
        tab: TabId,
        prompt: PromptRequest,
    },
    RequestPermission {
        tab: TabId,
        id: String,
        #[serde(default)]
        permissions: Vec<String>,
    },
    ClearPermissions {
        tab: TabId,
    },
    Confirm {
        tab: TabId,
        uid: PromptUid,
        #[serde(default)]
        value: PromptValue,
    },
    Cancel {
        tab: TabId,
        uid: PromptUid,
        #[serde(default)]
        value: PromptValue,
    },
    Clear {
        tab: TabId,
        uid: PromptUid,
    },
    Back,
    Stop,
}

impl Step {
    fn label(&self) -> &'static str {
        match self {
            Self::OpenTab { .. } => "open_tab",
            Self::SelectTab { .. } => "select_tab",
            Self::CloseTab { .. } => "close_tab",
            Self::Navigate { .. } => "navigate",
            Self::SetLoading { .. } => "set_loading",
            Self::PushPrompt { .. } => "push_prompt",
            Self::RequestPermission { .. } => "request_permission",
            Self::ClearPermissions { .. } => "clear_permissions",
            Self::Confirm { .. } => "confirm",
            Self::Cancel { .. } => "cancel",
            Self::Clear { .. } => "clear",
            Self::Back => "back",
            Self::Stop => "stop",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Observe this custom tab instead of the selected tab.
    #[serde(default)]
    pub custom_tab: Option<TabId>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid scenario file")
    }
}

type ResponseLog = Arc<Mutex<Vec<(PromptUid, PromptResponse)>>>;

fn describe(visible: Option<&VisiblePrompt>) -> String {
    match visible {
        Some(visible) => {
            let opt_out = if visible.offer_opt_out {
                " [opt-out offered]"
            } else {
                ""
            };
            format!(
                "visible: {} ({}) on {}{opt_out}",
                visible.request.uid(),
                visible.request.tag(),
                visible.tab_id
            )
        }
        None => "visible: none".to_string(),
    }
}

/// Replay `scenario`, returning the transcript lines.
pub async fn run(scenario: Scenario, settings: PromptSettings) -> Result<Vec<String>> {
    let store = Arc::new(InMemoryStore::default());
    let mut controller =
        PromptController::from_settings(Arc::clone(&store) as Arc<dyn SessionStore>, settings);
    if let Some(custom) = scenario.custom_tab.clone() {
        controller = controller.with_custom_tab(custom);
    }
    let feature = PromptFeature::spawn(controller)?;
    let handle = feature.handle();
    let visible_rx = handle.visible_prompt();
    let responses: ResponseLog = Arc::default();

    let mut transcript = Vec::new();
    let mut last_visible: Option<VisiblePrompt> = None;
    let mut stopped = false;

    for (index, step) in scenario.steps.into_iter().enumerate() {
        let number = index + 1;
        tracing::debug!(step = number, action = step.label(), "Replaying step");
        transcript.push(format!("step {number}: {}", step.label()));

        match step {
            Step::OpenTab { tab, url, custom } => {
                if custom {
                    store.add_custom_tab(tab, url);
                } else {
                    store.add_tab(tab, url);
                }
            }
            Step::SelectTab { tab } => {
                if !store.select_tab(&tab) {
                    transcript.push(format!("  no such tab: {tab}"));
                }
            }
            Step::CloseTab { tab } => {
                if !store.remove_tab(&tab) {
                    transcript.push(format!("  no such tab: {tab}"));
                }
            }
            Step::Navigate { tab, url } => {
                store.navigate(&tab, url);
            }
            Step::SetLoading { tab, loading } => {
                store.set_loading(&tab, loading);
            }
            Step::PushPrompt { tab, prompt } => {
                let log = Arc::clone(&responses);
                let prompt = prompt.with_responder(Responder::new(move |uid, response| {
                    if let Ok(mut log) = log.lock() {
                        log.push((uid.clone(), response));
                    }
                }));
                if !store.add_prompt(&tab, prompt) {
                    transcript.push(format!("  no such tab: {tab}"));
                }
            }
            Step::RequestPermission {
                tab,
                id,
                permissions,
            } => {
                store.add_permission_request(&tab, PermissionRequest { id, permissions });
            }
            Step::ClearPermissions { tab } => {
                store.clear_permission_requests(&tab);
            }
            Step::Confirm { tab, uid, value } => {
                if let Err(err) = handle.confirm(tab, uid, value).await {
                    transcript.push(format!("  error: {err}"));
                }
            }
            Step::Cancel { tab, uid, value } => {
                if let Err(err) = handle.cancel(tab, uid, value).await {
                    transcript.push(format!("  error: {err}"));
                }
            }
            Step::Clear { tab, uid } => handle.clear(tab, uid).await?,
            Step::Back => {
                let handled = handle.back_pressed().await?;
                transcript.push(format!("  back handled: {handled}"));
            }
            Step::Stop => stopped = true,
        }

        if stopped {
            // Stopping tears pickers down; the driver is gone afterwards.
            transcript.push("  stopped".to_string());
        } else {
            handle.flush().await?;
        }

        let drained: Vec<_> = match responses.lock() {
            Ok(mut log) => log.drain(..).collect(),
            Err(_) => anyhow::bail!("response log poisoned"),
        };
        for (uid, response) in drained {
            let body = serde_json::to_string(&response)?;
            transcript.push(format!("  response {uid}: {body}"));
        }

        if stopped {
            break;
        }
        let visible = visible_rx.borrow().clone();
        if visible != last_visible {
            transcript.push(format!("  {}", describe(visible.as_ref())));
            last_visible = visible;
        }
    }

    let controller = feature.stop().await?;
    let state = store.state();
    let pending: usize = state
        .tabs
        .iter()
        .chain(state.custom_tabs.iter())
        .map(|tab| tab.content.prompt_requests.len())
        .sum();
    tracing::info!(pending, active = ?controller.active_prompt(), "Scenario finished");
    transcript.push(format!("pending requests: {pending}"));
    Ok(transcript)
}
