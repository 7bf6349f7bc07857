//! Shared test utilities and fixtures
//!
//! A session store with one tab, a controller over it, and a recorder that
//! captures every response a request receives.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use ember_engine::{InMemoryStore, PromptController, PromptDelegates, SessionStore};
use ember_types::{
    AlertPrompt, PromptKind, PromptRequest, PromptResponse, PromptSettings, PromptUid, Responder,
    TabId,
};

pub const TAB: &str = "t1";
pub const URL: &str = "https://example.com/";

pub fn tab(id: &str) -> TabId {
    TabId::new(id).unwrap()
}

pub fn uid(id: &str) -> PromptUid {
    PromptUid::new(id).unwrap()
}

pub fn alert(message: &str) -> PromptKind {
    PromptKind::Alert(AlertPrompt {
        title: String::new(),
        message: message.to_string(),
    })
}

/// Collects `(uid, response)` pairs in delivery order.
#[derive(Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Vec<(PromptUid, PromptResponse)>>>,
}

impl Recorder {
    pub fn request(&self, id: &str, kind: PromptKind) -> PromptRequest {
        let log = Arc::clone(&self.log);
        PromptRequest::new(kind)
            .with_uid(uid(id))
            .with_responder(Responder::new(move |uid, response| {
                log.lock().unwrap().push((uid.clone(), response));
            }))
    }

    pub fn all(&self) -> Vec<(PromptUid, PromptResponse)> {
        self.log.lock().unwrap().clone()
    }

    /// Responses delivered to `id`, in order.
    pub fn for_uid(&self, id: &str) -> Vec<PromptResponse> {
        self.all()
            .into_iter()
            .filter(|(uid, _)| uid.as_str() == id)
            .map(|(_, response)| response)
            .collect()
    }
}

pub fn store_with_tab() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::default());
    store.add_tab(tab(TAB), URL);
    store
}

/// Synchronous fixture: the caller decides when the controller observes the
/// store.
pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub controller: PromptController,
    pub recorder: Recorder,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(PromptSettings::default(), PromptDelegates::new())
    }

    pub fn with(settings: PromptSettings, delegates: PromptDelegates) -> Self {
        let store = store_with_tab();
        let mut controller =
            PromptController::from_settings(Arc::clone(&store) as Arc<dyn SessionStore>, settings)
                .with_delegates(delegates);
        controller.start();
        controller.sync();
        Self {
            store,
            controller,
            recorder: Recorder::default(),
        }
    }

    /// Append a request to the tab's queue and let the controller observe it.
    pub fn push(&mut self, id: &str, kind: PromptKind) {
        let request = self.recorder.request(id, kind);
        self.push_request(request);
    }

    pub fn push_request(&mut self, request: PromptRequest) {
        assert!(self.store.add_prompt(&tab(TAB), request));
        self.controller.sync();
    }

    pub fn visible_uid(&self) -> Option<String> {
        self.controller
            .visible_prompt()
            .map(|visible| visible.request.uid().to_string())
    }

    pub fn pending(&self) -> Vec<String> {
        pending_uids(&self.store, TAB)
    }
}

pub fn pending_uids(store: &InMemoryStore, id: &str) -> Vec<String> {
    store
        .state()
        .find_tab_or_custom_tab(&tab(id))
        .map(|tab| {
            tab.content
                .prompt_requests
                .iter()
                .map(|request| request.uid().to_string())
                .collect()
        })
        .unwrap_or_default()
}
