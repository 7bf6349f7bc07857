//! Session store contract and the in-memory implementation.
//!
//! The store is the system of record for pending prompt requests. The prompt
//! controller reads it through snapshots and a `watch` subscription; its only
//! write is [`SessionStore::consume_prompt`].

use tokio::sync::watch;

use ember_types::{PromptRequest, PromptUid, TabId};

/// A pending site permission request (camera, location...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    pub id: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContentState {
    pub url: String,
    pub loading: bool,
    /// Pending prompts, oldest first. Only the last one is current.
    pub prompt_requests: Vec<PromptRequest>,
    pub permission_requests: Vec<PermissionRequest>,
    pub icon: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct TabSessionState {
    pub id: TabId,
    pub content: ContentState,
}

impl TabSessionState {
    #[must_use]
    pub fn new(id: TabId, url: impl Into<String>) -> Self {
        Self {
            id,
            content: ContentState {
                url: url.into(),
                ..ContentState::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BrowserState {
    pub tabs: Vec<TabSessionState>,
    pub custom_tabs: Vec<TabSessionState>,
    pub selected_tab_id: Option<TabId>,
}

impl BrowserState {
    #[must_use]
    pub fn find_tab_or_custom_tab(&self, id: &TabId) -> Option<&TabSessionState> {
        self.tabs
            .iter()
            .chain(self.custom_tabs.iter())
            .find(|tab| &tab.id == id)
    }

    fn find_tab_or_custom_tab_mut(&mut self, id: &TabId) -> Option<&mut TabSessionState> {
        self.tabs
            .iter_mut()
            .chain(self.custom_tabs.iter_mut())
            .find(|tab| &tab.id == id)
    }

    #[must_use]
    pub fn selected_tab(&self) -> Option<&TabSessionState> {
        let id = self.selected_tab_id.as_ref()?;
        self.tabs.iter().find(|tab| &tab.id == id)
    }

    /// The custom tab when `custom_tab_id` is given, else the selected tab.
    #[must_use]
    pub fn find_custom_tab_or_selected_tab(
        &self,
        custom_tab_id: Option<&TabId>,
    ) -> Option<&TabSessionState> {
        match custom_tab_id {
            Some(id) => self.custom_tabs.iter().find(|tab| &tab.id == id),
            None => self.selected_tab(),
        }
    }
}

/// The external store of tabs and their pending prompts.
pub trait SessionStore: Send + Sync {
    /// Current snapshot.
    fn state(&self) -> BrowserState;

    /// Subscribe to state changes. The receiver starts at the current state.
    fn subscribe(&self) -> watch::Receiver<BrowserState>;

    /// Atomically remove the request `uid` from tab `tab`.
    ///
    /// Returns the removed request, or `None` when it is not (or no longer)
    /// pending.
    fn consume_prompt(&self, tab: &TabId, uid: &PromptUid) -> Option<PromptRequest>;
}

/// `watch`-backed store used by the scenario runner and tests.
#[derive(Debug)]
pub struct InMemoryStore {
    tx: watch::Sender<BrowserState>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(BrowserState::default())
    }
}

impl InMemoryStore {
    #[must_use]
    pub fn new(initial: BrowserState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    fn modify_tab(&self, id: &TabId, f: impl FnOnce(&mut TabSessionState)) -> bool {
        self.tx.send_if_modified(|state| match state.find_tab_or_custom_tab_mut(id) {
            Some(tab) => {
                f(tab);
                true
            }
            None => false,
        })
    }

    /// Add a regular tab. The first tab becomes the selected one.
    pub fn add_tab(&self, id: TabId, url: impl Into<String>) {
        let tab = TabSessionState::new(id, url);
        self.tx.send_modify(|state| {
            if state.selected_tab_id.is_none() {
                state.selected_tab_id = Some(tab.id.clone());
            }
            state.tabs.push(tab);
        });
    }

    pub fn add_custom_tab(&self, id: TabId, url: impl Into<String>) {
        let tab = TabSessionState::new(id, url);
        self.tx.send_modify(|state| state.custom_tabs.push(tab));
    }

    /// Select a regular tab. Returns `false` for unknown ids.
    pub fn select_tab(&self, id: &TabId) -> bool {
        self.tx.send_if_modified(|state| {
            let known = state.tabs.iter().any(|tab| &tab.id == id);
            if known && state.selected_tab_id.as_ref() != Some(id) {
                state.selected_tab_id = Some(id.clone());
                return true;
            }
            false
        })
    }

    pub fn remove_tab(&self, id: &TabId) -> bool {
        self.tx.send_if_modified(|state| {
            let before = state.tabs.len() + state.custom_tabs.len();
            state.tabs.retain(|tab| &tab.id != id);
            state.custom_tabs.retain(|tab| &tab.id != id);
            if state.selected_tab_id.as_ref() == Some(id) {
                state.selected_tab_id = state.tabs.first().map(|tab| tab.id.clone());
            }
            before != state.tabs.len() + state.custom_tabs.len()
        })
    }

    pub fn navigate(&self, id: &TabId, url: impl Into<String>) -> bool {
        let url = url.into();
        self.modify_tab(id, |tab| tab.content.url = url)
    }

    pub fn set_loading(&self, id: &TabId, loading: bool) -> bool {
        self.modify_tab(id, |tab| tab.content.loading = loading)
    }

    pub fn set_icon(&self, id: &TabId, icon: Option<Vec<u8>>) -> bool {
        self.modify_tab(id, |tab| tab.content.icon = icon)
    }

    /// Append a prompt request to the tab's queue.
    pub fn add_prompt(&self, id: &TabId, request: PromptRequest) -> bool {
        self.modify_tab(id, |tab| tab.content.prompt_requests.push(request))
    }

    pub fn add_permission_request(&self, id: &TabId, request: PermissionRequest) -> bool {
        self.modify_tab(id, |tab| tab.content.permission_requests.push(request))
    }

    pub fn clear_permission_requests(&self, id: &TabId) -> bool {
        self.modify_tab(id, |tab| tab.content.permission_requests.clear())
    }
}

impl SessionStore for InMemoryStore {
    fn state(&self) -> BrowserState {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<BrowserState> {
        self.tx.subscribe()
    }

    fn consume_prompt(&self, tab: &TabId, uid: &PromptUid) -> Option<PromptRequest> {
        let mut consumed = None;
        self.tx.send_if_modified(|state| {
            let Some(tab) = state.find_tab_or_custom_tab_mut(tab) else {
                return false;
            };
            let requests = &mut tab.content.prompt_requests;
            match requests.iter().position(|request| request.uid() == uid) {
                Some(index) => {
                    consumed = Some(requests.remove(index));
                    true
                }
                None => false,
            }
        });
        consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_types::PromptKind;

    fn tab(id: &str) -> TabId {
        TabId::new(id).unwrap()
    }

    #[test]
    fn first_tab_is_selected() {
        let store = InMemoryStore::default();
        store.add_tab(tab("a"), "https://a.example");
        store.add_tab(tab("b"), "https://b.example");
        assert_eq!(store.state().selected_tab_id, Some(tab("a")));
        assert!(store.select_tab(&tab("b")));
        assert!(!store.select_tab(&tab("missing")));
        assert_eq!(store.state().selected_tab().unwrap().id, tab("b"));
    }

    #[test]
    fn consume_removes_exactly_once() {
        let store = InMemoryStore::default();
        store.add_tab(tab("a"), "https://a.example");
        let request = PromptRequest::new(PromptKind::Repost);
        let uid = request.uid().clone();
        store.add_prompt(&tab("a"), request);

        assert!(store.consume_prompt(&tab("a"), &uid).is_some());
        assert!(store.consume_prompt(&tab("a"), &uid).is_none());
        assert!(store.state().tabs[0].content.prompt_requests.is_empty());
    }

    #[test]
    fn consume_on_unknown_tab_is_noop() {
        let store = InMemoryStore::default();
        assert!(store.consume_prompt(&tab("x"), &PromptUid::generate()).is_none());
    }

    #[test]
    fn subscribers_see_changes() {
        let store = InMemoryStore::default();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());
        store.add_tab(tab("a"), "https://a.example");
        assert!(rx.has_changed().unwrap());
        let _ = rx.borrow_and_update();

        // Unknown tab: nothing changes, nobody is woken.
        store.set_loading(&tab("zzz"), true);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn custom_tab_lookup() {
        let store = InMemoryStore::default();
        store.add_tab(tab("a"), "https://a.example");
        store.add_custom_tab(tab("c"), "https://c.example");
        let state = store.state();
        assert_eq!(
            state
                .find_custom_tab_or_selected_tab(Some(&tab("c")))
                .unwrap()
                .id,
            tab("c")
        );
        assert_eq!(
            state.find_custom_tab_or_selected_tab(None).unwrap().id,
            tab("a")
        );
    }

    #[test]
    fn removing_selected_tab_selects_first_remaining() {
        let store = InMemoryStore::default();
        store.add_tab(tab("a"), "https://a.example");
        store.add_tab(tab("b"), "https://b.example");
        assert!(store.remove_tab(&tab("a")));
        assert_eq!(store.state().selected_tab_id, Some(tab("b")));
    }
}
