//! Start/stop, tab switching and custom tabs.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use ember_engine::{PermissionRequest, PromptController, SessionStore};
use ember_types::{PromptKind, PromptResponse, PromptSettings, PromptValue};

use crate::common::{Fixture, Recorder, TAB, alert, pending_uids, store_with_tab, tab, uid};

#[test]
fn stop_hides_prompt_and_keeps_request() {
    let mut f = Fixture::new();
    f.push("a1", alert("hi"));

    f.controller.stop();

    assert_eq!(f.visible_uid(), None);
    assert!(f.controller.active_prompt().is_none());
    assert_eq!(f.pending(), vec!["a1".to_string()]);
    assert!(f.recorder.all().is_empty());

    // Restarting re-admits the pending request.
    f.controller.start();
    f.controller.sync();
    assert_eq!(f.visible_uid(), Some("a1".to_string()));
}

#[test]
fn switching_tabs_shows_the_new_tabs_request() {
    let mut f = Fixture::new();
    f.store.add_tab(tab("t2"), "https://other.example/");
    f.push("a1", alert("on t1"));

    let kept = f.recorder.request("r2", PromptKind::Repost).with_dismiss_on_load(false);
    assert!(f.store.add_prompt(&tab("t2"), kept));
    f.controller.sync();
    assert_eq!(f.visible_uid(), Some("a1".to_string()));

    assert!(f.store.select_tab(&tab("t2")));
    f.controller.sync();

    assert_eq!(f.visible_uid(), Some("r2".to_string()));
    assert_eq!(f.controller.selected_tab_id(), Some(&tab("t2")));
    // The background tab's request is left alone.
    assert_eq!(f.pending(), vec!["a1".to_string()]);
    assert!(f.recorder.for_uid("a1").is_empty());
}

#[test]
fn custom_tab_is_observed_instead_of_selected_tab() {
    let store = store_with_tab();
    store.add_custom_tab(tab("c1"), "https://checkout.example/");
    let recorder = Recorder::default();
    let mut controller = PromptController::from_settings(
        Arc::clone(&store) as Arc<dyn SessionStore>,
        PromptSettings::default(),
    )
    .with_custom_tab(tab("c1"));
    controller.start();
    controller.sync();

    store.add_prompt(&tab(TAB), recorder.request("a1", alert("selected tab")));
    controller.sync();
    assert!(controller.visible_prompt().is_none());

    store.add_prompt(&tab("c1"), recorder.request("a2", alert("custom tab")));
    controller.sync();
    let visible = controller.visible_prompt().unwrap();
    assert_eq!(visible.tab_id, tab("c1"));

    controller
        .on_confirm(&tab("c1"), &uid("a2"), PromptValue::checkbox(false))
        .unwrap();
    assert!(pending_uids(&store, "c1").is_empty());
    assert_eq!(pending_uids(&store, TAB), vec!["a1".to_string()]);
}

#[test]
fn pending_permission_cancels_new_prompts() {
    let mut f = Fixture::new();
    f.store.add_permission_request(
        &tab(TAB),
        PermissionRequest {
            id: "geo".to_string(),
            permissions: vec!["geolocation".to_string()],
        },
    );
    f.push("a1", alert("hi"));

    assert_eq!(f.visible_uid(), None);
    assert_eq!(f.recorder.for_uid("a1"), vec![PromptResponse::Dismissed]);
}

#[test]
fn loading_then_settling_keeps_visible_prompt() {
    let mut f = Fixture::new();
    f.push("r1", PromptKind::Repost);

    f.store.set_loading(&tab(TAB), true);
    f.controller.sync();
    f.store.set_loading(&tab(TAB), false);
    f.controller.sync();

    assert_eq!(f.visible_uid(), Some("r1".to_string()));
    assert!(f.recorder.all().is_empty());
}
