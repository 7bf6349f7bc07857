//! The async driver: store emissions and handle commands on one task.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use ember_engine::{
    InMemoryStore, PromptController, PromptDelegates, PromptError, PromptFeature, SessionStore,
    ShareCompletion, ShareDelegate,
};
use ember_types::{
    ColorPrompt, PromptKind, PromptResponse, PromptSettings, PromptValue, ShareData, SharePrompt,
    TabId,
};

use crate::common::{Recorder, TAB, alert, pending_uids, store_with_tab, tab, uid};

/// Completes every share immediately.
struct InstantShare;

impl ShareDelegate for InstantShare {
    fn show_share_sheet(&self, _tab: &TabId, _data: &ShareData, completion: ShareCompletion) {
        completion.succeeded();
    }
}

fn spawn(store: &Arc<InMemoryStore>, delegates: PromptDelegates) -> PromptFeature {
    let controller = PromptController::from_settings(
        Arc::clone(store) as Arc<dyn SessionStore>,
        PromptSettings::default(),
    )
    .with_delegates(delegates);
    PromptFeature::spawn(controller).unwrap()
}

#[tokio::test]
async fn flush_makes_store_changes_visible() {
    let store = store_with_tab();
    let feature = spawn(&store, PromptDelegates::new());
    let handle = feature.handle();
    let recorder = Recorder::default();

    store.add_prompt(&tab(TAB), recorder.request("a1", alert("hi")));
    handle.flush().await.unwrap();
    let visible = handle.visible_prompt().borrow().clone().unwrap();
    assert_eq!(visible.request.uid(), &uid("a1"));
    assert!(!visible.offer_opt_out);

    handle
        .confirm(tab(TAB), uid("a1"), PromptValue::checkbox(false))
        .await
        .unwrap();
    assert!(handle.visible_prompt().borrow().is_none());
    assert_eq!(
        recorder.for_uid("a1"),
        vec![PromptResponse::Alert {
            show_more_dialogs: true
        }]
    );

    feature.stop().await.unwrap();
}

#[tokio::test]
async fn mismatched_value_is_returned_to_caller() {
    let store = store_with_tab();
    let feature = spawn(&store, PromptDelegates::new());
    let handle = feature.handle();
    let recorder = Recorder::default();

    store.add_prompt(
        &tab(TAB),
        recorder.request("c1", PromptKind::Color(ColorPrompt::default())),
    );
    handle.flush().await.unwrap();

    let err = handle
        .confirm(tab(TAB), uid("c1"), PromptValue::checkbox(true))
        .await
        .unwrap_err();
    assert!(matches!(err, PromptError::ValueMismatch { .. }));
    assert_eq!(pending_uids(&store, TAB), vec!["c1".to_string()]);
    assert!(recorder.all().is_empty());

    feature.stop().await.unwrap();
}

#[tokio::test]
async fn share_completion_resolves_request() {
    let store = store_with_tab();
    let feature = spawn(
        &store,
        PromptDelegates::new().with_share(Arc::new(InstantShare)),
    );
    let handle = feature.handle();
    let recorder = Recorder::default();

    store.add_prompt(
        &tab(TAB),
        recorder.request("s1", PromptKind::Share(SharePrompt::default())),
    );
    // The completion is queued while the emission is handled; the second
    // flush runs after it.
    handle.flush().await.unwrap();
    handle.flush().await.unwrap();

    assert_eq!(recorder.for_uid("s1"), vec![PromptResponse::Shared]);
    assert!(pending_uids(&store, TAB).is_empty());

    feature.stop().await.unwrap();
}

#[tokio::test]
async fn stop_returns_controller_and_closes_handle() {
    let store = store_with_tab();
    let feature = spawn(&store, PromptDelegates::new());
    let handle = feature.handle();
    let recorder = Recorder::default();

    store.add_prompt(&tab(TAB), recorder.request("r1", PromptKind::Repost));
    handle.flush().await.unwrap();

    let controller = feature.stop().await.unwrap();
    assert!(controller.visible_prompt().is_none());
    assert_eq!(pending_uids(&store, TAB), vec!["r1".to_string()]);
    assert!(recorder.all().is_empty());

    assert_eq!(handle.flush().await, Err(PromptError::FeatureStopped));
}
