//! End-to-end walkthroughs of common prompt flows.

use pretty_assertions::assert_eq;

use ember_engine::PromptDelegates;
use ember_types::{
    LoginEntry, PopupPrompt, PromptKind, PromptResponse, PromptSettings, PromptValue,
    SaveLoginPrompt,
};

use crate::common::{Fixture, TAB, alert, tab, uid};

#[test]
fn simple_confirm_round_trip() {
    let mut f = Fixture::new();
    f.push("a1", alert("hi"));
    assert_eq!(f.visible_uid(), Some("a1".to_string()));

    f.controller
        .on_confirm(&tab(TAB), &uid("a1"), PromptValue::checkbox(false))
        .unwrap();

    assert!(f.pending().is_empty());
    assert_eq!(f.visible_uid(), None);
    assert_eq!(
        f.recorder.for_uid("a1"),
        vec![PromptResponse::Alert {
            show_more_dialogs: true
        }]
    );
}

#[test]
fn host_navigation_sweeps_visible_popup() {
    let mut f = Fixture::new();
    let popup = f
        .recorder
        .request(
            "p1",
            PromptKind::Popup(PopupPrompt {
                target_uri: "https://ads.example.net/".to_string(),
            }),
        )
        .with_dismiss_on_load(true);
    f.push_request(popup);
    assert_eq!(f.visible_uid(), Some("p1".to_string()));

    f.store.navigate(&tab(TAB), "https://elsewhere.org/landing");
    f.controller.sync();

    assert_eq!(f.visible_uid(), None);
    assert!(f.pending().is_empty());
    assert_eq!(f.recorder.for_uid("p1"), vec![PromptResponse::Dismissed]);
    assert_eq!(
        f.controller.current_url(),
        Some("https://elsewhere.org/landing")
    );
}

#[test]
fn save_login_without_validator_is_dismissed() {
    let mut f = Fixture::with(PromptSettings::default(), PromptDelegates::new());
    f.push(
        "s1",
        PromptKind::SaveLogin(SaveLoginPrompt {
            logins: vec![LoginEntry {
                origin: "https://example.com".to_string(),
                username: "ada".to_string(),
                password: "hunter2".to_string(),
                ..LoginEntry::default()
            }],
        }),
    );

    assert_eq!(f.visible_uid(), None);
    assert!(f.pending().is_empty());
    assert_eq!(f.recorder.for_uid("s1"), vec![PromptResponse::Dismissed]);
}

#[test]
fn popup_cancel_records_opt_out() {
    let mut f = Fixture::new();
    f.push("p1", PromptKind::Popup(PopupPrompt::default()));

    f.controller
        .on_cancel(&tab(TAB), &uid("p1"), PromptValue::checkbox(true))
        .unwrap();

    assert_eq!(f.recorder.for_uid("p1"), vec![PromptResponse::PopupDenied]);
    assert!(f.pending().is_empty());
    assert_eq!(f.visible_uid(), None);
}
