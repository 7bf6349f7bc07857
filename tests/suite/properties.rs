//! Controller-wide guarantees that hold across any sequence of emissions.

use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;

use ember_engine::{ActivePicker, PromptDelegates};
use ember_types::{
    Address, AutofillSettings, ConfirmPrompt, DialogLimits, PromptKind, PromptResponse,
    PromptSettings, PromptValue, SelectAddressPrompt,
};

use crate::common::{Fixture, TAB, alert, tab, uid};

fn address_prompt() -> PromptKind {
    PromptKind::SelectAddress(SelectAddressPrompt {
        addresses: vec![Address {
            guid: "addr-1".to_string(),
            name: "Ada".to_string(),
            ..Address::default()
        }],
    })
}

fn assert_visible_is_active(f: &Fixture) {
    if let Some(visible) = f.controller.visible_prompt() {
        assert_eq!(
            Some(visible.request.uid()),
            f.controller.active_prompt().map(|active| active.uid())
        );
    }
}

#[test]
fn visible_prompt_is_always_the_active_request() {
    let mut f = Fixture::new();
    assert_eq!(f.visible_uid(), None);

    f.push("a1", alert("one"));
    assert_visible_is_active(&f);
    assert_eq!(f.visible_uid(), Some("a1".to_string()));

    f.push("r1", PromptKind::Repost);
    assert_visible_is_active(&f);
    assert_eq!(f.visible_uid(), Some("r1".to_string()));

    f.controller
        .on_confirm(&tab(TAB), &uid("r1"), PromptValue::None)
        .unwrap();
    assert_eq!(f.visible_uid(), None);

    // The remaining request is the newest again and goes back through the gate.
    f.controller.sync();
    assert_visible_is_active(&f);
    assert_eq!(f.visible_uid(), Some("a1".to_string()));
}

#[test]
fn each_request_is_consumed_exactly_once() {
    let mut f = Fixture::new();
    f.push("a1", alert("hi"));

    for _ in 0..2 {
        f.controller
            .on_confirm(&tab(TAB), &uid("a1"), PromptValue::checkbox(false))
            .unwrap();
    }
    f.controller
        .on_cancel(&tab(TAB), &uid("a1"), PromptValue::None)
        .unwrap();
    f.controller.on_clear(&tab(TAB), &uid("a1"));

    assert_eq!(
        f.recorder.for_uid("a1"),
        vec![PromptResponse::Alert {
            show_more_dialogs: true
        }]
    );
    assert!(f.pending().is_empty());
}

#[test]
fn superseded_request_is_never_fulfilled() {
    let mut f = Fixture::new();
    f.push("a1", alert("first"));
    f.push("a2", alert("second"));
    assert_eq!(f.visible_uid(), Some("a2".to_string()));

    f.controller
        .on_confirm(&tab(TAB), &uid("a2"), PromptValue::checkbox(false))
        .unwrap();

    assert!(f.recorder.for_uid("a1").is_empty());
    assert_eq!(f.recorder.all().len(), 1);
    assert_eq!(f.pending(), vec!["a1".to_string()]);
}

#[test]
fn opting_out_closes_the_gate_for_abusable_kinds() {
    let settings = PromptSettings {
        dialogs: DialogLimits::new(2, 60).unwrap(),
        ..PromptSettings::default()
    };
    let mut f = Fixture::with(settings, PromptDelegates::new());

    f.push("a1", alert("1"));
    f.controller
        .on_confirm(&tab(TAB), &uid("a1"), PromptValue::checkbox(true))
        .unwrap();
    f.controller.sync();
    f.push("a2", alert("2"));
    f.controller
        .on_confirm(&tab(TAB), &uid("a2"), PromptValue::checkbox(true))
        .unwrap();
    f.controller.sync();
    assert!(!f.controller.abuse_detector().should_show_more_dialogs());

    f.push("c1", PromptKind::Confirm(ConfirmPrompt::default()));
    assert_eq!(f.visible_uid(), None);
    assert_eq!(f.recorder.for_uid("c1"), vec![PromptResponse::Dismissed]);

    // Non-abusable kinds are unaffected.
    f.push("s1", address_prompt());
    assert_eq!(f.visible_uid(), Some("s1".to_string()));
}

#[test]
fn spaced_dialogs_are_stopped_after_opting_out() {
    let settings = PromptSettings {
        dialogs: DialogLimits::new(2, 1).unwrap(),
        ..PromptSettings::default()
    };
    let mut f = Fixture::with(settings, PromptDelegates::new());

    for id in ["a1", "a2"] {
        f.push(id, alert(id));
        assert_eq!(f.visible_uid(), Some(id.to_string()));
        f.controller
            .on_confirm(&tab(TAB), &uid(id), PromptValue::checkbox(true))
            .unwrap();
        f.controller.sync();
        thread::sleep(Duration::from_millis(1100));
    }
    assert!(!f.controller.abuse_detector().are_dialogs_being_abused());

    f.push("a3", alert("3"));
    assert_eq!(f.visible_uid(), None);
    assert_eq!(f.recorder.for_uid("a3"), vec![PromptResponse::Dismissed]);
}

#[test]
fn address_picker_follows_autofill_switch() {
    let mut enabled = Fixture::new();
    enabled.push("s1", address_prompt());
    assert_eq!(enabled.visible_uid(), Some("s1".to_string()));
    assert!(matches!(
        enabled.controller.active_picker(),
        Some(ActivePicker::Address { .. })
    ));

    let settings = PromptSettings {
        autofill: AutofillSettings {
            address: false,
            ..AutofillSettings::default()
        },
        ..PromptSettings::default()
    };
    let mut disabled = Fixture::with(settings, PromptDelegates::new());
    disabled.push("s1", address_prompt());
    assert_eq!(disabled.visible_uid(), None);
    assert!(disabled.controller.active_picker().is_none());
    // Ignored, not dismissed: the request stays queued.
    assert_eq!(disabled.pending(), vec!["s1".to_string()]);
    assert!(disabled.recorder.all().is_empty());
}
