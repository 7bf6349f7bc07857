//! Outcomes delivered back to the page.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ids::PromptUid;
use crate::prompt::{
    Address, Choice, CreditCard, CreditCardEntry, IdentityAccount, IdentityProvider, Login,
    LoginEntry,
};

/// Which button of a multi-button confirm dialog was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonType {
    Positive,
    Negative,
    Neutral,
}

/// The typed outcome of a prompt request.
///
/// Exactly one response is delivered per consumed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum PromptResponse {
    /// The request was dismissed without a selection.
    Dismissed,
    Alert {
        show_more_dialogs: bool,
    },
    Confirm {
        show_more_dialogs: bool,
        button: ButtonType,
    },
    Text {
        show_more_dialogs: bool,
        text: String,
    },
    Credentials {
        username: String,
        password: String,
    },
    Color {
        color: String,
    },
    Time {
        value: NaiveDateTime,
    },
    TimeCleared,
    Choice {
        choice: Choice,
    },
    Choices {
        choices: Vec<Choice>,
    },
    Files {
        uris: Vec<String>,
    },
    Shared,
    SaveLogin {
        login: LoginEntry,
    },
    SelectLogin {
        login: Login,
    },
    SaveCreditCard {
        credit_card: CreditCardEntry,
    },
    SelectCreditCard {
        credit_card: CreditCard,
    },
    SelectAddress {
        address: Address,
    },
    PopupAllowed,
    PopupDenied,
    BeforeUnloadLeave,
    BeforeUnloadStay,
    RepostConfirmed,
    IdentityProvider {
        provider: IdentityProvider,
    },
    IdentityAccount {
        account: IdentityAccount,
    },
    PrivacyPolicy {
        accepted: bool,
    },
}

type ResponseFn = dyn Fn(&PromptUid, PromptResponse) + Send + Sync;

/// Page-side callback embedded in a [`PromptRequest`](crate::PromptRequest).
///
/// The default responder discards responses.
#[derive(Clone, Default)]
pub struct Responder(Option<Arc<ResponseFn>>);

impl Responder {
    pub fn new(f: impl Fn(&PromptUid, PromptResponse) + Send + Sync + 'static) -> Self {
        Self(Some(Arc::new(f)))
    }

    pub fn respond(&self, uid: &PromptUid, response: PromptResponse) {
        if let Some(f) = &self.0 {
            f(uid, response);
        }
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_some() {
            "Responder(..)"
        } else {
            "Responder(noop)"
        })
    }
}
