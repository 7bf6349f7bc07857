//! Values the rendering layer hands back when the user acts on a prompt.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::prompt::{
    Address, Choice, CreditCard, CreditCardEntry, IdentityAccount, IdentityProvider, Login,
    LoginEntry,
};
use crate::response::ButtonType;

/// Payload of a confirm or cancel action.
///
/// The expected shape depends on the request kind; a mismatch is a wiring bug
/// in the renderer and is reported as an error by the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "value", rename_all = "snake_case")]
pub enum PromptValue {
    #[default]
    None,
    /// "Don't show more dialogs" checkbox state.
    Checkbox {
        checked: bool,
    },
    CheckboxText {
        checked: bool,
        text: String,
    },
    CheckboxButton {
        checked: bool,
        button: ButtonType,
    },
    Credentials {
        username: String,
        password: String,
    },
    Color {
        color: String,
    },
    Date {
        date: NaiveDateTime,
    },
    Choice {
        choice: Choice,
    },
    Choices {
        choices: Vec<Choice>,
    },
    Files {
        uris: Vec<String>,
    },
    LoginEntry {
        login: LoginEntry,
    },
    Login {
        login: Login,
    },
    CreditCardEntry {
        credit_card: CreditCardEntry,
    },
    CreditCard {
        credit_card: CreditCard,
    },
    Address {
        address: Address,
    },
    Provider {
        provider: IdentityProvider,
    },
    Account {
        account: IdentityAccount,
    },
    Accepted {
        accepted: bool,
    },
}

impl PromptValue {
    #[must_use]
    pub const fn checkbox(checked: bool) -> Self {
        Self::Checkbox { checked }
    }

    /// Short shape name used in mismatch reports.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Checkbox { .. } => "checkbox",
            Self::CheckboxText { .. } => "checkbox_text",
            Self::CheckboxButton { .. } => "checkbox_button",
            Self::Credentials { .. } => "credentials",
            Self::Color { .. } => "color",
            Self::Date { .. } => "date",
            Self::Choice { .. } => "choice",
            Self::Choices { .. } => "choices",
            Self::Files { .. } => "files",
            Self::LoginEntry { .. } => "login_entry",
            Self::Login { .. } => "login",
            Self::CreditCardEntry { .. } => "credit_card_entry",
            Self::CreditCard { .. } => "credit_card",
            Self::Address { .. } => "address",
            Self::Provider { .. } => "provider",
            Self::Account { .. } => "account",
            Self::Accepted { .. } => "accepted",
        }
    }
}
