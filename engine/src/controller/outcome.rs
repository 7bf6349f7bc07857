//! Mapping user actions to typed responses.
//!
//! One exhaustive match per action over the request kind. The value the
//! renderer supplies must have the shape the kind expects; anything else is
//! reported as [`PromptError::ValueMismatch`] and nothing is consumed.

use ember_types::{PromptKind, PromptRequest, PromptResponse, PromptValue};

use crate::error::PromptError;

/// What resolving a request produces, before it is consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolution {
    pub response: PromptResponse,
    /// Checkbox choice to feed to the abuse detector (`allow == !checked`).
    pub allow_more_dialogs: Option<bool>,
}

impl Resolution {
    fn plain(response: PromptResponse) -> Self {
        Self {
            response,
            allow_more_dialogs: None,
        }
    }

    fn with_opt_out(response: PromptResponse, checked: bool) -> Self {
        Self {
            response,
            allow_more_dialogs: Some(!checked),
        }
    }
}

fn mismatch(request: &PromptRequest, expected: &'static str, found: &PromptValue) -> PromptError {
    PromptError::ValueMismatch {
        kind: request.tag(),
        expected,
        found: found.shape(),
    }
}

pub(crate) fn confirm(
    request: &PromptRequest,
    value: PromptValue,
) -> Result<Resolution, PromptError> {
    let resolution = match (request.kind(), value) {
        (PromptKind::Alert(_), PromptValue::Checkbox { checked }) => Resolution::with_opt_out(
            PromptResponse::Alert {
                show_more_dialogs: !checked,
            },
            checked,
        ),
        (PromptKind::Confirm(_), PromptValue::CheckboxButton { checked, button }) => {
            Resolution::with_opt_out(
                PromptResponse::Confirm {
                    show_more_dialogs: !checked,
                    button,
                },
                checked,
            )
        }
        (PromptKind::TextPrompt(_), PromptValue::CheckboxText { checked, text }) => {
            Resolution::with_opt_out(
                PromptResponse::Text {
                    show_more_dialogs: !checked,
                    text,
                },
                checked,
            )
        }
        (PromptKind::Authentication(_), PromptValue::Credentials { username, password }) => {
            Resolution::plain(PromptResponse::Credentials { username, password })
        }
        (PromptKind::Color(_), PromptValue::Color { color }) => {
            Resolution::plain(PromptResponse::Color { color })
        }
        (PromptKind::TimeSelection(_), PromptValue::Date { date }) => {
            Resolution::plain(PromptResponse::Time { value: date })
        }
        (
            PromptKind::SingleChoice(_) | PromptKind::MenuChoice(_),
            PromptValue::Choice { choice },
        ) => Resolution::plain(PromptResponse::Choice { choice }),
        (PromptKind::MultipleChoice(_), PromptValue::Choices { choices }) => {
            Resolution::plain(PromptResponse::Choices { choices })
        }
        (PromptKind::File(_), PromptValue::Files { uris }) => {
            Resolution::plain(PromptResponse::Files { uris })
        }
        (PromptKind::SaveLogin(_), PromptValue::LoginEntry { login }) => {
            Resolution::plain(PromptResponse::SaveLogin { login })
        }
        (PromptKind::SelectLogin(_), PromptValue::Login { login }) => {
            Resolution::plain(PromptResponse::SelectLogin { login })
        }
        (PromptKind::SaveCreditCard(_), PromptValue::CreditCardEntry { credit_card }) => {
            Resolution::plain(PromptResponse::SaveCreditCard { credit_card })
        }
        (PromptKind::SelectCreditCard(_), PromptValue::CreditCard { credit_card }) => {
            Resolution::plain(PromptResponse::SelectCreditCard { credit_card })
        }
        (PromptKind::SelectAddress(_), PromptValue::Address { address }) => {
            Resolution::plain(PromptResponse::SelectAddress { address })
        }
        (PromptKind::IdentitySelectProvider(_), PromptValue::Provider { provider }) => {
            Resolution::plain(PromptResponse::IdentityProvider { provider })
        }
        (PromptKind::IdentitySelectAccount(_), PromptValue::Account { account }) => {
            Resolution::plain(PromptResponse::IdentityAccount { account })
        }
        (PromptKind::IdentityPrivacyPolicy(_), PromptValue::Accepted { accepted }) => {
            Resolution::plain(PromptResponse::PrivacyPolicy { accepted })
        }
        // Kinds without a payload take whatever the renderer sends.
        (PromptKind::Share(_), _) => Resolution::plain(PromptResponse::Shared),
        (PromptKind::Popup(_), _) => Resolution::plain(PromptResponse::PopupAllowed),
        (PromptKind::BeforeUnload(_), _) => Resolution::plain(PromptResponse::BeforeUnloadLeave),
        (PromptKind::Repost, _) => Resolution::plain(PromptResponse::RepostConfirmed),
        (kind, found) => return Err(mismatch(request, expected_confirm_shape(kind), &found)),
    };
    Ok(resolution)
}

const fn expected_confirm_shape(kind: &PromptKind) -> &'static str {
    match kind {
        PromptKind::Alert(_) => "checkbox",
        PromptKind::Confirm(_) => "checkbox_button",
        PromptKind::TextPrompt(_) => "checkbox_text",
        PromptKind::Authentication(_) => "credentials",
        PromptKind::Color(_) => "color",
        PromptKind::TimeSelection(_) => "date",
        PromptKind::SingleChoice(_) | PromptKind::MenuChoice(_) => "choice",
        PromptKind::MultipleChoice(_) => "choices",
        PromptKind::File(_) => "files",
        PromptKind::SaveLogin(_) => "login_entry",
        PromptKind::SelectLogin(_) => "login",
        PromptKind::SaveCreditCard(_) => "credit_card_entry",
        PromptKind::SelectCreditCard(_) => "credit_card",
        PromptKind::SelectAddress(_) => "address",
        PromptKind::IdentitySelectProvider(_) => "provider",
        PromptKind::IdentitySelectAccount(_) => "account",
        PromptKind::IdentityPrivacyPolicy(_) => "accepted",
        PromptKind::Share(_)
        | PromptKind::Popup(_)
        | PromptKind::BeforeUnload(_)
        | PromptKind::Repost => "any",
    }
}

pub(crate) fn cancel(
    request: &PromptRequest,
    value: PromptValue,
) -> Result<Resolution, PromptError> {
    let resolution = match (request.kind(), value) {
        (PromptKind::BeforeUnload(_), _) => Resolution::plain(PromptResponse::BeforeUnloadStay),
        (PromptKind::Popup(_), PromptValue::Checkbox { checked }) => {
            Resolution::with_opt_out(PromptResponse::PopupDenied, checked)
        }
        (PromptKind::Popup(_), PromptValue::None) => Resolution::plain(PromptResponse::PopupDenied),
        (PromptKind::Popup(_), found) => return Err(mismatch(request, "checkbox", &found)),
        (
            PromptKind::Alert(_)
            | PromptKind::Confirm(_)
            | PromptKind::TextPrompt(_)
            | PromptKind::Authentication(_)
            | PromptKind::Color(_)
            | PromptKind::TimeSelection(_)
            | PromptKind::SingleChoice(_)
            | PromptKind::MultipleChoice(_)
            | PromptKind::MenuChoice(_)
            | PromptKind::File(_)
            | PromptKind::Share(_)
            | PromptKind::SaveLogin(_)
            | PromptKind::SelectLogin(_)
            | PromptKind::SaveCreditCard(_)
            | PromptKind::SelectCreditCard(_)
            | PromptKind::SelectAddress(_)
            | PromptKind::Repost
            | PromptKind::IdentitySelectProvider(_)
            | PromptKind::IdentitySelectAccount(_)
            | PromptKind::IdentityPrivacyPolicy(_),
            _,
        ) => Resolution::plain(PromptResponse::Dismissed),
    };
    Ok(resolution)
}

/// Only time selection defines a clear action.
pub(crate) fn clear(request: &PromptRequest) -> Option<PromptResponse> {
    match request.kind() {
        PromptKind::TimeSelection(_) => Some(PromptResponse::TimeCleared),
        _ => None,
    }
}
