//! Dialog policy: what happens to a prompt request once it becomes current.
//!
//! Admission runs first and decides between showing, dismissing, ignoring or
//! handing the request to an external collaborator. Requests that pass
//! admission then go through the display gate, which is where abusable
//! dialogs and re-shown password suggestions are stopped.

use ember_types::{PromptKind, PromptKindTag, PromptRequest, PromptSettings, TabId};

use crate::picker::{LoginPickerVariant, PickerPlan, PickerState};

/// Feature switches read on every admission.
pub trait FeatureFlags: Send + Sync {
    fn login_autofill_enabled(&self) -> bool;
    fn save_login_enabled(&self) -> bool;
    fn credit_card_autofill_enabled(&self) -> bool;
    fn address_autofill_enabled(&self) -> bool;
    /// Open the password generator directly rather than the suggestion bar.
    fn auto_show_suggested_password(&self) -> bool;
}

impl FeatureFlags for PromptSettings {
    fn login_autofill_enabled(&self) -> bool {
        self.autofill.login
    }

    fn save_login_enabled(&self) -> bool {
        self.autofill.save_login
    }

    fn credit_card_autofill_enabled(&self) -> bool {
        self.autofill.credit_card
    }

    fn address_autofill_enabled(&self) -> bool {
        self.autofill.address
    }

    fn auto_show_suggested_password(&self) -> bool {
        self.passwords.auto_show_suggested
    }
}

/// A generated password the user just accepted, which the browser saves on
/// its own. A save prompt for the same credentials would be redundant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedGeneratedPassword {
    pub origin: String,
    pub password: String,
}

/// Facts about the surroundings of a request that admission depends on.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdmissionContext<'a> {
    pub has_pending_permission: bool,
    pub has_login_validator: bool,
    pub has_credit_card_validator: bool,
    pub saved_generated_password: Option<&'a SavedGeneratedPassword>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    /// A permission prompt owns the screen.
    PermissionPending,
    SaveLoginDisabled,
    MissingLoginValidator,
    CreditCardAutofillDisabled,
    MissingCreditCardValidator,
    InvalidCreditCard,
    DuplicateGeneratedPassword,
    /// Rejected by the display gate.
    GateRejected,
    /// File or share request with no collaborator to hand it to.
    MissingDelegate,
    /// The collaborator could not take the request.
    DelegateFailed,
}

impl DismissReason {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PermissionPending => "permission_pending",
            Self::SaveLoginDisabled => "save_login_disabled",
            Self::MissingLoginValidator => "missing_login_validator",
            Self::CreditCardAutofillDisabled => "credit_card_autofill_disabled",
            Self::MissingCreditCardValidator => "missing_credit_card_validator",
            Self::InvalidCreditCard => "invalid_credit_card",
            Self::DuplicateGeneratedPassword => "duplicate_generated_password",
            Self::GateRejected => "gate_rejected",
            Self::MissingDelegate => "missing_delegate",
            Self::DelegateFailed => "delegate_failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    LoginAutofillDisabled,
    CreditCardAutofillDisabled,
    NoCreditCards,
    AddressAutofillDisabled,
    NoAddresses,
}

impl IgnoreReason {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LoginAutofillDisabled => "login_autofill_disabled",
            Self::CreditCardAutofillDisabled => "credit_card_autofill_disabled",
            Self::NoCreditCards => "no_credit_cards",
            Self::AddressAutofillDisabled => "address_autofill_disabled",
            Self::NoAddresses => "no_addresses",
        }
    }
}

/// Result of admission for a newly current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Continue to the display gate, opening `picker` if approved.
    Gate { picker: Option<PickerPlan> },
    /// Consume the request immediately through its dismiss path.
    Dismiss(DismissReason),
    /// Leave the request pending and do nothing until it is superseded.
    Ignore(IgnoreReason),
    DelegateFile,
    DelegateShare,
}

/// Decide what to do with `request`.
#[must_use]
pub fn resolve_admission(
    request: &PromptRequest,
    flags: &dyn FeatureFlags,
    context: &AdmissionContext<'_>,
) -> Admission {
    if context.has_pending_permission {
        return Admission::Dismiss(DismissReason::PermissionPending);
    }

    match request.kind() {
        PromptKind::File(_) => Admission::DelegateFile,
        PromptKind::Share(_) => Admission::DelegateShare,
        PromptKind::SelectCreditCard(prompt) => {
            if !flags.credit_card_autofill_enabled() {
                Admission::Ignore(IgnoreReason::CreditCardAutofillDisabled)
            } else if prompt.credit_cards.is_empty() {
                Admission::Ignore(IgnoreReason::NoCreditCards)
            } else {
                Admission::Gate {
                    picker: Some(PickerPlan::CreditCard),
                }
            }
        }
        PromptKind::SelectLogin(prompt) => {
            if !flags.login_autofill_enabled() {
                return Admission::Ignore(IgnoreReason::LoginAutofillDisabled);
            }
            let variant = if prompt.generated_password.is_some() {
                if flags.auto_show_suggested_password() {
                    LoginPickerVariant::PasswordGenerator
                } else {
                    LoginPickerVariant::StrongPasswordBar
                }
            } else {
                LoginPickerVariant::LoginPicker
            };
            Admission::Gate {
                picker: Some(PickerPlan::Login(variant)),
            }
        }
        PromptKind::SelectAddress(prompt) => {
            if !flags.address_autofill_enabled() {
                Admission::Ignore(IgnoreReason::AddressAutofillDisabled)
            } else if prompt.addresses.is_empty() {
                Admission::Ignore(IgnoreReason::NoAddresses)
            } else {
                Admission::Gate {
                    picker: Some(PickerPlan::Address),
                }
            }
        }
        PromptKind::SaveLogin(prompt) => {
            if !flags.save_login_enabled() {
                return Admission::Dismiss(DismissReason::SaveLoginDisabled);
            }
            if !context.has_login_validator {
                return Admission::Dismiss(DismissReason::MissingLoginValidator);
            }
            let duplicates_generated = context.saved_generated_password.is_some_and(|saved| {
                prompt
                    .logins
                    .iter()
                    .any(|login| login.origin == saved.origin && login.password == saved.password)
            });
            if duplicates_generated {
                return Admission::Dismiss(DismissReason::DuplicateGeneratedPassword);
            }
            Admission::Gate { picker: None }
        }
        PromptKind::SaveCreditCard(prompt) => {
            if !flags.credit_card_autofill_enabled() {
                Admission::Dismiss(DismissReason::CreditCardAutofillDisabled)
            } else if !context.has_credit_card_validator {
                Admission::Dismiss(DismissReason::MissingCreditCardValidator)
            } else if !prompt.credit_card.is_valid() {
                Admission::Dismiss(DismissReason::InvalidCreditCard)
            } else {
                Admission::Gate { picker: None }
            }
        }
        PromptKind::Alert(_)
        | PromptKind::Confirm(_)
        | PromptKind::TextPrompt(_)
        | PromptKind::Authentication(_)
        | PromptKind::Color(_)
        | PromptKind::TimeSelection(_)
        | PromptKind::SingleChoice(_)
        | PromptKind::MultipleChoice(_)
        | PromptKind::MenuChoice(_)
        | PromptKind::Popup(_)
        | PromptKind::BeforeUnload(_)
        | PromptKind::Repost
        | PromptKind::IdentitySelectProvider(_)
        | PromptKind::IdentitySelectAccount(_)
        | PromptKind::IdentityPrivacyPolicy(_) => Admission::Gate { picker: None },
    }
}

/// Kinds a page can spam to lock the user out.
#[must_use]
pub const fn is_abusable(tag: PromptKindTag) -> bool {
    matches!(
        tag,
        PromptKindTag::Alert
            | PromptKindTag::TextPrompt
            | PromptKindTag::Confirm
            | PromptKindTag::Repost
            | PromptKindTag::Popup
    )
}

/// Kinds shown as windowed dialogs; fullscreen is exited before they appear.
#[must_use]
pub const fn is_windowed(tag: PromptKindTag) -> bool {
    matches!(
        tag,
        PromptKindTag::Alert | PromptKindTag::TextPrompt | PromptKindTag::Confirm | PromptKindTag::Popup
    )
}

/// The display gate.
///
/// `dialogs_allowed` is the abuse detector's current verdict.
#[must_use]
pub fn can_show_this_prompt(
    tag: PromptKindTag,
    picker: Option<PickerPlan>,
    tab: &TabId,
    pickers: &PickerState,
    dialogs_allowed: bool,
) -> bool {
    match tag {
        PromptKindTag::SingleChoice
        | PromptKindTag::MultipleChoice
        | PromptKindTag::MenuChoice
        | PromptKindTag::TimeSelection
        | PromptKindTag::File
        | PromptKindTag::Color
        | PromptKindTag::Authentication
        | PromptKindTag::BeforeUnload
        | PromptKindTag::SaveLogin
        | PromptKindTag::SelectCreditCard
        | PromptKindTag::SaveCreditCard
        | PromptKindTag::SelectAddress
        | PromptKindTag::Share
        | PromptKindTag::IdentitySelectProvider
        | PromptKindTag::IdentitySelectAccount
        | PromptKindTag::IdentityPrivacyPolicy => true,
        PromptKindTag::SelectLogin => match picker {
            Some(PickerPlan::Login(variant)) if variant.is_suggestion() => {
                !pickers.was_dismissed_for(variant, tab)
            }
            _ => true,
        },
        PromptKindTag::Alert
        | PromptKindTag::TextPrompt
        | PromptKindTag::Confirm
        | PromptKindTag::Repost
        | PromptKindTag::Popup => dialogs_allowed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_types::{
        Address, AlertPrompt, CreditCard, CreditCardEntry, FilePrompt, LoginEntry,
        SaveCreditCardPrompt, SaveLoginPrompt, SelectAddressPrompt, SelectCreditCardPrompt,
        SelectLoginPrompt, SharePrompt,
    };
    use pretty_assertions::assert_eq;

    fn settings() -> PromptSettings {
        PromptSettings::default()
    }

    fn ctx() -> AdmissionContext<'static> {
        AdmissionContext {
            has_login_validator: true,
            has_credit_card_validator: true,
            ..Default::default()
        }
    }

    fn select_login(generated: Option<&str>) -> PromptRequest {
        PromptRequest::new(PromptKind::SelectLogin(SelectLoginPrompt {
            generated_password: generated.map(str::to_string),
            ..Default::default()
        }))
    }

    fn valid_card() -> CreditCardEntry {
        CreditCardEntry {
            number: "4111111111111111".to_string(),
            expiry_month: "4".to_string(),
            expiry_year: "2031".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn permission_takes_precedence() {
        let request = PromptRequest::new(PromptKind::Alert(AlertPrompt::default()));
        let context = AdmissionContext {
            has_pending_permission: true,
            ..ctx()
        };
        assert_eq!(
            resolve_admission(&request, &settings(), &context),
            Admission::Dismiss(DismissReason::PermissionPending)
        );
    }

    #[test]
    fn file_and_share_are_delegated() {
        let file = PromptRequest::new(PromptKind::File(FilePrompt::default()));
        assert_eq!(
            resolve_admission(&file, &settings(), &ctx()),
            Admission::DelegateFile
        );
        let share = PromptRequest::new(PromptKind::Share(SharePrompt::default()));
        assert_eq!(
            resolve_admission(&share, &settings(), &ctx()),
            Admission::DelegateShare
        );
    }

    #[test]
    fn select_credit_card_needs_flag_and_cards() {
        let empty = PromptRequest::new(PromptKind::SelectCreditCard(
            SelectCreditCardPrompt::default(),
        ));
        assert_eq!(
            resolve_admission(&empty, &settings(), &ctx()),
            Admission::Ignore(IgnoreReason::NoCreditCards)
        );

        let with_cards = PromptRequest::new(PromptKind::SelectCreditCard(SelectCreditCardPrompt {
            credit_cards: vec![CreditCard::default()],
        }));
        assert_eq!(
            resolve_admission(&with_cards, &settings(), &ctx()),
            Admission::Gate {
                picker: Some(PickerPlan::CreditCard)
            }
        );

        let mut disabled = settings();
        disabled.autofill.credit_card = false;
        assert_eq!(
            resolve_admission(&with_cards, &disabled, &ctx()),
            Admission::Ignore(IgnoreReason::CreditCardAutofillDisabled)
        );
    }

    #[test]
    fn select_address_needs_flag_and_addresses() {
        let request = PromptRequest::new(PromptKind::SelectAddress(SelectAddressPrompt {
            addresses: vec![Address::default()],
        }));
        assert_eq!(
            resolve_admission(&request, &settings(), &ctx()),
            Admission::Gate {
                picker: Some(PickerPlan::Address)
            }
        );

        let mut disabled = settings();
        disabled.autofill.address = false;
        assert_eq!(
            resolve_admission(&request, &disabled, &ctx()),
            Admission::Ignore(IgnoreReason::AddressAutofillDisabled)
        );
    }

    #[test]
    fn select_login_picks_variant() {
        let mut flags = settings();
        assert_eq!(
            resolve_admission(&select_login(None), &flags, &ctx()),
            Admission::Gate {
                picker: Some(PickerPlan::Login(LoginPickerVariant::LoginPicker))
            }
        );
        assert_eq!(
            resolve_admission(&select_login(Some("s3cret!")), &flags, &ctx()),
            Admission::Gate {
                picker: Some(PickerPlan::Login(LoginPickerVariant::StrongPasswordBar))
            }
        );

        flags.passwords.auto_show_suggested = true;
        assert_eq!(
            resolve_admission(&select_login(Some("s3cret!")), &flags, &ctx()),
            Admission::Gate {
                picker: Some(PickerPlan::Login(LoginPickerVariant::PasswordGenerator))
            }
        );

        flags.autofill.login = false;
        assert_eq!(
            resolve_admission(&select_login(None), &flags, &ctx()),
            Admission::Ignore(IgnoreReason::LoginAutofillDisabled)
        );
    }

    #[test]
    fn save_login_requires_validator() {
        let request = PromptRequest::new(PromptKind::SaveLogin(SaveLoginPrompt::default()));
        let context = AdmissionContext {
            has_login_validator: false,
            ..ctx()
        };
        assert_eq!(
            resolve_admission(&request, &settings(), &context),
            Admission::Dismiss(DismissReason::MissingLoginValidator)
        );
    }

    #[test]
    fn save_login_suppressed_for_generated_password() {
        let request = PromptRequest::new(PromptKind::SaveLogin(SaveLoginPrompt {
            logins: vec![LoginEntry {
                origin: "https://example.com".to_string(),
                password: "gen-pass".to_string(),
                ..Default::default()
            }],
        }));
        let saved = SavedGeneratedPassword {
            origin: "https://example.com".to_string(),
            password: "gen-pass".to_string(),
        };
        let context = AdmissionContext {
            saved_generated_password: Some(&saved),
            ..ctx()
        };
        assert_eq!(
            resolve_admission(&request, &settings(), &context),
            Admission::Dismiss(DismissReason::DuplicateGeneratedPassword)
        );
        assert_eq!(
            resolve_admission(&request, &settings(), &ctx()),
            Admission::Gate { picker: None }
        );
    }

    #[test]
    fn save_credit_card_checks_validity() {
        let invalid = PromptRequest::new(PromptKind::SaveCreditCard(SaveCreditCardPrompt {
            credit_card: CreditCardEntry::default(),
        }));
        assert_eq!(
            resolve_admission(&invalid, &settings(), &ctx()),
            Admission::Dismiss(DismissReason::InvalidCreditCard)
        );

        let valid = PromptRequest::new(PromptKind::SaveCreditCard(SaveCreditCardPrompt {
            credit_card: valid_card(),
        }));
        assert_eq!(
            resolve_admission(&valid, &settings(), &ctx()),
            Admission::Gate { picker: None }
        );

        let no_validator = AdmissionContext {
            has_credit_card_validator: false,
            ..ctx()
        };
        assert_eq!(
            resolve_admission(&valid, &settings(), &no_validator),
            Admission::Dismiss(DismissReason::MissingCreditCardValidator)
        );
    }

    #[test]
    fn gate_blocks_abusable_kinds_only() {
        let tab = TabId::new("t1").unwrap();
        let pickers = PickerState::new();
        assert!(!can_show_this_prompt(
            PromptKindTag::Alert,
            None,
            &tab,
            &pickers,
            false
        ));
        assert!(!can_show_this_prompt(
            PromptKindTag::Repost,
            None,
            &tab,
            &pickers,
            false
        ));
        assert!(can_show_this_prompt(
            PromptKindTag::Color,
            None,
            &tab,
            &pickers,
            false
        ));
        assert!(can_show_this_prompt(
            PromptKindTag::Popup,
            None,
            &tab,
            &pickers,
            true
        ));
    }

    #[test]
    fn gate_blocks_dismissed_suggestion_on_same_tab() {
        let tab = TabId::new("t1").unwrap();
        let other = TabId::new("t2").unwrap();
        let mut pickers = PickerState::new();
        pickers.mark_dismissed(LoginPickerVariant::StrongPasswordBar, tab.clone());
        let plan = Some(PickerPlan::Login(LoginPickerVariant::StrongPasswordBar));

        assert!(!can_show_this_prompt(
            PromptKindTag::SelectLogin,
            plan,
            &tab,
            &pickers,
            true
        ));
        assert!(can_show_this_prompt(
            PromptKindTag::SelectLogin,
            plan,
            &other,
            &pickers,
            true
        ));
        assert!(can_show_this_prompt(
            PromptKindTag::SelectLogin,
            Some(PickerPlan::Login(LoginPickerVariant::LoginPicker)),
            &tab,
            &pickers,
            true
        ));
    }

    #[test]
    fn windowed_and_abusable_sets() {
        assert!(is_windowed(PromptKindTag::Popup));
        assert!(!is_windowed(PromptKindTag::Repost));
        assert!(is_abusable(PromptKindTag::Repost));
        assert!(!is_abusable(PromptKindTag::BeforeUnload));
    }
}
