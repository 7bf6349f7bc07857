//! Prompt requests raised by web content.
//!
//! A [`PromptRequest`] is an immutable description of a native interaction the
//! page asked for (an `alert()`, a login picker, a file chooser...). It carries
//! its own [`Responder`], the page-side callback that receives the typed
//! [`PromptResponse`](crate::PromptResponse) once the request is resolved.
//!
//! The kind set is closed: every dispatch over [`PromptKind`] is an exhaustive
//! match, and an unknown `kind` tag in serialized input is a hard error.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ids::PromptUid;
use crate::response::{PromptResponse, Responder};

// ============================================================================
// Payloads
// ============================================================================

/// An entry of a `<select>`-style choice list. Groups carry `children`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Choice {
    pub id: String,
    pub label: String,
    pub enabled: bool,
    pub selected: bool,
    pub children: Vec<Choice>,
}

impl Choice {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            enabled: true,
            selected: false,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A login the page offered to save or update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginEntry {
    pub origin: String,
    pub form_action_origin: Option<String>,
    pub http_realm: Option<String>,
    pub username: String,
    pub password: String,
}

/// A stored login offered in the login picker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Login {
    pub guid: String,
    pub origin: String,
    pub username: String,
    pub password: String,
}

/// A credit card the page offered to save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditCardEntry {
    pub guid: Option<String>,
    pub name: String,
    pub number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub card_type: String,
}

impl CreditCardEntry {
    /// Structural validity: 12 to 19 digits (separators ignored), a month in
    /// `1..=12` and a non-empty year.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let digits: Vec<char> = self
            .number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();
        let number_ok = (12..=19).contains(&digits.len()) && digits.iter().all(char::is_ascii_digit);
        let month_ok = self
            .expiry_month
            .trim()
            .parse::<u8>()
            .is_ok_and(|month| (1..=12).contains(&month));
        number_ok && month_ok && !self.expiry_year.trim().is_empty()
    }
}

/// A stored credit card offered in the card picker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditCard {
    pub guid: String,
    pub name: String,
    pub masked_number: String,
    pub card_type: String,
}

/// A stored address offered in the address picker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub guid: String,
    pub name: String,
    pub street_address: String,
    pub locality: String,
    pub country: String,
    pub email: String,
    pub tel: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareData {
    pub title: Option<String>,
    pub text: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityProvider {
    pub id: u32,
    pub icon: Option<String>,
    pub name: String,
    pub domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityAccount {
    pub id: u32,
    pub email: String,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeKind {
    #[default]
    Date,
    DateAndTime,
    Time,
    Month,
    Week,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCapture {
    #[default]
    None,
    Any,
    User,
    Environment,
}

// ============================================================================
// Kinds
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertPrompt {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub positive_label: String,
    pub negative_label: String,
    pub neutral_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPrompt {
    pub title: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationPrompt {
    pub uri: Option<String>,
    pub title: String,
    pub message: String,
    pub username: String,
    pub password: String,
    pub only_show_password: bool,
    pub previous_failed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPrompt {
    pub default_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSelectionPrompt {
    pub title: String,
    pub initial: Option<NaiveDateTime>,
    pub minimum: Option<NaiveDateTime>,
    pub maximum: Option<NaiveDateTime>,
    pub time_kind: TimeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoicePrompt {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePrompt {
    pub mime_types: Vec<String>,
    pub multiple: bool,
    pub capture: FileCapture,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharePrompt {
    pub data: ShareData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveLoginPrompt {
    pub logins: Vec<LoginEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectLoginPrompt {
    pub logins: Vec<Login>,
    /// Strong password suggested for a new-account form.
    pub generated_password: Option<String>,
    pub page_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveCreditCardPrompt {
    pub credit_card: CreditCardEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectCreditCardPrompt {
    pub credit_cards: Vec<CreditCard>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectAddressPrompt {
    pub addresses: Vec<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupPrompt {
    pub target_uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeforeUnloadPrompt {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectProviderPrompt {
    pub providers: Vec<IdentityProvider>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectAccountPrompt {
    pub provider: IdentityProvider,
    pub accounts: Vec<IdentityAccount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyPolicyPrompt {
    pub privacy_policy_url: String,
    pub terms_of_service_url: String,
    pub provider_domain: String,
    pub host: String,
}

/// The closed set of prompt kinds, each with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptKind {
    Alert(AlertPrompt),
    Confirm(ConfirmPrompt),
    TextPrompt(TextPrompt),
    Authentication(AuthenticationPrompt),
    Color(ColorPrompt),
    TimeSelection(TimeSelectionPrompt),
    SingleChoice(ChoicePrompt),
    MultipleChoice(ChoicePrompt),
    MenuChoice(ChoicePrompt),
    File(FilePrompt),
    Share(SharePrompt),
    SaveLogin(SaveLoginPrompt),
    SelectLogin(SelectLoginPrompt),
    SaveCreditCard(SaveCreditCardPrompt),
    SelectCreditCard(SelectCreditCardPrompt),
    SelectAddress(SelectAddressPrompt),
    Popup(PopupPrompt),
    BeforeUnload(BeforeUnloadPrompt),
    Repost,
    IdentitySelectProvider(SelectProviderPrompt),
    IdentitySelectAccount(SelectAccountPrompt),
    IdentityPrivacyPolicy(PrivacyPolicyPrompt),
}

/// Field-less mirror of [`PromptKind`], used for kind comparisons and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKindTag {
    Alert,
    Confirm,
    TextPrompt,
    Authentication,
    Color,
    TimeSelection,
    SingleChoice,
    MultipleChoice,
    MenuChoice,
    File,
    Share,
    SaveLogin,
    SelectLogin,
    SaveCreditCard,
    SelectCreditCard,
    SelectAddress,
    Popup,
    BeforeUnload,
    Repost,
    IdentitySelectProvider,
    IdentitySelectAccount,
    IdentityPrivacyPolicy,
}

impl PromptKindTag {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Confirm => "confirm",
            Self::TextPrompt => "text_prompt",
            Self::Authentication => "authentication",
            Self::Color => "color",
            Self::TimeSelection => "time_selection",
            Self::SingleChoice => "single_choice",
            Self::MultipleChoice => "multiple_choice",
            Self::MenuChoice => "menu_choice",
            Self::File => "file",
            Self::Share => "share",
            Self::SaveLogin => "save_login",
            Self::SelectLogin => "select_login",
            Self::SaveCreditCard => "save_credit_card",
            Self::SelectCreditCard => "select_credit_card",
            Self::SelectAddress => "select_address",
            Self::Popup => "popup",
            Self::BeforeUnload => "before_unload",
            Self::Repost => "repost",
            Self::IdentitySelectProvider => "identity_select_provider",
            Self::IdentitySelectAccount => "identity_select_account",
            Self::IdentityPrivacyPolicy => "identity_privacy_policy",
        }
    }

    /// Picker-style kinds layer an auxiliary selection UI over the page.
    #[must_use]
    pub const fn is_picker(self) -> bool {
        matches!(
            self,
            Self::SelectLogin | Self::SelectCreditCard | Self::SelectAddress
        )
    }
}

impl fmt::Display for PromptKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl PromptKind {
    #[must_use]
    pub const fn tag(&self) -> PromptKindTag {
        match self {
            Self::Alert(_) => PromptKindTag::Alert,
            Self::Confirm(_) => PromptKindTag::Confirm,
            Self::TextPrompt(_) => PromptKindTag::TextPrompt,
            Self::Authentication(_) => PromptKindTag::Authentication,
            Self::Color(_) => PromptKindTag::Color,
            Self::TimeSelection(_) => PromptKindTag::TimeSelection,
            Self::SingleChoice(_) => PromptKindTag::SingleChoice,
            Self::MultipleChoice(_) => PromptKindTag::MultipleChoice,
            Self::MenuChoice(_) => PromptKindTag::MenuChoice,
            Self::File(_) => PromptKindTag::File,
            Self::Share(_) => PromptKindTag::Share,
            Self::SaveLogin(_) => PromptKindTag::SaveLogin,
            Self::SelectLogin(_) => PromptKindTag::SelectLogin,
            Self::SaveCreditCard(_) => PromptKindTag::SaveCreditCard,
            Self::SelectCreditCard(_) => PromptKindTag::SelectCreditCard,
            Self::SelectAddress(_) => PromptKindTag::SelectAddress,
            Self::Popup(_) => PromptKindTag::Popup,
            Self::BeforeUnload(_) => PromptKindTag::BeforeUnload,
            Self::Repost => PromptKindTag::Repost,
            Self::IdentitySelectProvider(_) => PromptKindTag::IdentitySelectProvider,
            Self::IdentitySelectAccount(_) => PromptKindTag::IdentitySelectAccount,
            Self::IdentityPrivacyPolicy(_) => PromptKindTag::IdentityPrivacyPolicy,
        }
    }

    /// Whether a fresh page load abandons this kind by default.
    ///
    /// Save prompts and share sheets outlive the navigation that produced them.
    #[must_use]
    pub const fn dismisses_on_load_by_default(&self) -> bool {
        !matches!(self, Self::Share(_) | Self::SaveLogin(_) | Self::SaveCreditCard(_))
    }
}

// ============================================================================
// Request
// ============================================================================

#[derive(Deserialize)]
struct RawPromptRequest {
    #[serde(default)]
    uid: Option<PromptUid>,
    #[serde(default)]
    should_dismiss_on_load: Option<bool>,
    #[serde(flatten)]
    kind: PromptKind,
}

impl From<RawPromptRequest> for PromptRequest {
    fn from(raw: RawPromptRequest) -> Self {
        let mut request = Self::new(raw.kind);
        if let Some(uid) = raw.uid {
            request.uid = uid;
        }
        if let Some(dismiss) = raw.should_dismiss_on_load {
            request.should_dismiss_on_load = dismiss;
        }
        request
    }
}

/// A pending prompt request.
///
/// Equality is identity: two requests are equal when their uids match.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "RawPromptRequest")]
pub struct PromptRequest {
    uid: PromptUid,
    should_dismiss_on_load: bool,
    #[serde(flatten)]
    kind: PromptKind,
    #[serde(skip)]
    responder: Responder,
}

impl PromptRequest {
    /// New request with a generated uid and the kind's default load behavior.
    #[must_use]
    pub fn new(kind: PromptKind) -> Self {
        let should_dismiss_on_load = kind.dismisses_on_load_by_default();
        Self {
            uid: PromptUid::generate(),
            should_dismiss_on_load,
            kind,
            responder: Responder::default(),
        }
    }

    #[must_use]
    pub fn with_uid(mut self, uid: PromptUid) -> Self {
        self.uid = uid;
        self
    }

    #[must_use]
    pub fn with_dismiss_on_load(mut self, dismiss: bool) -> Self {
        self.should_dismiss_on_load = dismiss;
        self
    }

    #[must_use]
    pub fn with_responder(mut self, responder: Responder) -> Self {
        self.responder = responder;
        self
    }

    #[must_use]
    pub fn uid(&self) -> &PromptUid {
        &self.uid
    }

    #[must_use]
    pub fn kind(&self) -> &PromptKind {
        &self.kind
    }

    #[must_use]
    pub fn tag(&self) -> PromptKindTag {
        self.kind.tag()
    }

    #[must_use]
    pub fn should_dismiss_on_load(&self) -> bool {
        self.should_dismiss_on_load
    }

    /// Deliver the outcome to the page-side callback.
    pub fn respond(&self, response: PromptResponse) {
        self.responder.respond(&self.uid, response);
    }
}

impl PartialEq for PromptRequest {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for PromptRequest {}

impl fmt::Debug for PromptRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptRequest")
            .field("uid", &self.uid)
            .field("kind", &self.tag())
            .field("should_dismiss_on_load", &self.should_dismiss_on_load)
            .finish_non_exhaustive()
    }
}
