//! Core domain types for Ember prompts.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod ids;
mod prompt;
mod response;
pub mod settings;
mod value;

pub use ids::{EmptyIdError, PromptUid, TabId};
pub use prompt::{
    Address, AlertPrompt, AuthenticationPrompt, BeforeUnloadPrompt, Choice, ChoicePrompt,
    ColorPrompt, ConfirmPrompt, CreditCard, CreditCardEntry, FileCapture, FilePrompt,
    IdentityAccount, IdentityProvider, Login, LoginEntry, PopupPrompt, PrivacyPolicyPrompt,
    PromptKind, PromptKindTag, PromptRequest, SaveCreditCardPrompt, SaveLoginPrompt,
    SelectAccountPrompt, SelectAddressPrompt, SelectCreditCardPrompt, SelectLoginPrompt,
    SelectProviderPrompt, ShareData, SharePrompt, TextPrompt, TimeKind, TimeSelectionPrompt,
};
pub use response::{ButtonType, PromptResponse, Responder};
pub use settings::{AutofillSettings, DialogLimits, PasswordSettings, PromptSettings, SettingsError};
pub use value::PromptValue;
