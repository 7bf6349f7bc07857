//! Picker sub-state for selection-style prompts.
//!
//! Login, credit-card and address requests show an auxiliary selection UI on
//! top of the page instead of a plain dialog. At most one picker is active at
//! a time; tearing one down is a UI-only operation and never fulfils the
//! request behind it.

use ember_types::{PromptUid, TabId};

/// The three shapes a login selection can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPickerVariant {
    /// List of saved logins.
    LoginPicker,
    /// Dismissible "use a strong password" bar.
    StrongPasswordBar,
    /// Password generator dialog shown without user interaction.
    PasswordGenerator,
}

impl LoginPickerVariant {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LoginPicker => "login_picker",
            Self::StrongPasswordBar => "strong_password_bar",
            Self::PasswordGenerator => "password_generator",
        }
    }

    /// Variants whose dismissal is remembered per tab.
    #[must_use]
    pub const fn is_suggestion(self) -> bool {
        matches!(self, Self::StrongPasswordBar | Self::PasswordGenerator)
    }
}

/// Which picker an admitted request should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerPlan {
    Login(LoginPickerVariant),
    CreditCard,
    Address,
}

/// A picker currently on screen, with the tab and request it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivePicker {
    Login {
        tab: TabId,
        uid: PromptUid,
        variant: LoginPickerVariant,
    },
    CreditCard {
        tab: TabId,
        uid: PromptUid,
    },
    Address {
        tab: TabId,
        uid: PromptUid,
    },
}

impl ActivePicker {
    #[must_use]
    pub fn uid(&self) -> &PromptUid {
        match self {
            Self::Login { uid, .. } | Self::CreditCard { uid, .. } | Self::Address { uid, .. } => {
                uid
            }
        }
    }

    #[must_use]
    pub fn tab(&self) -> &TabId {
        match self {
            Self::Login { tab, .. } | Self::CreditCard { tab, .. } | Self::Address { tab, .. } => {
                tab
            }
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Login { variant, .. } => variant.label(),
            Self::CreditCard { .. } => "credit_card_picker",
            Self::Address { .. } => "address_picker",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PickerState {
    active: Option<ActivePicker>,
    strong_password_dismissed_for: Option<TabId>,
    password_generator_dismissed_for: Option<TabId>,
}

impl PickerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active(&self) -> Option<&ActivePicker> {
        self.active.as_ref()
    }

    /// Open the picker described by `plan` for `uid` on `tab`.
    ///
    /// A picker that is still open is replaced; that would mean two selection
    /// UIs overlapping, so it is reported.
    pub fn activate(&mut self, plan: PickerPlan, tab: TabId, uid: PromptUid) {
        let next = match plan {
            PickerPlan::Login(variant) => ActivePicker::Login { tab, uid, variant },
            PickerPlan::CreditCard => ActivePicker::CreditCard { tab, uid },
            PickerPlan::Address => ActivePicker::Address { tab, uid },
        };
        if let Some(previous) = self.active.replace(next) {
            tracing::warn!(
                picker = previous.label(),
                uid = %previous.uid(),
                "Replacing a picker that was never torn down"
            );
        }
    }

    /// Tear down whichever picker is showing. Returns it, if any.
    pub fn dismiss_select_prompts(&mut self) -> Option<ActivePicker> {
        self.active.take()
    }

    /// Tear down the picker only if it belongs to `uid`.
    pub fn dismiss_for(&mut self, uid: &PromptUid) -> Option<ActivePicker> {
        if self.active.as_ref().is_some_and(|p| p.uid() == uid) {
            self.active.take()
        } else {
            None
        }
    }

    /// Remember that the user dismissed a password suggestion on `tab`.
    pub fn mark_dismissed(&mut self, variant: LoginPickerVariant, tab: TabId) {
        match variant {
            LoginPickerVariant::StrongPasswordBar => self.strong_password_dismissed_for = Some(tab),
            LoginPickerVariant::PasswordGenerator => {
                self.password_generator_dismissed_for = Some(tab);
            }
            LoginPickerVariant::LoginPicker => {}
        }
    }

    #[must_use]
    pub fn was_dismissed_for(&self, variant: LoginPickerVariant, tab: &TabId) -> bool {
        let marker = match variant {
            LoginPickerVariant::StrongPasswordBar => &self.strong_password_dismissed_for,
            LoginPickerVariant::PasswordGenerator => &self.password_generator_dismissed_for,
            LoginPickerVariant::LoginPicker => return false,
        };
        marker.as_ref() == Some(tab)
    }

    /// Drop dismissal markers for `tab` (its page changed site).
    pub fn forget_dismissals(&mut self, tab: &TabId) {
        if self.strong_password_dismissed_for.as_ref() == Some(tab) {
            self.strong_password_dismissed_for = None;
        }
        if self.password_generator_dismissed_for.as_ref() == Some(tab) {
            self.password_generator_dismissed_for = None;
        }
    }
}
