//! Prompt lifecycle controller.
//!
//! Observes one tab (a custom tab when configured, else the selected tab) and
//! makes sure at most one of its pending prompt requests is presented at a
//! time. Requests are only ever removed from the store through
//! [`SessionStore::consume_prompt`], and each removal delivers exactly one
//! response to the page.
//!
//! The controller is synchronous. [`crate::PromptFeature`] drives it from a
//! store subscription and a command channel; tests drive it directly.

mod outcome;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use ember_core::{
    ActivePicker, Admission, AdmissionContext, DismissReason, FeatureFlags, PickerPlan,
    PickerState, PromptAbuseDetector, SavedGeneratedPassword, can_show_this_prompt, is_abusable,
    is_windowed, resolve_admission,
};
use ember_types::{
    CreditCardEntry, DialogLimits, LoginEntry, PromptKind, PromptRequest, PromptResponse,
    PromptSettings, PromptUid, PromptValue, TabId,
};

use crate::command::PromptCommand;
use crate::delegates::{
    ActivityResult, CreditCardValidation, FileOutcome, FileSelection, LoginValidation,
    PromptDelegates, ShareCompletion,
};
use crate::error::{FilePickerError, PromptError};
use crate::observe::{ObservableCell, Observation, Projection, host_of};
use crate::store::{BrowserState, SessionStore, TabSessionState};

use outcome::Resolution;

pub(crate) const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// The request currently presented to the user, as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisiblePrompt {
    pub tab_id: TabId,
    pub request: PromptRequest,
    /// Show the "don't show more dialogs" checkbox.
    pub offer_opt_out: bool,
}

/// Prompt list and loading flag of the observed tab.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PromptProjection {
    uids: Vec<PromptUid>,
    loading: bool,
}

/// Selected tab identity, plus the observed tab and its host.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TabProjection {
    selected: Option<TabId>,
    observed: Option<TabId>,
    host: Option<String>,
}

pub struct PromptController {
    store: Arc<dyn SessionStore>,
    custom_tab_id: Option<TabId>,
    flags: Arc<dyn FeatureFlags>,
    delegates: PromptDelegates,
    abuse: PromptAbuseDetector,
    pickers: PickerState,
    active_prompt: Option<PromptRequest>,
    visible: ObservableCell<Option<VisiblePrompt>>,
    selected_tab_id: Option<TabId>,
    current_url: Option<String>,
    saved_generated_password: Option<SavedGeneratedPassword>,
    prompt_projection: Projection<PromptProjection>,
    tab_projection: Projection<TabProjection>,
    command_tx: mpsc::Sender<PromptCommand>,
    command_rx: Option<mpsc::Receiver<PromptCommand>>,
}

impl PromptController {
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        flags: Arc<dyn FeatureFlags>,
        limits: DialogLimits,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        Self {
            store,
            custom_tab_id: None,
            flags,
            delegates: PromptDelegates::default(),
            abuse: PromptAbuseDetector::new(limits),
            pickers: PickerState::new(),
            active_prompt: None,
            visible: ObservableCell::new(None),
            selected_tab_id: None,
            current_url: None,
            saved_generated_password: None,
            prompt_projection: Projection::default(),
            tab_projection: Projection::default(),
            command_tx,
            command_rx: Some(command_rx),
        }
    }

    /// Controller whose feature flags and dialog limits come from `settings`.
    #[must_use]
    pub fn from_settings(store: Arc<dyn SessionStore>, settings: PromptSettings) -> Self {
        let limits = settings.dialogs;
        Self::new(store, Arc::new(settings), limits)
    }

    /// Observe the custom tab `id` instead of the selected tab.
    pub fn with_custom_tab(mut self, id: TabId) -> Self {
        self.custom_tab_id = Some(id);
        self
    }

    pub fn with_delegates(mut self, delegates: PromptDelegates) -> Self {
        self.delegates = delegates;
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    #[must_use]
    pub fn active_prompt(&self) -> Option<&PromptRequest> {
        self.active_prompt.as_ref()
    }

    #[must_use]
    pub fn visible_prompt(&self) -> Option<VisiblePrompt> {
        self.visible.get()
    }

    #[must_use]
    pub fn subscribe_visible(&self) -> watch::Receiver<Option<VisiblePrompt>> {
        self.visible.subscribe()
    }

    #[must_use]
    pub fn active_picker(&self) -> Option<&ActivePicker> {
        self.pickers.active()
    }

    #[must_use]
    pub fn selected_tab_id(&self) -> Option<&TabId> {
        self.selected_tab_id.as_ref()
    }

    #[must_use]
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    #[must_use]
    pub fn abuse_detector(&self) -> &PromptAbuseDetector {
        &self.abuse
    }

    /// Sender for commands processed by [`Self::poll_commands`] or the
    /// feature driver.
    #[must_use]
    pub fn command_sender(&self) -> mpsc::Sender<PromptCommand> {
        self.command_tx.clone()
    }

    pub(crate) fn take_commands(&mut self) -> Option<mpsc::Receiver<PromptCommand>> {
        self.command_rx.take()
    }

    /// Hand the queue back once the driver has stopped.
    pub(crate) fn restore_commands(&mut self, rx: mpsc::Receiver<PromptCommand>) {
        self.command_rx = Some(rx);
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Begin observing. The next [`Self::on_state`] call is treated as the
    /// first emission of both subscriptions.
    pub fn start(&mut self) {
        self.abuse.reset_js_alert_abuse_state();
        self.prompt_projection.reset();
        self.tab_projection.reset();
        tracing::debug!(custom_tab = ?self.custom_tab_id, "Prompt controller started");
    }

    /// Tear down pickers without consuming anything. Pending requests stay in
    /// the store for a later controller.
    pub fn stop(&mut self) {
        if let Some(picker) = self.pickers.dismiss_select_prompts() {
            tracing::debug!(picker = picker.label(), uid = %picker.uid(), "Picker torn down on stop");
        }
        self.active_prompt = None;
        self.visible.set(None);
        tracing::debug!("Prompt controller stopped");
    }

    /// Feed a store snapshot through both subscriptions.
    pub fn on_state(&mut self, state: &BrowserState) {
        let observed = self.observed_tab(state);
        let tab_projection = TabProjection {
            selected: state.selected_tab_id.clone(),
            observed: observed.map(|tab| tab.id.clone()),
            host: observed.and_then(|tab| host_of(&tab.content.url)),
        };
        let site_changed = self.tab_projection.last().is_some_and(|last| {
            last.observed == tab_projection.observed && last.host != tab_projection.host
        });
        let swept = match self.tab_projection.observe(tab_projection) {
            Observation::Changed => self.on_tab_or_host_change(state, site_changed),
            Observation::First | Observation::Unchanged => false,
        };

        // The sweep mutated the store; dispatch on what is left.
        let fresh;
        let state = if swept {
            fresh = self.store.state();
            &fresh
        } else {
            state
        };

        let prompt_projection = self.observed_tab(state).map(|tab| PromptProjection {
            uids: tab
                .content
                .prompt_requests
                .iter()
                .map(|request| request.uid().clone())
                .collect(),
            loading: tab.content.loading,
        });
        let prompt_projection = prompt_projection.unwrap_or(PromptProjection {
            uids: Vec::new(),
            loading: false,
        });
        match self.prompt_projection.observe(prompt_projection) {
            Observation::First | Observation::Changed => self.on_prompt_state(state),
            Observation::Unchanged => {}
        }

        self.current_url = self.observed_tab(state).map(|tab| tab.content.url.clone());
        self.selected_tab_id.clone_from(&state.selected_tab_id);
    }

    /// Shorthand for feeding the store's current snapshot.
    pub fn sync(&mut self) {
        let state = self.store.state();
        self.on_state(&state);
    }

    fn observed_tab<'a>(&self, state: &'a BrowserState) -> Option<&'a TabSessionState> {
        state.find_custom_tab_or_selected_tab(self.custom_tab_id.as_ref())
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn on_prompt_state(&mut self, state: &BrowserState) {
        let tab = self.observed_tab(state);
        let newest = tab.and_then(|tab| tab.content.prompt_requests.last());
        let loading = tab.is_some_and(|tab| tab.content.loading);

        let superseded = newest.map(PromptRequest::uid)
            != self.active_prompt.as_ref().map(PromptRequest::uid);

        if superseded {
            if let Some(previous) = &self.active_prompt
                && previous.tag().is_picker()
            {
                self.pickers.dismiss_for(previous.uid());
            }
            self.visible.set(None);
            self.active_prompt = newest.cloned();
            if let (Some(tab), Some(request)) = (tab, newest) {
                tracing::debug!(
                    tab = %tab.id,
                    uid = %request.uid(),
                    kind = request.tag().label(),
                    "Prompt became current"
                );
                self.admit(tab, request.clone());
            }
        } else if !loading {
            self.abuse.reset_js_alert_abuse_state();
        } else if let Some(picker) = self.pickers.dismiss_select_prompts() {
            tracing::debug!(picker = picker.label(), "Picker torn down while loading");
        }
    }

    fn admit(&mut self, tab: &TabSessionState, request: PromptRequest) {
        let context = AdmissionContext {
            has_pending_permission: !tab.content.permission_requests.is_empty(),
            has_login_validator: self.delegates.login_validator.is_some(),
            has_credit_card_validator: self.delegates.credit_card_validator.is_some(),
            saved_generated_password: self.saved_generated_password.as_ref(),
        };
        let admission = resolve_admission(&request, self.flags.as_ref(), &context);

        match admission {
            Admission::Dismiss(DismissReason::PermissionPending) => {
                tracing::debug!(
                    uid = %request.uid(),
                    kind = request.tag().label(),
                    "Permission request pending, cancelling prompt"
                );
                let value = match request.kind() {
                    PromptKind::Popup(_) => PromptValue::checkbox(false),
                    _ => PromptValue::None,
                };
                if let Err(err) = self.on_cancel(&tab.id, request.uid(), value) {
                    tracing::error!(error = %err, "Failed to cancel prompt behind permission request");
                }
            }
            Admission::Dismiss(reason) => self.dismiss(&tab.id, request.uid(), reason),
            Admission::Ignore(reason) => {
                tracing::debug!(
                    uid = %request.uid(),
                    kind = request.tag().label(),
                    reason = reason.label(),
                    "Prompt ignored"
                );
            }
            Admission::DelegateFile => self.delegate_file(&tab.id, &request),
            Admission::DelegateShare => self.delegate_share(&tab.id, &request),
            Admission::Gate { picker } => self.gate(&tab.id, request, picker),
        }
    }

    fn gate(&mut self, tab: &TabId, request: PromptRequest, picker: Option<PickerPlan>) {
        let tag = request.tag();
        if is_windowed(tag)
            && let Some(fullscreen) = &self.delegates.fullscreen
        {
            fullscreen.exit_fullscreen(tab);
        }

        let approved = can_show_this_prompt(
            tag,
            picker,
            tab,
            &self.pickers,
            self.abuse.should_show_more_dialogs(),
        );

        if approved {
            if let Some(plan) = picker {
                self.pickers.activate(plan, tab.clone(), request.uid().clone());
            }
            let offer_opt_out = is_abusable(tag) && self.abuse.are_dialogs_being_abused();
            tracing::debug!(tab = %tab, uid = %request.uid(), kind = tag.label(), "Showing prompt");
            self.visible.set(Some(VisiblePrompt {
                tab_id: tab.clone(),
                request,
                offer_opt_out,
            }));
        } else {
            self.dismiss(tab, request.uid(), DismissReason::GateRejected);
        }

        if is_abusable(tag) {
            self.abuse.update_js_dialog_abused_state();
        }
    }

    fn dismiss(&mut self, tab: &TabId, uid: &PromptUid, reason: DismissReason) {
        tracing::info!(tab = %tab, uid = %uid, reason = reason.label(), "Dismissing prompt");
        self.hide(uid);
        if let Some(request) = self.store.consume_prompt(tab, uid) {
            request.respond(PromptResponse::Dismissed);
        }
    }

    fn delegate_file(&mut self, tab: &TabId, request: &PromptRequest) {
        let Some(picker) = self.delegates.file_picker.clone() else {
            tracing::debug!(uid = %request.uid(), "No file picker configured");
            self.dismiss(tab, request.uid(), DismissReason::MissingDelegate);
            return;
        };
        match picker.handle_file_request(tab, request) {
            Ok(()) => {}
            Err(FilePickerError::HandlerNotFound) => {
                if let Some(notifier) = &self.delegates.notifier {
                    notifier.show_notice(tab, "No app found to open this file");
                }
                self.dismiss(tab, request.uid(), DismissReason::DelegateFailed);
            }
            Err(err) => {
                tracing::warn!(uid = %request.uid(), error = %err, "File picker failed");
                self.dismiss(tab, request.uid(), DismissReason::DelegateFailed);
            }
        }
    }

    fn delegate_share(&mut self, tab: &TabId, request: &PromptRequest) {
        let PromptKind::Share(prompt) = request.kind() else {
            return;
        };
        let Some(share) = self.delegates.share.clone() else {
            tracing::debug!(uid = %request.uid(), "No share delegate configured");
            self.dismiss(tab, request.uid(), DismissReason::MissingDelegate);
            return;
        };
        let completion =
            ShareCompletion::new(tab.clone(), request.uid().clone(), self.command_tx.clone());
        share.show_share_sheet(tab, &prompt.data, completion);
    }

    // ========================================================================
    // Tab and host changes
    // ========================================================================

    /// Returns `true` if any request was consumed.
    fn on_tab_or_host_change(&mut self, state: &BrowserState, site_changed: bool) -> bool {
        if let Some(picker) = self.pickers.dismiss_select_prompts() {
            tracing::debug!(picker = picker.label(), "Picker torn down on tab or host change");
        }

        // Same tab, different site: suggestions dismissed on the old site may
        // be offered again.
        if site_changed && let Some(tab) = self.observed_tab(state) {
            let id = tab.id.clone();
            self.pickers.forget_dismissals(&id);
        }

        let Some(selected) = state.selected_tab() else {
            return false;
        };
        let stale: Vec<PromptUid> = selected
            .content
            .prompt_requests
            .iter()
            .filter(|request| {
                !matches!(request.kind(), PromptKind::File(_)) && request.should_dismiss_on_load()
            })
            .map(|request| request.uid().clone())
            .collect();

        let mut consumed = false;
        for uid in &stale {
            self.hide(uid);
            if let Some(request) = self.store.consume_prompt(&selected.id, uid) {
                tracing::debug!(tab = %selected.id, uid = %uid, "Prompt dismissed on load");
                request.respond(PromptResponse::Dismissed);
                consumed = true;
            }
        }
        consumed
    }

    // ========================================================================
    // Outcomes
    // ========================================================================

    fn hide(&self, uid: &PromptUid) {
        let shows_uid = self
            .visible
            .get()
            .is_some_and(|visible| visible.request.uid() == uid);
        if shows_uid {
            self.visible.set(None);
        }
    }

    fn find_request(&self, tab: &TabId, uid: &PromptUid) -> Option<PromptRequest> {
        self.store
            .state()
            .find_tab_or_custom_tab(tab)
            .and_then(|tab| {
                tab.content
                    .prompt_requests
                    .iter()
                    .find(|request| request.uid() == uid)
                    .cloned()
            })
    }

    /// Hide, consume and respond. A request that is already gone is a no-op.
    fn resolve(&mut self, tab: &TabId, uid: &PromptUid, resolution: Resolution) {
        self.hide(uid);
        if let Some(allow) = resolution.allow_more_dialogs {
            self.abuse.user_wants_more_dialogs(allow);
        }
        if let Some(request) = self.store.consume_prompt(tab, uid) {
            request.respond(resolution.response);
        }
    }

    /// Confirm request `uid` on `tab` with the renderer-supplied `value`.
    pub fn on_confirm(
        &mut self,
        tab: &TabId,
        uid: &PromptUid,
        value: PromptValue,
    ) -> Result<(), PromptError> {
        let Some(request) = self.find_request(tab, uid) else {
            tracing::debug!(tab = %tab, uid = %uid, "Confirm for a prompt that is no longer pending");
            return Ok(());
        };
        let resolution = outcome::confirm(&request, value).inspect_err(|err| {
            tracing::error!(uid = %uid, error = %err, "Rejected confirm value");
        })?;

        if let (PromptKind::SelectLogin(prompt), PromptResponse::SelectLogin { login }) =
            (request.kind(), &resolution.response)
            && prompt.generated_password.as_deref() == Some(login.password.as_str())
        {
            self.saved_generated_password = Some(SavedGeneratedPassword {
                origin: login.origin.clone(),
                password: login.password.clone(),
            });
        }
        if request.tag().is_picker() {
            self.pickers.dismiss_for(uid);
        }

        tracing::debug!(uid = %uid, kind = request.tag().label(), "Prompt confirmed");
        self.resolve(tab, uid, resolution);
        Ok(())
    }

    /// Cancel request `uid` on `tab`. Only popups read `value` (the opt-out
    /// checkbox).
    pub fn on_cancel(
        &mut self,
        tab: &TabId,
        uid: &PromptUid,
        value: PromptValue,
    ) -> Result<(), PromptError> {
        let Some(request) = self.find_request(tab, uid) else {
            tracing::debug!(tab = %tab, uid = %uid, "Cancel for a prompt that is no longer pending");
            return Ok(());
        };
        let resolution = outcome::cancel(&request, value).inspect_err(|err| {
            tracing::error!(uid = %uid, error = %err, "Rejected cancel value");
        })?;

        if request.tag().is_picker() {
            self.tear_down_picker(uid);
        }

        tracing::debug!(uid = %uid, kind = request.tag().label(), "Prompt cancelled");
        self.resolve(tab, uid, resolution);
        Ok(())
    }

    /// Hide and clear request `uid`. Kinds without a clear action stay
    /// pending.
    pub fn on_clear(&mut self, tab: &TabId, uid: &PromptUid) {
        self.hide(uid);
        let Some(request) = self.find_request(tab, uid) else {
            return;
        };
        let Some(response) = outcome::clear(&request) else {
            tracing::warn!(uid = %uid, kind = request.tag().label(), "Clear is not defined for this prompt");
            return;
        };
        self.resolve(
            tab,
            uid,
            Resolution {
                response,
                allow_more_dialogs: None,
            },
        );
    }

    /// Tear down the picker for `uid`, remembering dismissed password
    /// suggestions for its tab.
    fn tear_down_picker(&mut self, uid: &PromptUid) -> Option<ActivePicker> {
        let picker = self.pickers.dismiss_for(uid)?;
        if let ActivePicker::Login { tab, variant, .. } = &picker
            && variant.is_suggestion()
        {
            self.pickers.mark_dismissed(*variant, tab.clone());
        }
        Some(picker)
    }

    /// Dismiss an open picker. Returns `true` if the back press was handled.
    pub fn on_back_pressed(&mut self) -> bool {
        let Some(uid) = self.pickers.active().map(|picker| picker.uid().clone()) else {
            return false;
        };
        let Some(picker) = self.tear_down_picker(&uid) else {
            return false;
        };
        tracing::debug!(picker = picker.label(), uid = %uid, "Picker dismissed by back press");
        self.resolve(
            picker.tab(),
            &uid,
            Resolution {
                response: PromptResponse::Dismissed,
                allow_more_dialogs: None,
            },
        );
        true
    }

    // ========================================================================
    // Collaborator callbacks
    // ========================================================================

    fn apply_file_selection(&mut self, selection: FileSelection) {
        let result = match selection.outcome {
            FileOutcome::Selected(uris) => self.on_confirm(
                &selection.tab,
                &selection.uid,
                PromptValue::Files { uris },
            ),
            FileOutcome::Cancelled => {
                self.on_cancel(&selection.tab, &selection.uid, PromptValue::None)
            }
        };
        if let Err(err) = result {
            tracing::error!(error = %err, "Failed to apply file selection");
        }
    }

    /// Forward a platform activity result. Returns `true` if it completed a
    /// file request.
    pub fn on_activity_result(&mut self, result: &ActivityResult) -> bool {
        let Some(picker) = self.delegates.file_picker.clone() else {
            return false;
        };
        match picker.on_activity_result(result) {
            Some(selection) => {
                self.apply_file_selection(selection);
                true
            }
            None => false,
        }
    }

    pub fn on_permissions_result(&mut self, permissions: &[String], grants: &[bool]) {
        if permissions.is_empty() {
            // Some platforms redeliver empty results while a prompt is showing.
            tracing::debug!("Ignoring empty permissions result");
            return;
        }
        if let Some(picker) = &self.delegates.file_picker {
            picker.on_permissions_result(permissions, grants);
        }
    }

    pub fn on_photo_picker_result(&mut self, uris: &[String]) {
        let Some(picker) = self.delegates.file_picker.clone() else {
            return;
        };
        if let Some(selection) = picker.on_photo_picker_result(uris) {
            self.apply_file_selection(selection);
        }
    }

    /// Ask the login validator how saving `entry` would land.
    #[must_use]
    pub fn validate_login(&self, entry: &LoginEntry) -> Option<LoginValidation> {
        self.delegates
            .login_validator
            .as_ref()
            .map(|validator| validator.validate(entry))
    }

    #[must_use]
    pub fn validate_credit_card(&self, entry: &CreditCardEntry) -> Option<CreditCardValidation> {
        self.delegates
            .credit_card_validator
            .as_ref()
            .map(|validator| validator.validate(entry))
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Apply one command. `Stop` stops the controller.
    pub fn apply(&mut self, command: PromptCommand) {
        tracing::trace!(command = command.label(), "Applying prompt command");
        match command {
            PromptCommand::Confirm {
                tab,
                uid,
                value,
                reply,
            } => {
                let result = self.on_confirm(&tab, &uid, value);
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            PromptCommand::Cancel {
                tab,
                uid,
                value,
                reply,
            } => {
                let result = self.on_cancel(&tab, &uid, value);
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            PromptCommand::Clear { tab, uid, reply } => {
                self.on_clear(&tab, &uid);
                if let Some(reply) = reply {
                    let _ = reply.send(());
                }
            }
            PromptCommand::BackPressed { reply } => {
                let handled = self.on_back_pressed();
                let _ = reply.send(handled);
            }
            PromptCommand::Flush { reply } => {
                self.sync();
                let _ = reply.send(());
            }
            PromptCommand::Stop => self.stop(),
        }
    }

    /// Apply up to `budget` queued commands without blocking. Returns how many
    /// were applied.
    ///
    /// Does nothing once a [`crate::PromptFeature`] has taken the queue.
    pub fn poll_commands(&mut self, budget: usize) -> usize {
        let mut count = 0;
        while count < budget {
            let Some(rx) = self.command_rx.as_mut() else {
                break;
            };
            match rx.try_recv() {
                Ok(command) => {
                    self.apply(command);
                    count += 1;
                }
                Err(mpsc::error::TryRecvError::Empty | mpsc::error::TryRecvError::Disconnected) => {
                    break;
                }
            }
        }
        count
    }
}

impl std::fmt::Debug for PromptController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptController")
            .field("custom_tab_id", &self.custom_tab_id)
            .field("active_prompt", &self.active_prompt)
            .field("visible", &self.visible.get())
            .field("pickers", &self.pickers)
            .field("selected_tab_id", &self.selected_tab_id)
            .finish_non_exhaustive()
    }
}
