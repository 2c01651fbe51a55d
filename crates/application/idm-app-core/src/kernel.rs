use std::future::Future;
use std::sync::Arc;

use idm_core::{DomainType, SortDirection, UpdateDomainUserRequest, VerifyState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::app_core::{AppCommand, AppStore, DomainEvent};
use crate::domain::{AppState, Route};
use crate::notifications::{self, Notification};
use crate::permissions::{Guard, IdmPermissions, Permission, REGISTER};
use crate::ports::{AccessApi, DomainsApi};
use crate::verify::{PollerConfig, VerificationPoller};
use crate::wizard::{VerifyRunId, WizardStep};

const LIST: &[Permission] = &[Permission::DomainsList];
const READ: &[Permission] = &[Permission::DomainsRead];
const UPDATE: &[Permission] = &[Permission::DomainsUpdate];
const DELETE: &[Permission] = &[Permission::DomainsDelete];

fn required_permissions(cmd: &AppCommand) -> &'static [Permission] {
    match cmd {
        AppCommand::LoadDomains | AppCommand::SetPage(_) | AppCommand::SetPerPage(_) => LIST,
        AppCommand::OpenDetail(_) => READ,
        AppCommand::ToggleAutoJoin(_)
        | AppCommand::SaveTitle { .. }
        | AppCommand::SaveDescription { .. }
        | AppCommand::SetAutoJoin { .. } => UPDATE,
        AppCommand::DeleteDomain(_) => DELETE,
        AppCommand::OpenWizard => &REGISTER,
        _ => &[],
    }
}

/// Turns commands into state changes and background calls.
///
/// Background work reports back through a channel; [`AppKernel::tick`] (or
/// one of the async drivers) folds those events into the store.
pub struct AppKernel<A, R> {
    pub store: AppStore,
    api: Arc<A>,
    access: Arc<R>,
    poller: PollerConfig,

    tx: mpsc::Sender<DomainEvent>,
    rx: mpsc::Receiver<DomainEvent>,

    verify_cancel: Option<CancellationToken>,
    token_in_flight: bool,
    /// The closing PATCH of the wizard has been sent and not answered yet.
    finish_in_flight: bool,
    /// Guarded commands received before the permissions arrived.
    deferred: Vec<AppCommand>,
}

impl<A, R> AppKernel<A, R>
where
    A: DomainsApi,
    R: AccessApi,
{
    pub fn new(store: AppStore, api: A, access: R) -> Self {
        let (tx, rx) = mpsc::channel(100);
        Self {
            store,
            api: Arc::new(api),
            access: Arc::new(access),
            poller: PollerConfig::default(),
            tx,
            rx,
            verify_cancel: None,
            token_in_flight: false,
            finish_in_flight: false,
            deferred: Vec::new(),
        }
    }

    pub fn with_poller_config(mut self, config: PollerConfig) -> Self {
        self.poller = config;
        self
    }

    pub fn dispatch(&mut self, cmd: AppCommand) {
        debug!("dispatch {:?}", cmd);

        if matches!(&cmd, AppCommand::OpenDetail(id) if id.is_empty()) {
            self.store.apply(DomainEvent::RouteChanged(Route::DomainList));
            return;
        }

        let required = required_permissions(&cmd);
        if !required.is_empty() {
            match self.store.with_state(|s| s.permissions.check(required)) {
                Guard::Allowed => {}
                Guard::Pending => {
                    debug!("deferring {:?} until permissions are known", cmd);
                    self.deferred.push(cmd);
                    return;
                }
                Guard::Denied => {
                    info!("permissions {:?} missing for {:?}", required, cmd);
                    self.store
                        .apply(DomainEvent::RouteChanged(Route::NoPermissions));
                    return;
                }
            }
        }

        match cmd {
            AppCommand::LoadPermissions => {
                let access = self.access.clone();
                let tx = self.tx.clone();
                self.spawn("load permissions", async move {
                    let perms = match access.permissions(idm_config::RBAC_APPLICATION).await {
                        Ok(granted) => IdmPermissions::from_granted(&granted),
                        Err(e) => {
                            warn!("permissions could not be loaded: {e}");
                            IdmPermissions::default()
                        }
                    };
                    let _ = tx.send(DomainEvent::PermissionsLoaded(perms)).await;
                });
            }

            AppCommand::Navigate(r) => {
                if r != Route::Wizard {
                    self.stop_verification();
                }
                self.store.apply(DomainEvent::RouteChanged(r));
            }

            AppCommand::LoadDomains => self.load_domains(),

            AppCommand::SetPage(n) => {
                let page = self.store.with_state(|s| s.list.page.with_number(n));
                self.store.apply(DomainEvent::PageChanged(page));
                self.load_domains();
            }

            AppCommand::SetPerPage(n) => {
                let per_page = idm_config::clamp_per_page(n);
                let page = self.store.with_state(|s| s.list.page.with_per_page(per_page));
                self.store.apply(DomainEvent::PageChanged(page));
                self.load_domains();
            }

            AppCommand::SortBy(column) => {
                let next = match self.store.with_state(|s| s.list.sort) {
                    Some((c, SortDirection::Asc)) if c == column => (column, SortDirection::Desc),
                    _ => (column, SortDirection::Asc),
                };
                self.store.apply(DomainEvent::SortChanged(Some(next)));
            }

            AppCommand::SetSort(sort) => self.store.apply(DomainEvent::SortChanged(sort)),

            AppCommand::ToggleAutoJoin(id) => {
                let Some(domain) = self.store.with_state(|s| s.find_domain(&id).cloned()) else {
                    warn!("cannot toggle auto-join of unknown domain {id}");
                    return;
                };
                self.set_auto_join(id, !domain.auto_join(), domain.title_or_empty().to_string());
            }

            AppCommand::DeleteDomain(id) => {
                let title = self
                    .store
                    .with_state(|s| s.find_domain(&id).map(|d| d.title_or_empty().to_string()))
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| id.clone());
                let api = self.api.clone();
                let tx = self.tx.clone();
                self.spawn("delete domain", async move {
                    match api.delete_domain(&id).await {
                        Ok(()) => {
                            info!("domain {id} deleted");
                            let _ = tx.send(DomainEvent::DomainDeleted(id)).await;
                            let _ = tx
                                .send(DomainEvent::Notified(notifications::delete_succeeded(&title)))
                                .await;
                        }
                        Err(e) => {
                            error!("deleting domain {id} failed: {e}");
                            let _ = tx
                                .send(DomainEvent::Notified(notifications::delete_failed(&title)))
                                .await;
                        }
                    }
                });
            }

            AppCommand::OpenDetail(id) => {
                self.stop_verification();
                let cached = self.store.with_state(|s| s.find_domain(&id).cloned());
                self.store
                    .apply(DomainEvent::RouteChanged(Route::DomainDetail(id.clone())));
                self.store.apply(DomainEvent::EditingChanged(cached));

                let api = self.api.clone();
                let tx = self.tx.clone();
                self.spawn("read domain", async move {
                    let ev = match api.read_domain(&id).await {
                        Ok(d) => DomainEvent::DetailLoaded(d),
                        Err(e) => {
                            warn!("domain {id} could not be read: {e}");
                            DomainEvent::DetailLoadFailed { id }
                        }
                    };
                    let _ = tx.send(ev).await;
                });
            }

            AppCommand::SaveTitle { id, title } => self.save_field(
                id,
                UpdateDomainUserRequest::title(title),
                notifications::title_edited,
                notifications::title_edit_failed,
            ),

            AppCommand::SaveDescription { id, description } => self.save_field(
                id,
                UpdateDomainUserRequest::description(description),
                notifications::description_edited,
                notifications::description_edit_failed,
            ),

            AppCommand::SetAutoJoin { id, enabled } => {
                let title = self
                    .store
                    .with_state(|s| s.find_domain(&id).map(|d| d.title_or_empty().to_string()))
                    .unwrap_or_default();
                self.set_auto_join(id, enabled, title);
            }

            AppCommand::OpenWizard => {
                self.stop_verification();
                self.finish_in_flight = false;
                self.store.apply(DomainEvent::WizardOpened);
                self.store.apply(DomainEvent::RouteChanged(Route::Wizard));
                self.enter_step(WizardStep::Preparation);
            }

            AppCommand::RequestToken => self.request_token(),

            AppCommand::GoToStep(step) => self.enter_step(step),

            AppCommand::NextStep => {
                if let Some(step) = self.store.with_state(|s| s.wizard.step.next()) {
                    self.enter_step(step);
                }
            }

            AppCommand::PreviousStep => {
                if let Some(step) = self.store.with_state(|s| s.wizard.step.previous()) {
                    self.enter_step(step);
                }
            }

            AppCommand::StartVerification => self.start_verification(),

            AppCommand::RetryVerification => {
                let current = self.store.with_state(|s| s.wizard.verify);
                if !current.is_retriable() {
                    debug!("verification is {current}, retry ignored");
                    return;
                }
                self.start_verification();
            }

            AppCommand::StopVerification => self.stop_verification(),

            AppCommand::ChangeTitle(t) => self.store.apply(DomainEvent::WizardTitleChanged(t)),
            AppCommand::ChangeDescription(d) => {
                self.store.apply(DomainEvent::WizardDescriptionChanged(d))
            }
            AppCommand::ChangeAutoJoin(v) => {
                self.store.apply(DomainEvent::WizardAutoJoinChanged(v))
            }

            AppCommand::CancelWizard => self.cancel_wizard(),

            AppCommand::FinishWizard => self.finish_wizard(),

            AppCommand::DismissNotification(id) => {
                self.store.apply(DomainEvent::NotificationDismissed(id))
            }
        }
    }

    /// Applies every event that is ready without waiting.
    pub fn tick(&mut self) {
        while let Ok(ev) = self.rx.try_recv() {
            self.handle_event(ev);
        }
    }

    /// Waits for the next background event and applies it.
    pub async fn next_event(&mut self) {
        if let Some(ev) = self.rx.recv().await {
            self.handle_event(ev);
        }
    }

    /// Applies events as they arrive until `done` holds for the state.
    pub async fn run_until(&mut self, mut done: impl FnMut(&AppState) -> bool) {
        self.tick();
        while !self.store.with_state(&mut done) {
            self.next_event().await;
        }
    }

    pub fn sender(&self) -> mpsc::Sender<DomainEvent> {
        self.tx.clone()
    }

    fn handle_event(&mut self, ev: DomainEvent) {
        match &ev {
            DomainEvent::Verification { run_id, state, .. } => {
                let current = self.store.with_state(|s| s.wizard.verify_run);
                if current != Some(*run_id) {
                    debug!("dropping {state} from stale verification run {run_id}");
                    return;
                }
            }
            DomainEvent::VerificationFinished { run_id } => {
                let current = self.store.with_state(|s| s.wizard.verify_run);
                if current != Some(*run_id) {
                    debug!("stale verification run {run_id} finished");
                    return;
                }
                self.verify_cancel = None;
            }
            DomainEvent::WizardTokenIssued(tok) => {
                self.token_in_flight = false;
                let wanted = self
                    .store
                    .with_state(|s| s.route == Route::Wizard && s.wizard.needs_token());
                if !wanted {
                    info!("token for {} arrived after the wizard moved on", tok.domain_id);
                    self.discard_provisional(tok.domain_id.clone());
                    return;
                }
            }
            DomainEvent::TokenRequestFailed { .. } => self.token_in_flight = false,
            DomainEvent::WizardClosed => self.finish_in_flight = false,
            _ => {}
        }

        let permissions_arrived = matches!(ev, DomainEvent::PermissionsLoaded(_));
        self.store.apply(ev);

        if permissions_arrived {
            for cmd in std::mem::take(&mut self.deferred) {
                self.dispatch(cmd);
            }
        }
    }

    fn spawn<F>(&self, what: &str, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match crate::async_runtime::handle() {
            Ok(handle) => {
                handle.spawn(fut);
            }
            Err(e) => {
                error!("cannot {what}: no async runtime ({e})");
                self.store.apply(DomainEvent::Notified(Notification::error(format!(
                    "Failed to start background task: {e}"
                ))));
            }
        }
    }

    fn load_domains(&mut self) {
        let page = self.store.with_state(|s| s.list.page);
        self.store.apply(DomainEvent::ListLoading { page });

        let api = self.api.clone();
        let tx = self.tx.clone();
        self.spawn("load domains", async move {
            match api.list_domains(page).await {
                Ok(res) => {
                    let _ = tx
                        .send(DomainEvent::ListLoaded {
                            page,
                            total: res.meta.count,
                            domains: res.data,
                        })
                        .await;
                }
                Err(e) => {
                    error!("listing domains failed: {e}");
                    let message = e.to_string();
                    let _ = tx
                        .send(DomainEvent::Notified(notifications::list_load_failed(&message)))
                        .await;
                    let _ = tx.send(DomainEvent::ListFailed { page, message }).await;
                }
            }
        });
    }

    fn save_field(
        &mut self,
        id: String,
        req: UpdateDomainUserRequest,
        on_ok: fn() -> Notification,
        on_err: fn() -> Notification,
    ) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.spawn("update domain", async move {
            match api.update_domain(&id, &req).await {
                Ok(d) => {
                    let _ = tx.send(DomainEvent::DomainUpdated(d)).await;
                    let _ = tx.send(DomainEvent::Notified(on_ok())).await;
                }
                Err(e) => {
                    error!("updating domain {id} failed: {e}");
                    let _ = tx.send(DomainEvent::Notified(on_err())).await;
                }
            }
        });
    }

    fn set_auto_join(&mut self, id: String, enabled: bool, title: String) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.spawn("update auto-join", async move {
            let req = UpdateDomainUserRequest::auto_join(enabled);
            match api.update_domain(&id, &req).await {
                Ok(d) => {
                    let _ = tx.send(DomainEvent::DomainUpdated(d)).await;
                }
                Err(e) => {
                    error!("changing auto-join of {id} failed: {e}");
                    let _ = tx
                        .send(DomainEvent::Notified(notifications::auto_join_change_failed(
                            &title,
                        )))
                        .await;
                }
            }
        });
    }

    fn enter_step(&mut self, step: WizardStep) {
        let before = self.store.with_state(|s| s.wizard.step);
        self.store.apply(DomainEvent::WizardStepChanged(step));
        let (after, verify) = self.store.with_state(|s| (s.wizard.step, s.wizard.verify));
        if after != step {
            return;
        }

        if before == WizardStep::Registration && after != WizardStep::Registration {
            self.stop_verification();
        }

        match after {
            WizardStep::Preparation => self.request_token(),
            WizardStep::Registration
                if before != WizardStep::Registration && verify != VerifyState::Completed =>
            {
                self.start_verification()
            }
            _ => {}
        }
    }

    fn request_token(&mut self) {
        let wanted = self
            .store
            .with_state(|s| s.route == Route::Wizard && s.wizard.needs_token());
        if !wanted || self.token_in_flight {
            return;
        }
        self.token_in_flight = true;

        let api = self.api.clone();
        let tx = self.tx.clone();
        self.spawn("request token", async move {
            let ev = match api.create_domain_token(DomainType::RhelIdm).await {
                Ok(tok) => {
                    info!("registration token issued for {}", tok.domain_id);
                    DomainEvent::WizardTokenIssued(tok)
                }
                Err(e) => {
                    error!("registration token request failed: {e}");
                    DomainEvent::TokenRequestFailed {
                        message: e.to_string(),
                    }
                }
            };
            let _ = tx.send(ev).await;
        });
    }

    fn start_verification(&mut self) {
        let (route, domain_id) = self
            .store
            .with_state(|s| (s.route.clone(), s.wizard.domain.domain_id.clone()));
        if route != Route::Wizard || domain_id.is_empty() {
            debug!("nothing to verify yet");
            return;
        }

        if let Some(token) = self.verify_cancel.take() {
            token.cancel();
        }
        let run_id: VerifyRunId = uuid::Uuid::new_v4();
        self.store.apply(DomainEvent::VerificationStarted { run_id });

        let cancel = CancellationToken::new();
        self.verify_cancel = Some(cancel.clone());

        let poller = VerificationPoller::new(self.api.clone(), self.poller);
        let tx = self.tx.clone();
        self.spawn("verify registration", async move {
            let reports = tx.clone();
            let last = poller
                .run(&domain_id, VerifyState::Initial, cancel, move |t| {
                    let tx = reports.clone();
                    async move {
                        let _ = tx
                            .send(DomainEvent::Verification {
                                run_id,
                                state: t.state,
                                domain: t.domain,
                            })
                            .await;
                    }
                })
                .await;
            debug!("verification run {run_id} ended in {last}");
            let _ = tx.send(DomainEvent::VerificationFinished { run_id }).await;
        });
    }

    fn stop_verification(&mut self) {
        if let Some(token) = self.verify_cancel.take() {
            token.cancel();
            self.store.apply(DomainEvent::VerificationStopped);
        }
    }

    fn discard_provisional(&self, id: String) {
        self.store
            .apply(DomainEvent::ProvisionalDiscarding(id.clone()));
        let api = self.api.clone();
        let tx = self.tx.clone();
        self.spawn("delete provisional domain", async move {
            match api.delete_domain(&id).await {
                Ok(()) => info!("provisional domain {id} deleted"),
                Err(e) if e.is_not_found() => debug!("provisional domain {id} already gone"),
                Err(e) => warn!("provisional domain {id} could not be deleted: {e}"),
            }
            let _ = tx.send(DomainEvent::ProvisionalDiscarded(id)).await;
        });
    }

    fn cancel_wizard(&mut self) {
        self.stop_verification();
        let id = self.store.with_state(|s| s.wizard.domain.domain_id.clone());
        if !id.is_empty() {
            self.discard_provisional(id);
        }
        self.store.apply(DomainEvent::WizardClosed);
        self.store.apply(DomainEvent::RouteChanged(Route::DomainList));
        self.store.apply(DomainEvent::Notified(
            notifications::registration_not_completed(),
        ));
    }

    fn finish_wizard(&mut self) {
        if self.finish_in_flight {
            debug!("registration is already being finished");
            return;
        }
        let draft = self.store.with_state(|s| s.wizard.clone());
        if !draft.gates().review {
            debug!("registration is not ready to be finished");
            return;
        }
        self.stop_verification();
        self.finish_in_flight = true;

        let api = self.api.clone();
        let tx = self.tx.clone();
        self.spawn("finish registration", async move {
            let id = draft.domain.domain_id.clone();
            let req = UpdateDomainUserRequest::from_draft(&draft.domain);
            let note = match api.update_domain(&id, &req).await {
                Ok(d) => {
                    info!("registration of {id} finished");
                    let _ = tx.send(DomainEvent::DomainUpdated(d)).await;
                    notifications::registration_finished(draft.domain.auto_join())
                }
                Err(e) => {
                    error!("finishing registration of {id} failed: {e}");
                    notifications::registration_failed()
                }
            };
            let _ = tx.send(DomainEvent::Notified(note)).await;
            let _ = tx.send(DomainEvent::WizardClosed).await;
            let _ = tx
                .send(DomainEvent::RouteChanged(Route::DomainList))
                .await;
        });
    }
}

impl<A, R> Drop for AppKernel<A, R> {
    fn drop(&mut self) {
        if let Some(token) = self.verify_cancel.take() {
            token.cancel();
        }
    }
}
