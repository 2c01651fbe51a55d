use std::time::Duration;

use anyhow::{bail, Context, Result};
use idm_app_core::{
    cancel_confirm_vm, domain_detail_vm, domain_list_vm, permissions_pending, wizard_vm,
    AppCommand, AppState, DomainDetailVm, DomainListVm, Notification, NotificationVariant, Route,
    VerifyVm, WizardStep,
};
use idm_core::{Domain, SortColumn, SortDirection, VerifyState};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use crate::{Console, ConsoleConfig};

/// Longest wait for the best-effort delete of an abandoned record.
const DISCARD_GRACE: Duration = Duration::from_secs(10);

fn permissions_known(s: &AppState) -> bool {
    !permissions_pending(s)
}

fn ensure_permitted(k: &Console) -> Result<()> {
    if k.store.state().route == Route::NoPermissions {
        bail!("You do not have the permissions required for this operation");
    }
    Ok(())
}

/// Turns the notification a command ended with into the command's outcome.
fn outcome(note: Option<Notification>) -> Result<Notification> {
    let Some(note) = note else {
        bail!("The operation finished without a result");
    };
    match note.variant {
        NotificationVariant::Danger => match &note.description {
            Some(d) => bail!("{}: {}", note.title, d),
            None => bail!("{}", note.title),
        },
        _ => Ok(note),
    }
}

fn print_note(note: &Notification) {
    println!(":: {}", note.title);
    if let Some(d) = &note.description {
        println!("   {}", d);
    }
}

/// Issues `cmd` and waits for the notification it answers with.
async fn notify_after(k: &mut Console, cmd: AppCommand) -> Result<Notification> {
    k.dispatch(AppCommand::LoadPermissions);
    k.dispatch(cmd);
    k.run_until(|s| s.route == Route::NoPermissions || !s.notifications.is_empty())
        .await;
    ensure_permitted(k)?;
    let note = outcome(k.store.state().notifications.last().cloned())?;
    print_note(&note);
    Ok(note)
}

pub async fn cmd_list(
    cfg: &ConsoleConfig,
    page: u32,
    per_page: Option<u32>,
    sort: Option<SortColumn>,
    desc: bool,
) -> Result<DomainListVm> {
    let mut k = cfg.connect()?;
    k.dispatch(AppCommand::LoadPermissions);
    if let Some(n) = per_page {
        k.dispatch(AppCommand::SetPerPage(n));
    }
    if per_page.is_none() || page != 1 {
        k.dispatch(AppCommand::SetPage(page));
    }
    k.run_until(|s| {
        s.route == Route::NoPermissions || (permissions_known(s) && !s.list.loading)
    })
    .await;
    ensure_permitted(&k)?;

    if let Some(column) = sort {
        let direction = if desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        k.dispatch(AppCommand::SetSort(Some((column, direction))));
    }

    let vm = domain_list_vm(&k.store.state());
    if let Some(err) = &vm.error {
        bail!("Failed to load identity domains: {err}");
    }

    if vm.empty {
        println!(":: No identity domains registered yet.");
        if vm.can_register {
            println!("   Run `idm-console register` to add one.");
        }
        return Ok(vm);
    }

    println!(
        ":: Identity domains (page {} of {}, {} total)",
        vm.page, vm.page_count, vm.total
    );
    println!("   {:<36}  {:<24}  {:<12}  AUTO-JOIN", "ID", "NAME", "TYPE");
    for row in &vm.rows {
        println!(
            "   {:<36}  {:<24}  {:<12}  {}",
            row.id, row.title, row.type_label, row.auto_join_label
        );
    }

    Ok(vm)
}

pub async fn cmd_show(cfg: &ConsoleConfig, id: String) -> Result<DomainDetailVm> {
    let mut k = cfg.connect()?;
    k.dispatch(AppCommand::LoadPermissions);
    k.dispatch(AppCommand::OpenDetail(id.clone()));
    let page = Route::DomainDetail(id.clone());
    k.run_until(|s| permissions_known(s) && (s.route != page || s.editing.is_some()))
        .await;
    ensure_permitted(&k)?;

    let Some(vm) = domain_detail_vm(&k.store.state()) else {
        bail!("Identity domain {id} could not be read");
    };

    println!(":: {}", vm.title);
    println!("   ID:          {}", vm.id);
    println!("   Domain:      {}", vm.domain_name);
    println!("   Type:        {}", vm.type_label);
    println!("   Description: {}", vm.description);
    println!(
        "   Auto-join:   {}",
        if vm.auto_join { "Enabled" } else { "Disabled" }
    );
    if let Some(realm) = &vm.realm_name {
        println!("   Realm:       {}", realm);
    }
    if !vm.servers.is_empty() {
        println!("\n:: Servers");
        for s in &vm.servers {
            let mut roles = Vec::new();
            if s.ca_server {
                roles.push("CA");
            }
            if s.hcc_enrollment_server {
                roles.push("enrollment");
            }
            println!(
                "   {:<40}  {:<16}  {:<10}  {}",
                s.fqdn,
                s.location,
                s.ipa_version,
                roles.join(", ")
            );
        }
    }

    Ok(vm)
}

pub async fn cmd_set_title(cfg: &ConsoleConfig, id: String, title: String) -> Result<Notification> {
    let mut k = cfg.connect()?;
    notify_after(&mut k, AppCommand::SaveTitle { id, title }).await
}

pub async fn cmd_set_description(
    cfg: &ConsoleConfig,
    id: String,
    description: String,
) -> Result<Notification> {
    let mut k = cfg.connect()?;
    notify_after(&mut k, AppCommand::SaveDescription { id, description }).await
}

pub async fn cmd_auto_join(cfg: &ConsoleConfig, id: String, enabled: bool) -> Result<Domain> {
    let mut k = cfg.connect()?;
    k.dispatch(AppCommand::LoadPermissions);
    k.dispatch(AppCommand::SetAutoJoin {
        id: id.clone(),
        enabled,
    });
    // Success is silent; it shows as the updated record in the cache.
    k.run_until(|s| {
        s.route == Route::NoPermissions
            || !s.notifications.is_empty()
            || s
                .get_domain(&id)
                .is_some_and(|d| d.auto_enrollment_enabled == Some(enabled))
    })
    .await;
    ensure_permitted(&k)?;

    let state = k.store.state();
    if let Some(note) = state.notifications.last().cloned() {
        outcome(Some(note))?;
    }
    let domain = state
        .get_domain(&id)
        .cloned()
        .with_context(|| format!("No answer for identity domain {id}"))?;
    println!(
        ":: Auto-join {} for {}",
        if enabled { "enabled" } else { "disabled" },
        domain.title_or_empty()
    );
    Ok(domain)
}

pub async fn cmd_delete(cfg: &ConsoleConfig, id: String) -> Result<Notification> {
    let mut k = cfg.connect()?;
    notify_after(&mut k, AppCommand::DeleteDomain(id)).await
}

#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub no_auto_join: bool,
}

#[derive(Debug, Clone)]
pub struct RegisterOutcome {
    pub domain: Domain,
    pub notification: Notification,
}

/// Closes the wizard and waits a bounded time for the provisional record to
/// be deleted.
async fn abandon(k: &mut Console) {
    k.dispatch(AppCommand::CancelWizard);
    let drained = tokio::time::timeout(DISCARD_GRACE, k.run_until(|s| s.discarding.is_empty()));
    if drained.await.is_err() {
        warn!("provisional record may still exist; the delete did not answer in time");
    }
    if let Some(note) = k.store.state().notifications.last() {
        print_note(note);
    }
}

pub async fn cmd_register(cfg: &ConsoleConfig, opts: RegisterOptions) -> Result<RegisterOutcome> {
    let mut k = cfg.connect()?;

    println!(":: Requesting a registration token...");
    k.dispatch(AppCommand::LoadPermissions);
    k.dispatch(AppCommand::OpenWizard);
    k.run_until(|s| {
        s.route == Route::NoPermissions || !s.wizard.token.is_empty() || !s.notifications.is_empty()
    })
    .await;
    ensure_permitted(&k)?;

    let state = k.store.state();
    if state.wizard.token.is_empty() {
        outcome(state.notifications.last().cloned())?;
        bail!("No registration token was issued");
    }

    let wizard = wizard_vm(&state);
    println!("   Domain ID: {}", state.wizard.domain.domain_id);
    if let Some(expires) = &wizard.token_expires {
        println!("   Token expires: {}", expires);
    }
    println!("\n:: Run this on an IdM server of the domain:");
    println!("   {}\n", wizard.registration_command.unwrap_or_default());

    k.dispatch(AppCommand::NextStep);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let interrupted = {
        let progress = pb.clone();
        let verified = k.run_until(move |s| {
            progress.set_message(VerifyVm::from(s.wizard.verify).description);
            s.wizard.verify == VerifyState::Completed || s.wizard.verify_run.is_none()
        });
        tokio::select! {
            _ = verified => false,
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!("cannot listen for Ctrl-C: {e}");
                }
                true
            }
        }
    };

    if interrupted {
        pb.finish_with_message(cancel_confirm_vm().title);
        abandon(&mut k).await;
        bail!("Registration cancelled");
    }

    let verify = k.store.state().wizard.verify;
    let vm = VerifyVm::from(verify);
    pb.finish_with_message(vm.description);
    if verify != VerifyState::Completed {
        abandon(&mut k).await;
        bail!("Verification failed: {}", vm.description);
    }

    if let Some(title) = opts.title {
        k.dispatch(AppCommand::ChangeTitle(title));
    }
    if let Some(description) = opts.description {
        k.dispatch(AppCommand::ChangeDescription(description));
    }
    if opts.no_auto_join {
        k.dispatch(AppCommand::ChangeAutoJoin(false));
    }
    k.dispatch(AppCommand::GoToStep(WizardStep::Details));
    k.dispatch(AppCommand::GoToStep(WizardStep::Review));

    let draft = k.store.state().wizard;
    if draft.step != WizardStep::Review {
        debug!("review step refused, draft title {:?}", draft.domain.title);
        abandon(&mut k).await;
        bail!("The domain has no title; pass one with --title");
    }

    println!(":: Review");
    println!("   Name:        {}", draft.domain.title_or_empty());
    println!("   Description: {}", draft.domain.description_or_empty());
    println!(
        "   Auto-join:   {}",
        if draft.domain.auto_join() {
            "Enabled"
        } else {
            "Disabled"
        }
    );

    k.dispatch(AppCommand::FinishWizard);
    k.run_until(|s| s.route == Route::DomainList).await;

    let state = k.store.state();
    let note = state.notifications.last().cloned();
    if let Some(n) = &note {
        print_note(n);
    }
    let notification = outcome(note)?;
    let domain = state
        .get_domain(&draft.domain.domain_id)
        .cloned()
        .unwrap_or(draft.domain);
    Ok(RegisterOutcome {
        domain,
        notification,
    })
}
