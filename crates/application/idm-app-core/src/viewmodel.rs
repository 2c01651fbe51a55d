use chrono::{DateTime, Utc};
use idm_core::list::{auto_join_label, sort_domains};
use idm_core::{Domain, DomainId, SortColumn, SortDirection, VerifyState};

use crate::domain::AppState;
use crate::permissions::{Guard, Permission, PermissionsState, REGISTER};
use crate::wizard::{WizardGates, WizardStep};

// --- Domain list ---

#[derive(Debug, Clone, PartialEq)]
pub struct DomainRowVm {
    pub id: DomainId,
    pub title: String,
    pub type_label: String,
    pub auto_join_label: &'static str,
    /// Row action that flips auto-join.
    pub toggle_label: &'static str,
}

impl From<&Domain> for DomainRowVm {
    fn from(d: &Domain) -> Self {
        Self {
            id: d.domain_id.clone(),
            title: d.title_or_empty().to_string(),
            type_label: d.domain_type.label(),
            auto_join_label: auto_join_label(d),
            toggle_label: if d.auto_join() { "Disable" } else { "Enable" },
        }
    }
}

#[derive(Debug, Clone)]
pub struct DomainListVm {
    pub rows: Vec<DomainRowVm>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub page_count: u32,
    pub sort: Option<(SortColumn, SortDirection)>,
    pub loading: bool,
    pub error: Option<String>,
    /// Nothing registered yet; the view shows the empty state instead of a
    /// table.
    pub empty: bool,
    pub can_register: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

pub fn domain_list_vm(state: &AppState) -> DomainListVm {
    let list = &state.list;
    let mut domains = list.domains.clone();
    if let Some((column, direction)) = list.sort {
        sort_domains(&mut domains, column, direction);
    }
    let perms = &state.permissions;

    DomainListVm {
        rows: domains.iter().map(DomainRowVm::from).collect(),
        total: list.total,
        page: list.page.number,
        per_page: list.page.per_page,
        page_count: list.page.page_count(list.total),
        sort: list.sort,
        loading: list.loading,
        error: list.error.clone(),
        empty: !list.loading && list.total <= 0,
        can_register: perms.check(&REGISTER) == Guard::Allowed,
        can_update: perms.allows(Permission::DomainsUpdate),
        can_delete: perms.allows(Permission::DomainsDelete),
    }
}

// --- Detail page ---

#[derive(Debug, Clone, PartialEq)]
pub struct ServerVm {
    pub fqdn: String,
    pub location: String,
    pub ca_server: bool,
    pub hcc_enrollment_server: bool,
    pub ipa_version: String,
}

#[derive(Debug, Clone)]
pub struct DomainDetailVm {
    pub id: DomainId,
    pub title: String,
    pub description: String,
    pub domain_name: String,
    pub type_label: String,
    pub auto_join: bool,
    pub realm_name: Option<String>,
    pub servers: Vec<ServerVm>,
    pub can_edit: bool,
    pub can_delete: bool,
}

fn servers(d: &Domain) -> Vec<ServerVm> {
    let Some(ipa) = &d.rhel_idm else {
        return Vec::new();
    };
    ipa.servers
        .iter()
        .map(|s| ServerVm {
            fqdn: s.fqdn.clone(),
            location: s.location.clone().unwrap_or_default(),
            ca_server: s.ca_server,
            hcc_enrollment_server: s.hcc_enrollment_server,
            ipa_version: s.ipa_version.clone().unwrap_or_default(),
        })
        .collect()
}

/// `None` until the domain being edited is known, either from the cache or
/// from the read issued when the page was opened.
pub fn domain_detail_vm(state: &AppState) -> Option<DomainDetailVm> {
    let d = state.editing.as_ref()?;
    Some(DomainDetailVm {
        id: d.domain_id.clone(),
        title: d.title_or_empty().to_string(),
        description: d.description_or_empty().to_string(),
        domain_name: d.domain_name.clone().unwrap_or_default(),
        type_label: d.domain_type.label(),
        auto_join: d.auto_join(),
        realm_name: d.rhel_idm.as_ref().map(|i| i.realm_name.clone()),
        servers: servers(d),
        can_edit: state.permissions.allows(Permission::DomainsUpdate),
        can_delete: state.permissions.allows(Permission::DomainsDelete),
    })
}

// --- Wizard ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyVm {
    pub state: VerifyState,
    pub label: &'static str,
    pub description: &'static str,
    /// Button shown under the status, if any.
    pub action: Option<&'static str>,
    pub failed: bool,
}

impl From<VerifyState> for VerifyVm {
    fn from(state: VerifyState) -> Self {
        let (description, action) = match state {
            VerifyState::Initial => ("Running verification test", Some("Test")),
            VerifyState::Waiting => ("Waiting for registration data", None),
            VerifyState::TimedOut => ("Test timed out", Some("Test again")),
            VerifyState::NotFound => ("Registration data not found", None),
            VerifyState::Completed => ("Test completed", Some("Test")),
        };
        Self {
            state,
            label: "Verify registration",
            description,
            action,
            failed: matches!(state, VerifyState::TimedOut | VerifyState::NotFound),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WizardStepVm {
    pub step: WizardStep,
    pub title: &'static str,
    pub enabled: bool,
    pub current: bool,
}

#[derive(Debug, Clone)]
pub struct WizardVm {
    pub steps: Vec<WizardStepVm>,
    pub current: WizardStep,
    pub token: String,
    pub token_expires: Option<String>,
    pub registration_command: Option<String>,
    pub verify: VerifyVm,
    pub title: String,
    pub description: String,
    pub auto_join: bool,
    pub can_next: bool,
    pub can_back: bool,
    pub can_finish: bool,
}

pub fn wizard_vm(state: &AppState) -> WizardVm {
    let draft = &state.wizard;
    let gates: WizardGates = draft.gates();
    let expires = draft.token_expiration.and_then(format_expiration);

    WizardVm {
        steps: WizardStep::ALL
            .iter()
            .map(|&step| WizardStepVm {
                step,
                title: step.title(),
                enabled: gates.can_enter(step),
                current: step == draft.step,
            })
            .collect(),
        current: draft.step,
        token: draft.token.clone(),
        token_expires: expires,
        registration_command: (!draft.token.is_empty()).then(|| draft.registration_command()),
        verify: VerifyVm::from(draft.verify),
        title: draft.domain.title_or_empty().to_string(),
        description: draft.domain.description_or_empty().to_string(),
        auto_join: draft.domain.auto_join(),
        can_next: draft.step.next().is_some_and(|s| gates.can_enter(s)),
        can_back: draft.step.previous().is_some(),
        can_finish: draft.step == WizardStep::Review && gates.review,
    }
}

fn format_expiration(ts: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|t| t.to_rfc3339())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelConfirmVm {
    pub title: &'static str,
    pub body: &'static str,
    pub confirm_label: &'static str,
    pub keep_label: &'static str,
}

pub fn cancel_confirm_vm() -> CancelConfirmVm {
    CancelConfirmVm {
        title: "Cancel identity domain registration",
        body: "Proceeding with the cancellation, your data will not be saved in the Red Hat \
               Hybrid Cloud Console. However, this action does not affect the identity server \
               side if any action is done there.",
        confirm_label: "Cancel registration",
        keep_label: "Continue registration",
    }
}

/// Whether the permission set is still being fetched.
pub fn permissions_pending(state: &AppState) -> bool {
    matches!(state.permissions, PermissionsState::Loading)
}
