use idm_core::{Domain, DomainId, Page, SortColumn, SortDirection};

use crate::notifications::Notification;
use crate::permissions::PermissionsState;
use crate::wizard::WizardDraft;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    DomainList,
    DomainDetail(DomainId),
    Wizard,
    NoPermissions,
}

/// The page of domains currently shown by the list view. Membership is
/// decided by server side pagination only.
#[derive(Debug, Clone)]
pub struct DomainListState {
    pub domains: Vec<Domain>,
    pub total: i64,
    pub page: Page,
    pub sort: Option<(SortColumn, SortDirection)>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for DomainListState {
    fn default() -> Self {
        Self {
            domains: Vec::new(),
            total: 0,
            page: Page::new(1, idm_config::DEFAULT_PER_PAGE),
            sort: None,
            loading: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub route: Route,
    pub permissions: PermissionsState,

    pub list: DomainListState,
    /// Full records of every domain visited in this session.
    pub domains: Vec<Domain>,
    pub editing: Option<Domain>,

    pub wizard: WizardDraft,
    /// Provisional records whose best-effort deletion is still in flight.
    pub discarding: Vec<DomainId>,
    pub notifications: Vec<Notification>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            route: Route::DomainList,
            permissions: PermissionsState::Loading,
            list: DomainListState::default(),
            domains: Vec::new(),
            editing: None,
            wizard: WizardDraft::default(),
            discarding: Vec::new(),
            notifications: Vec::new(),
        }
    }
}

fn replace_by_id(domains: &mut Vec<Domain>, domain: &Domain, insert: bool) {
    if let Some(ix) = domains
        .iter()
        .position(|d| d.domain_id == domain.domain_id)
    {
        domains[ix] = domain.clone();
    } else if insert {
        domains.push(domain.clone());
    }
}

impl AppState {
    /// Replace the record in both caches. Only the detail cache gains records
    /// it did not hold before.
    pub fn update_domain(&mut self, domain: Domain) {
        replace_by_id(&mut self.domains, &domain, true);
        replace_by_id(&mut self.list.domains, &domain, false);
        if self
            .editing
            .as_ref()
            .is_some_and(|e| e.domain_id == domain.domain_id)
        {
            self.editing = Some(domain);
        }
    }

    pub fn delete_domain(&mut self, id: &str) {
        self.domains.retain(|d| d.domain_id != id);
        self.list.domains.retain(|d| d.domain_id != id);
        if self.list.total > 0 {
            self.list.total -= 1;
        }
        if self.editing.as_ref().is_some_and(|e| e.domain_id == id) {
            self.editing = None;
        }
    }

    pub fn get_domain(&self, id: &str) -> Option<&Domain> {
        if id.is_empty() {
            return None;
        }
        self.domains.iter().find(|d| d.domain_id == id)
    }

    /// Looks in the detail cache first, then in the current list page.
    pub fn find_domain(&self, id: &str) -> Option<&Domain> {
        self.get_domain(id)
            .or_else(|| self.list.domains.iter().find(|d| d.domain_id == id))
    }
}
