use idm_config::RBAC_APPLICATION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    TokenCreate,
    DomainsRead,
    DomainsList,
    DomainsUpdate,
    DomainsDelete,
}

impl Permission {
    fn resource_verb(self) -> (&'static str, &'static str) {
        match self {
            Permission::TokenCreate => ("token", "create"),
            Permission::DomainsRead => ("domains", "read"),
            Permission::DomainsList => ("domains", "list"),
            Permission::DomainsUpdate => ("domains", "update"),
            Permission::DomainsDelete => ("domains", "delete"),
        }
    }

    pub fn as_rbac_string(self) -> String {
        let (resource, verb) = self.resource_verb();
        format!("{RBAC_APPLICATION}:{resource}:{verb}")
    }

    /// `granted` may use `*` for any of its three segments.
    pub fn granted_by(self, granted: &str) -> bool {
        let (resource, verb) = self.resource_verb();
        let mut parts = granted.splitn(3, ':');
        let (Some(app), Some(res), Some(v)) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };
        let seg = |have: &str, want: &str| have == "*" || have == want;
        seg(app, RBAC_APPLICATION) && seg(res, resource) && seg(v, verb)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdmPermissions {
    pub has_token_create: bool,
    pub has_domains_read: bool,
    pub has_domains_list: bool,
    pub has_domains_update: bool,
    pub has_domains_delete: bool,
}

impl IdmPermissions {
    pub fn from_granted(granted: &[String]) -> Self {
        let any = |p: Permission| granted.iter().any(|g| p.granted_by(g));
        Self {
            has_token_create: any(Permission::TokenCreate),
            has_domains_read: any(Permission::DomainsRead),
            has_domains_list: any(Permission::DomainsList),
            has_domains_update: any(Permission::DomainsUpdate),
            has_domains_delete: any(Permission::DomainsDelete),
        }
    }

    pub fn all() -> Self {
        Self {
            has_token_create: true,
            has_domains_read: true,
            has_domains_list: true,
            has_domains_update: true,
            has_domains_delete: true,
        }
    }

    pub fn has(&self, p: Permission) -> bool {
        match p {
            Permission::TokenCreate => self.has_token_create,
            Permission::DomainsRead => self.has_domains_read,
            Permission::DomainsList => self.has_domains_list,
            Permission::DomainsUpdate => self.has_domains_update,
            Permission::DomainsDelete => self.has_domains_delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionsState {
    Loading,
    Loaded(IdmPermissions),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Permissions are still loading; act once they arrive.
    Pending,
    Allowed,
    Denied,
}

impl PermissionsState {
    pub fn check(&self, required: &[Permission]) -> Guard {
        match self {
            PermissionsState::Loading => Guard::Pending,
            PermissionsState::Loaded(p) if required.iter().all(|r| p.has(*r)) => Guard::Allowed,
            PermissionsState::Loaded(_) => Guard::Denied,
        }
    }

    pub fn allows(&self, p: Permission) -> bool {
        self.check(&[p]) == Guard::Allowed
    }
}

/// Permissions needed to start a registration.
pub const REGISTER: [Permission; 2] = [Permission::TokenCreate, Permission::DomainsUpdate];
