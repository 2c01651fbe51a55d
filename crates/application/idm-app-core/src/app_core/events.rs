use idm_core::{Domain, DomainId, DomainRegToken, Page, SortColumn, SortDirection, VerifyState};

use crate::domain::Route;
use crate::notifications::Notification;
use crate::permissions::IdmPermissions;
use crate::wizard::{VerifyRunId, WizardStep};

#[derive(Debug, Clone)]
pub enum DomainEvent {
    // Boot
    PermissionsLoaded(IdmPermissions),

    // Navigation
    RouteChanged(Route),

    // Domain list
    PageChanged(Page),
    ListLoading {
        page: Page,
    },
    ListLoaded {
        page: Page,
        domains: Vec<Domain>,
        total: i64,
    },
    ListFailed {
        page: Page,
        message: String,
    },
    SortChanged(Option<(SortColumn, SortDirection)>),

    // Shared records
    DomainUpdated(Domain),
    DomainDeleted(DomainId),

    // Detail page
    EditingChanged(Option<Domain>),
    DetailLoaded(Domain),
    DetailLoadFailed {
        id: DomainId,
    },

    // Registration wizard
    WizardOpened,
    WizardTokenIssued(DomainRegToken),
    TokenRequestFailed {
        message: String,
    },
    VerificationStarted {
        run_id: VerifyRunId,
    },
    Verification {
        run_id: VerifyRunId,
        state: VerifyState,
        domain: Option<Domain>,
    },
    /// The run ended by itself; no further reports will follow.
    VerificationFinished {
        run_id: VerifyRunId,
    },
    VerificationStopped,
    WizardTitleChanged(String),
    WizardDescriptionChanged(String),
    WizardAutoJoinChanged(bool),
    WizardStepChanged(WizardStep),
    WizardClosed,
    ProvisionalDiscarding(DomainId),
    ProvisionalDiscarded(DomainId),

    // User-visible messages
    Notified(Notification),
    NotificationDismissed(String),
}
