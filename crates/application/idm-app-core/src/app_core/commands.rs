use idm_core::{DomainId, SortColumn, SortDirection};

use crate::domain::Route;
use crate::wizard::WizardStep;

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    // Boot
    LoadPermissions,

    // Navigation
    Navigate(Route),

    // Domain list
    LoadDomains,
    SetPage(u32),
    SetPerPage(u32),
    /// Sort by a column, flipping the direction when it is already active.
    SortBy(SortColumn),
    SetSort(Option<(SortColumn, SortDirection)>),
    ToggleAutoJoin(DomainId),
    DeleteDomain(DomainId),

    // Detail page
    OpenDetail(DomainId),
    SaveTitle { id: DomainId, title: String },
    SaveDescription { id: DomainId, description: String },
    SetAutoJoin { id: DomainId, enabled: bool },

    // Registration wizard
    OpenWizard,
    RequestToken,
    GoToStep(WizardStep),
    NextStep,
    PreviousStep,
    StartVerification,
    RetryVerification,
    StopVerification,
    ChangeTitle(String),
    ChangeDescription(String),
    ChangeAutoJoin(bool),
    CancelWizard,
    FinishWizard,

    // Notifications
    DismissNotification(String),
}
