pub mod app_core;
mod async_runtime;
pub mod domain;
pub mod kernel;
pub mod notifications;
pub mod permissions;
pub mod ports;
pub mod verify;
pub mod viewmodel;
pub mod wizard;

pub use app_core::*;
pub use domain::{AppState, DomainListState, Route};
pub use kernel::AppKernel;
pub use notifications::{Notification, NotificationVariant};
pub use permissions::{Guard, IdmPermissions, Permission, PermissionsState};
pub use ports::*;
pub use verify::{PollerConfig, VerificationPoller, VerifyTransition};
pub use viewmodel::*;
pub use wizard::{VerifyRunId, WizardDraft, WizardGates, WizardStep};
