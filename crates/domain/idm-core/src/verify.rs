use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiErrorKind};

/// Progress of the out-of-band registration check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyState {
    #[default]
    Initial,
    Waiting,
    TimedOut,
    NotFound,
    Completed,
}

impl VerifyState {
    /// States a finished run can be left in. `timed-out` is also reported
    /// for network failures while polling goes on.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            VerifyState::TimedOut | VerifyState::NotFound | VerifyState::Completed
        )
    }

    /// States from which the user may start the check again.
    pub fn is_retriable(self) -> bool {
        matches!(
            self,
            VerifyState::Initial
                | VerifyState::TimedOut
                | VerifyState::NotFound
                | VerifyState::Completed
        )
    }

    /// Maps a failed probe onto the state the poller reports.
    ///
    /// 404 is the normal answer while the agent has not registered yet, so it
    /// and other non-fatal answers keep the poller waiting.
    pub fn from_probe_error(err: &ApiError) -> VerifyState {
        match err.kind() {
            ApiErrorKind::NotFound
            | ApiErrorKind::Client
            | ApiErrorKind::Server
            | ApiErrorKind::BadOption
            | ApiErrorKind::Cancelled
            | ApiErrorKind::BadResponse => VerifyState::Waiting,
            ApiErrorKind::Timeout
            | ApiErrorKind::Network
            | ApiErrorKind::Redirect
            | ApiErrorKind::Rejected => VerifyState::TimedOut,
            ApiErrorKind::Gone => VerifyState::NotFound,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VerifyState::Initial => "initial",
            VerifyState::Waiting => "waiting",
            VerifyState::TimedOut => "timed-out",
            VerifyState::NotFound => "not-found",
            VerifyState::Completed => "completed",
        }
    }
}

impl std::fmt::Display for VerifyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
