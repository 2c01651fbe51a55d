/// Failure of a single backend call.
///
/// Transport failures are flattened into coarse variants so that callers can
/// classify them without depending on the HTTP client crate.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("too many redirects: {0}")]
    Redirect(String),
    #[error("invalid request options: {0}")]
    Builder(String),
    #[error("request cancelled")]
    Cancelled,
    #[error("response could not be decoded: {0}")]
    Decode(String),
    #[error("request failed: {0}")]
    Request(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 404 and other "not there yet" answers.
    NotFound,
    /// 410: the record is definitively gone.
    Gone,
    /// 400, 401, 403: the probe itself is wrong or not allowed.
    Rejected,
    /// Remaining 4xx answers.
    Client,
    /// 5xx answers.
    Server,
    Timeout,
    Network,
    Redirect,
    BadOption,
    Cancelled,
    BadResponse,
}

impl ApiErrorKind {
    /// Answers a later probe cannot change: the probe itself is refused, or
    /// the record is gone for good.
    pub fn is_definitive(self) -> bool {
        matches!(self, ApiErrorKind::Rejected | ApiErrorKind::Gone)
    }
}

impl ApiError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Status { status, .. } => match *status {
                404 => ApiErrorKind::NotFound,
                410 => ApiErrorKind::Gone,
                400 | 401 | 403 => ApiErrorKind::Rejected,
                400..=499 => ApiErrorKind::Client,
                _ => ApiErrorKind::Server,
            },
            ApiError::Timeout(_) => ApiErrorKind::Timeout,
            ApiError::Connect(_) => ApiErrorKind::Network,
            ApiError::Redirect(_) => ApiErrorKind::Redirect,
            ApiError::Builder(_) => ApiErrorKind::BadOption,
            ApiError::Cancelled => ApiErrorKind::Cancelled,
            ApiError::Decode(_) => ApiErrorKind::BadResponse,
            ApiError::Request(_) => ApiErrorKind::Network,
        }
    }

    /// Delete calls treat a missing record as already deleted.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), ApiErrorKind::NotFound | ApiErrorKind::Gone)
    }
}
