use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session expired, sign in again")]
    Unauthorized,
    #[error("you do not have permission to access this resource")]
    Forbidden,
    #[error("server error (status {status}), try again later")]
    Server { status: u16 },
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("connection error, check your network")]
    Connection(#[source] reqwest::Error),
    #[error("unreadable response from the server")]
    InvalidResponse(#[source] reqwest::Error),
}

impl ApiError {
    /// Response classification shared with the app-wide interceptor
    /// contract: 401 invalidates the session, 403 is a permission notice,
    /// 5xx a generic server notice, and any other rejection surfaces the
    /// server-provided message when there is one.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            s if s >= 500 => ApiError::Server { status: s },
            s => ApiError::Rejected {
                status: s,
                message: message.unwrap_or_else(|| "request rejected by the server".to_string()),
            },
        }
    }

    /// True when the failure means the stored session must be torn down.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
