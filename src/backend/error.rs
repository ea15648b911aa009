//! Backend client error types

use thiserror::Error;

/// Errors from calls to the shop backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Backend timeout")]
    Timeout,

    #[error("Backend unavailable")]
    Unavailable,

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Classify a transport error the way the rest of the client expects
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_connect() {
            BackendError::Unavailable
        } else {
            BackendError::Request(err)
        }
    }

    /// Message suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Timeout | BackendError::Unavailable | BackendError::Request(_) => {
                "Der Server ist gerade nicht erreichbar. Bitte versuche es später erneut.".to_string()
            }
            BackendError::Unauthorized => "Bitte melde dich an.".to_string(),
            BackendError::NotFound(_) => "Nicht gefunden.".to_string(),
            BackendError::Api { message, .. } => message.clone(),
            BackendError::Decode(_) => "Unerwartete Antwort vom Server.".to_string(),
        }
    }
}

/// Result type for backend calls
pub type BackendResult<T> = Result<T, BackendError>;
