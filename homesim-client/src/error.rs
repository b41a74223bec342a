use homesim_api::models::{FieldErrors, Id};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// Transport failure: connection refused, timeout, broken body
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The backend answered with a non-success envelope
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        errors: FieldErrors,
    },

    #[error("Malformed response: {0}")]
    Decode(String),

    /// A precondition checked before any request is sent
    #[error("{0}")]
    Validation(String),

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: Id },

    #[error("Preset has no devices")]
    EmptyPreset,

    #[error("Request cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            errors: FieldErrors::new(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClientError::NotFound { .. } | ClientError::Api { status: 404, .. }
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
