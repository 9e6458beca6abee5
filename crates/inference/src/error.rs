//! Errors from the collaborator service layer.

/// Errors from calling one of the inference collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("Service unavailable: request timed out")]
    Timeout,

    /// The service returned a non-2xx status code.
    #[error("Service error ({status}): {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// `detail` field of the error body, or the raw body.
        detail: String,
    },

    /// The service refused the request with a human-readable reason.
    #[error("{0}")]
    Rejected(String),

    /// A success response whose payload breaks the contract.
    #[error("Invalid service response: {0}")]
    InvalidResponse(String),

    /// The upload was refused before any request was made.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
}

impl ServiceError {
    /// Map a transport error, singling out timeouts.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err)
        }
    }

    /// Map an error raised while reading a success body. Undecodable
    /// payloads become `InvalidResponse`.
    pub fn from_body(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::from_transport(err)
        }
    }

    /// Human-readable reason supplied by the service, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => Some(detail),
            Self::Rejected(detail) => Some(detail),
            _ => None,
        }
    }
}
