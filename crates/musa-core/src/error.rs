//! Assistant API error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Could not reach the assistant API: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Assistant API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Could not decode assistant response: {0}")]
    Decode(String),

    #[error("Invalid assistant API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// True when the request never got an HTTP answer at all
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
