//! Error types for the movie registry
//!
//! Request-level variants map onto HTTP status codes; startup variants
//! terminate the process.

use hyper::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    /// No movie with this id exists
    #[error("movie not found: {0}")]
    NotFound(String),

    /// Request body could not be read or decoded
    #[error("invalid request body: {0}")]
    Decode(String),

    /// Request body exceeded `http.max_body_size`
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    /// Listener could not be created or bound
    #[error("failed to listen: {0}")]
    Listen(String),

    #[error("invalid server address: {0}")]
    InvalidAddress(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

impl RegistryError {
    /// HTTP status a request-level error is reported with
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Listen(_) | Self::InvalidAddress(_) | Self::Config(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body describing the error to the client
    pub fn to_body(&self) -> serde_json::Value {
        match self {
            Self::NotFound(id) => serde_json::json!({
                "error": "movie not found",
                "id": id,
            }),
            Self::Decode(detail) => serde_json::json!({
                "error": "invalid request body",
                "detail": detail,
            }),
            Self::PayloadTooLarge { limit } => serde_json::json!({
                "error": "payload too large",
                "limit": limit,
            }),
            _ => serde_json::json!({ "error": "internal server error" }),
        }
    }
}
