//! Error types for the inkmath domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type.
//!
//! The taxonomy mirrors the service contract: request-validation failures
//! never reach the generator, generator failures surface as a service-level
//! error, and an unparseable response from a *successful* generation is not
//! an error at all — the normalizer absorbs it into a sentinel record.

use thiserror::Error;

/// The top-level error type for all inkmath operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Request validation errors ---
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    // --- Upstream generation errors ---
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A malformed inbound request. Maps to a 4xx response; the generator is
/// never invoked for these.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    #[error("Data URI has no base64 payload (missing comma separator)")]
    MissingPayload,

    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(String),

    #[error("Image bytes could not be decoded: {0}")]
    UndecodableImage(String),
}

/// A failure of the external generative-model call itself. Maps to a 5xx
/// response; deliberately not retried (a single attempt per request is the
/// documented behavior).
#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by generator, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Generator returned no usable text")]
    EmptyResponse,

    #[error("Generator not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}
