//! Error types for the Trello Airdrop snap-in
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the snap-in
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Input Validation Errors
    // ============================================================================
    #[error("No events provided")]
    NoEvents,

    #[error("Invalid event: missing {field}")]
    MissingField { field: String },

    #[error("Invalid event: {message}")]
    InvalidEvent { message: String },

    #[error("Invalid key format. Expected format: \"key=<api_key>&token=<token>\"")]
    InvalidKeyFormat,

    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },

    // ============================================================================
    // Upstream HTTP Errors
    // ============================================================================
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        status: u16,
        api_delay: u64,
        message: String,
    },

    /// The request went out but no response ever came back.
    #[error("No response received: {message}")]
    NoResponse { message: String },

    /// The request could not even be constructed or sent.
    #[error("Request setup failed: {message}")]
    RequestSetup { message: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Worker Errors
    // ============================================================================
    #[error("Callback emit failed: {message}")]
    CallbackEmit { message: String },

    // ============================================================================
    // Serialization / IO Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("State error: {message}")]
    State { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a missing-field validation error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a generic validation error
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            message: message.into(),
        }
    }

    /// Create an HTTP status error without a rate-limit delay
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            api_delay: 0,
            message: message.into(),
        }
    }

    /// Create a no-response error
    pub fn no_response(message: impl Into<String>) -> Self {
        Self::NoResponse {
            message: message.into(),
        }
    }

    /// Create a request-setup error
    pub fn request_setup(message: impl Into<String>) -> Self {
        Self::RequestSetup {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create a callback emit error
    pub fn callback(message: impl Into<String>) -> Self {
        Self::CallbackEmit {
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Seconds the upstream asked us to back off, 0 when not rate limited
    pub fn api_delay(&self) -> u64 {
        match self {
            Error::HttpStatus { api_delay, .. } => *api_delay,
            Error::RateLimited {
                retry_after_seconds,
            } => *retry_after_seconds,
            _ => 0,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::NoResponse { .. } | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for the snap-in
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
