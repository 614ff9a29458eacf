use thiserror::Error;

/// Result type alias for soawatch operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Errors that can occur while monitoring zones
#[derive(Error, Debug)]
pub enum WatchError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Remote endpoint answered with a non-success status
    #[error("HTTP status {code}: {message}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Request timed out
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Resolver answered with a DNS error status (NXDOMAIN, SERVFAIL, ...)
    #[error("DNS response status {0}")]
    DnsStatus(u32),

    /// Resolver answered but carried no SOA record
    #[error("no SOA record in response for {0}")]
    NoSoa(String),

    /// SOA text could not be parsed
    #[error("malformed SOA record: {0}")]
    MalformedSoa(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable store read or write failed
    #[error("store error: {0}")]
    Store(String),

    /// A notification channel is enabled but cannot be used
    #[error("channel {channel} not configured: {reason}")]
    ChannelNotConfigured {
        /// Channel name
        channel: String,
        /// What is missing
        reason: String,
    },

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl WatchError {
    /// Returns true if repeating the operation may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) | Self::Store(_) => true,
            Self::Status { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }

    /// Returns the HTTP status code if the remote answered with one
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}
