//! Error types for requeue-redis
//!
//! Provides a unified error type for all proxy operations.

use thiserror::Error;

/// Result type alias using ProxyError
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Unified error type for proxy operations
#[derive(Debug, Error)]
pub enum ProxyError {
    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    /// Transient failure to reach or talk to the server. Handled internally
    /// by the reconnect loop unless the proxy runs in fail-fast mode.
    #[error("error communicating with redis: {0}")]
    Connection(String),

    /// A reconnect sequence used up its whole retry budget. Terminal: the
    /// connection stays down and the process must be restarted.
    #[error("reconnect gave up after {attempts} attempts: {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },

    // -------------------------------------------------------------------------
    // Address Errors
    // -------------------------------------------------------------------------
    #[error("invalid server address '{input}': {reason}")]
    InvalidEndpoint { input: String, reason: String },
}
