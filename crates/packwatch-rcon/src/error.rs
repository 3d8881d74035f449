//! Error types for packwatch-rcon

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during a console exchange
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RconError {
    /// Failed to connect to the console port
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Password rejected by the server
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Malformed or truncated frame
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Whole exchange exceeded its deadline
    #[error("console exchange timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// I/O error on the socket
    #[error("I/O error: {0}")]
    IoError(String),

    /// Client is missing required settings
    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

impl RconError {
    pub(crate) fn protocol(message: &str) -> Self {
        RconError::Protocol(message.to_string())
    }
}

impl From<std::io::Error> for RconError {
    fn from(err: std::io::Error) -> Self {
        RconError::IoError(err.to_string())
    }
}
