//! Core error types for packwatch-core

use thiserror::Error;

/// Errors surfaced by the check cycle collaborators
///
/// None of these end the process; the checker logs them and records the
/// outcome in the persisted state.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Release source could not be queried or returned nothing usable
    #[error("release source query failed: {0}")]
    SourceQuery(String),

    /// A notification sink failed to deliver
    #[error("{sink} notification failed: {message}")]
    Sink {
        /// Sink name
        sink: &'static str,
        /// Failure detail
        message: String,
    },

    /// State file could not be written
    #[error("state store error: {0}")]
    State(String),
}

impl CoreError {
    /// Build a sink failure
    pub fn sink(sink: &'static str, err: impl std::fmt::Display) -> Self {
        CoreError::Sink {
            sink,
            message: err.to_string(),
        }
    }
}
