//! Error handling for onsetd.
//!
//! Four categories: configuration (fatal, before readiness), request
//! (recoverable per chunk), protocol (recoverable per line), and I/O.
//! Trace write failures are deliberately not represented here; the trace
//! recorder logs and swallows them so diagnostics can never fail a chunk.

use thiserror::Error;

/// Result type alias for onsetd operations
pub type Result<T> = std::result::Result<T, OnsetError>;

/// Main error type for onsetd operations
#[derive(Error, Debug)]
pub enum OnsetError {
    /// Invalid startup parameters. Fatal: the pipeline never signals ready.
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    /// Malformed chunk request (wrong length, non-finite sample).
    /// Recoverable: the pipeline stays ready for the next request.
    #[error("Invalid chunk request: {reason}")]
    Request { reason: String },

    /// Unparseable request or directive line.
    /// Recoverable: the pipeline stays ready for the next line.
    #[error("Protocol error: {reason}")]
    Protocol { reason: String },

    /// Pipeline asked to process after shutdown.
    #[error("Pipeline is terminated")]
    Terminated,

    /// I/O error on the protocol channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error on a protocol record.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OnsetError {
    /// Stable error code, used in protocol error responses so callers can
    /// branch without parsing message text.
    pub fn error_code(&self) -> &'static str {
        match self {
            OnsetError::Config { .. } => "CONFIG_ERROR",
            OnsetError::Request { .. } => "REQUEST_ERROR",
            OnsetError::Protocol { .. } => "PROTOCOL_ERROR",
            OnsetError::Terminated => "TERMINATED",
            OnsetError::Io(_) => "IO_ERROR",
            OnsetError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether the pipeline remains usable after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OnsetError::Request { .. } | OnsetError::Protocol { .. }
        )
    }
}
