//! Shared error type across tsgate crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// Datastore unreachable (connect, timeout, broken connection).
    Network,
    /// Datastore answered with an error.
    Upstream,
    /// Invalid or incomplete configuration.
    Config,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Network => "NETWORK",
            ClientCode::Upstream => "UPSTREAM",
            ClientCode::Config => "CONFIG",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TsGateError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum TsGateError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("bad request: invalid timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("{0}")]
    Transport(String),
    #[error("datastore returned {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl TsGateError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            TsGateError::BadRequest(_) | TsGateError::InvalidTimestamp(_) => ClientCode::BadRequest,
            TsGateError::Transport(_) => ClientCode::Network,
            TsGateError::Remote { .. } | TsGateError::Decode(_) => ClientCode::Upstream,
            TsGateError::Config(_) => ClientCode::Config,
            TsGateError::Internal(_) => ClientCode::Internal,
        }
    }

    /// True for network-class failures (the request may never have reached the datastore).
    pub fn is_transport(&self) -> bool {
        matches!(self, TsGateError::Transport(_))
    }
}
