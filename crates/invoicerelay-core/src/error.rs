//! Shared error type across invoicerelay crates.

use thiserror::Error;

/// Stable error codes, usable in logs and by consumers matching on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// `connect` called while another attempt is pending.
    ConnectionInProgress,
    /// Socket failed to open or errored while open.
    Transport,
    /// Inbound frame is not a valid envelope.
    MalformedMessage,
    /// A registered listener failed during dispatch.
    ListenerFailure,
    /// `send` called while the channel is not open.
    SendWhileClosed,
    /// The client was permanently disconnected.
    Disconnected,
    /// Invalid configuration.
    Config,
    /// Unsupported config version.
    UnsupportedVersion,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ConnectionInProgress => "CONNECTION_IN_PROGRESS",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::MalformedMessage => "MALFORMED_MESSAGE",
            ErrorCode::ListenerFailure => "LISTENER_FAILURE",
            ErrorCode::SendWhileClosed => "SEND_WHILE_CLOSED",
            ErrorCode::Disconnected => "DISCONNECTED",
            ErrorCode::Config => "CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("connection already in progress")]
    ConnectionInProgress,
    #[error("transport: {0}")]
    Transport(String),
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    #[error("listener for {kind} failed: {reason}")]
    ListenerFailure { kind: String, reason: String },
    #[error("channel not open, dropped {kind}")]
    SendWhileClosed { kind: String },
    #[error("client disconnected")]
    Disconnected,
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
}

impl RelayError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            RelayError::ConnectionInProgress => ErrorCode::ConnectionInProgress,
            RelayError::Transport(_) => ErrorCode::Transport,
            RelayError::MalformedMessage(_) => ErrorCode::MalformedMessage,
            RelayError::ListenerFailure { .. } => ErrorCode::ListenerFailure,
            RelayError::SendWhileClosed { .. } => ErrorCode::SendWhileClosed,
            RelayError::Disconnected => ErrorCode::Disconnected,
            RelayError::Config(_) => ErrorCode::Config,
            RelayError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
        }
    }
}
