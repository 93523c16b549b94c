//! Client error taxonomy.
//!
//! Every fallible client operation returns [`ClientError`]. Network
//! operations are never retried internally; the caller decides whether to
//! reconnect.

use crate::robot::model::Model;
use thiserror::Error;

/// Error types for sample changer client operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    /// Socket setup or I/O failure. The connection is down until reconnected.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The reply does not echo the command that was sent.
    #[error("Answer is not the one expected. Cmd: {sent} Ans: {received}")]
    Protocol { sent: String, received: String },

    /// A status poll could not complete.
    #[error("Status unavailable: {0}")]
    StatusUnavailable(String),

    /// The operation does not exist on the active controller model.
    #[error("Operation '{operation}' is not supported on {model}")]
    UnsupportedOperation { operation: String, model: Model },

    /// Reconnection kept failing for longer than the configured timeout.
    #[error("Could not reconnect within {elapsed_secs}s")]
    ReconnectTimeout { elapsed_secs: u64 },

    /// An argument is outside the range accepted by the active model.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A request was issued while disconnected.
    #[error("Not connected")]
    NotConnected,

    /// `poll` was called while another poll was still running.
    #[error("A status poll is already in progress")]
    PollInProgress,

    /// The model cannot change while the client is connected.
    #[error("Model cannot be changed while connected")]
    ModelLocked,
}

impl ClientError {
    /// Whether the error means the link to the controller is gone.
    pub fn is_connection_loss(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::StatusUnavailable(_) | Self::NotConnected
        )
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        Self::Connection(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_shows_both_sides() {
        let err = ClientError::Protocol {
            sent: "home(2,0,0)".to_string(),
            received: "state(1,0)".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("home(2,0,0)"));
        assert!(text.contains("state(1,0)"));
    }

    #[test]
    fn unsupported_operation_names_model() {
        let err = ClientError::UnsupportedOperation {
            operation: "transfer".to_string(),
            model: Model::Isara2,
        };
        assert_eq!(
            err.to_string(),
            "Operation 'transfer' is not supported on ISARA2"
        );
    }

    #[test]
    fn connection_loss_classification() {
        assert!(ClientError::NotConnected.is_connection_loss());
        assert!(ClientError::StatusUnavailable("x".into()).is_connection_loss());
        assert!(!ClientError::PollInProgress.is_connection_loss());
        assert!(!ClientError::InvalidArgument("tool".into()).is_connection_loss());
    }
}
