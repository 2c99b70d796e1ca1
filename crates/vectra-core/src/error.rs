//! Error types for the VECTRA simulation

use thiserror::Error;

use crate::NodeId;

/// Core VECTRA errors
#[derive(Error, Debug)]
pub enum VectraError {
    // Clock errors
    #[error("Clock length mismatch: expected {expected} slots, got {actual}")]
    ClockLengthMismatch { expected: usize, actual: usize },

    // Wire errors
    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Unknown message tag: {0}")]
    UnknownMessageTag(u8),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    // Node errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(NodeId),

    #[error("Remote error: {0}")]
    RemoteError(String),

    #[error("Node is shutting down")]
    ShuttingDown,

    // Transport errors
    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Connection to {0} failed: {1}")]
    ConnectionFailed(NodeId, String),

    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),
}

/// Result type for VECTRA operations
pub type VectraResult<T> = Result<T, VectraError>;
