//! Error types for tinyrpc.

use std::time::Duration;

use thiserror::Error;

/// Main error type for all RPC operations.
///
/// Server-side variants are logged and end the connection without a
/// response payload. Client-side variants are recorded on the caller's
/// [`RpcController`](crate::RpcController) by
/// [`RpcChannel::call_method`](crate::RpcChannel::call_method).
#[derive(Debug, Error)]
pub enum RpcError {
    /// More bytes are needed before a frame can be decoded.
    #[error("Incomplete frame: need {needed} more bytes")]
    IncompleteFrame { needed: usize },

    /// Declared frame length exceeds the configured ceiling.
    #[error("Frame size {length} exceeds maximum {max}")]
    OversizedFrame { length: usize, max: u32 },

    /// Call envelope is malformed (bad header or argument length mismatch).
    #[error("Envelope decode error: {0}")]
    EnvelopeDecode(String),

    /// No service registered under this name.
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    /// Service exists but has no method with this name.
    #[error("Method not found: {service}.{method}")]
    MethodNotFound { service: String, method: String },

    /// Argument bytes could not be decoded into the method's request type.
    #[error("Argument decode error: {0}")]
    ArgumentDecode(String),

    /// Handler dropped its completion signal without running it.
    #[error("Handler for {service}.{method} dropped its completion signal")]
    HandlerAbandoned { service: String, method: String },

    /// TCP connection could not be established.
    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    /// Writing the request frame failed.
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Reading the response frame failed.
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// Response payload could not be decoded.
    #[error("Response decode error: {0}")]
    ResponseDecode(String),

    /// Peer closed the connection before a complete frame arrived.
    #[error("Connection closed before a complete response was received")]
    ConnectionClosedPrematurely,

    /// Connect or call deadline elapsed.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Discovery has no node at the given path.
    #[error("Discovery path not found: {0}")]
    DiscoveryNotFound(String),

    /// Other discovery failure.
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Missing or invalid configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),
}

impl RpcError {
    /// True for errors that mean "wait for more bytes" rather than failure.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, RpcError::IncompleteFrame { .. })
    }

    /// True for registry misses.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RpcError::ServiceNotFound(_) | RpcError::MethodNotFound { .. }
        )
    }
}

/// Result type alias using RpcError.
pub type Result<T> = std::result::Result<T, RpcError>;
