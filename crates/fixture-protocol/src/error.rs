//! Error types for the wire protocol

/// Errors decoding a message envelope
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The message has no string `type` field
    #[error("message has no type")]
    MissingType,

    /// The `type` is not one this side understands
    #[error("unknown message type '{0}'")]
    UnknownType(String),

    /// The payload does not match the declared type
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors moving messages across a transport
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The other side hung up
    #[error("transport closed")]
    Closed,

    /// Underlying stream failure
    #[error("transport i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Message could not be encoded
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}
