//! Transports
//!
//! Any reliable, order-preserving channel can carry the protocol. Messages
//! cross the transport as raw JSON values; decoding into [`Command`] or
//! [`Event`] happens at the receiving end so malformed traffic can be
//! dropped there without tearing down the connection.
//!
//! [`Command`]: crate::Command
//! [`Event`]: crate::Event

mod channel;
mod stream;

pub use channel::ChannelTransport;
pub use stream::{DuplexTransport, StreamTransport};

use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;

/// One end of a bidirectional message channel
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send one message
    ///
    /// # Errors
    /// `TransportError::Closed` once the other side is gone, or an I/O error
    async fn send(&mut self, message: Value) -> Result<(), TransportError>;

    /// Next message, or `None` once the channel is closed
    ///
    /// Must be cancellation safe: dropping the future before it completes
    /// loses no message.
    async fn recv(&mut self) -> Option<Value>;
}

/// Type-erased transport, for picking a transport at runtime
pub type BoxTransport = Box<dyn Transport>;

#[async_trait]
impl Transport for Box<dyn Transport> {
    async fn send(&mut self, message: Value) -> Result<(), TransportError> {
        (**self).send(message).await
    }

    async fn recv(&mut self) -> Option<Value> {
        (**self).recv().await
    }
}
