//! In-process transport over bounded mpsc channels

use super::Transport;
use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

/// One end of an in-process channel pair
#[derive(Debug)]
pub struct ChannelTransport {
    tx: mpsc::Sender<Value>,
    rx: mpsc::Receiver<Value>,
}

impl ChannelTransport {
    /// Two connected ends, each direction buffering `capacity` messages
    #[must_use]
    pub fn pair(capacity: usize) -> (Self, Self) {
        Self::pair_with(capacity, capacity)
    }

    /// Two connected ends with separate capacities per direction
    ///
    /// `forward` bounds messages from the first end to the second,
    /// `backward` the reverse.
    #[must_use]
    pub fn pair_with(forward: usize, backward: usize) -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::channel(forward);
        let (b_tx, a_rx) = mpsc::channel(backward);
        (
            Self { tx: a_tx, rx: a_rx },
            Self { tx: b_tx, rx: b_rx },
        )
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&mut self, message: Value) -> Result<(), TransportError> {
        self.tx
            .send(message)
            .await
            .map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> Option<Value> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn messages_cross_in_order() {
        let (mut left, mut right) = ChannelTransport::pair(4);
        left.send(json!({ "n": 1 })).await.unwrap();
        left.send(json!({ "n": 2 })).await.unwrap();

        assert_eq!(right.recv().await, Some(json!({ "n": 1 })));
        assert_eq!(right.recv().await, Some(json!({ "n": 2 })));

        right.send(json!("back")).await.unwrap();
        assert_eq!(left.recv().await, Some(json!("back")));
    }

    #[tokio::test]
    async fn dropped_peer_closes() {
        let (mut left, right) = ChannelTransport::pair(4);
        drop(right);

        assert!(matches!(
            left.send(json!(1)).await,
            Err(TransportError::Closed)
        ));
        assert_eq!(left.recv().await, None);
    }
}
