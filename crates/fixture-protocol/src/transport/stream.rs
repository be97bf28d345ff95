//! Newline-delimited JSON over any byte stream
//!
//! One message per line. Blank lines are ignored and lines that are not
//! JSON are dropped with a debug log; the stream stays open.

use super::Transport;
use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{
    self, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream,
    ReadHalf, WriteHalf,
};

/// Stream transport over an in-memory duplex pipe
pub type DuplexTransport = StreamTransport<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

/// Line-framed JSON transport
#[derive(Debug)]
pub struct StreamTransport<R, W> {
    reader: BufReader<R>,
    writer: W,
    buf: Vec<u8>,
}

impl<R, W> StreamTransport<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            buf: Vec::new(),
        }
    }
}

impl DuplexTransport {
    /// Two ends of an in-memory pipe buffering up to `max_buf_size` bytes
    #[must_use]
    pub fn duplex(max_buf_size: usize) -> (Self, Self) {
        let (a, b) = io::duplex(max_buf_size);
        let (a_read, a_write) = io::split(a);
        let (b_read, b_write) = io::split(b);
        (Self::new(a_read, a_write), Self::new(b_read, b_write))
    }
}

#[async_trait]
impl<R, W> Transport for StreamTransport<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&mut self, message: Value) -> Result<(), TransportError> {
        let mut frame = serde_json::to_vec(&message)?;
        frame.push(b'\n');
        self.writer.write_all(&frame).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Value> {
        loop {
            // Partial lines stay in `buf` if this future is dropped.
            let eof = match self.reader.read_until(b'\n', &mut self.buf).await {
                Ok(n) => n == 0,
                Err(err) => {
                    tracing::warn!(error = %err, "transport read failed");
                    return None;
                }
            };
            if eof && self.buf.is_empty() {
                return None;
            }

            let line = std::mem::take(&mut self.buf);
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice(&line) {
                Ok(message) => return Some(message),
                Err(err) => {
                    tracing::debug!(error = %err, "dropping malformed frame");
                }
            }
        }
    }
}
