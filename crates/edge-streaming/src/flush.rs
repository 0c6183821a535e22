//! Explicit flush control over the response transport.

use std::fmt::Display;

use async_trait::async_trait;
use edge_core::{RenderMode, StreamError};
use futures::{Sink, SinkExt};

/// Flush policy for a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushPolicy {
    /// Flush after the shell and after each section.
    #[default]
    AfterEachSection,
    /// Only push bytes when the response is closed.
    AtEnd,
}

impl FlushPolicy {
    /// Policy that goes with a render mode.
    pub fn for_mode(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Streaming => Self::AfterEachSection,
            RenderMode::Buffered => Self::AtEnd,
        }
    }

    /// Check if should flush after shell and sections.
    pub fn flushes_incrementally(&self) -> bool {
        matches!(self, Self::AfterEachSection)
    }
}

/// Byte sink for a response body with an explicit flush.
///
/// Writes may be held back by the transport until `flush` or `close`.
#[async_trait]
pub trait Transport: Send {
    /// Append bytes to the response.
    async fn write(&mut self, bytes: &[u8]) -> Result<(), StreamError>;

    /// Push everything written so far onto the wire now.
    async fn flush(&mut self) -> Result<(), StreamError>;

    /// Push any remaining bytes and end the response.
    async fn close(&mut self) -> Result<(), StreamError>;

    /// Whether `flush` actually reaches the client.
    fn can_flush(&self) -> bool {
        true
    }
}

/// Transport over any `Sink<Vec<u8>>`, one sink item per flush.
///
/// Writes are buffered locally; `flush` sends the buffer as a single chunk.
pub struct SinkTransport<S> {
    inner: S,
    buffer: Vec<u8>,
}

impl<S> SinkTransport<S> {
    /// Wrap a sink.
    pub fn new(sink: S) -> Self {
        Self {
            inner: sink,
            buffer: Vec::new(),
        }
    }

    /// Bytes written but not yet flushed.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

#[async_trait]
impl<S, E> Transport for SinkTransport<S>
where
    S: Sink<Vec<u8>, Error = E> + Unpin + Send,
    E: Display + Send,
{
    async fn write(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), StreamError> {
        let chunk = std::mem::take(&mut self.buffer);
        if chunk.is_empty() {
            return self
                .inner
                .flush()
                .await
                .map_err(|e| StreamError::Transport(e.to_string()));
        }
        self.inner
            .send(chunk)
            .await
            .map_err(|e| StreamError::Transport(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), StreamError> {
        let chunk = std::mem::take(&mut self.buffer);
        if !chunk.is_empty() {
            self.inner
                .feed(chunk)
                .await
                .map_err(|e| StreamError::Transport(e.to_string()))?;
        }
        self.inner
            .close()
            .await
            .map_err(|e| StreamError::Transport(e.to_string()))
    }
}

/// Event recorded by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Bytes appended (length).
    Write(usize),
    /// Buffered bytes pushed out.
    Flush,
    /// Response ended.
    Close,
}

/// In-memory transport that records every operation.
#[derive(Debug)]
pub struct MemoryTransport {
    flush_capable: bool,
    closed: bool,
    pending: Vec<u8>,
    chunks: Vec<Vec<u8>>,
    events: Vec<TransportEvent>,
}

impl MemoryTransport {
    /// Create a flush-capable memory transport.
    pub fn new() -> Self {
        Self {
            flush_capable: true,
            closed: false,
            pending: Vec::new(),
            chunks: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Create a transport that cannot flush (e.g. behind a buffering proxy).
    pub fn without_flush() -> Self {
        Self {
            flush_capable: false,
            ..Self::new()
        }
    }

    /// Everything recorded, in order.
    pub fn events(&self) -> &[TransportEvent] {
        &self.events
    }

    /// Number of explicit flushes.
    pub fn flush_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| **e == TransportEvent::Flush)
            .count()
    }

    /// Chunks as the client would receive them.
    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    /// Bytes the client has received so far.
    pub fn delivered(&self) -> Vec<u8> {
        self.chunks.concat()
    }

    /// Delivered bytes as text.
    pub fn delivered_string(&self) -> String {
        String::from_utf8_lossy(&self.delivered()).into_owned()
    }

    /// Whether the response was closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::Transport("transport closed".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        self.ensure_open()?;
        self.pending.extend_from_slice(bytes);
        self.events.push(TransportEvent::Write(bytes.len()));
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), StreamError> {
        self.ensure_open()?;
        if !self.flush_capable {
            return Err(StreamError::TransportUnsupported);
        }
        if !self.pending.is_empty() {
            self.chunks.push(std::mem::take(&mut self.pending));
        }
        self.events.push(TransportEvent::Flush);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StreamError> {
        self.ensure_open()?;
        if !self.pending.is_empty() {
            self.chunks.push(std::mem::take(&mut self.pending));
        }
        self.closed = true;
        self.events.push(TransportEvent::Close);
        Ok(())
    }

    fn can_flush(&self) -> bool {
        self.flush_capable
    }
}
