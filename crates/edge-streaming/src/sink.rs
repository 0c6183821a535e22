//! Shell-first streaming sink.

use edge_core::{LifecyclePhase, StreamError};

use crate::flush::{FlushPolicy, Transport};
use crate::section::SectionId;

/// State of the streaming sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    /// Initial state, nothing written.
    Initial,
    /// Shell has been sent, sections can be streamed.
    ShellSent,
    /// Response has been completed.
    Completed,
}

/// Sink that enforces the shell-first pattern over a [`Transport`].
///
/// With [`FlushPolicy::AfterEachSection`] every shell and section write is
/// followed by exactly one flush.
pub struct StreamingSink<'a, T: Transport + ?Sized> {
    inner: &'a mut T,
    policy: FlushPolicy,
    state: SinkState,
    last_section: Option<SectionId>,
    flushes: usize,
    bytes: usize,
}

impl<'a, T: Transport + ?Sized> StreamingSink<'a, T> {
    /// Create a new streaming sink.
    pub fn new(transport: &'a mut T, policy: FlushPolicy) -> Self {
        Self {
            inner: transport,
            policy,
            state: SinkState::Initial,
            last_section: None,
            flushes: 0,
            bytes: 0,
        }
    }

    async fn write(&mut self, html: &str) -> Result<(), StreamError> {
        self.inner.write(html.as_bytes()).await?;
        self.bytes += html.len();
        Ok(())
    }

    async fn flush_if_incremental(&mut self) -> Result<(), StreamError> {
        if self.policy.flushes_incrementally() {
            self.inner.flush().await?;
            self.flushes += 1;
        }
        Ok(())
    }

    /// Send the shell HTML. Must be called before any sections.
    pub async fn send_shell(&mut self, html: &str) -> Result<(), StreamError> {
        if self.state != SinkState::Initial {
            return Err(StreamError::AlreadyCompleted);
        }

        self.write(html).await?;
        self.flush_if_incremental().await?;
        self.state = SinkState::ShellSent;

        Ok(())
    }

    /// Send one rendered section. Shell must be sent first.
    pub async fn send_section(&mut self, id: &SectionId, html: &str) -> Result<(), StreamError> {
        match self.state {
            SinkState::Initial => return Err(StreamError::ShellNotSent),
            SinkState::Completed => return Err(StreamError::AlreadyCompleted),
            SinkState::ShellSent => {}
        }

        self.write(html).await?;
        self.flush_if_incremental().await?;
        self.last_section = Some(id.clone());

        Ok(())
    }

    /// Write the closing markup and end the response.
    pub async fn complete(&mut self, closing: &str) -> Result<(), StreamError> {
        match self.state {
            SinkState::Initial => return Err(StreamError::ShellNotSent),
            SinkState::Completed => return Err(StreamError::AlreadyCompleted),
            SinkState::ShellSent => {}
        }

        self.write(closing).await?;
        self.inner.close().await?;
        self.state = SinkState::Completed;
        Ok(())
    }

    /// Write a whole page in one go and end the response.
    pub async fn send_document(&mut self, html: &str) -> Result<(), StreamError> {
        if self.state != SinkState::Initial {
            return Err(StreamError::AlreadyCompleted);
        }

        self.write(html).await?;
        self.inner.close().await?;
        self.state = SinkState::Completed;
        Ok(())
    }

    /// Explicit flushes issued so far.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Bytes written so far.
    pub fn bytes_written(&self) -> usize {
        self.bytes
    }

    /// Get the current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        match (self.state, &self.last_section) {
            (SinkState::Initial, _) => LifecyclePhase::Start,
            (SinkState::ShellSent, None) => LifecyclePhase::ShellSent,
            (SinkState::ShellSent, Some(last)) => LifecyclePhase::SectionFlushed(last.to_string()),
            (SinkState::Completed, _) => LifecyclePhase::Completion,
        }
    }
}
