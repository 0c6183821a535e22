//! Sections bound to a payload source and a renderer.

use std::sync::Arc;

use async_trait::async_trait;
use edge_core::{RenderError, StreamError};
use edge_data::{FutureError, SectionFuture};
use edge_streaming::Section;

use crate::render::SectionRenderer;

/// Where a section's payload comes from.
///
/// The same renderer serves both delivery modes; only the source differs.
pub enum PayloadSource<T> {
    /// The payload is already available.
    Ready(Arc<T>),
    /// The payload arrives from a producer.
    Pending(SectionFuture<T>),
}

impl<T> PayloadSource<T> {
    /// Source with a value available now.
    pub fn ready(value: T) -> Self {
        Self::Ready(Arc::new(value))
    }

    /// Wait for the payload.
    pub async fn resolve(&mut self) -> Result<Arc<T>, FutureError> {
        match self {
            Self::Ready(value) => Ok(Arc::clone(value)),
            Self::Pending(future) => future.read().await,
        }
    }
}

impl<T> From<SectionFuture<T>> for PayloadSource<T> {
    fn from(future: SectionFuture<T>) -> Self {
        Self::Pending(future)
    }
}

/// A page section the coordinator can wait on and render, whatever its
/// payload type.
#[async_trait]
pub trait PageSection: Send {
    /// Section definition.
    fn section(&self) -> &Section;

    /// Wait for the payload. This is the only suspension point per section.
    async fn resolve(&mut self) -> Result<(), StreamError>;

    /// Render the resolved payload.
    fn render(&self) -> Result<String, StreamError>;
}

/// A section, its payload source and its renderer.
pub struct BoundSection<R: SectionRenderer> {
    section: Section,
    source: PayloadSource<R::Payload>,
    renderer: Arc<R>,
    payload: Option<Arc<R::Payload>>,
}

impl<R: SectionRenderer> BoundSection<R> {
    /// Bind a section to its source and renderer.
    pub fn new(
        section: Section,
        source: impl Into<PayloadSource<R::Payload>>,
        renderer: Arc<R>,
    ) -> Self {
        Self {
            section,
            source: source.into(),
            renderer,
            payload: None,
        }
    }

    /// Box for the coordinator.
    pub fn boxed(self) -> Box<dyn PageSection>
    where
        R: 'static,
    {
        Box::new(self)
    }
}

#[async_trait]
impl<R> PageSection for BoundSection<R>
where
    R: SectionRenderer + 'static,
{
    fn section(&self) -> &Section {
        &self.section
    }

    async fn resolve(&mut self) -> Result<(), StreamError> {
        if self.payload.is_some() {
            return Ok(());
        }

        let payload = self
            .source
            .resolve()
            .await
            .map_err(|_| StreamError::ProducerAbandoned(self.section.id.to_string()))?;
        self.payload = Some(payload);
        Ok(())
    }

    fn render(&self) -> Result<String, StreamError> {
        let payload = self
            .payload
            .as_deref()
            .ok_or_else(|| StreamError::render(self.section.id.as_str(), RenderError::NotLoaded))?;

        self.renderer
            .render(payload)
            .map_err(|e| StreamError::render(self.section.id.as_str(), e))
    }
}
