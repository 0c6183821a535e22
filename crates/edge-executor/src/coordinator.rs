//! Page coordination: shell first, then sections in document order.

use edge_core::{LifecyclePhase, RenderMode, StreamError};
use edge_observability::{MetricsCollector, RequestMetrics, StructuredLogger};
use edge_streaming::{
    wrap_filled, FlushPolicy, Section, SectionId, Shell, StreamingSink, Transport,
};

use crate::bound::PageSection;
use crate::progress::SectionProgress;

/// Outcome of a completed page.
#[derive(Debug, Clone)]
pub struct RenderReport {
    /// Mode the page was delivered in.
    pub mode: RenderMode,
    /// Sections in the order they were written.
    pub sections: Vec<SectionId>,
    /// Explicit flushes issued.
    pub flushes: usize,
    /// Body bytes written.
    pub bytes: usize,
    /// Timing metrics.
    pub metrics: RequestMetrics,
}

/// Coordinates one page response.
///
/// In streaming mode the shell goes out first with a placeholder per
/// section. Sections are then awaited strictly in document order: a section
/// that finishes early waits for the ones before it, and a slow section
/// never holds up the ones before it. Each section is flushed as soon as it
/// is written.
///
/// In buffered mode nothing is written until every section is ready.
///
/// Bytes already flushed cannot be taken back. If a section fails, nothing
/// more is written (not even the closing markup) and the client sees a
/// truncated page.
pub struct StreamCoordinator {
    shell: Shell,
    sections: Vec<Box<dyn PageSection>>,
    mode: RenderMode,
    progress: SectionProgress,
    phase: LifecyclePhase,
    ran: bool,
}

impl StreamCoordinator {
    /// Create a coordinator with no sections.
    pub fn new(shell: Shell, mode: RenderMode) -> Self {
        Self {
            shell,
            sections: Vec::new(),
            mode,
            progress: SectionProgress::new(),
            phase: LifecyclePhase::Start,
            ran: false,
        }
    }

    /// Append a section. Document order is the order sections are added.
    pub fn add_section(&mut self, section: Box<dyn PageSection>) -> Result<(), StreamError> {
        let id = section.section().id.clone();
        if self.progress.contains(&id) {
            return Err(StreamError::DuplicateSection(id.to_string()));
        }

        self.progress.push(id);
        self.sections.push(section);
        Ok(())
    }

    /// Append several sections in order.
    pub fn with_sections(
        mut self,
        sections: impl IntoIterator<Item = Box<dyn PageSection>>,
    ) -> Result<Self, StreamError> {
        for section in sections {
            self.add_section(section)?;
        }
        Ok(self)
    }

    /// Section definitions in document order.
    pub fn sections(&self) -> Vec<Section> {
        self.sections.iter().map(|s| s.section().clone()).collect()
    }

    /// Per-section progress.
    pub fn progress(&self) -> &SectionProgress {
        &self.progress
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> &LifecyclePhase {
        &self.phase
    }

    /// Delivery mode.
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Check the transport can carry this page before writing anything.
    ///
    /// Streaming needs a transport whose flush reaches the client. Falling
    /// back to buffered delivery silently is not an option.
    pub fn preflight<T: Transport + ?Sized>(&self, transport: &T) -> Result<(), StreamError> {
        if self.mode == RenderMode::Streaming && !transport.can_flush() {
            return Err(StreamError::TransportUnsupported);
        }
        Ok(())
    }

    /// Deliver the page over `transport`.
    ///
    /// A coordinator runs once.
    pub async fn run<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        logger: &StructuredLogger,
    ) -> Result<RenderReport, StreamError> {
        if self.ran {
            return Err(StreamError::AlreadyCompleted);
        }
        self.ran = true;

        let mut metrics = MetricsCollector::new(logger.request_id().clone(), self.mode);
        let result = match self.mode {
            RenderMode::Streaming => self.stream(transport, logger, &mut metrics).await,
            RenderMode::Buffered => self.buffer(transport, &mut metrics).await,
        };

        match result {
            Ok((flushes, bytes)) => {
                let metrics = metrics.finalize();
                logger
                    .info_builder("Page complete")
                    .field("mode", self.mode.as_str())
                    .field_u64("sections", self.sections.len() as u64)
                    .field_u64("flushes", flushes as u64)
                    .field_u64("bytes", bytes as u64)
                    .duration_ms(
                        "time_to_last_byte_ms",
                        metrics.time_to_last_byte().unwrap_or_default(),
                    )
                    .emit();

                Ok(RenderReport {
                    mode: self.mode,
                    sections: self.progress.flushed(),
                    flushes,
                    bytes,
                    metrics,
                })
            }
            Err(e) => {
                let flushed = self.progress.flushed();
                logger
                    .error_builder("Page aborted")
                    .field("error", e.to_string())
                    .field_u64("sections_flushed", flushed.len() as u64)
                    .field_bool("partial", !matches!(self.phase, LifecyclePhase::Start))
                    .emit();
                self.phase = LifecyclePhase::Error(e.to_string());
                Err(e)
            }
        }
    }

    async fn stream<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        logger: &StructuredLogger,
        metrics: &mut MetricsCollector,
    ) -> Result<(usize, usize), StreamError> {
        self.preflight(transport)?;

        let opening = self.shell.render_opening(&self.sections());
        let mut sink = StreamingSink::new(transport, FlushPolicy::AfterEachSection);

        sink.send_shell(&opening).await?;
        metrics.record_shell_sent(opening.len());
        self.phase = sink.phase();

        for section in self.sections.iter_mut() {
            let id = section.section().id.clone();

            section.resolve().await?;
            self.progress.load(&id)?;
            metrics.record_section_loaded(id.as_str());

            let html = wrap_filled(&id, &section.render()?);
            self.progress.check_flush(&id)?;
            sink.send_section(&id, &html).await?;
            metrics.record_section_sent(id.as_str(), html.len(), true);
            self.progress.flush(&id)?;

            logger
                .debug_builder("Section flushed")
                .section(id.as_str())
                .field_u64("bytes", html.len() as u64)
                .emit();
            self.phase = sink.phase();
        }

        let closing = self.shell.render_closing();
        sink.complete(&closing).await?;
        metrics.record_complete(closing.len());
        self.phase = sink.phase();

        Ok((sink.flush_count(), sink.bytes_written()))
    }

    async fn buffer<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        metrics: &mut MetricsCollector,
    ) -> Result<(usize, usize), StreamError> {
        self.preflight(transport)?;

        // Producers are already running, so waiting in document order costs
        // the slowest producer, not the sum.
        for section in self.sections.iter_mut() {
            let id = section.section().id.clone();
            section.resolve().await?;
            self.progress.load(&id)?;
            metrics.record_section_loaded(id.as_str());
        }

        let document = {
            let mut rendered = Vec::with_capacity(self.sections.len());
            for section in &self.sections {
                rendered.push((section.section(), section.render()?));
            }
            self.shell.render_document(&rendered)
        };

        let mut sink = StreamingSink::new(transport, FlushPolicy::AtEnd);
        sink.send_document(&document).await?;
        metrics.record_document_sent(document.len());
        metrics.record_complete(0);

        for section in &self.sections {
            self.progress.flush(&section.section().id)?;
        }
        self.phase = sink.phase();

        Ok((sink.flush_count(), sink.bytes_written()))
    }
}
