//! Per-request timing metrics.

use std::time::Duration;

use edge_core::{RenderMode, RequestId};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Metrics for a single page request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMetrics {
    /// Request ID for correlation.
    pub request_id: String,
    /// Delivery mode.
    pub mode: RenderMode,
    /// Time to shell flush (microseconds). Absent in buffered mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_shell_us: Option<u64>,
    /// Time to first section flush (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_first_section_us: Option<u64>,
    /// Time to the first body byte leaving the server (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_first_byte_us: Option<u64>,
    /// Time until the response was closed (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_last_byte_us: Option<u64>,
    /// Section timings, in the order the sections were emitted.
    pub sections: Vec<SectionMetrics>,
    /// Explicit flushes issued.
    pub flushes: usize,
    /// Body bytes written.
    pub bytes: usize,
}

/// Metrics for a single section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionMetrics {
    /// Section id.
    pub name: String,
    /// Time from request start until the payload was available (microseconds).
    pub loaded_us: u64,
    /// Time from request start until the markup was written (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_us: Option<u64>,
    /// Bytes of rendered markup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
}

#[derive(Debug)]
struct SectionMetricsBuilder {
    name: String,
    loaded: Instant,
    sent: Option<Instant>,
    bytes: Option<usize>,
}

/// Collector for request metrics.
#[derive(Debug)]
pub struct MetricsCollector {
    request_id: RequestId,
    mode: RenderMode,
    start: Instant,
    shell_sent: Option<Instant>,
    first_byte: Option<Instant>,
    first_section_sent: Option<Instant>,
    completed: Option<Instant>,
    sections: Vec<SectionMetricsBuilder>,
    flushes: usize,
    bytes: usize,
}

fn micros(d: Duration) -> u64 {
    d.as_micros() as u64
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new(request_id: RequestId, mode: RenderMode) -> Self {
        Self {
            request_id,
            mode,
            start: Instant::now(),
            shell_sent: None,
            first_byte: None,
            first_section_sent: None,
            completed: None,
            sections: Vec::new(),
            flushes: 0,
            bytes: 0,
        }
    }

    /// Record the shell flush.
    pub fn record_shell_sent(&mut self, bytes: usize) {
        let now = Instant::now();
        self.shell_sent = Some(now);
        self.first_byte.get_or_insert(now);
        self.bytes += bytes;
        self.flushes += 1;
    }

    /// Record that a section's payload became available to the writer.
    pub fn record_section_loaded(&mut self, name: &str) {
        self.sections.push(SectionMetricsBuilder {
            name: name.to_string(),
            loaded: Instant::now(),
            sent: None,
            bytes: None,
        });
    }

    /// Record a section's markup written and flushed.
    pub fn record_section_sent(&mut self, name: &str, bytes: usize, flushed: bool) {
        let now = Instant::now();
        self.first_section_sent.get_or_insert(now);
        self.first_byte.get_or_insert(now);
        self.bytes += bytes;
        if flushed {
            self.flushes += 1;
        }

        match self.sections.iter_mut().rev().find(|s| s.name == name) {
            Some(section) => {
                section.sent = Some(now);
                section.bytes = Some(bytes);
            }
            None => self.sections.push(SectionMetricsBuilder {
                name: name.to_string(),
                loaded: now,
                sent: Some(now),
                bytes: Some(bytes),
            }),
        }
    }

    /// Record the whole page written at once (buffered mode).
    pub fn record_document_sent(&mut self, bytes: usize) {
        let now = Instant::now();
        self.first_byte.get_or_insert(now);
        self.bytes += bytes;
        for section in &mut self.sections {
            section.sent.get_or_insert(now);
        }
    }

    /// Record trailing bytes (closing markup) and the end of the response.
    pub fn record_complete(&mut self, trailing_bytes: usize) {
        self.bytes += trailing_bytes;
        self.completed = Some(Instant::now());
    }

    /// Finalize and return the metrics.
    pub fn finalize(self) -> RequestMetrics {
        let start = self.start;
        let since = |t: Instant| micros(t.duration_since(start));

        RequestMetrics {
            request_id: self.request_id.to_string(),
            mode: self.mode,
            time_to_shell_us: self.shell_sent.map(since),
            time_to_first_section_us: self.first_section_sent.map(since),
            time_to_first_byte_us: self.first_byte.map(since),
            time_to_last_byte_us: self.completed.map(since),
            sections: self
                .sections
                .iter()
                .map(|s| SectionMetrics {
                    name: s.name.clone(),
                    loaded_us: since(s.loaded),
                    sent_us: s.sent.map(since),
                    bytes: s.bytes,
                })
                .collect(),
            flushes: self.flushes,
            bytes: self.bytes,
        }
    }

    /// Get time-to-shell so far.
    pub fn time_to_shell(&self) -> Option<Duration> {
        self.shell_sent.map(|t| t.duration_since(self.start))
    }

    /// Get total elapsed time.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl RequestMetrics {
    /// Format as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Time to shell as a duration.
    pub fn time_to_shell(&self) -> Option<Duration> {
        self.time_to_shell_us.map(Duration::from_micros)
    }

    /// Time to first body byte as a duration.
    pub fn time_to_first_byte(&self) -> Option<Duration> {
        self.time_to_first_byte_us.map(Duration::from_micros)
    }

    /// Time to last byte as a duration.
    pub fn time_to_last_byte(&self) -> Option<Duration> {
        self.time_to_last_byte_us.map(Duration::from_micros)
    }

    /// Format as human-readable summary.
    pub fn to_summary(&self) -> String {
        let ms = |us: u64| us as f64 / 1000.0;
        let mut lines = Vec::new();

        lines.push(format!("Request: {} ({})", self.request_id, self.mode));

        if let Some(tts) = self.time_to_shell_us {
            lines.push(format!("  Time to shell: {:.2}ms", ms(tts)));
        }

        if let Some(ttfb) = self.time_to_first_byte_us {
            lines.push(format!("  Time to first byte: {:.2}ms", ms(ttfb)));
        }

        if let Some(ttlb) = self.time_to_last_byte_us {
            lines.push(format!("  Time to last byte: {:.2}ms", ms(ttlb)));
        }

        if !self.sections.is_empty() {
            lines.push("  Sections:".to_string());
            for section in &self.sections {
                let sent = section
                    .sent_us
                    .map(|us| format!("{:.2}ms", ms(us)))
                    .unwrap_or_else(|| "not sent".to_string());
                lines.push(format!(
                    "    {}: loaded {:.2}ms, sent {}",
                    section.name,
                    ms(section.loaded_us),
                    sent
                ));
            }
        }

        lines.push(format!("  Flushes: {}, bytes: {}", self.flushes, self.bytes));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_streaming_timeline() {
        let mut metrics = MetricsCollector::new(RequestId::from_string("r"), RenderMode::Streaming);
        metrics.record_shell_sent(100);

        tokio::time::sleep(Duration::from_millis(40)).await;
        metrics.record_section_loaded("a");
        metrics.record_section_sent("a", 20, true);

        tokio::time::sleep(Duration::from_millis(10)).await;
        metrics.record_section_loaded("b");
        metrics.record_section_sent("b", 30, true);
        metrics.record_complete(7);

        let m = metrics.finalize();
        assert_eq!(m.time_to_shell(), Some(Duration::ZERO));
        assert_eq!(m.time_to_first_section_us, Some(40_000));
        assert_eq!(m.time_to_last_byte(), Some(Duration::from_millis(50)));
        assert_eq!(m.flushes, 3);
        assert_eq!(m.bytes, 157);
        let names: Vec<_> = m.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_buffered_first_byte_waits_for_document() {
        let mut metrics = MetricsCollector::new(RequestId::from_string("r"), RenderMode::Buffered);
        metrics.record_section_loaded("a");
        tokio::time::sleep(Duration::from_millis(80)).await;
        metrics.record_section_loaded("b");
        metrics.record_document_sent(500);
        metrics.record_complete(0);

        let m = metrics.finalize();
        assert!(m.time_to_shell_us.is_none());
        assert_eq!(m.time_to_first_byte(), Some(Duration::from_millis(80)));
        assert_eq!(m.flushes, 0);
        assert!(m.sections.iter().all(|s| s.sent_us == Some(80_000)));
        assert!(m.to_summary().contains("buffered"));
    }
}
