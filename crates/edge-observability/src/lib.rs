//! Observability for progressive HTML requests.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging with request context
//! - `MetricsCollector` - Shell and per-section timing metrics

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;

// Re-export RequestId from edge-core for convenience
pub use edge_core::RequestId;
