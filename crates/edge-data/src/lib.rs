//! Section futures and concurrent data producers.
//!
//! This crate provides:
//! - `SectionFuture` / `SectionWriter` - Single-assignment handoff per section
//! - `Producer` - Delayed computation that publishes one value
//! - `ProducerGroup` - Request-scoped set of running producers

mod future;
mod producer;

pub use future::*;
pub use producer::*;
