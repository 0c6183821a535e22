//! Core abstractions for progressive HTML streaming.
//!
//! This crate provides the fundamental types:
//! - `ServerConfig` / `RenderMode` - Per-run configuration
//! - `RequestContext` - Per-request identity
//! - `LifecyclePhase` / `SectionState` - Request and section state machines
//! - `StreamError` / `RenderError` - Error taxonomy

mod config;
mod context;
mod error;
mod lifecycle;

pub use config::*;
pub use context::*;
pub use error::*;
pub use lifecycle::*;
