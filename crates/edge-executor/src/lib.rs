//! Section rendering and document-order streaming.
//!
//! This crate turns section payloads into page output:
//! - `Template` / `TemplateSet` - Named sub-templates applied to payloads
//! - `SectionRenderer` - Flag and list section variants
//! - `BoundSection` - A section bound to its payload source and renderer
//! - `StreamCoordinator` - Shell first, then sections in document order

mod bound;
mod coordinator;
mod progress;
mod render;
mod template;

pub use bound::*;
pub use coordinator::*;
pub use progress::*;
pub use render::*;
pub use template::*;
