//! Streaming primitives for shell-first progressive HTML.
//!
//! This crate enforces shell-first streaming patterns:
//! - `Section` - Named page slots in document order
//! - `render_placeholder` - Loading skeleton for a slot
//! - `Shell` - Page chrome with one placeholder per section
//! - `Transport` - Write/flush seam over the response body
//! - `StreamingSink` - Shell-first state machine over a transport

mod flush;
mod html;
mod placeholder;
mod section;
mod shell;
mod sink;

pub use flush::*;
pub use html::*;
pub use placeholder::*;
pub use section::*;
pub use shell::*;
pub use sink::*;
