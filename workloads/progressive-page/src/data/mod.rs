//! Demo payloads and the producers that load them.

mod catalog;

pub use catalog::*;
