//! Per-request context.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::RenderMode;

/// Unique request identifier for log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let id = format!(
            "{:x}-{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            next_sequence()
        );
        Self(id)
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

fn next_sequence() -> u32 {
    static SEQ: AtomicU32 = AtomicU32::new(0);
    SEQ.fetch_add(1, Ordering::Relaxed)
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Render context for a single page request.
///
/// Created once per request and never shared across requests.
#[derive(Debug)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// Request path.
    pub path: String,
    /// Delivery mode for this request.
    pub mode: RenderMode,
}

impl RequestContext {
    /// Create a new request context.
    pub fn new(path: impl Into<String>, mode: RenderMode) -> Self {
        Self {
            request_id: RequestId::generate(),
            path: path.into(),
            mode,
        }
    }
}
