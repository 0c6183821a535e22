//! Request and section lifecycle tracking.

/// Lifecycle phases for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Request received, nothing written yet.
    Start,
    /// Shell HTML (with placeholders) has been flushed to the client.
    ShellSent,
    /// A named section has been rendered and flushed.
    SectionFlushed(String),
    /// Every section was flushed and the response closed.
    Completion,
    /// The request stopped on an error.
    Error(String),
}

/// Per-section state. Sections only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SectionState {
    /// The payload is not available yet.
    Pending,
    /// The payload arrived and the section can be rendered.
    Loaded,
    /// The rendered markup was written and flushed.
    Flushed,
}

impl SectionState {
    /// The state that follows this one, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Loaded),
            Self::Loaded => Some(Self::Flushed),
            Self::Flushed => None,
        }
    }

    /// Move one step forward. Returns `false` if `to` is not the next state.
    pub fn advance(&mut self, to: SectionState) -> bool {
        if self.next() == Some(to) {
            *self = to;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_state_moves_forward_only() {
        let mut state = SectionState::Pending;
        assert!(!state.advance(SectionState::Flushed));
        assert!(state.advance(SectionState::Loaded));
        assert!(state.advance(SectionState::Flushed));
        assert!(!state.advance(SectionState::Loaded));
        assert_eq!(state, SectionState::Flushed);
        assert_eq!(state.next(), None);
    }
}
