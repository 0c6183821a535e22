//! Per-section progress in document order.

use edge_core::{SectionState, StreamError};
use edge_streaming::SectionId;

/// Tracks `Pending → Loaded → Flushed` for every section on a page.
#[derive(Debug, Clone, Default)]
pub struct SectionProgress {
    sections: Vec<(SectionId, SectionState)>,
}

impl SectionProgress {
    /// Create empty progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section as pending.
    pub fn push(&mut self, id: SectionId) {
        self.sections.push((id, SectionState::Pending));
    }

    /// Mark a section's payload as loaded.
    pub fn load(&mut self, id: &SectionId) -> Result<(), StreamError> {
        let index = self.index(id)?;
        self.advance(index, SectionState::Loaded)
    }

    /// Check that a section may be written now: it is loaded and every
    /// earlier section is already flushed.
    pub fn check_flush(&self, id: &SectionId) -> Result<(), StreamError> {
        let index = self.index(id)?;

        if let Some((earlier, _)) = self.sections[..index]
            .iter()
            .find(|(_, state)| *state != SectionState::Flushed)
        {
            return Err(StreamError::OutOfOrder {
                section: id.to_string(),
                waiting_on: earlier.to_string(),
            });
        }

        let state = self.sections[index].1;
        if state.next() != Some(SectionState::Flushed) {
            return Err(StreamError::InvalidTransition {
                section: id.to_string(),
                from: state,
                to: SectionState::Flushed,
            });
        }
        Ok(())
    }

    /// Mark a section as flushed. Same rules as [`check_flush`](Self::check_flush).
    pub fn flush(&mut self, id: &SectionId) -> Result<(), StreamError> {
        self.check_flush(id)?;
        let index = self.index(id)?;
        self.advance(index, SectionState::Flushed)
    }

    /// Current state of a section.
    pub fn state(&self, id: &SectionId) -> Option<SectionState> {
        self.find(id).map(|i| self.sections[i].1)
    }

    /// Whether every section has been flushed.
    pub fn is_complete(&self) -> bool {
        self.sections
            .iter()
            .all(|(_, state)| *state == SectionState::Flushed)
    }

    /// Flushed sections, in document order.
    pub fn flushed(&self) -> Vec<SectionId> {
        self.sections
            .iter()
            .filter(|(_, state)| *state == SectionState::Flushed)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Whether a section is tracked.
    pub fn contains(&self, id: &SectionId) -> bool {
        self.find(id).is_some()
    }

    fn advance(&mut self, index: usize, to: SectionState) -> Result<(), StreamError> {
        let (id, state) = &mut self.sections[index];
        let from = *state;
        if state.advance(to) {
            Ok(())
        } else {
            Err(StreamError::InvalidTransition {
                section: id.to_string(),
                from,
                to,
            })
        }
    }

    fn index(&self, id: &SectionId) -> Result<usize, StreamError> {
        self.find(id)
            .ok_or_else(|| StreamError::UnknownSection(id.to_string()))
    }

    fn find(&self, id: &SectionId) -> Option<usize> {
        self.sections.iter().position(|(s, _)| s == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress() -> SectionProgress {
        let mut p = SectionProgress::new();
        for id in ["a", "b", "c"] {
            p.push(SectionId::new(id));
        }
        p
    }

    #[test]
    fn test_flush_requires_load() {
        let mut p = progress();
        let a = SectionId::new("a");
        assert!(matches!(
            p.flush(&a),
            Err(StreamError::InvalidTransition {
                from: SectionState::Pending,
                ..
            })
        ));
        p.load(&a).unwrap();
        p.flush(&a).unwrap();
        assert_eq!(p.state(&a), Some(SectionState::Flushed));
        assert!(p.load(&a).is_err());
    }

    #[test]
    fn test_flush_out_of_order_refused() {
        let mut p = progress();
        let (a, c) = (SectionId::new("a"), SectionId::new("c"));
        p.load(&c).unwrap();
        match p.flush(&c) {
            Err(StreamError::OutOfOrder {
                section,
                waiting_on,
            }) => {
                assert_eq!(section, "c");
                assert_eq!(waiting_on, "a");
            }
            other => panic!("expected OutOfOrder, got {:?}", other),
        }
        assert_eq!(p.state(&c), Some(SectionState::Loaded));

        p.load(&a).unwrap();
        p.flush(&a).unwrap();
        assert_eq!(p.flushed(), vec![a]);
        assert!(!p.is_complete());
    }

    #[test]
    fn test_complete_after_all_flushed() {
        let mut p = progress();
        for id in ["a", "b", "c"] {
            let id = SectionId::new(id);
            p.load(&id).unwrap();
            p.check_flush(&id).unwrap();
            p.flush(&id).unwrap();
        }
        assert!(p.is_complete());
        assert!(matches!(
            p.load(&SectionId::new("missing")),
            Err(StreamError::UnknownSection(_))
        ));
    }
}
