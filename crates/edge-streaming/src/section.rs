//! Section abstraction for independently loaded page parts.

use std::fmt;

/// Stable slot identifier shared by a placeholder and the markup that fills it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(String);

impl SectionId {
    /// Create a section identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SectionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A section is a named, independently-loaded part of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Slot identifier.
    pub id: SectionId,
    /// Human label shown while loading.
    pub label: String,
}

impl Section {
    /// Create a new section labelled with its id.
    pub fn new(id: impl Into<SectionId>) -> Self {
        let id = id.into();
        Self {
            label: id.to_string(),
            id,
        }
    }

    /// Create a section using the builder.
    pub fn builder(id: impl Into<SectionId>) -> SectionBuilder {
        SectionBuilder::new(id)
    }
}

/// Builder for ergonomic section definition.
pub struct SectionBuilder {
    id: SectionId,
    label: Option<String>,
}

impl SectionBuilder {
    /// Create a new section builder.
    pub fn new(id: impl Into<SectionId>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }

    /// Set the loading label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Build the section.
    pub fn build(self) -> Section {
        Section {
            label: self.label.unwrap_or_else(|| self.id.to_string()),
            id: self.id,
        }
    }
}
