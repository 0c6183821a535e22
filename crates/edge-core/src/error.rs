//! Error taxonomy for page streaming.

use http::StatusCode;

use crate::lifecycle::SectionState;

/// A payload did not fit the sub-template it was applied to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Template '{template}' expects field '{field}' which the payload lacks")]
    MissingField { template: String, field: String },

    #[error("Template '{template}' expects an object payload")]
    NotAnObject { template: String },

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Payload could not be serialized: {0}")]
    Payload(String),

    #[error("Payload has not been loaded")]
    NotLoaded,
}

/// Error type for page streaming operations.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Shell not sent before sections")]
    ShellNotSent,

    #[error("Response already completed")]
    AlreadyCompleted,

    #[error("Transport cannot flush; refusing to stream")]
    TransportUnsupported,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Section '{section}' failed to render: {source}")]
    Render { section: String, source: RenderError },

    #[error("Producer for section '{0}' went away without a value")]
    ProducerAbandoned(String),

    #[error("Section '{0}' appears more than once")]
    DuplicateSection(String),

    #[error("Section '{0}' is not on this page")]
    UnknownSection(String),

    #[error("Section '{section}' cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        section: String,
        from: SectionState,
        to: SectionState,
    },

    #[error("Section '{section}' cannot be flushed before '{waiting_on}'")]
    OutOfOrder { section: String, waiting_on: String },
}

impl StreamError {
    /// Create a render error for a section.
    pub fn render(section: impl Into<String>, source: RenderError) -> Self {
        Self::Render {
            section: section.into(),
            source,
        }
    }

    /// HTTP status for errors caught before any byte was written.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::TransportUnsupported => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_message_names_section() {
        let err = StreamError::render(
            "products",
            RenderError::MissingField {
                template: "product".into(),
                field: "name".into(),
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("products"));
        assert!(msg.contains("name"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_transition_message() {
        let err = StreamError::InvalidTransition {
            section: "profile".into(),
            from: SectionState::Pending,
            to: SectionState::Flushed,
        };
        assert_eq!(
            err.to_string(),
            "Section 'profile' cannot move from Pending to Flushed"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            StreamError::TransportUnsupported.status_code(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            StreamError::Transport("closed".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
