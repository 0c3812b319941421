//! Domain error taxonomy for story conversion.
//!
//! # Responsibility
//! - Name every way a projection, extraction, import or publish call can fail.
//! - Provide author-facing messages through `Display`.
//!
//! # Invariants
//! - No error is fatal to the process; each failing call can be retried.

use crate::board::{BoardError, ItemId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by story services.
pub type StoryResult<T> = Result<T, StoryError>;

/// Labeled field kinds a story container must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Title,
    Format,
    Ifid,
    StartMarker,
    Passages,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Title => "title",
            Self::Format => "story format",
            Self::Ifid => "IFID",
            Self::StartMarker => "start node",
            Self::Passages => "passage",
        };
        f.write_str(label)
    }
}

/// Errors from story services.
#[derive(Debug)]
pub enum StoryError {
    /// A required labeled field is absent from the container.
    MissingField(FieldKind),
    /// More than one object claims the same single-instance field.
    AmbiguousField { field: FieldKind, count: usize },
    /// Start marker is absent or has no outgoing connector.
    NoStart { marker_found: bool },
    /// Start marker has more than one outgoing connector.
    AmbiguousStart { connectors: usize },
    /// Story format title cannot be resolved.
    UnknownFormat(String),
    /// Import file has an unrecognized extension or unparsable content.
    InvalidFile(String),
    /// Two passages share one name.
    DuplicatePassage(String),
    /// Container id does not point at a story container.
    NotAStory(ItemId),
    /// External format subsystem failure (parser, loader, compiler).
    External(String),
    /// Canvas platform failure.
    Board(BoardError),
}

impl Display for StoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(FieldKind::Passages) => write!(f, "no passages were found"),
            Self::MissingField(field) => write!(f, "no {field} was found"),
            Self::AmbiguousField { field, count } => {
                write!(f, "found {count} {field} fields; expected exactly one")
            }
            Self::NoStart {
                marker_found: false,
            } => write!(f, "no start node was found"),
            Self::NoStart { marker_found: true } => {
                write!(f, "start node is not connected to any passage")
            }
            Self::AmbiguousStart { connectors } => write!(
                f,
                "start node has {connectors} connections; expected exactly one"
            ),
            Self::UnknownFormat(title) => write!(f, "unknown story format: `{title}`"),
            Self::InvalidFile(message) => write!(f, "invalid story file: {message}"),
            Self::DuplicatePassage(name) => write!(f, "duplicate passage name: `{name}`"),
            Self::NotAStory(id) => write!(f, "board item is not a story container: {id}"),
            Self::External(message) => write!(f, "{message}"),
            Self::Board(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Board(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BoardError> for StoryError {
    fn from(value: BoardError) -> Self {
        Self::Board(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldKind, StoryError};

    #[test]
    fn messages_name_the_missing_piece() {
        assert_eq!(
            StoryError::MissingField(FieldKind::Ifid).to_string(),
            "no IFID was found"
        );
        assert_eq!(
            StoryError::MissingField(FieldKind::Passages).to_string(),
            "no passages were found"
        );
        assert!(StoryError::AmbiguousStart { connectors: 2 }
            .to_string()
            .contains("2 connections"));
    }
}
