//! Story-graph synchronization and auto-layout engine.
//! Projects Twine stories onto a visual board and reads them back.

pub mod board;
pub mod config;
pub mod content;
pub mod error;
pub mod format;
pub mod graph;
pub mod logging;
pub mod model;
pub mod service;

pub use board::memory::InMemoryBoard;
pub use board::{Board, BoardError, BoardItem, BoardResult, ItemId, ItemKind};
pub use config::{EngineConfig, LayoutConfig};
pub use error::{FieldKind, StoryError, StoryResult};
pub use format::{FormatId, FormatRegistry, StoryFormatEntry};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::canvas::{CanvasRole, RoleRecord};
pub use model::story::{generate_ifid, Passage, Story};
pub use service::extraction::{ExtractionService, StartMode, StorySummary};
pub use service::projection::{ProjectedStory, ProjectionService};
pub use service::publish::{
    FileKind, FormatLoader, HtmlCompiler, JsonStoryParser, PublishService, PublishedStory,
    StoryFileParser, StoryFormatSource,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
