//! Import and publish orchestration.
//!
//! # Responsibility
//! - Detect interchange file kinds and hand parsing to a `StoryFileParser`.
//! - Project imported stories onto the board.
//! - Extract a container, load its story format and compile it to HTML.
//!
//! # Invariants
//! - Parsing, format loading and compilation stay behind traits; this module
//!   never interprets format source or HTML output.
//! - A story is compiled only after its start passage is resolved.

use crate::board::{Board, ItemId};
use crate::config::EngineConfig;
use crate::error::{StoryError, StoryResult};
use crate::format::FormatId;
use crate::model::story::{generate_ifid, Story};
use crate::service::extraction::{ExtractionService, StartMode};
use crate::service::notify_failure;
use crate::service::projection::{ProjectedStory, ProjectionService};
use log::{error, info};
use std::path::Path;
use std::time::Instant;

/// Interchange file kinds accepted by `import_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Link-based plain text (`.twee`, `.tw`).
    Twee,
    /// JSON story document.
    Json,
    /// Published Twine 2 HTML (`<tw-storydata>`).
    Twine2Html,
    /// Twine 1 HTML with a `storeArea` block.
    Twine1Html,
}

impl FileKind {
    /// Detects the kind from the file extension, sniffing HTML content.
    pub fn detect(file_name: &str, contents: &str) -> StoryResult<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "twee" | "tw" => Ok(Self::Twee),
            "json" => Ok(Self::Json),
            "html" | "htm" => {
                if contents.contains("<tw-storydata") {
                    Ok(Self::Twine2Html)
                } else if contents.contains("id=\"storeArea\"")
                    || contents.contains("id=\"store-area\"")
                {
                    Ok(Self::Twine1Html)
                } else {
                    Err(StoryError::InvalidFile(format!(
                        "`{file_name}` does not contain Twine story data"
                    )))
                }
            }
            _ => Err(StoryError::InvalidFile(format!(
                "`{file_name}` is a file type not supported"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Twee => "twee",
            Self::Json => "json",
            Self::Twine2Html => "twine2-html",
            Self::Twine1Html => "twine1-html",
        }
    }
}

/// Parses interchange file text into a story.
pub trait StoryFileParser {
    fn parse(&self, kind: FileKind, contents: &str) -> Result<Story, String>;
}

/// Loaded story format source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryFormatSource {
    pub id: FormatId,
    /// Format definition as delivered by the loader.
    pub source: String,
}

/// Fetches story format definitions.
pub trait FormatLoader {
    fn load(&self, id: &FormatId) -> Result<StoryFormatSource, String>;
}

/// Compiles a story with a loaded format into a playable HTML document.
pub trait HtmlCompiler {
    fn compile(&self, story: &Story, format: &StoryFormatSource) -> Result<String, String>;
}

/// Parser for the JSON interchange format only.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStoryParser;

impl StoryFileParser for JsonStoryParser {
    fn parse(&self, kind: FileKind, contents: &str) -> Result<Story, String> {
        if kind != FileKind::Json {
            return Err(format!("{} files need an external parser", kind.as_str()));
        }
        serde_json::from_str(contents).map_err(|err| err.to_string())
    }
}

/// Compiled document for one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedStory {
    pub story: Story,
    pub html: String,
}

/// Import/publish service over one board.
pub struct PublishService<'a, B: Board> {
    board: &'a mut B,
    config: &'a EngineConfig,
}

impl<'a, B: Board> PublishService<'a, B> {
    pub fn new(board: &'a mut B, config: &'a EngineConfig) -> Self {
        Self { board, config }
    }

    /// Parses an interchange file and projects it onto the board.
    ///
    /// Failures are also posted to the board as error notices.
    pub fn import_file<P: StoryFileParser>(
        &mut self,
        parser: &P,
        file_name: &str,
        contents: &str,
    ) -> StoryResult<ProjectedStory> {
        let story = match read_story(parser, file_name, contents) {
            Ok(story) => story,
            Err(err) => {
                notify_failure(&mut *self.board, "publish", &err);
                return Err(err);
            }
        };
        ProjectionService::new(&mut *self.board, self.config).project(&story)
    }

    /// Extracts `container` and compiles it with its story format.
    ///
    /// Failures are also posted to the board as error notices.
    pub fn compile_container<L: FormatLoader, C: HtmlCompiler>(
        &mut self,
        container: ItemId,
        mode: StartMode,
        loader: &L,
        compiler: &C,
    ) -> StoryResult<PublishedStory> {
        let result = self.compile_inner(container, mode, loader, compiler);
        if let Err(err) = &result {
            notify_failure(&mut *self.board, "publish", err);
        }
        result
    }

    fn compile_inner<L: FormatLoader, C: HtmlCompiler>(
        &self,
        container: ItemId,
        mode: StartMode,
        loader: &L,
        compiler: &C,
    ) -> StoryResult<PublishedStory> {
        let started_at = Instant::now();
        let story = ExtractionService::new(&*self.board, self.config).extract(container, mode)?;
        if story.start_passage().is_none() {
            return Err(StoryError::NoStart { marker_found: true });
        }

        let id = FormatId::new(story.format.clone(), story.format_version.clone());
        let result = loader
            .load(&id)
            .and_then(|format| compiler.compile(&story, &format));
        match result {
            Ok(html) => {
                info!(
                    "event=story_publish module=publish status=ok format={} duration_ms={}",
                    id,
                    started_at.elapsed().as_millis()
                );
                Ok(PublishedStory { story, html })
            }
            Err(message) => {
                error!(
                    "event=story_publish module=publish status=error format={} duration_ms={}",
                    id,
                    started_at.elapsed().as_millis()
                );
                Err(StoryError::External(message))
            }
        }
    }
}

fn read_story<P: StoryFileParser>(
    parser: &P,
    file_name: &str,
    contents: &str,
) -> StoryResult<Story> {
    let kind = FileKind::detect(file_name, contents)?;
    info!(
        "event=story_import module=publish status=start kind={}",
        kind.as_str()
    );

    let mut story = parser.parse(kind, contents).map_err(|message| {
        error!(
            "event=story_import module=publish status=error kind={} reason=parse",
            kind.as_str()
        );
        StoryError::InvalidFile(message)
    })?;
    if story.ifid.trim().is_empty() {
        story.ifid = generate_ifid();
    }
    Ok(story)
}

#[cfg(test)]
mod tests {
    use super::{FileKind, JsonStoryParser, StoryFileParser};
    use crate::error::StoryError;

    #[test]
    fn detect_uses_extension_and_html_markers() {
        assert_eq!(FileKind::detect("a.twee", "").unwrap(), FileKind::Twee);
        assert_eq!(FileKind::detect("a.TW", "").unwrap(), FileKind::Twee);
        assert_eq!(FileKind::detect("story.json", "{}").unwrap(), FileKind::Json);
        assert_eq!(
            FileKind::detect("s.html", "<tw-storydata name=\"x\">").unwrap(),
            FileKind::Twine2Html
        );
        assert_eq!(
            FileKind::detect("s.htm", "<div id=\"storeArea\">").unwrap(),
            FileKind::Twine1Html
        );
    }

    #[test]
    fn detect_rejects_unknown_kinds() {
        assert!(matches!(
            FileKind::detect("notes.txt", ""),
            Err(StoryError::InvalidFile(_))
        ));
        assert!(matches!(
            FileKind::detect("page.html", "<html></html>"),
            Err(StoryError::InvalidFile(_))
        ));
        assert!(matches!(
            FileKind::detect("noextension", ""),
            Err(StoryError::InvalidFile(_))
        ));
    }

    #[test]
    fn json_parser_reads_interchange_fields() {
        let story = JsonStoryParser
            .parse(
                FileKind::Json,
                r#"{"name":"Cave","ifid":"X","format":"harlowe","formatVersion":"3.3.9",
                    "start":"A","passages":[{"name":"A","text":"hi","tags":["t"]}]}"#,
            )
            .unwrap();
        assert_eq!(story.name, "Cave");
        assert_eq!(story.format_version, "3.3.9");
        assert!(story.passages[0].tags.contains("t"));
    }

    #[test]
    fn json_parser_refuses_other_kinds() {
        assert!(JsonStoryParser.parse(FileKind::Twee, "::A\nhi").is_err());
    }
}
