//! Story format identifiers and the known-format registry.
//!
//! # Responsibility
//! - Parse and render `name-version` story format titles.
//! - Resolve a format name with a missing version against a registry.
//!
//! # Invariants
//! - The registry is an immutable value; its default format is explicit.
//! - Registry order is a priority list: the first matching entry wins.

use crate::error::{StoryError, StoryResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const DEFAULT_FORMAT_TITLE: &str = "harlowe-3.3.9";

/// Parsed story format identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatId {
    pub name: String,
    pub version: String,
}

impl FormatId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Splits `title` on its last `-`.
    ///
    /// Returns `None` when `title` carries no version part.
    pub fn parse(title: &str) -> Option<Self> {
        let (name, version) = title.trim().rsplit_once('-')?;
        let name = name.trim();
        let version = version.trim();
        if name.is_empty() || version.is_empty() {
            return None;
        }
        Some(Self::new(name, version))
    }

    /// Canonical `name-version` title.
    pub fn title(&self) -> String {
        self.to_string()
    }
}

impl Display for FormatId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

/// One known story format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryFormatEntry {
    /// `name-version` title, e.g. `harlowe-3.3.9`.
    pub title: String,
    /// Starter text placed in the template passage of a new story.
    #[serde(default)]
    pub template: String,
}

impl StoryFormatEntry {
    pub fn new(title: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            template: template.into(),
        }
    }

    pub fn id(&self) -> Option<FormatId> {
        FormatId::parse(&self.title)
    }
}

/// Immutable list of known story formats.
///
/// Deserialization goes through `FormatRegistry::new`, so a loaded registry
/// always contains its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegistryDocument")]
pub struct FormatRegistry {
    formats: Vec<StoryFormatEntry>,
    default_title: String,
}

/// Unchecked serialized form of a `FormatRegistry`.
#[derive(Debug, Deserialize)]
struct RegistryDocument {
    formats: Vec<StoryFormatEntry>,
    default_title: String,
}

impl TryFrom<RegistryDocument> for FormatRegistry {
    type Error = StoryError;

    fn try_from(value: RegistryDocument) -> Result<Self, Self::Error> {
        Self::new(value.formats, value.default_title)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FormatRegistry {
    /// Builds a registry; `default_title` must name one of `formats`.
    pub fn new(formats: Vec<StoryFormatEntry>, default_title: impl Into<String>) -> StoryResult<Self> {
        let default_title = default_title.into();
        if !formats.iter().any(|entry| entry.title == default_title) {
            return Err(StoryError::UnknownFormat(default_title));
        }
        Ok(Self {
            formats,
            default_title,
        })
    }

    /// Formats bundled with the engine, Harlowe first and default.
    pub fn builtin() -> Self {
        Self {
            formats: vec![
                StoryFormatEntry::new(
                    "harlowe-3.3.9",
                    "LINK\n[[My link text->Next Passage]]\n\n\
                     // This is an editor only comment\n\
                     A comment can also be added at the end of a line // so the rest is not exported",
                ),
                StoryFormatEntry::new(
                    "chapbook-2.2.0",
                    "LINK:\n{link to: 'Passage name', label: 'Label text'}\n\n\
                     // This is an editor only comment",
                ),
                StoryFormatEntry::new(
                    "paperthin-1.0.0",
                    "Paperthin is a proofing format. It displays the story as is.",
                ),
                StoryFormatEntry::new(
                    "snowman-2.0.2",
                    "LINK:\n[[Next Passage]]\n\n// This is an editor only comment",
                ),
                StoryFormatEntry::new(
                    "sugarcube-2.37.3",
                    "LINK:\n[[Next Passage]]\n\n// This is an editor only comment",
                ),
            ],
            default_title: DEFAULT_FORMAT_TITLE.to_string(),
        }
    }

    pub fn formats(&self) -> &[StoryFormatEntry] {
        &self.formats
    }

    pub fn default_entry(&self) -> Option<&StoryFormatEntry> {
        self.get(&self.default_title)
    }

    /// Returns the default format id.
    pub fn default_format(&self) -> StoryResult<FormatId> {
        FormatId::parse(&self.default_title)
            .ok_or_else(|| StoryError::UnknownFormat(self.default_title.clone()))
    }

    /// Looks up one entry by exact title.
    pub fn get(&self, title: &str) -> Option<&StoryFormatEntry> {
        self.formats.iter().find(|entry| entry.title == title)
    }

    /// Resolves a possibly incomplete format reference.
    ///
    /// - `version` present: returned as-is with `name`.
    /// - `name` already `name-version`: split on the last `-`.
    /// - otherwise: the first entry whose title contains `name` supplies the
    ///   version. An empty `name` resolves to the default format.
    pub fn resolve(&self, name: &str, version: Option<&str>) -> StoryResult<FormatId> {
        let name = name.trim();
        let version = version.map(str::trim).filter(|value| !value.is_empty());

        if name.is_empty() {
            return self.default_format();
        }
        if let Some(version) = version {
            return Ok(FormatId::new(name, version));
        }
        if let Some(id) = FormatId::parse(name) {
            if self.get(&id.title()).is_some() {
                return Ok(id);
            }
        }

        let needle = name.to_ascii_lowercase();
        self.formats
            .iter()
            .filter(|entry| entry.title.to_ascii_lowercase().contains(needle.as_str()))
            .find_map(StoryFormatEntry::id)
            .map(|id| FormatId::new(name, id.version))
            .ok_or_else(|| StoryError::UnknownFormat(name.to_string()))
    }

    /// Resolves a format-field value read off the canvas.
    pub fn resolve_title(&self, title: &str) -> StoryResult<FormatId> {
        match FormatId::parse(title) {
            Some(id) => Ok(id),
            None => self.resolve(title, None),
        }
    }
}
