//! Story domain model.
//!
//! # Responsibility
//! - Define the in-memory story graph exchanged with the canvas and the
//!   external format subsystem.
//!
//! # Invariants
//! - Passage names are pairwise distinct inside one `Story`.
//! - `start` names the starting passage once reconstruction succeeds; the
//!   caller is responsible for checking it.
//! - Passage tags form a set; insertion order is not preserved.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// One named unit of story text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Unique name inside the owning story.
    pub name: String,
    /// Raw author-facing body markup.
    #[serde(default)]
    pub text: String,
    /// Passage tags, deduplicated.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Passage {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Builder-style helper that adds tags to this passage.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// Full narrative graph plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub name: String,
    /// Globally unique story identifier. Opaque to this crate.
    #[serde(rename = "ifid", default)]
    pub ifid: String,
    /// Story format name, e.g. `harlowe`.
    #[serde(default)]
    pub format: String,
    /// Story format version, e.g. `3.3.9`. Empty when unknown.
    #[serde(default)]
    pub format_version: String,
    /// Name of the starting passage.
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub passages: Vec<Passage>,
}

impl Story {
    /// Creates an empty story with a freshly generated IFID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ifid: generate_ifid(),
            format: String::new(),
            format_version: String::new(),
            start: String::new(),
            passages: Vec::new(),
        }
    }

    /// Looks up one passage by exact name.
    pub fn passage(&self, name: &str) -> Option<&Passage> {
        self.passages.iter().find(|passage| passage.name == name)
    }

    /// Returns the passage named by `start`, if any.
    pub fn start_passage(&self) -> Option<&Passage> {
        self.passage(self.start.as_str())
    }

    /// Returns the first passage name that occurs more than once.
    pub fn duplicate_passage_name(&self) -> Option<&str> {
        let mut seen = BTreeSet::new();
        self.passages
            .iter()
            .map(|passage| passage.name.as_str())
            .find(|name| !seen.insert(*name))
    }

    /// Returns the union of all passage tags, trimmed and sorted.
    ///
    /// Blank tags are skipped; the canvas cannot hold a tag without a title.
    pub fn tag_titles(&self) -> BTreeSet<&str> {
        self.passages
            .iter()
            .flat_map(|passage| passage.tags.iter().map(|tag| tag.trim()))
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

/// Generates a new IFID in the canonical uppercase UUID form.
pub fn generate_ifid() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::{generate_ifid, Passage, Story};

    #[test]
    fn ifid_is_uppercase_uuid() {
        let ifid = generate_ifid();
        assert_eq!(ifid.len(), 36);
        assert_eq!(ifid, ifid.to_uppercase());
    }

    #[test]
    fn tags_collapse_duplicates() {
        let passage = Passage::new("Cave", "dark").with_tags(["b", "a", "b"]);
        assert_eq!(passage.tags.len(), 2);
        assert_eq!(passage.tags.iter().next().map(String::as_str), Some("a"));
    }

    #[test]
    fn tag_titles_are_trimmed_and_skip_blanks() {
        let mut story = Story::new("Tags");
        story
            .passages
            .push(Passage::new("A", "").with_tags(["", "  ", " shared "]));
        story.passages.push(Passage::new("B", "").with_tags(["shared"]));
        let titles: Vec<&str> = story.tag_titles().into_iter().collect();
        assert_eq!(titles, vec!["shared"]);
    }

    #[test]
    fn duplicate_passage_name_is_reported() {
        let mut story = Story::new("Dupes");
        story.passages.push(Passage::new("A", ""));
        story.passages.push(Passage::new("B", ""));
        assert_eq!(story.duplicate_passage_name(), None);
        story.passages.push(Passage::new("A", "again"));
        assert_eq!(story.duplicate_passage_name(), Some("A"));
    }

    #[test]
    fn json_uses_interchange_field_names() {
        let mut story = Story::new("Json");
        story.ifid = "ABC".to_string();
        story.format_version = "3.3.9".to_string();
        let value = serde_json::to_value(&story).expect("story should serialize");
        assert_eq!(value["ifid"], "ABC");
        assert_eq!(value["formatVersion"], "3.3.9");
    }
}
