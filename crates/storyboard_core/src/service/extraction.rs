//! Canvas -> story extraction use-case.
//!
//! # Responsibility
//! - Classify the direct children of a story container by discriminant.
//! - Rebuild the `Story` value, resolving the start passage by marker or by
//!   an explicit card.
//! - List the story containers present on a board.
//!
//! # Invariants
//! - The board is read only; extraction never mutates canvas state.
//! - Single-instance fields are counted as missing, found or ambiguous; more
//!   than one instance is an error.
//! - Untagged cards are passage candidates; other untagged objects are
//!   decoration and are ignored.

use crate::board::{Board, BoardItem, ItemId, ItemKind};
use crate::config::EngineConfig;
use crate::content::{decode_description, plain_text};
use crate::error::{FieldKind, StoryError, StoryResult};
use crate::model::canvas::{CanvasRole, RoleRecord};
use crate::model::story::{Passage, Story};
use log::{error, info};
use std::collections::BTreeSet;
use std::time::Instant;

/// How the start passage is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Follow the single outgoing connector of the start marker.
    FromMarker,
    /// Use this card as start; the marker is not consulted.
    FromCard(ItemId),
}

/// One story container found on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorySummary {
    pub container: ItemId,
    pub title: String,
}

/// Census state of one single-instance field.
#[derive(Debug, Clone, PartialEq, Default)]
enum FieldSlot {
    #[default]
    Missing,
    Found(BoardItem),
    Ambiguous(usize),
}

impl FieldSlot {
    fn record(&mut self, item: BoardItem) {
        *self = match std::mem::take(self) {
            Self::Missing => Self::Found(item),
            Self::Found(_) => Self::Ambiguous(2),
            Self::Ambiguous(count) => Self::Ambiguous(count + 1),
        };
    }

    fn require(self, field: FieldKind) -> StoryResult<BoardItem> {
        match self {
            Self::Missing => Err(StoryError::MissingField(field)),
            Self::Found(item) => Ok(item),
            Self::Ambiguous(count) => Err(StoryError::AmbiguousField { field, count }),
        }
    }
}

#[derive(Debug, Default)]
struct ContainerCensus {
    title: FieldSlot,
    format: FieldSlot,
    ifid: FieldSlot,
    start_marker: FieldSlot,
    cards: Vec<BoardItem>,
}

/// Extraction service over one board.
pub struct ExtractionService<'a, B: Board> {
    board: &'a B,
    config: &'a EngineConfig,
}

impl<'a, B: Board> ExtractionService<'a, B> {
    pub fn new(board: &'a B, config: &'a EngineConfig) -> Self {
        Self { board, config }
    }

    /// Rebuilds the story held by `container`.
    pub fn extract(&self, container: ItemId, mode: StartMode) -> StoryResult<Story> {
        let started_at = Instant::now();
        info!(
            "event=story_extract module=extraction status=start container={}",
            container
        );

        match self.extract_inner(container, mode) {
            Ok(story) => {
                info!(
                    "event=story_extract module=extraction status=ok passages={} duration_ms={}",
                    story.passages.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(story)
            }
            Err(err) => {
                error!(
                    "event=story_extract module=extraction status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Rebuilds the story that owns `card`, starting from that card.
    pub fn extract_from_card(&self, card: ItemId) -> StoryResult<Story> {
        let item = self.board.get_item(card)?.ok_or(StoryError::NotAStory(card))?;
        let container = item.parent_id.ok_or(StoryError::NotAStory(card))?;
        self.extract(container, StartMode::FromCard(card))
    }

    /// Lists every story container that carries exactly one title field.
    pub fn list_stories(&self) -> StoryResult<Vec<StorySummary>> {
        let mut stories = Vec::new();
        for frame in self.board.list_frames()? {
            if frame.title != self.config.container_title {
                continue;
            }
            let census = self.census(frame.id)?;
            if let FieldSlot::Found(title) = census.title {
                stories.push(StorySummary {
                    container: frame.id,
                    title: plain_text(&title.title),
                });
            }
        }
        Ok(stories)
    }

    fn extract_inner(&self, container: ItemId, mode: StartMode) -> StoryResult<Story> {
        let frame = self
            .board
            .get_item(container)?
            .ok_or(StoryError::NotAStory(container))?;
        if frame.kind != ItemKind::Frame || frame.title != self.config.container_title {
            return Err(StoryError::NotAStory(container));
        }

        let census = self.census(container)?;
        let title = census.title.require(FieldKind::Title)?;
        let ifid = census.ifid.require(FieldKind::Ifid)?;
        let format = census.format.require(FieldKind::Format)?;
        if census.cards.is_empty() {
            return Err(StoryError::MissingField(FieldKind::Passages));
        }

        let start_card = match mode {
            StartMode::FromCard(card) => card,
            StartMode::FromMarker => self.start_from_marker(census.start_marker)?,
        };

        let format_id = self.config.formats.resolve_title(&plain_text(&format.title))?;
        let mut story = Story {
            name: plain_text(&title.title),
            ifid: plain_text(&ifid.title),
            format: format_id.name,
            format_version: format_id.version,
            start: String::new(),
            passages: Vec::with_capacity(census.cards.len()),
        };

        for card in &census.cards {
            let passage = self.read_passage(card)?;
            if card.id == start_card {
                story.start = passage.name.clone();
            }
            story.passages.push(passage);
        }
        Ok(story)
    }

    fn census(&self, container: ItemId) -> StoryResult<ContainerCensus> {
        let mut census = ContainerCensus::default();
        for id in self.board.children(container)? {
            let Some(item) = self.board.get_item(id)? else {
                continue;
            };
            let role = self
                .board
                .metadata(id, &self.config.metadata_key)?
                .as_ref()
                .and_then(RoleRecord::from_value)
                .map(|record| record.role);

            match role {
                Some(CanvasRole::TitleField) => census.title.record(item),
                Some(CanvasRole::FormatField) => census.format.record(item),
                Some(CanvasRole::IfidField) => census.ifid.record(item),
                Some(CanvasRole::StartMarker) => census.start_marker.record(item),
                Some(CanvasRole::PassageCard) => census.cards.push(item),
                Some(CanvasRole::Container) => {}
                None if item.kind == ItemKind::Card => census.cards.push(item),
                None => {}
            }
        }
        Ok(census)
    }

    /// Resolves the card at the far end of the marker's only outgoing connector.
    fn start_from_marker(&self, slot: FieldSlot) -> StoryResult<ItemId> {
        let marker = match slot {
            FieldSlot::Missing => return Err(StoryError::NoStart { marker_found: false }),
            FieldSlot::Ambiguous(count) => {
                return Err(StoryError::AmbiguousField {
                    field: FieldKind::StartMarker,
                    count,
                })
            }
            FieldSlot::Found(marker) => marker,
        };

        let outgoing: Vec<ItemId> = self
            .board
            .connectors(marker.id)?
            .into_iter()
            .filter(|connector| connector.start == marker.id)
            .map(|connector| connector.end)
            .collect();
        match outgoing.as_slice() {
            [] => Err(StoryError::NoStart { marker_found: true }),
            [target] => Ok(*target),
            many => Err(StoryError::AmbiguousStart {
                connectors: many.len(),
            }),
        }
    }

    fn read_passage(&self, card: &BoardItem) -> StoryResult<Passage> {
        let mut tags = BTreeSet::new();
        for tag_id in &card.tag_ids {
            if let Some(tag) = self.board.get_item(*tag_id)? {
                let title = plain_text(&tag.title);
                if !title.is_empty() {
                    tags.insert(title);
                }
            }
        }
        Ok(Passage {
            name: plain_text(&card.title),
            text: decode_description(&card.description),
            tags,
        })
    }
}
