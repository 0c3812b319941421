//! Story -> canvas projection use-case.
//!
//! # Responsibility
//! - Lay out a story graph and create its container, header fields, start
//!   marker, passage cards, tags and connectors on the board.
//! - Create starter stories for new authors.
//!
//! # Invariants
//! - Every role object gets its discriminant before the next object is made.
//! - Existing tag objects are reused by title; one title maps to one tag
//!   within a single projection call.
//! - A failing board call aborts the projection; objects already created
//!   remain on the board.

use crate::board::{
    Board, CardSpec, FrameSpec, ItemId, NoticeLevel, Placement, ShapeKind, ShapeSpec, TextSpec,
};
use crate::config::EngineConfig;
use crate::content::{encode_description, escape_angles, plain_text};
use crate::error::{FieldKind, StoryError, StoryResult};
use crate::format::FormatId;
use crate::graph::layout::GraphLayout;
use crate::graph::{NodeId, StoryGraph};
use crate::model::canvas::{CanvasRole, RoleRecord};
use crate::model::story::{Passage, Story};
use crate::service::notify_failure;
use log::{error, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

const FRAME_FILL: &str = "#e6e6e6";
const LABEL_COLOR: &str = "#cfcfcf";
const FIELD_COLOR: &str = "#1a1a1a";
const ACCENT_COLOR: &str = "#414bb2";

const LABEL_WIDTH: f64 = 200.0;
const LABEL_HEIGHT: f64 = 14.0;
const IFID_WIDTH: f64 = 250.0;
const TITLE_FIELD_OFFSET: f64 = 22.0;
const TITLE_FIELD_HEIGHT: f64 = 25.0;
const FORMAT_FIELD_OFFSET: f64 = 44.0;
const IFID_FIELD_OFFSET: f64 = 62.0;
const START_MARKER_WIDTH: f64 = 65.0;
const START_MARKER_HEIGHT: f64 = 35.0;

/// Title given to starter stories.
pub const TEMPLATE_STORY_TITLE: &str = "Untitled Story";
/// Start passage of starter stories.
pub const TEMPLATE_FIRST_PASSAGE: &str = "My First Passage";
/// Passage carrying the format cheat sheet in starter stories.
pub const TEMPLATE_REFERENCE_PASSAGE: &str = "Template Passage to Copy/Paste";
const TEMPLATE_FIRST_TEXT: &str = "Lorem ipsum dolor sit amet...";

/// Board objects created by one projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedStory {
    pub container: ItemId,
    pub title_field: ItemId,
    pub format_field: ItemId,
    pub ifid_field: ItemId,
    pub start_marker: ItemId,
    /// Passage name -> card, in passage order.
    pub cards: Vec<(String, ItemId)>,
    /// Tag title -> tag object used by the cards.
    pub tags: BTreeMap<String, ItemId>,
    pub connectors: Vec<ItemId>,
    /// Resolved format written to the format field.
    pub format: FormatId,
}

impl ProjectedStory {
    /// Card created for the passage named `name`.
    pub fn card(&self, name: &str) -> Option<ItemId> {
        self.cards
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, id)| *id)
    }
}

/// Projection service over one board.
pub struct ProjectionService<'a, B: Board> {
    board: &'a mut B,
    config: &'a EngineConfig,
}

impl<'a, B: Board> ProjectionService<'a, B> {
    pub fn new(board: &'a mut B, config: &'a EngineConfig) -> Self {
        Self { board, config }
    }

    /// Projects `story` into a new container centered on the viewport.
    pub fn project(&mut self, story: &Story) -> StoryResult<ProjectedStory> {
        let started_at = Instant::now();
        info!(
            "event=story_project module=projection status=start passages={}",
            story.passages.len()
        );

        match self.project_inner(story) {
            Ok(projected) => {
                info!(
                    "event=story_project module=projection status=ok passages={} tags={} connectors={} duration_ms={}",
                    projected.cards.len(),
                    projected.tags.len(),
                    projected.connectors.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(projected)
            }
            Err(err) => {
                error!(
                    "event=story_project module=projection status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                notify_failure(&mut *self.board, "projection", &err);
                Err(err)
            }
        }
    }

    /// Creates and projects a starter story for `format`, or the registry
    /// default when `format` is `None`.
    pub fn create_template(&mut self, format: Option<&str>) -> StoryResult<ProjectedStory> {
        let story = template_story(self.config, format)?;
        self.project(&story)
    }

    fn project_inner(&mut self, story: &Story) -> StoryResult<ProjectedStory> {
        if story.passages.is_empty() {
            return Err(StoryError::MissingField(FieldKind::Passages));
        }
        if let Some(name) = story.duplicate_passage_name() {
            return Err(StoryError::DuplicatePassage(name.to_string()));
        }
        if story.start_passage().is_none() {
            warn!(
                "event=story_project module=projection status=warn reason=start_not_found fallback=first_passage"
            );
        }

        let format = self
            .config
            .formats
            .resolve(&story.format, Some(story.format_version.as_str()))?;
        let graph = StoryGraph::from_story(story);
        let layout = GraphLayout::compute(&graph, &self.config.layout);

        let container = self.create_container(&layout)?;
        let title_field = self.create_header(container, story)?;
        let format_field = self.create_format_field(container, &format)?;
        let ifid_field = self.create_ifid_field(container, story)?;

        let start_position = layout
            .container_position(NodeId::START)
            .ok_or(StoryError::MissingField(FieldKind::StartMarker))?;
        let start_marker = self.create_start_marker(container, start_position.x, start_position.y)?;

        let tags = self.resolve_tags(story)?;

        let mut items: BTreeMap<NodeId, ItemId> = BTreeMap::new();
        items.insert(NodeId::START, start_marker);
        let mut cards = Vec::with_capacity(story.passages.len());
        for (node, index) in graph.map().passage_nodes() {
            let passage = &story.passages[index];
            let position = layout
                .container_position(node)
                .ok_or(StoryError::MissingField(FieldKind::Passages))?;
            let card = self.create_passage_card(container, passage, &tags, position.x, position.y)?;
            items.insert(node, card);
            cards.push((passage.name.clone(), card));
        }

        let mut connectors = Vec::with_capacity(graph.edges().len());
        for edge in graph.edges() {
            if let (Some(start), Some(end)) = (items.get(&edge.source), items.get(&edge.target)) {
                connectors.push(self.board.create_connector(*start, *end)?);
            }
        }

        self.board.zoom_to(container)?;
        self.board.notify(
            NoticeLevel::Info,
            &format!("Story \"{}\" has been added to the board!", story.name),
        )?;

        Ok(ProjectedStory {
            container,
            title_field,
            format_field,
            ifid_field,
            start_marker,
            cards,
            tags,
            connectors,
            format,
        })
    }

    fn create_container(&mut self, layout: &GraphLayout) -> StoryResult<ItemId> {
        let (width, height) = layout.container_size();
        let (x, y) = self.board.viewport()?.center();
        Ok(self.board.create_frame(FrameSpec {
            title: self.config.container_title.clone(),
            placement: Placement {
                x,
                y,
                width,
                height: Some(height),
            },
            fill_color: FRAME_FILL.to_string(),
        })?)
    }

    /// Creates the decorative label and the title field; returns the field.
    fn create_header(&mut self, container: ItemId, story: &Story) -> StoryResult<ItemId> {
        let padding = self.config.layout.padding;
        let label_x = padding + LABEL_WIDTH / 2.0;
        let label_y = padding + LABEL_HEIGHT / 2.0;

        self.board.create_text(
            container,
            TextSpec {
                content: "<p><i>Story Title</i></p>".to_string(),
                placement: Placement {
                    x: label_x,
                    y: label_y,
                    width: LABEL_WIDTH,
                    height: None,
                },
                color: LABEL_COLOR.to_string(),
            },
        )?;

        let field = self.board.create_shape(
            container,
            ShapeSpec {
                content: format!("<p><b>{}</b></p>", escape_angles(&story.name)),
                shape: ShapeKind::RoundRectangle,
                placement: Placement {
                    x: label_x + 1.0,
                    y: label_y + TITLE_FIELD_OFFSET,
                    width: LABEL_WIDTH,
                    height: Some(TITLE_FIELD_HEIGHT),
                },
                color: FIELD_COLOR.to_string(),
            },
        )?;
        self.mark(field, CanvasRole::TitleField)?;
        Ok(field)
    }

    fn create_format_field(&mut self, container: ItemId, format: &FormatId) -> StoryResult<ItemId> {
        let padding = self.config.layout.padding;
        let field = self.board.create_text(
            container,
            TextSpec {
                content: format!("<p>{}</p>", escape_angles(&format.title())),
                placement: Placement {
                    x: padding + LABEL_WIDTH / 2.0,
                    y: padding + LABEL_HEIGHT / 2.0 + FORMAT_FIELD_OFFSET,
                    width: LABEL_WIDTH,
                    height: None,
                },
                color: LABEL_COLOR.to_string(),
            },
        )?;
        self.mark(field, CanvasRole::FormatField)?;
        Ok(field)
    }

    fn create_ifid_field(&mut self, container: ItemId, story: &Story) -> StoryResult<ItemId> {
        let padding = self.config.layout.padding;
        let field = self.board.create_text(
            container,
            TextSpec {
                content: format!("<p>{}</p>", escape_angles(&story.ifid)),
                placement: Placement {
                    x: padding + IFID_WIDTH / 2.0,
                    y: padding + LABEL_HEIGHT / 2.0 + IFID_FIELD_OFFSET,
                    width: IFID_WIDTH,
                    height: None,
                },
                color: LABEL_COLOR.to_string(),
            },
        )?;
        self.mark(field, CanvasRole::IfidField)?;
        Ok(field)
    }

    fn create_start_marker(&mut self, container: ItemId, x: f64, y: f64) -> StoryResult<ItemId> {
        let marker = self.board.create_shape(
            container,
            ShapeSpec {
                content: "<p><b>START</b></p>".to_string(),
                shape: ShapeKind::Circle,
                placement: Placement {
                    x,
                    y,
                    width: START_MARKER_WIDTH,
                    height: Some(START_MARKER_HEIGHT),
                },
                color: ACCENT_COLOR.to_string(),
            },
        )?;
        self.mark(marker, CanvasRole::StartMarker)?;
        Ok(marker)
    }

    fn create_passage_card(
        &mut self,
        container: ItemId,
        passage: &Passage,
        tags: &BTreeMap<String, ItemId>,
        x: f64,
        y: f64,
    ) -> StoryResult<ItemId> {
        let tag_ids: BTreeSet<ItemId> = passage
            .tags
            .iter()
            .filter_map(|tag| tags.get(tag.trim()).copied())
            .collect();
        let card = self.board.create_card(
            container,
            CardSpec {
                title: escape_angles(&passage.name),
                description: encode_description(&passage.text),
                tag_ids: tag_ids.into_iter().collect(),
                placement: Placement {
                    x,
                    y,
                    width: self.config.layout.card_width,
                    height: None,
                },
                theme: ACCENT_COLOR.to_string(),
            },
        )?;
        self.mark(card, CanvasRole::PassageCard)?;
        Ok(card)
    }

    /// Maps every tag used by the story to a board tag, creating missing ones.
    ///
    /// Titles are compared as plain text after trimming, both on the story
    /// side and on the board side.
    fn resolve_tags(&mut self, story: &Story) -> StoryResult<BTreeMap<String, ItemId>> {
        let mut existing: BTreeMap<String, ItemId> = BTreeMap::new();
        for tag in self.board.list_tags()? {
            existing.entry(plain_text(&tag.title)).or_insert(tag.id);
        }

        let mut resolved = BTreeMap::new();
        for title in story.tag_titles() {
            let id = match existing.get(title) {
                Some(id) => *id,
                None => {
                    let id = self.board.create_tag(title)?;
                    existing.insert(title.to_string(), id);
                    id
                }
            };
            resolved.insert(title.to_string(), id);
        }
        Ok(resolved)
    }

    fn mark(&mut self, item: ItemId, role: CanvasRole) -> StoryResult<()> {
        self.board
            .set_metadata(item, &self.config.metadata_key, RoleRecord::new(role).to_value())?;
        Ok(())
    }
}

/// Builds the starter story used by `create_template`.
pub fn template_story(config: &EngineConfig, format: Option<&str>) -> StoryResult<Story> {
    let formats = &config.formats;
    let (id, entry) = match format {
        Some(name) => {
            let id = formats.resolve_title(name)?;
            let entry = formats.get(&id.title());
            (id, entry)
        }
        None => (formats.default_format()?, formats.default_entry()),
    };
    let template = entry
        .map(|entry| entry.template.clone())
        .unwrap_or_default();

    let mut story = Story::new(TEMPLATE_STORY_TITLE);
    story.format = id.name;
    story.format_version = id.version;
    story.start = TEMPLATE_FIRST_PASSAGE.to_string();
    story.passages = vec![
        Passage::new(TEMPLATE_FIRST_PASSAGE, TEMPLATE_FIRST_TEXT),
        Passage::new(TEMPLATE_REFERENCE_PASSAGE, template),
    ];
    Ok(story)
}
