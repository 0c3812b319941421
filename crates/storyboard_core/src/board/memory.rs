//! In-process board implementation.
//!
//! # Responsibility
//! - Provide a complete `Board` without a remote platform, for the CLI and
//!   for tests.
//! - Offer author-side edit helpers (rename, retag, reconnect, delete) that
//!   mimic manual changes made on a real canvas.
//!
//! # Invariants
//! - Listing order is creation order.
//! - Deleting an item also deletes connectors touching it.

use super::{
    Board, BoardError, BoardItem, BoardResult, CardSpec, Connector, FrameSpec, ItemId, ItemKind,
    NoticeLevel, Placement, ShapeSpec, TextSpec, Viewport,
};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

const DEFAULT_VIEWPORT: Viewport = Viewport {
    x: -960.0,
    y: -540.0,
    width: 1920.0,
    height: 1080.0,
};

/// Board state kept entirely in memory.
#[derive(Debug, Clone)]
pub struct InMemoryBoard {
    items: BTreeMap<ItemId, BoardItem>,
    order: Vec<ItemId>,
    connectors: Vec<Connector>,
    metadata: BTreeMap<(ItemId, String), Value>,
    viewport: Viewport,
    notices: Vec<(NoticeLevel, String)>,
}

impl Default for InMemoryBoard {
    fn default() -> Self {
        Self::with_viewport(DEFAULT_VIEWPORT)
    }
}

impl InMemoryBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(viewport: Viewport) -> Self {
        Self {
            items: BTreeMap::new(),
            order: Vec::new(),
            connectors: Vec::new(),
            metadata: BTreeMap::new(),
            viewport,
            notices: Vec::new(),
        }
    }

    /// Returns notifications in the order they were raised.
    pub fn notices(&self) -> &[(NoticeLevel, String)] {
        &self.notices
    }

    /// Returns all connectors on the board.
    pub fn all_connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Lists items of one kind in creation order.
    pub fn items_of_kind(&self, kind: ItemKind) -> Vec<&BoardItem> {
        self.order
            .iter()
            .filter_map(|id| self.items.get(id))
            .filter(|item| item.kind == kind)
            .collect()
    }

    /// Renames an item the way an author would edit its visible title.
    pub fn set_title(&mut self, id: ItemId, title: impl Into<String>) -> BoardResult<()> {
        let item = self.items.get_mut(&id).ok_or(BoardError::ItemNotFound(id))?;
        item.title = title.into();
        Ok(())
    }

    /// Replaces the tag set attached to a card.
    pub fn set_tag_ids(&mut self, id: ItemId, tag_ids: Vec<ItemId>) -> BoardResult<()> {
        let item = self.items.get_mut(&id).ok_or(BoardError::ItemNotFound(id))?;
        if item.kind != ItemKind::Card {
            return Err(BoardError::Rejected(format!("item {id} is not a card")));
        }
        item.tag_ids = tag_ids;
        Ok(())
    }

    /// Deletes one connector.
    pub fn remove_connector(&mut self, id: ItemId) -> BoardResult<()> {
        let before = self.connectors.len();
        self.connectors.retain(|connector| connector.id != id);
        if self.connectors.len() == before {
            return Err(BoardError::ItemNotFound(id));
        }
        Ok(())
    }

    /// Deletes one item, its metadata, and connectors touching it.
    ///
    /// Children of a deleted frame stay on the board as top-level items.
    pub fn remove_item(&mut self, id: ItemId) -> BoardResult<()> {
        self.items.remove(&id).ok_or(BoardError::ItemNotFound(id))?;
        self.order.retain(|candidate| *candidate != id);
        self.connectors
            .retain(|connector| connector.start != id && connector.end != id);
        self.metadata.retain(|(item_id, _), _| *item_id != id);
        for item in self.items.values_mut() {
            if item.parent_id == Some(id) {
                item.parent_id = None;
            }
            item.tag_ids.retain(|tag_id| *tag_id != id);
        }
        Ok(())
    }

    fn insert(
        &mut self,
        kind: ItemKind,
        parent_id: Option<ItemId>,
        title: String,
        description: String,
        tag_ids: Vec<ItemId>,
        placement: Placement,
    ) -> ItemId {
        let id = Uuid::new_v4();
        self.items.insert(
            id,
            BoardItem {
                id,
                kind,
                parent_id,
                title,
                description,
                tag_ids,
                placement,
            },
        );
        self.order.push(id);
        id
    }

    fn ensure_frame(&self, id: ItemId) -> BoardResult<()> {
        match self.items.get(&id) {
            None => Err(BoardError::ItemNotFound(id)),
            Some(item) if item.kind != ItemKind::Frame => Err(BoardError::NotAFrame(id)),
            Some(_) => Ok(()),
        }
    }

    fn ensure_exists(&self, id: ItemId) -> BoardResult<()> {
        if self.items.contains_key(&id) {
            Ok(())
        } else {
            Err(BoardError::ItemNotFound(id))
        }
    }
}

impl Board for InMemoryBoard {
    fn viewport(&self) -> BoardResult<Viewport> {
        Ok(self.viewport)
    }

    fn zoom_to(&mut self, item: ItemId) -> BoardResult<()> {
        let target = self.items.get(&item).ok_or(BoardError::ItemNotFound(item))?;
        let height = target.placement.height.unwrap_or(target.placement.width);
        self.viewport = Viewport {
            x: target.placement.x - target.placement.width / 2.0,
            y: target.placement.y - height / 2.0,
            width: target.placement.width,
            height,
        };
        Ok(())
    }

    fn create_frame(&mut self, spec: FrameSpec) -> BoardResult<ItemId> {
        Ok(self.insert(
            ItemKind::Frame,
            None,
            spec.title,
            String::new(),
            Vec::new(),
            spec.placement,
        ))
    }

    fn create_text(&mut self, parent: ItemId, spec: TextSpec) -> BoardResult<ItemId> {
        self.ensure_frame(parent)?;
        Ok(self.insert(
            ItemKind::Text,
            Some(parent),
            spec.content,
            String::new(),
            Vec::new(),
            spec.placement,
        ))
    }

    fn create_shape(&mut self, parent: ItemId, spec: ShapeSpec) -> BoardResult<ItemId> {
        self.ensure_frame(parent)?;
        Ok(self.insert(
            ItemKind::Shape,
            Some(parent),
            spec.content,
            String::new(),
            Vec::new(),
            spec.placement,
        ))
    }

    fn create_card(&mut self, parent: ItemId, spec: CardSpec) -> BoardResult<ItemId> {
        self.ensure_frame(parent)?;
        for tag_id in &spec.tag_ids {
            match self.items.get(tag_id) {
                Some(item) if item.kind == ItemKind::Tag => {}
                _ => return Err(BoardError::ItemNotFound(*tag_id)),
            }
        }
        Ok(self.insert(
            ItemKind::Card,
            Some(parent),
            spec.title,
            spec.description,
            spec.tag_ids,
            spec.placement,
        ))
    }

    fn create_connector(&mut self, start: ItemId, end: ItemId) -> BoardResult<ItemId> {
        self.ensure_exists(start)?;
        self.ensure_exists(end)?;
        let id = Uuid::new_v4();
        self.connectors.push(Connector { id, start, end });
        Ok(id)
    }

    fn create_tag(&mut self, title: &str) -> BoardResult<ItemId> {
        if title.trim().is_empty() {
            return Err(BoardError::Rejected("tag title must not be blank".to_string()));
        }
        Ok(self.insert(
            ItemKind::Tag,
            None,
            title.to_string(),
            String::new(),
            Vec::new(),
            Placement {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: None,
            },
        ))
    }

    fn get_item(&self, id: ItemId) -> BoardResult<Option<BoardItem>> {
        Ok(self.items.get(&id).cloned())
    }

    fn list_frames(&self) -> BoardResult<Vec<BoardItem>> {
        Ok(self
            .items_of_kind(ItemKind::Frame)
            .into_iter()
            .cloned()
            .collect())
    }

    fn list_tags(&self) -> BoardResult<Vec<BoardItem>> {
        Ok(self
            .items_of_kind(ItemKind::Tag)
            .into_iter()
            .cloned()
            .collect())
    }

    fn children(&self, frame: ItemId) -> BoardResult<Vec<ItemId>> {
        self.ensure_frame(frame)?;
        Ok(self
            .order
            .iter()
            .filter(|id| {
                self.items
                    .get(id)
                    .is_some_and(|item| item.parent_id == Some(frame))
            })
            .copied()
            .collect())
    }

    fn connectors(&self, item: ItemId) -> BoardResult<Vec<Connector>> {
        self.ensure_exists(item)?;
        Ok(self
            .connectors
            .iter()
            .filter(|connector| connector.start == item || connector.end == item)
            .copied()
            .collect())
    }

    fn set_metadata(&mut self, item: ItemId, key: &str, value: Value) -> BoardResult<()> {
        self.ensure_exists(item)?;
        self.metadata.insert((item, key.to_string()), value);
        Ok(())
    }

    fn metadata(&self, item: ItemId, key: &str) -> BoardResult<Option<Value>> {
        self.ensure_exists(item)?;
        Ok(self.metadata.get(&(item, key.to_string())).cloned())
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) -> BoardResult<()> {
        self.notices.push((level, message.to_string()));
        Ok(())
    }
}
