//! Canvas platform contract.
//!
//! # Responsibility
//! - Define the operations the engine consumes from a visual board: object
//!   creation, item/children/connector queries, metadata records, viewport
//!   control and notifications.
//! - Keep platform transport details outside of projection/extraction.
//!
//! # Invariants
//! - Children are created against an existing parent frame; a missing or
//!   non-frame parent is rejected.
//! - Child placements are relative to the parent's top-left corner.
//! - Each call completes before the next one starts; the board is the sole
//!   arbiter of consistency for shared state such as tags.

use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod memory;

/// Stable identifier of one board object.
pub type ItemId = Uuid;

/// Result type used by board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors reported by the canvas platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Referenced item does not exist on the board.
    ItemNotFound(ItemId),
    /// Referenced item exists but cannot hold children.
    NotAFrame(ItemId),
    /// Platform refused the call.
    Rejected(String),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound(id) => write!(f, "board item not found: {id}"),
            Self::NotAFrame(id) => write!(f, "board item is not a frame: {id}"),
            Self::Rejected(message) => write!(f, "board rejected the request: {message}"),
        }
    }
}

impl Error for BoardError {}

/// Structural type of a board object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Frame,
    Text,
    Shape,
    Card,
    Tag,
}

/// Outline used by shape objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    RoundRectangle,
    Circle,
}

/// Severity of a board notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Visible board area in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Position and size of a new object.
///
/// Frames use absolute center coordinates; children use coordinates relative
/// to the parent frame's top-left corner. `height: None` lets the platform
/// derive height from content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpec {
    pub title: String,
    pub placement: Placement,
    pub fill_color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    /// Rich-text content (`<p>...</p>`).
    pub content: String,
    pub placement: Placement,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSpec {
    pub content: String,
    pub shape: ShapeKind,
    pub placement: Placement,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardSpec {
    pub title: String,
    /// Rich-text description.
    pub description: String,
    pub tag_ids: Vec<ItemId>,
    pub placement: Placement,
    pub theme: String,
}

/// Read model of one board object.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardItem {
    pub id: ItemId,
    pub kind: ItemKind,
    /// Owning frame; `None` for top-level objects and tags.
    pub parent_id: Option<ItemId>,
    /// Frame title, text/shape content, card title or tag title.
    pub title: String,
    /// Card description. Empty for other kinds.
    pub description: String,
    /// Tags attached to a card. Empty for other kinds.
    pub tag_ids: Vec<ItemId>,
    pub placement: Placement,
}

/// Directed line between two board objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub id: ItemId,
    pub start: ItemId,
    pub end: ItemId,
}

/// Operations consumed from the canvas platform.
pub trait Board {
    /// Returns the currently visible area.
    fn viewport(&self) -> BoardResult<Viewport>;
    /// Moves the viewport so that `item` is fully visible.
    fn zoom_to(&mut self, item: ItemId) -> BoardResult<()>;

    /// Creates one top-level frame.
    fn create_frame(&mut self, spec: FrameSpec) -> BoardResult<ItemId>;
    /// Creates one text label inside `parent`.
    fn create_text(&mut self, parent: ItemId, spec: TextSpec) -> BoardResult<ItemId>;
    /// Creates one shape inside `parent`.
    fn create_shape(&mut self, parent: ItemId, spec: ShapeSpec) -> BoardResult<ItemId>;
    /// Creates one card inside `parent`.
    fn create_card(&mut self, parent: ItemId, spec: CardSpec) -> BoardResult<ItemId>;
    /// Creates one directed connector.
    fn create_connector(&mut self, start: ItemId, end: ItemId) -> BoardResult<ItemId>;
    /// Creates one board-level tag object.
    fn create_tag(&mut self, title: &str) -> BoardResult<ItemId>;

    /// Loads one item by id.
    fn get_item(&self, id: ItemId) -> BoardResult<Option<BoardItem>>;
    /// Lists every frame on the board.
    fn list_frames(&self) -> BoardResult<Vec<BoardItem>>;
    /// Lists every tag object on the board.
    fn list_tags(&self) -> BoardResult<Vec<BoardItem>>;
    /// Lists direct children of one frame.
    fn children(&self, frame: ItemId) -> BoardResult<Vec<ItemId>>;
    /// Lists connectors that start or end at `item`.
    fn connectors(&self, item: ItemId) -> BoardResult<Vec<Connector>>;

    /// Attaches an opaque record to `item` under `key`.
    fn set_metadata(&mut self, item: ItemId, key: &str, value: Value) -> BoardResult<()>;
    /// Reads the record stored on `item` under `key`.
    fn metadata(&self, item: ItemId, key: &str) -> BoardResult<Option<Value>>;

    /// Shows a notification to the author.
    fn notify(&mut self, level: NoticeLevel, message: &str) -> BoardResult<()>;
}
