//! Canvas role model.
//!
//! # Responsibility
//! - Name the roles a canvas object can play inside a story container.
//! - Define the out-of-band discriminant record attached to role objects.
//!
//! # Invariants
//! - Role is decided by the discriminant record, never by visual style.
//! - `Container` is identified structurally (reserved frame title) and is
//!   never written as a discriminant.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of one canvas object inside a story container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanvasRole {
    /// Frame grouping one story. Identified by its title, not by metadata.
    #[serde(skip)]
    Container,
    /// Shape whose content is the story name.
    TitleField,
    /// Text whose content is `name-version` of the story format.
    FormatField,
    /// Text whose content is the story IFID.
    IfidField,
    /// Shape whose single outgoing connector points at the start passage.
    #[serde(rename = "start-node")]
    StartMarker,
    /// Card holding one passage.
    PassageCard,
}

impl CanvasRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::TitleField => "title-field",
            Self::FormatField => "format-field",
            Self::IfidField => "ifid-field",
            Self::StartMarker => "start-node",
            Self::PassageCard => "passage-card",
        }
    }
}

/// Discriminant record stored under the engine metadata key.
///
/// Serialized as `{"type": "<role>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    #[serde(rename = "type")]
    pub role: CanvasRole,
}

impl RoleRecord {
    pub fn new(role: CanvasRole) -> Self {
        Self { role }
    }

    pub fn to_value(self) -> Value {
        // A one-field struct over a unit enum always serializes.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Reads a record back. Unknown roles and foreign payloads yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value::<Self>(value.clone()).ok()
    }
}
