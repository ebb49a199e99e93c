//! Lightweight list/table read models served from the search projection.

use crate::model::entity::{EntityId, EntityKind, ParentRef};
use serde::{Deserialize, Serialize};

/// Immediate parent of a summarized entity, label included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentSummary {
    pub kind: EntityKind,
    pub id: EntityId,
    pub label: String,
}

impl ParentSummary {
    pub fn parent_ref(&self) -> ParentRef {
        ParentRef::new(self.kind, self.id)
    }
}

/// Minimal fields needed to render one list/table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub id: EntityId,
    pub kind: EntityKind,
    pub label: String,
    pub description: Option<String>,
    pub preview_picture: Option<String>,
    pub parent: Option<ParentSummary>,
}

impl SummaryRow {
    pub fn parent_id(&self) -> Option<EntityId> {
        self.parent.as_ref().map(|parent| parent.id)
    }

    pub fn parent_label(&self) -> Option<&str> {
        self.parent.as_ref().map(|parent| parent.label.as_str())
    }
}
