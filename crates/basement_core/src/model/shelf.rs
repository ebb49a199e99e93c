//! Shelf: physical rack inside an optional area.

use crate::model::entity::{BasicInfo, Entity, EntityId, EntityKind, ParentRef};
use crate::model::summary::SummaryRow;

/// Shelf record.
///
/// Dimensions and grid size are free-form; no sign or unit is enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct Shelf {
    pub info: BasicInfo,
    pub height: f64,
    pub width: f64,
    pub depth: f64,
    pub rows: i64,
    pub cols: i64,
    /// Only `EntityKind::Area` parents are accepted.
    pub parent: Option<ParentRef>,
    /// Items stored directly on this shelf. Filled by `get_shelf` only.
    pub items: Vec<SummaryRow>,
    /// Boxes stored directly on this shelf. Filled by `get_shelf` only.
    pub boxes: Vec<SummaryRow>,
}

impl Shelf {
    pub fn new(label: impl Into<String>) -> Self {
        Self::from_info(BasicInfo::new(label))
    }

    pub fn with_id(id: EntityId, label: impl Into<String>) -> Self {
        Self::from_info(BasicInfo::with_id(id, label))
    }

    pub fn from_info(info: BasicInfo) -> Self {
        Self {
            info,
            height: 0.0,
            width: 0.0,
            depth: 0.0,
            rows: 0,
            cols: 0,
            parent: None,
            items: Vec::new(),
            boxes: Vec::new(),
        }
    }

    pub fn in_area(mut self, area_id: EntityId) -> Self {
        self.parent = Some(ParentRef::area(area_id));
        self
    }
}

impl Entity for Shelf {
    const KIND: EntityKind = EntityKind::Shelf;

    fn info(&self) -> &BasicInfo {
        &self.info
    }

    fn parent(&self) -> Option<ParentRef> {
        self.parent
    }
}
