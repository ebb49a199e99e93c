//! Area: the root of the containment hierarchy.

use crate::model::entity::{BasicInfo, Entity, EntityId, EntityKind, ParentRef};
use crate::model::summary::SummaryRow;

#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub info: BasicInfo,
    /// Shelves stored directly in this area. Filled by `get_area` only.
    pub shelves: Vec<SummaryRow>,
    /// Boxes stored directly in this area. Filled by `get_area` only.
    pub boxes: Vec<SummaryRow>,
    /// Items stored directly in this area. Filled by `get_area` only.
    pub items: Vec<SummaryRow>,
}

impl Area {
    pub fn new(label: impl Into<String>) -> Self {
        Self::from_info(BasicInfo::new(label))
    }

    pub fn with_id(id: EntityId, label: impl Into<String>) -> Self {
        Self::from_info(BasicInfo::with_id(id, label))
    }

    pub fn from_info(info: BasicInfo) -> Self {
        Self {
            info,
            shelves: Vec::new(),
            boxes: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shelves.is_empty() && self.boxes.is_empty() && self.items.is_empty()
    }
}

impl Entity for Area {
    const KIND: EntityKind = EntityKind::Area;

    fn info(&self) -> &BasicInfo {
        &self.info
    }

    fn parent(&self) -> Option<ParentRef> {
        None
    }
}
