//! Box: nestable container for items and other boxes.

use crate::model::entity::{BasicInfo, Entity, EntityId, EntityKind, ParentRef};
use crate::model::summary::SummaryRow;

/// Box record. Named `StorageBox` to stay clear of `std::boxed::Box`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageBox {
    pub info: BasicInfo,
    /// Outer box, shelf or area holding this box.
    pub parent: Option<ParentRef>,
    /// Items stored directly in this box. Filled by `get_box` only.
    pub items: Vec<SummaryRow>,
    /// Boxes stored directly in this box. Filled by `get_box` only.
    pub inner_boxes: Vec<SummaryRow>,
    /// Summary of `parent`. Filled by `get_box` only.
    pub parent_row: Option<SummaryRow>,
}

impl StorageBox {
    pub fn new(label: impl Into<String>) -> Self {
        Self::from_info(BasicInfo::new(label))
    }

    pub fn with_id(id: EntityId, label: impl Into<String>) -> Self {
        Self::from_info(BasicInfo::with_id(id, label))
    }

    pub fn from_info(info: BasicInfo) -> Self {
        Self {
            info,
            parent: None,
            items: Vec::new(),
            inner_boxes: Vec::new(),
            parent_row: None,
        }
    }

    pub fn inside(mut self, parent: ParentRef) -> Self {
        self.parent = Some(parent);
        self
    }
}

impl Entity for StorageBox {
    const KIND: EntityKind = EntityKind::Box;

    fn info(&self) -> &BasicInfo {
        &self.info
    }

    fn parent(&self) -> Option<ParentRef> {
        self.parent
    }
}
