//! Item: leaf of the containment hierarchy.

use crate::model::entity::{
    BasicInfo, Entity, EntityId, EntityKind, EntityValidationError, ParentRef,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub info: BasicInfo,
    pub quantity: i64,
    /// Free-form numeric string such as `"1.5"`; empty means unknown.
    pub weight: String,
    pub parent: Option<ParentRef>,
}

impl Item {
    pub fn new(label: impl Into<String>) -> Self {
        Self::from_info(BasicInfo::new(label))
    }

    pub fn with_id(id: EntityId, label: impl Into<String>) -> Self {
        Self::from_info(BasicInfo::with_id(id, label))
    }

    pub fn from_info(info: BasicInfo) -> Self {
        Self {
            info,
            quantity: 1,
            weight: String::new(),
            parent: None,
        }
    }

    pub fn inside(mut self, parent: ParentRef) -> Self {
        self.parent = Some(parent);
        self
    }
}

impl Entity for Item {
    const KIND: EntityKind = EntityKind::Item;

    fn info(&self) -> &BasicInfo {
        &self.info
    }

    fn parent(&self) -> Option<ParentRef> {
        self.parent
    }

    fn validate(&self) -> Result<(), EntityValidationError> {
        self.info.validate()?;
        if self.quantity < 0 {
            return Err(EntityValidationError::NegativeQuantity(self.quantity));
        }
        let weight = self.weight.trim();
        if !weight.is_empty() && weight.parse::<f64>().map_or(true, |value| !value.is_finite()) {
            return Err(EntityValidationError::NonNumericWeight(self.weight.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Item;
    use crate::model::entity::{Entity, EntityValidationError};

    #[test]
    fn weight_must_be_numeric_when_set() {
        let mut item = Item::new("Drill");
        assert!(item.validate().is_ok());

        item.weight = "2.75".to_string();
        assert!(item.validate().is_ok());

        item.weight = "heavy".to_string();
        assert_eq!(
            item.validate(),
            Err(EntityValidationError::NonNumericWeight("heavy".to_string()))
        );
    }

    #[test]
    fn quantity_must_not_be_negative() {
        let mut item = Item::new("Screws");
        item.quantity = -1;
        assert_eq!(
            item.validate(),
            Err(EntityValidationError::NegativeQuantity(-1))
        );
    }
}
