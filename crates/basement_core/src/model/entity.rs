//! Shared entity vocabulary: kinds, ids, parent references, basic info.
//!
//! # Responsibility
//! - Define the four entity kinds and which kinds may contain which.
//! - Define the single tagged parent reference every child row carries.
//! - Validate the attributes every entity shares.
//!
//! # Invariants
//! - `EntityId` is stable and never reassigned to another entity.
//! - A child holds at most one parent, expressed as one `ParentRef`.
//! - Areas never have a parent.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier shared by all entity kinds.
pub type EntityId = Uuid;

/// Maximum label length in characters.
pub const LABEL_MAX_CHARS: usize = 128;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 256;

static QR_CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{N}]*$").unwrap_or_else(|err| panic!("invalid qr code pattern: {err}"))
});

/// Kind of an inventory entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Item,
    Box,
    Shelf,
    Area,
}

impl EntityKind {
    /// All kinds in containment order, leaves first.
    pub const ALL: [EntityKind; 4] = [Self::Item, Self::Box, Self::Shelf, Self::Area];

    /// Stable storage tag, also used in projection rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Box => "box",
            Self::Shelf => "shelf",
            Self::Area => "area",
        }
    }

    /// Parses a storage tag produced by [`EntityKind::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "item" => Some(Self::Item),
            "box" => Some(Self::Box),
            "shelf" => Some(Self::Shelf),
            "area" => Some(Self::Area),
            _ => None,
        }
    }

    /// Primary table holding rows of this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::Item => "items",
            Self::Box => "boxes",
            Self::Shelf => "shelves",
            Self::Area => "areas",
        }
    }

    /// Kinds allowed as the parent of this kind.
    pub fn allowed_parents(self) -> &'static [EntityKind] {
        match self {
            Self::Item | Self::Box => &[Self::Box, Self::Shelf, Self::Area],
            Self::Shelf => &[Self::Area],
            Self::Area => &[],
        }
    }

    /// Kinds that may be stored directly inside this kind.
    pub fn allowed_children(self) -> &'static [EntityKind] {
        match self {
            Self::Item => &[],
            Self::Box => &[Self::Item, Self::Box],
            Self::Shelf => &[Self::Item, Self::Box],
            Self::Area => &[Self::Item, Self::Box, Self::Shelf],
        }
    }

    pub fn can_contain(self, child: EntityKind) -> bool {
        child.allowed_parents().contains(&self)
    }

    pub fn is_container(self) -> bool {
        !self.allowed_children().is_empty()
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference from a child row to the container holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl ParentRef {
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }

    pub fn area(id: EntityId) -> Self {
        Self::new(EntityKind::Area, id)
    }

    pub fn shelf(id: EntityId) -> Self {
        Self::new(EntityKind::Shelf, id)
    }

    pub fn storage_box(id: EntityId) -> Self {
        Self::new(EntityKind::Box, id)
    }
}

impl Display for ParentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Attributes shared by every entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub id: EntityId,
    /// Required, non-blank, at most [`LABEL_MAX_CHARS`] characters.
    pub label: String,
    pub description: Option<String>,
    /// Base64 encoded PNG or JPEG.
    pub picture: Option<String>,
    /// Derived from `picture` by the repositories; caller values are ignored.
    pub preview_picture: Option<String>,
    pub qr_code: Option<String>,
}

impl BasicInfo {
    /// Creates basic info with a generated id.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), label)
    }

    /// Creates basic info with a caller-provided id.
    pub fn with_id(id: EntityId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            description: None,
            picture: None,
            preview_picture: None,
            qr_code: None,
        }
    }

    /// Validates label, description and qr code bounds.
    pub fn validate(&self) -> Result<(), EntityValidationError> {
        if self.label.trim().is_empty() {
            return Err(EntityValidationError::EmptyLabel);
        }
        let label_chars = self.label.chars().count();
        if label_chars > LABEL_MAX_CHARS {
            return Err(EntityValidationError::LabelTooLong {
                max: LABEL_MAX_CHARS,
                actual: label_chars,
            });
        }
        if let Some(description) = &self.description {
            let chars = description.chars().count();
            if chars > DESCRIPTION_MAX_CHARS {
                return Err(EntityValidationError::DescriptionTooLong {
                    max: DESCRIPTION_MAX_CHARS,
                    actual: chars,
                });
            }
        }
        if let Some(qr_code) = &self.qr_code {
            if !QR_CODE_PATTERN.is_match(qr_code) {
                return Err(EntityValidationError::InvalidQrCode);
            }
        }
        Ok(())
    }
}

/// Common surface the repositories need from every entity kind.
pub trait Entity {
    const KIND: EntityKind;

    fn info(&self) -> &BasicInfo;

    fn parent(&self) -> Option<ParentRef>;

    fn id(&self) -> EntityId {
        self.info().id
    }

    fn validate(&self) -> Result<(), EntityValidationError> {
        self.info().validate()
    }
}

/// Field-level validation failure raised before any SQL runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityValidationError {
    EmptyLabel,
    LabelTooLong { max: usize, actual: usize },
    DescriptionTooLong { max: usize, actual: usize },
    InvalidQrCode,
    NegativeQuantity(i64),
    NonNumericWeight(String),
}

impl Display for EntityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLabel => write!(f, "label must not be blank"),
            Self::LabelTooLong { max, actual } => {
                write!(f, "label has {actual} characters, at most {max} allowed")
            }
            Self::DescriptionTooLong { max, actual } => {
                write!(f, "description has {actual} characters, at most {max} allowed")
            }
            Self::InvalidQrCode => write!(f, "qr code must contain only letters and digits"),
            Self::NegativeQuantity(value) => write!(f, "quantity must be >= 0, got {value}"),
            Self::NonNumericWeight(value) => write!(f, "weight `{value}` is not numeric"),
        }
    }
}

impl Error for EntityValidationError {}
