//! Inventory domain model.
//!
//! # Responsibility
//! - Define the four entity kinds (area, shelf, box, item) and their records.
//! - Define the summary rows served by listing and search.
//!
//! # Invariants
//! - Every entity is identified by a stable `EntityId`.
//! - Containment is expressed by one optional `ParentRef` per child.

pub mod area;
pub mod entity;
pub mod item;
pub mod shelf;
pub mod storage_box;
pub mod summary;
