//! Core data model for the tzfinder spatial time-zone index.
//!
//! This crate holds everything shared between the offline index builder
//! (`tzfinder-index`) and the online lookup (`tzfinder-lookup`):
//!
//! - [`geometry`]: positions, bounding boxes, level-parity bisection
//! - [`ring`]: polygon rings, vertex reduction, the 4-vertex edge window
//! - [`predicate`]: segment crossing, point-in-ring, box/ring classification
//! - [`index`]: packed small sets of time-zone indices (2/4/8 slots)
//! - [`source`]: per-feature polygon sources and the id table
//! - [`tree`]: build-phase and frozen tree nodes
//!
//! # Architecture
//!
//! The world is partitioned by an alternating-axis binary space partition:
//! even levels bisect longitude, odd levels bisect latitude, so that a
//! root-to-leaf path spells out a geohash-compatible bit string. Leaves
//! carry up to two 1-based time-zone indices into the id table; index `0`
//! means open ocean.
//!
//! ```text
//! GeoJSON ──loader──▶ SourceTable ──builder──▶ BuildNode tree
//!                                                   │ consolidate
//!                                                   ▼
//!                        file ◀──serialize── Tree (frozen Node tree + ids)
//!                          │
//!                          └──deserialize──▶ lookup descent
//! ```
//!
//! Build-phase nodes ([`tree::BuildNode`]) have interior mutability so that
//! worker threads can claim cells concurrently; the consolidation pass
//! converts them into immutable [`tree::Node`]s, after which nothing in
//! this crate mutates.

pub mod geometry;
pub mod index;
pub mod predicate;
pub mod ring;
pub mod source;
pub mod tree;

pub use geometry::{BBox, Position};
pub use index::{TimeZoneIndex, TimeZoneIndex2, TimeZoneIndex8};
pub use ring::Ring;
pub use source::{SourceTable, TimeZoneSource};
pub use tree::{BuildNode, Node, Tree};
