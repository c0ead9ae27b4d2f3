//! Constant-time IANA time-zone lookup.
//!
//! Loads the binary tree produced by `tzfinder-index` once and answers
//! "which time zone(s) apply at this coordinate" by a log-depth descent
//! through the alternating-axis partition, with no polygon math at query
//! time. Ocean coordinates synthesize an `Etc/GMT±k` id from the
//! longitude.
//!
//! Two entry points:
//!
//! - [`TimeZoneLookup`]: an owned handle over one loaded tree. Cheap to
//!   query, fully re-entrant, never mutates.
//! - [`facade`]: a process-wide singleton around one lazily-loaded
//!   handle, for hosts that want `facade::id_at(lon, lat)` without
//!   threading a handle through their call graph.
//!
//! Read side only: serialization lives in `tzfinder-index`.

pub mod error;
pub mod facade;
pub mod lookup;
pub mod reader;

pub use error::{LookupError, Result};
pub use lookup::{etc_gmt, TimeZoneLookup};
pub use reader::read_tree;
