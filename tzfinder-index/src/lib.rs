//! Offline compiler for the tzfinder time-zone index.
//!
//! Turns a GeoJSON `FeatureCollection` of time-zone boundary polygons into
//! the compact binary tree the lookup crate serves from. The pipeline:
//!
//! ```text
//! GeoJSON ──load_sources──▶ SourceTable
//!                               │ build_tree (parallel subdivision)
//!                               ▼
//!                          BuildOutput (mutable nodes + overflow table)
//!                               │ consolidate (candidate push-down + sampling)
//!                               ▼
//!                             Tree ──write_tree──▶ gzip byte stream
//! ```
//!
//! [`compile`] runs the whole pipeline; the stages are public for callers
//! that want to cache intermediates. All stages observe a cooperative
//! cancellation flag and report through the [`progress::Progress`]
//! observer.
//!
//! Write side only: the matching deserializer lives in `tzfinder-lookup`.

pub mod build;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod loader;
pub mod progress;
pub mod queue;
pub mod writer;

use std::io::Read;
use std::sync::atomic::AtomicBool;

use tzfinder_core::{Node, Tree};

pub use build::{build_tree, BuildOutput};
pub use config::BuildConfig;
pub use consolidate::consolidate;
pub use error::{BuildError, Result};
pub use loader::load_sources;
pub use progress::{NoopProgress, Progress, ProgressStep};
pub use writer::{write_tree, write_tree_to_path};

/// Shape statistics of a compiled tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub sources: usize,
    pub rings_included: usize,
    pub rings_excluded: usize,
    pub node_count: u64,
    pub leaf_count: u64,
    pub multi_index_leaves: u64,
    pub max_depth: u8,
}

impl BuildStats {
    /// Measure a consolidated tree.
    pub fn of(tree: &Tree) -> Self {
        let mut stats = Self {
            node_count: tree.node_count,
            ..Self::default()
        };
        fn walk(node: &Node, depth: u8, stats: &mut BuildStats) {
            match &node.children {
                Some(pair) => {
                    walk(&pair.0, depth + 1, stats);
                    walk(&pair.1, depth + 1, stats);
                }
                None => {
                    stats.leaf_count += 1;
                    if node.index.second() != 0 {
                        stats.multi_index_leaves += 1;
                    }
                    stats.max_depth = stats.max_depth.max(depth);
                }
            }
        }
        walk(&tree.root, 0, &mut stats);
        stats
    }
}

/// Run the full pipeline: load, build, consolidate.
pub fn compile<R: Read>(
    reader: R,
    config: &BuildConfig,
    progress: &dyn Progress,
    cancel: &AtomicBool,
) -> Result<(Tree, BuildStats)> {
    let sources = load_sources(reader, config, progress)?;
    let rings_included: usize = sources.iter().map(|s| s.included.len()).sum();
    let rings_excluded: usize = sources.iter().map(|s| s.excluded.len()).sum();

    let output = build_tree(&sources, config, progress, cancel)?;
    let tree = consolidate(output, &sources, config, progress, cancel)?;

    let stats = BuildStats {
        sources: sources.len(),
        rings_included,
        rings_excluded,
        ..BuildStats::of(&tree)
    };
    tracing::info!(
        sources = stats.sources,
        nodes = stats.node_count,
        leaves = stats.leaf_count,
        multi_index_leaves = stats.multi_index_leaves,
        max_depth = stats.max_depth,
        "tree compiled"
    );
    Ok((tree, stats))
}
