//! Parallel tree construction.
//!
//! Every included ring of every source is folded into a shared mutable
//! tree: cells fully contained by the ring claim the source's index and
//! stop; cells merely overlapping split and recurse until `max_level`,
//! where a forced claim records the partial overlap as containment
//! (imprecision bounded by the cell size). Disjoint cells contribute
//! nothing.
//!
//! Work is distributed as one item per `(source, ring)` pair through the
//! priority queue, ordered by ascending source index so a progress display
//! advances zone by zone. Workers share the tree without a global lock:
//! claims take the target node's own mutex, child creation is a
//! `OnceLock`, and the overflow side table has its own mutex. The tree
//! *shape* is deterministic regardless of scheduling because the
//! box/ring classification is pure; payload slot order is not, which the
//! consolidator's canonical normalization later absorbs.

use std::cmp::Ordering;
use std::sync::atomic::{self, AtomicBool, AtomicU32};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use tzfinder_core::predicate::box_ring_relation;
use tzfinder_core::{BBox, BuildNode, Ring, SourceTable, TimeZoneIndex2};

use crate::config::BuildConfig;
use crate::error::{BuildError, Result};
use crate::progress::{Progress, ProgressStep};
use crate::queue::WorkQueue;

/// The mutable tree plus its overflow side table, ready for
/// consolidation.
pub struct BuildOutput {
    pub root: BuildNode,
    /// Candidates that did not fit a node's two-slot payload, keyed by
    /// node id. Discarded after consolidation.
    pub multiples: FxHashMap<u32, TimeZoneIndex2>,
    pub node_count: u64,
}

/// One ring to fold into the tree. Lower source indices run first.
struct RingTask<'a> {
    index: u16,
    ring: &'a Ring,
}

impl PartialEq for RingTask<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for RingTask<'_> {}

impl PartialOrd for RingTask<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RingTask<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: reverse so the smallest source index pops first.
        other.index.cmp(&self.index)
    }
}

struct BuildContext<'a> {
    counter: &'a AtomicU32,
    multiples: &'a Mutex<FxHashMap<u32, TimeZoneIndex2>>,
    max_level: u8,
}

/// Build the subdivision tree for all sources.
pub fn build_tree(
    sources: &SourceTable,
    config: &BuildConfig,
    progress: &dyn Progress,
    cancel: &AtomicBool,
) -> Result<BuildOutput> {
    let counter = AtomicU32::new(0);
    let root = BuildNode::root(&counter);
    let multiples = Mutex::new(FxHashMap::default());

    let queue = WorkQueue::new();
    for source in sources.iter() {
        for ring in &source.included {
            queue.push(RingTask {
                index: source.index,
                ring,
            });
        }
    }
    let ring_count = queue.len();
    queue.close();

    let ctx = BuildContext {
        counter: &counter,
        multiples: &multiples,
        max_level: config.max_level,
    };

    let workers = config.effective_workers();
    std::thread::scope(|s| {
        for _ in 0..workers {
            s.spawn(|| {
                while let Some(task) = queue.pop() {
                    if cancel.load(atomic::Ordering::Relaxed) {
                        break;
                    }
                    add_ring(&root, task.index, task.ring, BBox::WORLD, 0, &ctx);
                    progress.on_progress(ProgressStep::Build, 1);
                }
            });
        }
    });

    if cancel.load(atomic::Ordering::Relaxed) {
        return Err(BuildError::Cancelled);
    }

    let node_count = counter.load(atomic::Ordering::Relaxed) as u64;
    let multiples = multiples.into_inner();
    tracing::info!(
        rings = ring_count,
        nodes = node_count,
        overflow_nodes = multiples.len(),
        workers = workers,
        "tree built"
    );

    Ok(BuildOutput {
        root,
        multiples,
        node_count,
    })
}

/// Fold one ring into the subtree rooted at `node`.
fn add_ring(node: &BuildNode, idx: u16, ring: &Ring, bbox: BBox, level: u8, ctx: &BuildContext) {
    let rel = box_ring_relation(ring, &bbox);
    if rel.subset {
        claim(node, idx, ctx);
    } else if rel.overlapping {
        if level == ctx.max_level {
            claim(node, idx, ctx);
        } else {
            let (hi, lo) = node.ensure_children(ctx.counter);
            let (hi_box, lo_box) = bbox.split(level);
            add_ring(hi, idx, ring, hi_box, level + 1, ctx);
            add_ring(lo, idx, ring, lo_box, level + 1, ctx);
        }
    }
    // Disjoint: nothing to record.
}

/// Record `idx` on `node`, spilling into the side table when the two-slot
/// payload is full.
fn claim(node: &BuildNode, idx: u16, ctx: &BuildContext) {
    if node.try_claim(idx) {
        return;
    }
    let mut table = ctx.multiples.lock();
    if !table.entry(node.id()).or_default().add(idx) {
        // Five or more zones over one cell never happens in boundary
        // data; if it does, the extra candidate loses.
        tracing::warn!(node = node.id(), index = idx, "overflow set full, dropping candidate");
    }
}
