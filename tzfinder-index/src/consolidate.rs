//! Consolidation: push candidate sets to the leaves and resolve overlap.
//!
//! After the build, payloads sit wherever a ring happened to claim: on
//! internal nodes (whose whole cell the ring contained) as well as leaves,
//! with spill-over in the side table. The consolidator sweeps top-down,
//! accumulating each path's candidate set, dropping candidates whose
//! source excludes the cell through a hole, and freezing every node into
//! its final immutable form:
//!
//! - leaves with one surviving candidate keep exactly that index;
//! - leaves with several are resolved by sampling a 5×5 interior grid
//!   against the candidates' full ring sets and keeping the most common
//!   outcome, normalized to ascending order;
//! - empty leaves stay empty (open ocean).
//!
//! The top of the tree is processed inline; subtrees hanging below
//! [`DISPATCH_LEVEL`] go through the worker pool, deepest first. Every
//! task carries its fully-realized inherited set, so worker scheduling
//! cannot change any result.

use std::cmp::Ordering;
use std::sync::atomic::{self, AtomicBool};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use tzfinder_core::predicate::{box_ring_relation, point_in_ring};
use tzfinder_core::{
    BBox, BuildNode, Node, SourceTable, TimeZoneIndex, TimeZoneIndex2, TimeZoneIndex8, Tree,
};

use crate::build::BuildOutput;
use crate::config::BuildConfig;
use crate::error::{BuildError, Result};
use crate::progress::{Progress, ProgressStep};
use crate::queue::WorkQueue;

/// Depth at which subtrees leave the inline sweep for the worker pool.
/// 2^6 = 64 subtrees saturate any realistic core count without making
/// dispatch bookkeeping noticeable.
const DISPATCH_LEVEL: u8 = 6;

/// Samples per axis of the interior grid.
const SAMPLE_GRID: usize = 5;

struct ConsolidateContext<'a> {
    sources: &'a SourceTable,
    multiples: &'a FxHashMap<u32, TimeZoneIndex2>,
}

/// One dispatched subtree. Deeper tasks pop first.
struct SubtreeTask<'a> {
    node: &'a BuildNode,
    inherited: TimeZoneIndex8,
    bbox: BBox,
    level: u8,
}

impl PartialEq for SubtreeTask<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.node.id() == other.node.id()
    }
}

impl Eq for SubtreeTask<'_> {}

impl PartialOrd for SubtreeTask<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SubtreeTask<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level
            .cmp(&other.level)
            .then_with(|| other.node.id().cmp(&self.node.id()))
    }
}

/// Consolidate a built tree into its frozen, serializable form.
pub fn consolidate(
    output: BuildOutput,
    sources: &SourceTable,
    config: &BuildConfig,
    progress: &dyn Progress,
    cancel: &AtomicBool,
) -> Result<Tree> {
    let ctx = ConsolidateContext {
        sources,
        multiples: &output.multiples,
    };

    let mut tasks = Vec::new();
    collect_tasks(
        &output.root,
        TimeZoneIndex8::EMPTY,
        BBox::WORLD,
        0,
        &ctx,
        &mut tasks,
    );
    let task_count = tasks.len();

    let queue = WorkQueue::new();
    for task in tasks {
        queue.push(task);
    }
    queue.close();

    let results: Mutex<FxHashMap<u32, Node>> = Mutex::new(FxHashMap::default());
    let workers = config.effective_workers();
    std::thread::scope(|s| {
        for _ in 0..workers {
            s.spawn(|| {
                while let Some(task) = queue.pop() {
                    if cancel.load(atomic::Ordering::Relaxed) {
                        break;
                    }
                    let id = task.node.id();
                    let node =
                        consolidate_subtree(task.node, task.inherited, task.bbox, task.level, &ctx);
                    results.lock().insert(id, node);
                    progress.on_progress(ProgressStep::Consolidate, 1);
                }
            });
        }
    });

    if cancel.load(atomic::Ordering::Relaxed) {
        return Err(BuildError::Cancelled);
    }

    let mut results = results.into_inner();
    let root = assemble(&output.root, 0, &mut results);
    let tree = Tree::new(root, sources.ids());
    tracing::info!(
        tasks = task_count,
        nodes = tree.node_count,
        workers = workers,
        "tree consolidated"
    );
    Ok(tree)
}

/// Inline sweep of the tree top: absorb payloads on the way down and cut
/// dispatch points at [`DISPATCH_LEVEL`] (or at shallow leaves).
fn collect_tasks<'a>(
    node: &'a BuildNode,
    inherited: TimeZoneIndex8,
    bbox: BBox,
    level: u8,
    ctx: &ConsolidateContext<'_>,
    tasks: &mut Vec<SubtreeTask<'a>>,
) {
    match node.children() {
        Some((hi, lo)) if level < DISPATCH_LEVEL => {
            let mut set = inherited;
            absorb(node, &mut set, &bbox, ctx);
            let (hi_box, lo_box) = bbox.split(level);
            collect_tasks(hi, set, hi_box, level + 1, ctx, tasks);
            collect_tasks(lo, set, lo_box, level + 1, ctx, tasks);
        }
        _ => tasks.push(SubtreeTask {
            node,
            inherited,
            bbox,
            level,
        }),
    }
}

/// Mirror of [`collect_tasks`]: stitch the dispatched subtree results back
/// under freshly frozen internal nodes.
fn assemble(node: &BuildNode, level: u8, results: &mut FxHashMap<u32, Node>) -> Node {
    match node.children() {
        Some((hi, lo)) if level < DISPATCH_LEVEL => Node::internal(
            assemble(hi, level + 1, results),
            assemble(lo, level + 1, results),
        ),
        _ => results
            .remove(&node.id())
            .expect("dispatched subtree missing from results"),
    }
}

/// Freeze the subtree rooted at `node`, given the candidate set inherited
/// from its ancestors.
fn consolidate_subtree(
    node: &BuildNode,
    inherited: TimeZoneIndex8,
    bbox: BBox,
    level: u8,
    ctx: &ConsolidateContext<'_>,
) -> Node {
    let mut set = inherited;
    absorb(node, &mut set, &bbox, ctx);

    match node.children() {
        Some((hi, lo)) => {
            let (hi_box, lo_box) = bbox.split(level);
            Node::internal(
                consolidate_subtree(hi, set, hi_box, level + 1, ctx),
                consolidate_subtree(lo, set, lo_box, level + 1, ctx),
            )
        }
        None => Node::leaf(resolve_leaf(set, &bbox, ctx)),
    }
}

/// Fold `node`'s own payload and side-table spill into `set`, skipping
/// candidates whose source excludes this cell through a hole.
fn absorb(node: &BuildNode, set: &mut TimeZoneIndex8, bbox: &BBox, ctx: &ConsolidateContext<'_>) {
    let payload = node.payload();
    let spill = ctx.multiples.get(&node.id());
    let candidates = payload
        .iter()
        .chain(spill.into_iter().flat_map(|m| m.iter()));

    for idx in candidates {
        if excluded_by_any_ring(ctx.sources, idx, bbox) {
            continue;
        }
        if !set.add(idx) {
            tracing::warn!(node = node.id(), index = idx, "candidate set full, dropping");
        }
    }
}

/// Does any hole of source `idx` fully contain the cell?
fn excluded_by_any_ring(sources: &SourceTable, idx: u16, bbox: &BBox) -> bool {
    sources
        .get(idx)
        .excluded
        .iter()
        .any(|ring| box_ring_relation(ring, bbox).subset)
}

/// Final payload for a leaf with the given surviving candidates.
fn resolve_leaf(set: TimeZoneIndex8, bbox: &BBox, ctx: &ConsolidateContext<'_>) -> TimeZoneIndex {
    match set.len() {
        0 => TimeZoneIndex::EMPTY,
        1 => TimeZoneIndex::single(set.get(0)),
        _ => resolve_by_sampling(&set, bbox, ctx),
    }
}

/// Evaluate every candidate at a 5×5 interior grid (10% inset, 20% step)
/// and keep the most common per-sample outcome. Each sample's accumulator
/// takes a candidate iff the point is inside one of its included rings
/// and outside all of its excluded rings. Ties go to the accumulator seen
/// first in row-major sample order; two-entry winners are normalized to
/// ascending order so the serialized tree is schedule-independent.
fn resolve_by_sampling(
    candidates: &TimeZoneIndex8,
    bbox: &BBox,
    ctx: &ConsolidateContext<'_>,
) -> TimeZoneIndex {
    let mut counts: Vec<(TimeZoneIndex, u32)> = Vec::new();

    for sy in 0..SAMPLE_GRID {
        for sx in 0..SAMPLE_GRID {
            let point = bbox.at(0.1 + sx as f32 * 0.2, 0.1 + sy as f32 * 0.2);

            let mut accumulator = TimeZoneIndex::EMPTY;
            for idx in candidates.iter() {
                let source = ctx.sources.get(idx);
                let inside = source.included.iter().any(|r| point_in_ring(r, point))
                    && !source.excluded.iter().any(|r| point_in_ring(r, point));
                if inside && !accumulator.add(idx) {
                    tracing::debug!(index = idx, "sample accumulator full, dropping");
                }
            }

            match counts.iter_mut().find(|(acc, _)| *acc == accumulator) {
                Some((_, n)) => *n += 1,
                None => counts.push((accumulator, 1)),
            }
        }
    }

    // Strictly-greater comparison keeps the first-seen accumulator on
    // ties, which is fixed by sample order rather than thread timing.
    let mut winner = TimeZoneIndex::EMPTY;
    let mut winner_count = 0;
    for &(accumulator, n) in &counts {
        if n > winner_count {
            winner = accumulator;
            winner_count = n;
        }
    }
    winner.normalized()
}
