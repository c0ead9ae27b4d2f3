//! Tree nodes in their two lifecycle phases.
//!
//! [`BuildNode`] is the construction-time representation: the payload sits
//! behind a per-node mutex so that worker threads claiming cells for
//! different rings never block each other beyond a single node, and child
//! creation goes through a `OnceLock` so racing workers agree on one child
//! pair. Node ids are handed out by a shared atomic counter; the side
//! table of overflow candidates keys on them.
//!
//! [`Node`] is the frozen form the consolidator produces. It has no
//! interior mutability at all: after consolidation the tree shape and
//! every payload are final, and the serializer and lookup read them
//! without synchronization.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::index::TimeZoneIndex;

/// Mutable tree node used during construction.
#[derive(Debug)]
pub struct BuildNode {
    id: u32,
    payload: Mutex<TimeZoneIndex>,
    children: OnceLock<Box<(BuildNode, BuildNode)>>,
}

impl BuildNode {
    /// Root node; takes the first id from `counter`.
    pub fn root(counter: &AtomicU32) -> Self {
        Self::with_payload(counter, TimeZoneIndex::EMPTY)
    }

    fn with_payload(counter: &AtomicU32, payload: TimeZoneIndex) -> Self {
        Self {
            id: counter.fetch_add(1, Ordering::Relaxed),
            payload: Mutex::new(payload),
            children: OnceLock::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Snapshot of the current payload.
    pub fn payload(&self) -> TimeZoneIndex {
        *self.payload.lock()
    }

    /// Add `idx` to this node's payload. Returns `false` when the payload
    /// is full and the caller must fall back to the overflow side table.
    pub fn try_claim(&self, idx: u16) -> bool {
        self.payload.lock().add(idx)
    }

    /// Split this node, creating both children exactly once. Children
    /// start with a copy of the parent's payload at split time: whatever
    /// was already claimed for this cell holds for both halves.
    pub fn ensure_children(&self, counter: &AtomicU32) -> &(BuildNode, BuildNode) {
        self.children.get_or_init(|| {
            let payload = self.payload();
            Box::new((
                Self::with_payload(counter, payload),
                Self::with_payload(counter, payload),
            ))
        })
    }

    /// `(hi, lo)` children, if this node has been split.
    pub fn children(&self) -> Option<&(BuildNode, BuildNode)> {
        self.children.get().map(|b| &**b)
    }
}

/// Immutable tree node, post-consolidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub index: TimeZoneIndex,
    /// `(hi, lo)` subtrees; `None` marks a leaf.
    pub children: Option<Box<(Node, Node)>>,
}

impl Node {
    pub fn leaf(index: TimeZoneIndex) -> Self {
        Self {
            index,
            children: None,
        }
    }

    pub fn internal(hi: Node, lo: Node) -> Self {
        Self {
            // Internal payloads were pushed into the leaves during
            // consolidation; nothing reads them afterwards.
            index: TimeZoneIndex::EMPTY,
            children: Some(Box::new((hi, lo))),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Nodes in this subtree, including `self`.
    pub fn count(&self) -> u64 {
        match &self.children {
            None => 1,
            Some(pair) => 1 + pair.0.count() + pair.1.count(),
        }
    }
}

/// A consolidated time-zone tree: frozen nodes plus the id table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub root: Node,
    /// IANA ids; index `i` (1-based) maps to `ids[i - 1]`.
    pub ids: Vec<String>,
    pub node_count: u64,
}

impl Tree {
    pub fn new(root: Node, ids: Vec<String>) -> Self {
        let node_count = root.count();
        Self {
            root,
            ids,
            node_count,
        }
    }
}
