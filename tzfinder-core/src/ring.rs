//! Polygon rings: vertex reduction and the sliding edge window.
//!
//! A [`Ring`] stores a closed polygon boundary after two preparation steps:
//!
//! 1. **Reduction** drops vertices closer than a distance threshold to the
//!    previously kept vertex. Source data traces coastlines at a few meters
//!    of resolution; the tree never resolves below a few hundred meters, so
//!    the extra vertices only slow the classifier down.
//! 2. **Padding** repeats the boundary end-points (tail prepended, head and
//!    head+1 appended) so that a flat 4-vertex window can slide over every
//!    edge of the closed polygon exactly once, with both neighbors of the
//!    edge in view. The crossing predicate needs those neighbors to break
//!    ties when a query segment passes exactly through a vertex.
//!
//! The padding is the data structure's contract: `positions[0]` is the last
//! real vertex, `positions[1..=n]` are the real vertices, and the final two
//! entries repeat the first two real vertices.

use crate::geometry::{haversine_m, Position};

/// Latitude above which the reducer keeps every distinct vertex. Meridians
/// converge toward the poles, so small great-circle distances there still
/// span large longitude ranges in the degree grid the tree splits on.
const POLAR_LATITUDE: f32 = 70.0;

/// One polygon edge `start → end` with its ring neighbors in view.
#[derive(Debug, Clone, Copy)]
pub struct EdgeWindow {
    pub prev: Position,
    pub start: Position,
    pub end: Position,
    pub next: Position,
}

/// A reduced, padded polygon boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    positions: Vec<Position>,
}

impl Ring {
    /// Reduce a raw GeoJSON ring (closing duplicate included) and pad it.
    ///
    /// A vertex is kept when its haversine distance from the last kept
    /// vertex exceeds `min_distance_m`. Above [`POLAR_LATITUDE`] in
    /// absolute value, any vertex differing from the last kept one is
    /// kept.
    pub fn reduce(raw: &[Position], min_distance_m: f64) -> Ring {
        // Walk the ring without its closing duplicate.
        let open = if raw.len() > 1 && raw[0] == raw[raw.len() - 1] {
            &raw[..raw.len() - 1]
        } else {
            raw
        };

        let mut reduced: Vec<Position> = Vec::with_capacity(open.len() / 2 + 4);
        for &vertex in open {
            match reduced.last() {
                None => reduced.push(vertex),
                Some(&last) => {
                    let keep = haversine_m(last, vertex) > min_distance_m
                        || (vertex.lat.abs() > POLAR_LATITUDE && vertex != last);
                    if keep {
                        reduced.push(vertex);
                    }
                }
            }
        }

        Self::from_reduced(reduced)
    }

    /// Pad an already-reduced vertex list. Exposed for tests and for
    /// synthetic rings whose vertices are exact by construction.
    pub fn from_reduced(reduced: Vec<Position>) -> Ring {
        debug_assert!(!reduced.is_empty(), "ring must have at least one vertex");
        let mut positions = Vec::with_capacity(reduced.len() + 3);
        positions.push(reduced[reduced.len() - 1]);
        positions.extend_from_slice(&reduced);
        positions.push(reduced[0]);
        positions.push(reduced[reduced.len().min(2) - 1]);
        Ring { positions }
    }

    /// Number of edges (equals the number of real vertices).
    pub fn edge_count(&self) -> usize {
        self.positions.len() - 3
    }

    /// First stored vertex of the padded sequence. Any boundary vertex
    /// serves the "is the polygon inside this box" probe equally well.
    pub fn first(&self) -> Position {
        self.positions[0]
    }

    /// Slide a 4-vertex window over every edge of the closed polygon.
    pub fn windows(&self) -> impl Iterator<Item = EdgeWindow> + '_ {
        self.positions.windows(4).map(|w| EdgeWindow {
            prev: w[0],
            start: w[1],
            end: w[2],
            next: w[3],
        })
    }
}
