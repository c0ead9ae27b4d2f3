//! Point and edge predicates: segment crossing, ray casting, box/ring
//! classification.
//!
//! Everything here reduces to the 2-D orientation determinant
//! `det(O, A, B) = (A.x - O.x)(B.y - O.y) - (A.y - O.y)(B.x - O.x)`,
//! evaluated in `f32` exactly as the coordinates are stored. There is no
//! epsilon anywhere: a determinant is either zero or it is not, and the
//! zero cases are resolved structurally by looking one vertex past each
//! edge end-point through the [`EdgeWindow`].
//!
//! The classifier has exactly two callers: [`point_in_ring`] ray-casts a
//! query point against the designated [`OUTSIDE`] anchor, and
//! [`box_ring_relation`] classifies a cell against a polygon boundary
//! during tree construction. Boundary points count as inside throughout.

use crate::geometry::{BBox, Position};
use crate::ring::{EdgeWindow, Ring};

/// Ray-cast anchor. The latitude sits outside the valid coordinate domain,
/// so no polygon vertex can ever coincide with it and no query segment
/// toward it can be degenerate.
pub const OUTSIDE: Position = Position::new(0.0, 200.0);

/// Orientation of `b` relative to the directed line `o → a`.
#[inline]
fn det(o: Position, a: Position, b: Position) -> f32 {
    (a.lon - o.lon) * (b.lat - o.lat) - (a.lat - o.lat) * (b.lon - o.lon)
}

/// Whether `p` lies within the closed coordinate span of segment `a → b`,
/// assuming `p` is already known to be collinear with it: either it equals
/// an end-point or it sits strictly between them on one of the axes.
#[inline]
fn within_span(p: Position, a: Position, b: Position) -> bool {
    p == a
        || p == b
        || (a.lon < p.lon && p.lon < b.lon)
        || (b.lon < p.lon && p.lon < a.lon)
        || (a.lat < p.lat && p.lat < b.lat)
        || (b.lat < p.lat && p.lat < a.lat)
}

/// Does the query segment `q → r` cross the ring edge in `w`?
///
/// The generic case is the textbook double-orientation test: the segments
/// cross iff each straddles the other's supporting line. The degenerate
/// cases are where the window earns its keep:
///
/// - `q` on the edge: `on_edge` is raised. If `r` is *also* collinear with
///   the edge, the query segment runs along it and counts as a crossing
///   only when the edge's outer neighbors `prev` and `next` lie on
///   opposite sides of `q → r`.
/// - The edge's start vertex on `q → r`: the polyline pivots at that
///   vertex, and the pivot counts as a crossing only when `prev` and the
///   edge's end lie on opposite sides of `q → r`. The end vertex of the
///   edge is deliberately left to the next window, where it is the start.
pub fn crossing(w: &EdgeWindow, q: Position, r: Position, on_edge: &mut bool) -> bool {
    let d_q = det(q, w.start, w.end);
    let d_r = det(r, w.start, w.end);

    if d_q == 0.0 && within_span(q, w.start, w.end) {
        *on_edge = true;
        if d_r == 0.0 {
            return det(w.prev, q, r) * det(w.next, q, r) < 0.0;
        }
        return false;
    }

    let d_start = det(w.start, q, r);
    let d_end = det(w.end, q, r);

    if d_start == 0.0 && within_span(w.start, q, r) {
        return det(w.prev, q, r) * d_end < 0.0;
    }

    d_q * d_r < 0.0 && d_start * d_end < 0.0
}

/// Is `p` inside the ring (boundary included)?
pub fn point_in_ring(ring: &Ring, p: Position) -> bool {
    let mut inside = false;
    for w in ring.windows() {
        let mut on_edge = false;
        if crossing(&w, p, OUTSIDE, &mut on_edge) {
            inside = !inside;
        }
        if on_edge {
            return true;
        }
    }
    inside
}

/// Outcome of classifying a box against a single ring.
///
/// `subset` means the ring fully contains the box; `overlapping` means the
/// two share any area at all. `subset` implies `overlapping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxRelation {
    pub subset: bool,
    pub overlapping: bool,
}

/// Classify `bbox` against `ring` in a single walk of the ring.
///
/// Per ring edge, two kinds of evidence accumulate:
///
/// 1. crossings and touches between the ring edge and each of the four box
///    edges, and
/// 2. four corner ray-casts toward [`OUTSIDE`], each frozen by a sticky
///    bit the moment its corner turns out to lie on the boundary (a corner
///    on the boundary counts as inside, so its parity no longer matters).
///
/// The box is a subset of the ring when every corner is inside and nothing
/// crosses or touches its edges. It overlaps when any corner is inside,
/// any edge crosses or touches, or, with none of those, when the ring's
/// first vertex sits inside the box, which is the polygon-wholly-inside
/// case the corner tests cannot see.
pub fn box_ring_relation(ring: &Ring, bbox: &BBox) -> BoxRelation {
    let corners = bbox.corners();
    let box_edges = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];

    let mut edge_crossing = false;
    let mut edge_touch = false;
    let mut corner_inside = [false; 4];
    let mut corner_on_edge = [false; 4];

    for w in ring.windows() {
        for &(a, b) in &box_edges {
            let mut touched = false;
            if crossing(&w, a, b, &mut touched) {
                edge_crossing = true;
            }
            if touched {
                edge_touch = true;
            }
        }

        for k in 0..4 {
            if corner_on_edge[k] {
                continue;
            }
            let mut touched = false;
            if crossing(&w, corners[k], OUTSIDE, &mut touched) {
                corner_inside[k] = !corner_inside[k];
            }
            if touched {
                corner_on_edge[k] = true;
            }
        }
    }

    let all_corners_inside = (0..4).all(|k| corner_on_edge[k] || corner_inside[k]);
    let subset = all_corners_inside && !edge_crossing && !edge_touch;
    let overlapping = all_corners_inside
        || edge_crossing
        || edge_touch
        || box_contains_point(bbox, ring.first());

    BoxRelation {
        subset,
        overlapping,
    }
}

/// Ray-cast `p` against the box treated as a closed 4-edge ring.
///
/// Self-contained so that [`box_ring_relation`] can probe a ring vertex
/// without materializing a [`Ring`] for the box. Boundary counts inside.
pub fn box_contains_point(bbox: &BBox, p: Position) -> bool {
    let c = bbox.corners();
    let mut inside = false;
    for i in 0..4 {
        let w = EdgeWindow {
            prev: c[(i + 3) % 4],
            start: c[i],
            end: c[(i + 1) % 4],
            next: c[(i + 2) % 4],
        };
        let mut on_edge = false;
        if crossing(&w, p, OUTSIDE, &mut on_edge) {
            inside = !inside;
        }
        if on_edge {
            return true;
        }
    }
    inside
}
