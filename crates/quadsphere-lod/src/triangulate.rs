//! Edge-aware triangle index generation for a patch grid.
//!
//! A leaf is tiled by `((segments - 1) / 2)²` cells. Each cell is a 2×2 block
//! of grid quads drawn as a fan of four wedges around its odd-indexed centre
//! sample. A wedge on an inactive leaf edge is one triangle spanning the whole
//! cell side. A wedge on an active leaf edge is split through the mid-edge
//! sample, so the edge carries every grid sample and lines up one-to-one with
//! a neighbour one level deeper.
//!
//! For `segments = 3` the grid is
//!
//! ```text
//! 6 7 8
//! 3 4 5
//! 0 1 2
//! ```
//!
//! and the generators emit:
//!
//! | side   | inactive  | active                |
//! |--------|-----------|-----------------------|
//! | left   | `4, 6, 0` | `4, 6, 3,  4, 3, 0`   |
//! | bottom | `4, 0, 2` | `4, 0, 1,  4, 1, 2`   |
//! | right  | `4, 2, 8` | `4, 2, 5,  4, 5, 8`   |
//! | top    | `4, 8, 6` | `4, 8, 7,  4, 7, 6`   |
//!
//! with no interior wedges. Triangles wind counter-clockwise seen from the
//! patch's outward normal.

use crate::side::{Side, Sides};

/// Row-major index of grid sample `(x, y)`.
#[inline]
#[must_use]
pub fn grid_index(x: u32, y: u32, segments: u32) -> u32 {
    y * segments + x
}

/// Index of the patch's centre sample.
#[inline]
#[must_use]
pub fn centre_index(segments: u32) -> u32 {
    let mid = (segments - 1) / 2;
    grid_index(mid, mid, segments)
}

fn cells_per_side(segments: u32) -> u32 {
    (segments - 1) / 2
}

/// Emit the wedge of the cell centred on `(cx, cy)` that faces `side`.
fn push_wedge(out: &mut Vec<u32>, segments: u32, cx: u32, cy: u32, side: Side, split: bool) {
    let idx = |x: u32, y: u32| grid_index(x, y, segments);
    let centre = idx(cx, cy);
    // Start, middle and end of the cell side, walking counter-clockwise.
    let (start, mid, end) = match side {
        Side::Bottom => (idx(cx - 1, cy - 1), idx(cx, cy - 1), idx(cx + 1, cy - 1)),
        Side::Right => (idx(cx + 1, cy - 1), idx(cx + 1, cy), idx(cx + 1, cy + 1)),
        Side::Top => (idx(cx + 1, cy + 1), idx(cx, cy + 1), idx(cx - 1, cy + 1)),
        Side::Left => (idx(cx - 1, cy + 1), idx(cx - 1, cy), idx(cx - 1, cy - 1)),
    };
    if split {
        out.extend_from_slice(&[centre, start, mid, centre, mid, end]);
    } else {
        out.extend_from_slice(&[centre, start, end]);
    }
}

/// Wedges of every cell that do not lie on the patch boundary.
#[must_use]
pub fn centre_indices(segments: u32) -> Vec<u32> {
    let cells = cells_per_side(segments);
    let mut out = Vec::new();
    for b in 0..cells {
        for a in 0..cells {
            let (cx, cy) = (2 * a + 1, 2 * b + 1);
            for side in Side::ALL {
                let on_boundary = match side {
                    Side::Left => a == 0,
                    Side::Right => a + 1 == cells,
                    Side::Bottom => b == 0,
                    Side::Top => b + 1 == cells,
                };
                if !on_boundary {
                    push_wedge(&mut out, segments, cx, cy, side, false);
                }
            }
        }
    }
    out
}

/// Wedges along one patch edge, split into the zipper pattern when `active`.
#[must_use]
pub fn side_indices(segments: u32, side: Side, active: bool) -> Vec<u32> {
    let cells = cells_per_side(segments);
    let last = 2 * cells - 1;
    let mut out = Vec::new();
    for n in 0..cells {
        let along = 2 * n + 1;
        let (cx, cy) = match side {
            Side::Left => (1, along),
            Side::Right => (last, along),
            Side::Bottom => (along, 1),
            Side::Top => (along, last),
        };
        push_wedge(&mut out, segments, cx, cy, side, active);
    }
    out
}

/// Left-edge wedges.
#[must_use]
pub fn left_indices(segments: u32, active: bool) -> Vec<u32> {
    side_indices(segments, Side::Left, active)
}

/// Bottom-edge wedges.
#[must_use]
pub fn bottom_indices(segments: u32, active: bool) -> Vec<u32> {
    side_indices(segments, Side::Bottom, active)
}

/// Right-edge wedges.
#[must_use]
pub fn right_indices(segments: u32, active: bool) -> Vec<u32> {
    side_indices(segments, Side::Right, active)
}

/// Top-edge wedges.
#[must_use]
pub fn top_indices(segments: u32, active: bool) -> Vec<u32> {
    side_indices(segments, Side::Top, active)
}

/// Full triangulation of a leaf: the four edge wedges followed by the interior.
#[must_use]
pub fn leaf_indices(segments: u32, active: Sides) -> Vec<u32> {
    let mut out = left_indices(segments, active.contains(Side::Left));
    out.extend(bottom_indices(segments, active.contains(Side::Bottom)));
    out.extend(right_indices(segments, active.contains(Side::Right)));
    out.extend(top_indices(segments, active.contains(Side::Top)));
    out.extend(centre_indices(segments));
    out
}
