//! Level-partitioned index of live nodes with geometric neighbour lookup.
//!
//! Two nodes are neighbours when one of their edges coincides sample by
//! sample, in either direction. Matching is purely geometric, so edges that
//! meet across cube-face seams (reversed, or labelled differently on each
//! side) are found the same way as edges inside one face.

use glam::DVec3;
use rustc_hash::FxHashMap;

use crate::node::QuadId;
use crate::side::Side;

/// A same-level node across one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbor {
    /// The neighbouring node.
    pub id: QuadId,
    /// The neighbour's own side that faces back.
    pub side: Side,
}

#[derive(Clone, Debug)]
struct Entry {
    edges: [Vec<DVec3>; 4],
}

/// The single source of truth for which nodes exist at which level.
#[derive(Clone, Debug)]
pub struct Registry {
    levels: Vec<FxHashMap<QuadId, Entry>>,
    level_of: FxHashMap<QuadId, u32>,
    tolerance: f64,
}

impl Registry {
    /// Creates an empty registry with base matching `tolerance`.
    pub fn new(tolerance: f64) -> Self {
        Self {
            levels: Vec::new(),
            level_of: FxHashMap::default(),
            tolerance,
        }
    }

    /// Matching tolerance at `level`; tighter for smaller, deeper patches.
    pub fn tolerance_at(&self, level: u32) -> f64 {
        self.tolerance / (level as f64 + 1.0)
    }

    /// Records `id` at `level` with its four edges in [`Side::ALL`] order.
    pub fn register(&mut self, id: QuadId, level: u32, edges: [Vec<DVec3>; 4]) {
        let slot = level as usize;
        if self.levels.len() <= slot {
            self.levels.resize_with(slot + 1, FxHashMap::default);
        }
        self.levels[slot].insert(id, Entry { edges });
        self.level_of.insert(id, level);
    }

    /// Forgets `id`. Returns `false` if it was not registered.
    pub fn deregister(&mut self, id: QuadId) -> bool {
        let Some(level) = self.level_of.remove(&id) else {
            return false;
        };
        self.levels[level as usize].remove(&id).is_some()
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: QuadId) -> bool {
        self.level_of.contains_key(&id)
    }

    /// Level `id` was registered at.
    pub fn level(&self, id: QuadId) -> Option<u32> {
        self.level_of.get(&id).copied()
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.level_of.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.level_of.is_empty()
    }

    /// All nodes at `level`, sorted by handle.
    pub fn quads_at_level(&self, level: u32) -> Vec<QuadId> {
        let mut ids: Vec<QuadId> = self
            .levels
            .get(level as usize)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// The same-level node bordering `side` of `id`, if any.
    pub fn neighbor(&self, side: Side, id: QuadId) -> Option<Neighbor> {
        let level = self.level(id)?;
        let nodes = &self.levels[level as usize];
        let edge = &nodes.get(&id)?.edges[side as usize];
        let tolerance = self.tolerance_at(level);

        nodes
            .iter()
            .filter(|(other, _)| **other != id)
            .find_map(|(other, entry)| {
                Side::ALL
                    .into_iter()
                    .find(|s| edges_match(edge, &entry.edges[*s as usize], tolerance))
                    .map(|s| Neighbor {
                        id: *other,
                        side: s,
                    })
            })
    }

    /// Neighbours on all four sides, in [`Side::ALL`] order.
    pub fn neighbors(&self, id: QuadId) -> [Option<Neighbor>; 4] {
        Side::ALL.map(|side| self.neighbor(side, id))
    }
}

/// Pointwise comparison of two sampled edges, forward or reversed.
fn edges_match(a: &[DVec3], b: &[DVec3], tolerance: f64) -> bool {
    if a.len() != b.len() || a.is_empty() {
        return false;
    }
    let close = |p: DVec3, q: DVec3| p.distance_squared(q) <= tolerance * tolerance;
    let (first, last) = (a[0], a[a.len() - 1]);
    let (b_first, b_last) = (b[0], b[b.len() - 1]);

    if close(first, b_first) && close(last, b_last) {
        a.iter().zip(b).all(|(p, q)| close(*p, *q))
    } else if close(first, b_last) && close(last, b_first) {
        a.iter().zip(b.iter().rev()).all(|(p, q)| close(*p, *q))
    } else {
        false
    }
}
