//! Arena of quadtree nodes sharing one neighbour registry.
//!
//! All structural edits go through [`QuadTree`] so node storage and the
//! registry always change together. Parents own their children through
//! handles; children point back with a plain handle, never a reference.

use std::fmt::Write as _;

use glam::DVec3;
use quadsphere_math::{Orientation, UvRect};

use crate::error::{MeshError, QuadError};
use crate::mesh::{MeshData, merge_vertices};
use crate::node::{Curve, PatchSpec, QuadId, QuadNode};
use crate::registry::{Neighbor, Registry};
use crate::search;
use crate::side::{Quadrant, Side, Sides};

/// Default base tolerance for geometric edge matching.
pub const DEFAULT_NEIGHBOR_TOLERANCE: f64 = 1e-3;

/// Default bucket size for vertex welding.
pub const DEFAULT_WELD_PRECISION: f64 = 1e-4;

/// Construction options for a single-root tree.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadOptions {
    /// Centre of the root patch in its local plane.
    pub centre: DVec3,
    /// Half-width of the root patch.
    pub radius: f64,
    /// Samples per grid row; odd and at least 3.
    pub segments: u32,
    /// Deepest level subdivision may reach.
    pub max_level: u32,
    /// Rotation applied to every sample.
    pub orientation: Orientation,
    /// Optional projection onto a sphere.
    pub curve: Option<Curve>,
    /// Texture rectangle covered by the root.
    pub uv: UvRect,
    /// Base tolerance for neighbour matching.
    pub neighbor_tolerance: f64,
    /// Bucket size for vertex welding.
    pub weld_precision: f64,
}

impl Default for QuadOptions {
    fn default() -> Self {
        Self {
            centre: DVec3::ZERO,
            radius: 1.0,
            segments: 3,
            max_level: 5,
            orientation: Orientation::IDENTITY,
            curve: None,
            uv: UvRect::FULL,
            neighbor_tolerance: DEFAULT_NEIGHBOR_TOLERANCE,
            weld_precision: DEFAULT_WELD_PRECISION,
        }
    }
}

impl QuadOptions {
    fn root_spec(&self) -> PatchSpec {
        PatchSpec {
            centre: self.centre,
            radius: self.radius,
            segments: self.segments,
            level: 0,
            orientation: self.orientation,
            curve: self.curve,
            uv: self.uv,
        }
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<QuadNode>,
}

/// Quadtree forest: node arena, registry, and the refinement state machine.
#[derive(Clone, Debug)]
pub struct QuadTree {
    slots: Vec<Slot>,
    free_list: Vec<usize>,
    registry: Registry,
    roots: Vec<QuadId>,
    max_level: u32,
    weld_precision: f64,
}

fn check_positive(name: &'static str, value: f64) -> Result<(), QuadError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(QuadError::InvalidTolerance { name, value })
    }
}

impl QuadTree {
    /// Builds a tree with a single root patch.
    pub fn new(options: QuadOptions) -> Result<Self, QuadError> {
        let mut tree = Self::empty(
            options.max_level,
            options.neighbor_tolerance,
            options.weld_precision,
        )?;
        tree.add_root(options.root_spec())?;
        Ok(tree)
    }

    pub(crate) fn empty(
        max_level: u32,
        neighbor_tolerance: f64,
        weld_precision: f64,
    ) -> Result<Self, QuadError> {
        check_positive("neighbor tolerance", neighbor_tolerance)?;
        check_positive("weld precision", weld_precision)?;
        Ok(Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            registry: Registry::new(neighbor_tolerance),
            roots: Vec::new(),
            max_level,
            weld_precision,
        })
    }

    pub(crate) fn add_root(&mut self, spec: PatchSpec) -> Result<QuadId, QuadError> {
        spec.validate()?;
        let path = format!("{}/", self.roots.len());
        let id = self.spawn(spec, None, path);
        self.roots.push(id);
        Ok(id)
    }

    fn spawn(&mut self, spec: PatchSpec, parent: Option<QuadId>, path: String) -> QuadId {
        let node = QuadNode::new(spec, parent, path);
        let level = node.level();
        let edges = node.edges();
        tracing::trace!(identifier = %node.identifier(), "spawned patch");

        let id = match self.free_list.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                QuadId::new(index, slot.generation)
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                QuadId::new(self.slots.len() - 1, 0)
            }
        };
        self.registry.register(id, level, edges);
        id
    }

    /// Deregisters and frees `id` and its whole subtree.
    fn dispose(&mut self, id: QuadId) {
        if let Some(children) = self.children(id) {
            for child in children {
                self.dispose(child);
            }
        }
        self.registry.deregister(id);
        if let Some(slot) = self.slots.get_mut(id.index())
            && slot.generation == id.generation()
            && slot.node.take().is_some()
        {
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(id.index());
        }
    }

    /// The node behind `id`, or `None` if it has been disposed.
    pub fn node(&self, id: QuadId) -> Option<&QuadNode> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: QuadId) -> Option<&mut QuadNode> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    /// Returns `true` if `id` refers to a live node.
    pub fn contains(&self, id: QuadId) -> bool {
        self.node(id).is_some()
    }

    /// Root handles in creation order.
    pub fn roots(&self) -> &[QuadId] {
        &self.roots
    }

    /// The first root.
    ///
    /// # Panics
    ///
    /// Never for trees built through [`QuadTree::new`] or a sphere.
    pub fn root(&self) -> QuadId {
        self.roots[0]
    }

    /// The shared neighbour registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Deepest level subdivision may reach.
    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Bucket size used by [`QuadTree::mesh_data`].
    pub fn weld_precision(&self) -> f64 {
        self.weld_precision
    }

    /// Children of `id` in quadrant order, if it is a live, subdivided node.
    pub fn children(&self, id: QuadId) -> Option<[QuadId; 4]> {
        self.node(id).and_then(QuadNode::children)
    }

    /// Returns `true` iff `id` is live and has all four children.
    pub fn has_children(&self, id: QuadId) -> bool {
        self.node(id).is_some_and(QuadNode::has_children)
    }

    /// Same-level neighbour of `id` across `side`.
    pub fn neighbor(&self, id: QuadId, side: Side) -> Option<Neighbor> {
        self.registry.neighbor(side, id)
    }

    /// Same-level neighbours of `id` in [`Side::ALL`] order.
    pub fn neighbors(&self, id: QuadId) -> [Option<Neighbor>; 4] {
        self.registry.neighbors(id)
    }

    /// Adds `sides` to the active set of `id`. Does not cascade.
    pub fn activate(&mut self, id: QuadId, sides: Sides) {
        if let Some(node) = self.node_mut(id) {
            node.activate(sides);
        }
    }

    /// Removes `sides` from the active set of `id`. Does not cascade.
    pub fn deactivate(&mut self, id: QuadId, sides: Sides) {
        if let Some(node) = self.node_mut(id) {
            node.deactivate(sides);
        }
    }

    /// Recomputes the active sides of `id` from the registry: a side is active
    /// iff a same-level neighbour exists there and is subdivided.
    pub fn update_sides(&mut self, id: QuadId) {
        if !self.contains(id) {
            return;
        }
        let wanted: Sides = Side::ALL
            .into_iter()
            .filter(|side| {
                self.registry
                    .neighbor(*side, id)
                    .is_some_and(|n| self.has_children(n.id))
            })
            .collect();

        if let Some(node) = self.node_mut(id) {
            let mut stale = node.active_sides();
            stale.remove_all(wanted);
            node.deactivate(stale);
            node.activate(wanted);
        }
    }

    /// Refreshes active sides of `id`, its children, its neighbours, and
    /// their children.
    fn refresh_around(&mut self, id: QuadId) {
        let mut touched = vec![id];
        touched.extend(self.children(id).into_iter().flatten());
        for neighbor in self.registry.neighbors(id).into_iter().flatten() {
            touched.push(neighbor.id);
            touched.extend(self.children(neighbor.id).into_iter().flatten());
        }
        for node in touched {
            self.update_sides(node);
        }
    }

    /// Splits `id` into four children.
    ///
    /// First unifies every other node on the same level, so at most one
    /// region deepens per call. Shallower neighbours are split in turn to
    /// keep adjacent levels within one of each other. No-op if `id` is
    /// already subdivided, at the maximum level, or disposed.
    pub fn subdivide(&mut self, id: QuadId) {
        self.subdivide_from(id, None);
    }

    fn subdivide_from(&mut self, id: QuadId, initiator: Option<QuadId>) {
        let Some(node) = self.node(id) else {
            tracing::trace!(%id, "subdivide of a disposed node ignored");
            return;
        };
        let level = node.level();
        if node.has_children() || level >= self.max_level {
            tracing::trace!(%id, level, "subdivide is a no-op");
            return;
        }
        let parent = node.parent();

        if initiator.is_none() {
            for other in self.registry.quads_at_level(level) {
                if other != id {
                    self.unify_from(other, Some(id));
                }
            }
        }

        let Some(node) = self.node(id) else {
            return;
        };
        let spec = node.spec().clone();
        let path = node.path().to_owned();
        let children = Quadrant::ALL.map(|quadrant| {
            let child_path = format!("{path}{}", quadrant.digit());
            self.spawn(spec.child(quadrant), Some(id), child_path)
        });
        if let Some(node) = self.node_mut(id) {
            node.set_children(Some(children));
        }
        tracing::debug!(%id, level, ?initiator, "subdivided patch");

        for side in Side::ALL {
            let neighbor = self
                .registry
                .neighbor(side, id)
                .or_else(|| parent.and_then(|p| self.registry.neighbor(side, p)));
            let Some(neighbor) = neighbor else {
                continue;
            };
            if self.node(neighbor.id).is_some_and(|n| n.level() < level) {
                tracing::debug!(%id, neighbor = %neighbor.id, ?side, "splitting shallower neighbour");
                self.subdivide_from(neighbor.id, Some(id));
            }
        }

        self.refresh_around(id);
    }

    /// Collapses `id` back into a leaf, disposing all descendants.
    ///
    /// Neighbours whose children along the shared edge are themselves
    /// subdivided are flattened so no leaf borders one two levels deeper.
    /// No-op on a leaf.
    pub fn unify(&mut self, id: QuadId) {
        self.unify_from(id, None);
    }

    fn unify_from(&mut self, id: QuadId, initiator: Option<QuadId>) {
        let Some(children) = self.children(id) else {
            tracing::trace!(%id, "unify of a leaf is a no-op");
            return;
        };
        for child in children {
            self.dispose(child);
        }
        if let Some(node) = self.node_mut(id) {
            node.set_children(None);
        }
        tracing::debug!(%id, ?initiator, "unified patch");

        for neighbor in self.registry.neighbors(id).into_iter().flatten() {
            if Some(neighbor.id) == initiator {
                continue;
            }
            let Some(their_children) = self.children(neighbor.id) else {
                continue;
            };
            for quadrant in neighbor.side.quadrants() {
                let child = their_children[quadrant as usize];
                if self.has_children(child) {
                    tracing::debug!(%id, %child, "flattening deeper neighbour");
                    self.unify_from(child, Some(id));
                }
            }
        }

        self.refresh_around(id);
    }

    /// Subdivides the leaf closest to `point`. Returns `true` if it split.
    pub fn subdivide_at(&mut self, point: DVec3) -> bool {
        let Some(leaf) = self.closest_quad(point) else {
            return false;
        };
        self.subdivide(leaf);
        self.has_children(leaf)
    }

    /// Unifies the parent of the leaf closest to `point`. Returns `true` if
    /// anything was collapsed.
    pub fn unify_at(&mut self, point: DVec3) -> bool {
        let Some(parent) = self
            .closest_quad(point)
            .and_then(|leaf| self.node(leaf)?.parent())
        else {
            return false;
        };
        self.unify(parent);
        true
    }

    /// Leaf whose centre is nearest to `point`.
    pub fn closest_quad(&self, point: DVec3) -> Option<QuadId> {
        search::closest_quad(self, &self.roots, point)
    }

    /// Leaves whose centres lie within `distance` of `point`.
    pub fn quads_within_distance(&self, point: DVec3, distance: f64) -> Vec<QuadId> {
        search::quads_within_distance(self, &self.roots, point, distance)
    }

    /// All leaves, depth-first in root then quadrant order.
    pub fn leaves(&self) -> Vec<QuadId> {
        let mut out = Vec::new();
        let mut stack: Vec<QuadId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            match self.children(id) {
                Some(children) => stack.extend(children.iter().rev()),
                None if self.contains(id) => out.push(id),
                None => {}
            }
        }
        out
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// Number of live nodes, leaves and interior alike.
    pub fn node_count(&self) -> usize {
        self.registry.len()
    }

    /// Deepest leaf level.
    pub fn max_depth(&self) -> u32 {
        self.leaves()
            .into_iter()
            .filter_map(|id| self.node(id).map(QuadNode::level))
            .max()
            .unwrap_or(0)
    }

    /// Unwelded mesh of the subtree under `id`: a leaf's own grid, or its
    /// children's meshes concatenated in quadrant order.
    pub fn node_mesh_data(&mut self, id: QuadId) -> MeshData {
        let mut out = MeshData::new();
        self.append_mesh(id, &mut out);
        out
    }

    fn append_mesh(&mut self, id: QuadId, out: &mut MeshData) {
        match self.children(id) {
            Some(children) => {
                for child in children {
                    self.append_mesh(child, out);
                }
            }
            None => {
                if let Some(node) = self.node_mut(id) {
                    node.append_grid(out);
                }
            }
        }
    }

    /// Unwelded mesh of every root, in root order.
    pub fn raw_mesh_data(&mut self) -> MeshData {
        let mut out = MeshData::new();
        for root in self.roots.clone() {
            self.append_mesh(root, &mut out);
        }
        out
    }

    /// Welded mesh of every root, ready for upload.
    pub fn mesh_data(&mut self) -> Result<MeshData, MeshError> {
        merge_vertices(&self.raw_mesh_data(), self.weld_precision)
    }

    /// Topology fingerprint: every leaf's path and active-side mask.
    ///
    /// Equal keys mean identical leaves and stitching, so consumers only
    /// need to re-upload geometry when the key changes.
    pub fn key(&self) -> String {
        let mut key = String::new();
        for id in self.leaves() {
            if let Some(node) = self.node(id) {
                let _ = write!(key, "{}:{:x};", node.path(), node.active_sides().bits());
            }
        }
        key
    }
}
