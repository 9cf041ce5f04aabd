//! A single quadtree patch: its grid, subdivision slots, and active edges.

use std::fmt;

use glam::{DVec2, DVec3};
use quadsphere_math::{Orientation, UvRect, apply_curve, midpoint};

use crate::error::QuadError;
use crate::mesh::MeshData;
use crate::side::{Quadrant, Side, Sides};
use crate::triangulate::{centre_index, grid_index, leaf_indices};

/// Generational handle of a node in a [`QuadTree`](crate::QuadTree).
///
/// A handle stops resolving once its node is disposed, even if the slot is
/// later reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuadId {
    index: u32,
    generation: u32,
}

impl QuadId {
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        Self {
            index: index as u32,
            generation,
        }
    }

    /// Arena slot.
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Slot generation this handle was issued for.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for QuadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Spherical bending applied after orientation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Curve {
    /// Centre of the target sphere.
    pub origin: DVec3,
    /// Radius of the target sphere.
    pub radius: f64,
}

/// Geometry and placement of one patch.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchSpec {
    /// Centre in the local plane, before orientation.
    pub centre: DVec3,
    /// Half the patch width.
    pub radius: f64,
    /// Samples per grid row; odd and at least 3.
    pub segments: u32,
    /// Depth below the root.
    pub level: u32,
    /// Rotation into world space.
    pub orientation: Orientation,
    /// Optional projection onto a sphere.
    pub curve: Option<Curve>,
    /// Texture sub-rectangle covered by this patch.
    pub uv: UvRect,
}

impl PatchSpec {
    /// Rejects segment counts and radii that cannot produce a centred grid.
    pub fn validate(&self) -> Result<(), QuadError> {
        if self.segments < 3 || self.segments % 2 == 0 {
            return Err(QuadError::InvalidSegments(self.segments));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(QuadError::InvalidRadius(self.radius));
        }
        if let Some(curve) = self.curve
            && !(curve.radius.is_finite() && curve.radius > 0.0)
        {
            return Err(QuadError::InvalidRadius(curve.radius));
        }
        Ok(())
    }

    /// Spec of the child occupying `quadrant`.
    #[must_use]
    pub fn child(&self, quadrant: Quadrant) -> PatchSpec {
        let (sx, sy) = quadrant.corner_sign();
        let corner = self.centre + DVec3::new(sx * self.radius, sy * self.radius, 0.0);
        PatchSpec {
            centre: midpoint(corner, self.centre),
            radius: self.radius * 0.5,
            segments: self.segments,
            level: self.level + 1,
            orientation: self.orientation,
            curve: self.curve,
            uv: self.uv.quarters()[quadrant as usize],
        }
    }
}

/// One patch of the quadtree.
///
/// Holds a `segments × segments` grid of samples in world space. A node is a
/// leaf until it is subdivided, at which point it keeps its grid but hands
/// rendering over to its four children.
#[derive(Clone, Debug)]
pub struct QuadNode {
    spec: PatchSpec,
    parent: Option<QuadId>,
    children: Option<[QuadId; 4]>,
    path: String,
    active: Sides,
    positions: Vec<DVec3>,
    normals: Vec<DVec3>,
    uvs: Vec<DVec2>,
    dirty: bool,
    indices: Vec<u32>,
}

impl QuadNode {
    /// Builds the grid for `spec`.
    ///
    /// `path` identifies the node within its tree (root index followed by
    /// quadrant digits). The spec is assumed valid.
    pub(crate) fn new(spec: PatchSpec, parent: Option<QuadId>, path: String) -> Self {
        let n = spec.segments as usize;
        let last = (spec.segments - 1) as f64;
        let mut positions = Vec::with_capacity(n * n);
        let mut normals = Vec::with_capacity(n * n);
        let mut uvs = Vec::with_capacity(n * n);

        let plane_normal = spec.orientation.apply_direction(DVec3::Z);
        for j in 0..n {
            let t = j as f64 / last;
            for i in 0..n {
                let s = i as f64 / last;
                let local = spec.centre
                    + DVec3::new(
                        spec.radius * (2.0 * s - 1.0),
                        spec.radius * (2.0 * t - 1.0),
                        0.0,
                    );
                let mut position = spec.orientation.apply_point(local);
                let mut normal = plane_normal;
                if let Some(curve) = spec.curve {
                    position = apply_curve(position, curve.origin, curve.radius);
                    normal = (position - curve.origin).normalize_or_zero();
                }
                positions.push(position);
                normals.push(normal);
                uvs.push(spec.uv.lerp(s, t));
            }
        }

        Self {
            spec,
            parent,
            children: None,
            path,
            active: Sides::NONE,
            positions,
            normals,
            uvs,
            dirty: true,
            indices: Vec::new(),
        }
    }

    /// The spec this node was built from.
    pub fn spec(&self) -> &PatchSpec {
        &self.spec
    }

    /// Centre in the local plane.
    pub fn centre(&self) -> DVec3 {
        self.spec.centre
    }

    /// World-space centre sample.
    pub fn world_centre(&self) -> DVec3 {
        self.positions[centre_index(self.spec.segments) as usize]
    }

    /// Half the patch width.
    pub fn radius(&self) -> f64 {
        self.spec.radius
    }

    /// Samples per grid row.
    pub fn segments(&self) -> u32 {
        self.spec.segments
    }

    /// Depth below the root.
    pub fn level(&self) -> u32 {
        self.spec.level
    }

    /// Parent handle, `None` for roots.
    pub fn parent(&self) -> Option<QuadId> {
        self.parent
    }

    /// Children in quadrant order, if subdivided.
    pub fn children(&self) -> Option<[QuadId; 4]> {
        self.children
    }

    /// Returns `true` iff all four child slots are populated.
    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    /// Child in `quadrant`, if subdivided.
    pub fn child(&self, quadrant: Quadrant) -> Option<QuadId> {
        self.children.map(|c| c[quadrant as usize])
    }

    /// Root index and quadrant digits, e.g. `2/031`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Human-readable identifier from world centre, radius, and level.
    pub fn identifier(&self) -> String {
        let c = self.world_centre();
        format!(
            "L{}@({:.6},{:.6},{:.6})r{}",
            self.spec.level, c.x, c.y, c.z, self.spec.radius
        )
    }

    /// Sides currently drawn with the zipper pattern.
    pub fn active_sides(&self) -> Sides {
        self.active
    }

    /// Returns `true` if cached triangle indices are stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// World-space sample positions, row-major from the bottom-left corner.
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    /// Per-sample outward normals.
    pub fn normals(&self) -> &[DVec3] {
        &self.normals
    }

    /// Per-sample texture coordinates.
    pub fn uvs(&self) -> &[DVec2] {
        &self.uvs
    }

    /// Samples along `side`, ordered by increasing local x or y.
    pub fn edge(&self, side: Side) -> Vec<DVec3> {
        let n = self.spec.segments;
        let last = n - 1;
        (0..n)
            .map(|k| {
                let (x, y) = match side {
                    Side::Left => (0, k),
                    Side::Right => (last, k),
                    Side::Bottom => (k, 0),
                    Side::Top => (k, last),
                };
                self.positions[grid_index(x, y, n) as usize]
            })
            .collect()
    }

    /// All four edges in [`Side::ALL`] order.
    pub(crate) fn edges(&self) -> [Vec<DVec3>; 4] {
        Side::ALL.map(|side| self.edge(side))
    }

    /// Adds `sides` to the active set. No cascading.
    pub fn activate(&mut self, sides: Sides) {
        let before = self.active;
        self.active.insert_all(sides);
        self.dirty |= before != self.active;
    }

    /// Removes `sides` from the active set. No cascading.
    pub fn deactivate(&mut self, sides: Sides) {
        let before = self.active;
        self.active.remove_all(sides);
        self.dirty |= before != self.active;
    }

    pub(crate) fn set_children(&mut self, children: Option<[QuadId; 4]>) {
        self.children = children;
        self.dirty = true;
    }

    /// Leaf triangulation for the current active sides, recomputed only when dirty.
    pub fn triangles(&mut self) -> &[u32] {
        if self.dirty {
            self.indices = leaf_indices(self.spec.segments, self.active);
            self.dirty = false;
        }
        &self.indices
    }

    /// Appends this node's own grid and triangles to `out`.
    pub(crate) fn append_grid(&mut self, out: &mut MeshData) {
        let offset = out.vertex_count() as u32;
        for ((p, n), uv) in self.positions.iter().zip(&self.normals).zip(&self.uvs) {
            let uv = uv.as_vec2().to_array();
            out.push_vertex(p.as_vec3().to_array(), n.as_vec3().to_array(), uv);
        }
        let triangles = self.triangles().iter().map(|&i| i + offset);
        out.indices.extend(triangles);
    }

    /// This node's own grid as a standalone mesh.
    pub fn mesh_data(&mut self) -> MeshData {
        let mut out = MeshData::new();
        self.append_grid(&mut out);
        out
    }
}
