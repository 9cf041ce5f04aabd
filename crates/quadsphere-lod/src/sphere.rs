//! Six curved quadtree roots composed into one sphere.
//!
//! Every face starts as the `z = +radius` plane around the sphere centre and
//! is rotated into place about that centre, so all faces share one local
//! layout and one registry. Seams are found geometrically by the registry.

use glam::{DVec2, DVec3};
use quadsphere_math::{Orientation, UvRect};

use crate::error::{MeshError, QuadError};
use crate::lod::{LodAction, LodPolicy};
use crate::mesh::MeshData;
use crate::node::{Curve, PatchSpec, QuadId};
use crate::tree::{DEFAULT_NEIGHBOR_TOLERANCE, DEFAULT_WELD_PRECISION, QuadTree};

/// One of the six cube faces, named by the direction its normal points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SphereFace {
    /// +Z
    Front = 0,
    /// +X
    Right = 1,
    /// −Z
    Back = 2,
    /// −X
    Left = 3,
    /// +Y
    Top = 4,
    /// −Y
    Bottom = 5,
}

impl SphereFace {
    /// All faces in root order.
    pub const ALL: [SphereFace; 6] = [
        SphereFace::Front,
        SphereFace::Right,
        SphereFace::Back,
        SphereFace::Left,
        SphereFace::Top,
        SphereFace::Bottom,
    ];

    /// Axis and angle in degrees taking the `+Z` face onto this one.
    #[must_use]
    pub fn rotation(self) -> (DVec3, f64) {
        match self {
            SphereFace::Front => (DVec3::Y, 0.0),
            SphereFace::Right => (DVec3::Y, 90.0),
            SphereFace::Back => (DVec3::Y, 180.0),
            SphereFace::Left => (DVec3::Y, -90.0),
            SphereFace::Top => (DVec3::X, -90.0),
            SphereFace::Bottom => (DVec3::X, 90.0),
        }
    }

    /// The face on the far side of the sphere.
    #[must_use]
    pub fn opposite(self) -> SphereFace {
        match self {
            SphereFace::Front => SphereFace::Back,
            SphereFace::Back => SphereFace::Front,
            SphereFace::Left => SphereFace::Right,
            SphereFace::Right => SphereFace::Left,
            SphereFace::Top => SphereFace::Bottom,
            SphereFace::Bottom => SphereFace::Top,
        }
    }

    /// Outward unit normal.
    #[must_use]
    pub fn normal(self) -> DVec3 {
        match self {
            SphereFace::Front => DVec3::Z,
            SphereFace::Right => DVec3::X,
            SphereFace::Back => DVec3::NEG_Z,
            SphereFace::Left => DVec3::NEG_X,
            SphereFace::Top => DVec3::Y,
            SphereFace::Bottom => DVec3::NEG_Y,
        }
    }

    /// Tile of this face in a 4×3 horizontal-cross cube-map atlas.
    ///
    /// ```text
    ///        [Top]
    /// [Left][Front][Right][Back]
    ///        [Bottom]
    /// ```
    #[must_use]
    pub fn atlas_rect(self) -> UvRect {
        let (col, row) = match self {
            SphereFace::Left => (0.0, 1.0),
            SphereFace::Front => (1.0, 1.0),
            SphereFace::Right => (2.0, 1.0),
            SphereFace::Back => (3.0, 1.0),
            SphereFace::Top => (1.0, 2.0),
            SphereFace::Bottom => (1.0, 0.0),
        };
        UvRect::new(
            DVec2::new(col / 4.0, row / 3.0),
            DVec2::new((col + 1.0) / 4.0, (row + 1.0) / 3.0),
        )
    }
}

/// How texture coordinates are laid out across faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UvLayout {
    /// Every face spans the whole `[0, 1]²` range.
    #[default]
    Split,
    /// Faces share one cube-cross atlas.
    Atlas,
}

impl UvLayout {
    fn rect(self, face: SphereFace) -> UvRect {
        match self {
            UvLayout::Split => UvRect::FULL,
            UvLayout::Atlas => face.atlas_rect(),
        }
    }
}

/// Construction options for a [`Sphere`].
#[derive(Clone, Debug, PartialEq)]
pub struct SphereOptions {
    pub centre: DVec3,
    pub radius: f64,
    pub segments: u32,
    pub max_level: u32,
    pub uv_layout: UvLayout,
    pub neighbor_tolerance: f64,
    pub weld_precision: f64,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            centre: DVec3::ZERO,
            radius: 1.0,
            segments: 3,
            max_level: 5,
            uv_layout: UvLayout::Split,
            neighbor_tolerance: DEFAULT_NEIGHBOR_TOLERANCE,
            weld_precision: DEFAULT_WELD_PRECISION,
        }
    }
}

/// A sphere built from six curved quadtree faces.
#[derive(Clone, Debug)]
pub struct Sphere {
    tree: QuadTree,
    faces: [QuadId; 6],
    centre: DVec3,
    radius: f64,
}

impl Sphere {
    pub fn new(options: SphereOptions) -> Result<Self, QuadError> {
        let SphereOptions {
            centre,
            radius,
            segments,
            max_level,
            uv_layout,
            neighbor_tolerance,
            weld_precision,
        } = options;

        let mut tree = QuadTree::empty(max_level, neighbor_tolerance, weld_precision)?;
        let mut faces = Vec::with_capacity(SphereFace::ALL.len());
        for face in SphereFace::ALL {
            let (axis, angle) = face.rotation();
            let spec = PatchSpec {
                centre: centre + DVec3::new(0.0, 0.0, radius),
                radius,
                segments,
                level: 0,
                orientation: Orientation::new(axis, angle, centre),
                curve: Some(Curve {
                    origin: centre,
                    radius,
                }),
                uv: uv_layout.rect(face),
            };
            faces.push(tree.add_root(spec)?);
        }
        let faces: [QuadId; 6] = std::array::from_fn(|i| faces[i]);

        tracing::debug!(radius, segments, max_level, ?uv_layout, "built sphere");
        Ok(Self {
            tree,
            faces,
            centre,
            radius,
        })
    }

    /// The shared quadtree forest holding all six faces.
    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    /// Root node of `face`.
    pub fn face(&self, face: SphereFace) -> QuadId {
        self.faces[face as usize]
    }

    pub fn centre(&self) -> DVec3 {
        self.centre
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Face whose root is nearest to `point`.
    pub fn nearest_face(&self, point: DVec3) -> SphereFace {
        let direction = point - self.centre;
        SphereFace::ALL
            .into_iter()
            .max_by(|a, b| direction.dot(a.normal()).total_cmp(&direction.dot(b.normal())))
            .unwrap_or(SphereFace::Front)
    }

    pub fn subdivide(&mut self, id: QuadId) {
        self.tree.subdivide(id);
    }

    pub fn unify(&mut self, id: QuadId) {
        self.tree.unify(id);
    }

    /// Subdivides the leaf nearest to `point`, on whichever face it lies.
    pub fn subdivide_at(&mut self, point: DVec3) -> bool {
        self.tree.subdivide_at(point)
    }

    /// Unifies the parent of the leaf nearest to `point`.
    pub fn unify_at(&mut self, point: DVec3) -> bool {
        self.tree.unify_at(point)
    }

    pub fn closest_quad(&self, point: DVec3) -> Option<QuadId> {
        self.tree.closest_quad(point)
    }

    pub fn quads_within_distance(&self, point: DVec3, distance: f64) -> Vec<QuadId> {
        self.tree.quads_within_distance(point, distance)
    }

    /// All six faces' leaf grids, unwelded.
    pub fn raw_mesh_data(&mut self) -> MeshData {
        self.tree.raw_mesh_data()
    }

    /// Welded mesh of the whole sphere.
    pub fn mesh_data(&mut self) -> Result<MeshData, MeshError> {
        self.tree.mesh_data()
    }

    pub fn key(&self) -> String {
        self.tree.key()
    }

    pub fn update(&mut self, viewer: DVec3, policy: &LodPolicy) -> LodAction {
        self.tree.update(viewer, policy)
    }

    pub fn leaf_count(&self) -> usize {
        self.tree.leaf_count()
    }

    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    pub fn max_depth(&self) -> u32 {
        self.tree.max_depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::side::Side;
    use rustc_hash::FxHashMap;

    const EPSILON: f64 = 1e-5;

    fn sphere() -> Sphere {
        Sphere::new(SphereOptions::default()).unwrap()
    }

    /// Every leaf's neighbours, across seams included, are within one level.
    fn assert_balanced(sphere: &Sphere) {
        let tree = sphere.tree();
        for leaf in tree.leaves() {
            let node = tree.node(leaf).unwrap();
            for side in Side::ALL {
                match tree.neighbor(leaf, side) {
                    Some(n) => {
                        if let Some(children) = tree.children(n.id) {
                            assert!(node.active_sides().contains(side));
                            for q in n.side.quadrants() {
                                assert!(
                                    !tree.has_children(children[q as usize]),
                                    "{} borders a patch two levels deeper",
                                    node.path()
                                );
                            }
                        } else {
                            assert!(!node.active_sides().contains(side));
                        }
                    }
                    None => {
                        let parent = node.parent().expect("roots always have neighbours");
                        assert!(
                            tree.neighbor(parent, side).is_some(),
                            "{} borders a patch two levels coarser on {side:?}",
                            node.path()
                        );
                    }
                }
            }
        }
    }

    /// Closed, consistently wound surface: every directed edge appears once
    /// and its reverse appears once.
    fn assert_watertight(sphere: &mut Sphere) {
        let mesh = sphere.mesh_data().unwrap();
        let mut directed: FxHashMap<(u32, u32), u32> = FxHashMap::default();
        for tri in mesh.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                *directed.entry((a, b)).or_default() += 1;
            }
        }
        for (&(a, b), &count) in &directed {
            assert_eq!(count, 1, "edge {a}->{b} used {count} times");
            assert_eq!(directed.get(&(b, a)), Some(&1), "edge {a}->{b} has no twin");
        }
    }

    #[test]
    fn test_unsplit_sphere_mesh() {
        let mut sphere = sphere();
        let raw = sphere.raw_mesh_data();
        assert_eq!(raw.vertex_count(), 6 * 9);
        assert_eq!(raw.triangle_count(), 6 * 4);

        let mesh = sphere.mesh_data().unwrap();
        assert_eq!(mesh.triangle_count(), 24);
        // 8 corners, 12 edge midpoints, 6 face centres.
        assert_eq!(mesh.vertex_count(), 26);
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i);
            let length = DVec3::new(p[0].into(), p[1].into(), p[2].into()).length();
            assert!((length - 1.0).abs() < EPSILON, "vertex {i} at {length}");
        }
        assert_watertight(&mut sphere);
    }

    #[test]
    fn test_offset_sphere_vertices_lie_on_surface() {
        let centre = DVec3::new(3.0, -2.0, 1.0);
        let mut sphere = Sphere::new(SphereOptions {
            centre,
            radius: 2.5,
            segments: 5,
            ..SphereOptions::default()
        })
        .unwrap();
        let mesh = sphere.mesh_data().unwrap();
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i);
            let p = DVec3::new(p[0].into(), p[1].into(), p[2].into());
            assert!((p.distance(centre) - 2.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_triangles_wind_outward() {
        let mut sphere = sphere();
        sphere.subdivide_at(DVec3::new(0.7, 0.1, 0.7));
        let mesh = sphere.mesh_data().unwrap();
        let at = |i: u32| {
            let p = mesh.position(i as usize);
            DVec3::new(p[0].into(), p[1].into(), p[2].into())
        };
        for tri in mesh.indices.chunks_exact(3) {
            let (a, b, c) = (at(tri[0]), at(tri[1]), at(tri[2]));
            let normal = (b - a).cross(c - a);
            assert!(normal.dot(a + b + c) > 0.0);
        }
    }

    #[test]
    fn test_face_roots_point_along_normals() {
        let sphere = sphere();
        for face in SphereFace::ALL {
            let node = sphere.tree().node(sphere.face(face)).unwrap();
            assert!((node.world_centre() - face.normal()).length() < EPSILON);
            assert_eq!(sphere.nearest_face(face.normal() * 3.0), face);
        }
    }

    #[test]
    fn test_every_face_has_four_seam_neighbours() {
        let sphere = sphere();
        let tree = sphere.tree();
        for face in SphereFace::ALL {
            let id = sphere.face(face);
            let neighbours = tree.neighbors(id);
            assert!(neighbours.iter().all(Option::is_some), "{face:?} has a gap");
            for n in neighbours.into_iter().flatten() {
                assert_ne!(n.id, sphere.face(face.opposite()));
                let back = tree.neighbor(n.id, n.side).unwrap();
                assert_eq!(back.id, id);
            }
        }
    }

    #[test]
    fn test_seam_refinement_keeps_neighbouring_face_balanced() {
        let mut sphere = sphere();
        // Front face, just inside its seam with the right face.
        let seam = DVec3::new(1.0, 0.05, 1.1).normalize();
        for _ in 0..4 {
            assert!(sphere.subdivide_at(seam));
            assert_balanced(&sphere);
            assert_watertight(&mut sphere);
        }
        assert_eq!(sphere.max_depth(), 4);

        // The deepest leaf on the front face borders the right face; the
        // right face must have been refined to within one level of it.
        let tree = sphere.tree();
        let prefix = format!("{}/", SphereFace::Right as usize);
        let right_depth = tree
            .leaves()
            .into_iter()
            .filter(|id| tree.node(*id).unwrap().path().starts_with(&prefix))
            .map(|id| tree.node(id).unwrap().level())
            .max()
            .unwrap();
        assert!(right_depth >= 3);
    }

    #[test]
    fn test_corner_refinement_touches_three_faces() {
        let mut sphere = sphere();
        let corner = DVec3::new(1.0, 1.0, 1.0).normalize() * 0.999;
        for _ in 0..3 {
            sphere.subdivide_at(corner);
            assert_balanced(&sphere);
        }
        assert_watertight(&mut sphere);
        for _ in 0..3 {
            sphere.unify_at(corner);
            assert_balanced(&sphere);
            assert_watertight(&mut sphere);
        }
    }

    #[test]
    fn test_round_trip_restores_key_and_mesh() {
        let mut sphere = sphere();
        let before_key = sphere.key();
        let before_mesh = sphere.mesh_data().unwrap();
        let front = sphere.face(SphereFace::Front);

        sphere.subdivide(front);
        assert_ne!(sphere.key(), before_key);
        sphere.unify(front);

        assert_eq!(sphere.key(), before_key);
        assert_eq!(sphere.mesh_data().unwrap(), before_mesh);
    }

    #[test]
    fn test_atlas_layout_is_a_horizontal_cross() {
        let front = SphereFace::Front.atlas_rect();
        assert_eq!(front.min, DVec2::new(0.25, 1.0 / 3.0));
        assert_eq!(front.max, DVec2::new(0.5, 2.0 / 3.0));
        let top = SphereFace::Top.atlas_rect();
        assert_eq!(top.min.x, 0.25);
        assert_eq!(top.min.y, 2.0 / 3.0);

        let sphere = Sphere::new(SphereOptions {
            uv_layout: UvLayout::Atlas,
            ..SphereOptions::default()
        })
        .unwrap();
        for face in SphereFace::ALL {
            let rect = face.atlas_rect();
            let node = sphere.tree().node(sphere.face(face)).unwrap();
            for uv in node.uvs() {
                assert!(uv.x >= rect.min.x - EPSILON && uv.x <= rect.max.x + EPSILON);
                assert!(uv.y >= rect.min.y - EPSILON && uv.y <= rect.max.y + EPSILON);
            }
        }
    }

    #[test]
    fn test_viewer_descent_refines_under_viewer() {
        let mut sphere = Sphere::new(SphereOptions {
            max_level: 4,
            ..SphereOptions::default()
        })
        .unwrap();
        let policy = LodPolicy::default();
        let viewer = DVec3::new(0.0, 1.02, 0.0);
        let mut steps = 0;
        while sphere.update(viewer, &policy).changed() {
            steps += 1;
            assert!(steps < 1000);
        }
        let leaf = sphere.closest_quad(viewer).unwrap();
        assert_eq!(sphere.tree().node(leaf).unwrap().level(), 4);
        assert_balanced(&sphere);
        assert_watertight(&mut sphere);
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let err = Sphere::new(SphereOptions {
            segments: 2,
            ..SphereOptions::default()
        })
        .unwrap_err();
        assert_eq!(err, QuadError::InvalidSegments(2));
        assert!(Sphere::new(SphereOptions {
            radius: 0.0,
            ..SphereOptions::default()
        })
        .is_err());
    }
}
