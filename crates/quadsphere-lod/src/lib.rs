//! Adaptive, crack-free quadtree level of detail for flat patches and spheres.
//!
//! A [`QuadTree`] owns every node in an arena together with a [`Registry`]
//! that finds same-level neighbours geometrically. Subdividing or unifying a
//! node cascades through neighbours so adjacent leaves never differ by more
//! than one level, and leaves bordering a finer region stitch their edge
//! with extra triangles. [`Sphere`] composes six curved roots into one tree.

mod error;
mod lod;
mod mesh;
mod node;
mod registry;
mod search;
mod side;
mod sphere;
mod tree;
pub mod triangulate;

pub use error::{MeshError, QuadError};
pub use lod::{LodAction, LodPolicy};
pub use mesh::{MeshData, merge_vertices};
pub use node::{Curve, PatchSpec, QuadId, QuadNode};
pub use registry::{Neighbor, Registry};
pub use search::{closest_quad, quads_within_distance};
pub use side::{Quadrant, Side, Sides};
pub use sphere::{Sphere, SphereFace, SphereOptions, UvLayout};
pub use tree::{DEFAULT_NEIGHBOR_TOLERANCE, DEFAULT_WELD_PRECISION, QuadOptions, QuadTree};
