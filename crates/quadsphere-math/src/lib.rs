//! Point, orientation, UV and curvature math for quadtree sphere patches.

mod curve;
mod point;
mod uv;

pub use curve::{apply_curve, cube_to_sphere_everitt, project_to_cube};
pub use point::{Orientation, distance, midpoint, rotate_point};
pub use uv::UvRect;
