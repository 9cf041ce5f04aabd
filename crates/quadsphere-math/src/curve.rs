//! Curvature: bending flat cube-face samples onto a sphere.
//!
//! Naive normalize-and-scale crowds samples towards the face centre. The
//! Everitt mapping adds cross terms that spread them more evenly while
//! staying continuous across cube edges.

use glam::DVec3;

/// Analytic cube-to-sphere mapping for a point on the `[-1, 1]` cube surface.
///
/// ```text
/// sx = x * sqrt(1 - y²/2 - z²/2 + y²z²/3)
/// sy = y * sqrt(1 - x²/2 - z²/2 + x²z²/3)
/// sz = z * sqrt(1 - x²/2 - y²/2 + x²y²/3)
/// ```
#[inline]
#[must_use]
pub fn cube_to_sphere_everitt(cube_point: DVec3) -> DVec3 {
    let x2 = cube_point.x * cube_point.x;
    let y2 = cube_point.y * cube_point.y;
    let z2 = cube_point.z * cube_point.z;

    DVec3::new(
        cube_point.x * (1.0 - y2 / 2.0 - z2 / 2.0 + y2 * z2 / 3.0).max(0.0).sqrt(),
        cube_point.y * (1.0 - x2 / 2.0 - z2 / 2.0 + x2 * z2 / 3.0).max(0.0).sqrt(),
        cube_point.z * (1.0 - x2 / 2.0 - y2 / 2.0 + x2 * y2 / 3.0).max(0.0).sqrt(),
    )
}

/// Scale `offset` so its largest absolute component is 1, placing it on the
/// surface of the unit cube. Returns `None` for the zero vector.
#[inline]
#[must_use]
pub fn project_to_cube(offset: DVec3) -> Option<DVec3> {
    let extent = offset.abs().max_element();
    if extent > 0.0 && extent.is_finite() {
        Some(offset / extent)
    } else {
        None
    }
}

/// Project `point` onto the sphere of `target_radius` around `origin`.
///
/// The offset from `origin` is first pushed onto the unit cube surface, so
/// the result depends only on the direction of `point`. A point equal to
/// `origin` has no direction and is returned unchanged.
#[must_use]
pub fn apply_curve(point: DVec3, origin: DVec3, target_radius: f64) -> DVec3 {
    let Some(cube_point) = project_to_cube(point - origin) else {
        return point;
    };
    origin + cube_to_sphere_everitt(cube_point).normalize() * target_radius
}
