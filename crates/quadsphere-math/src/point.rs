//! Point arithmetic and axis/angle rotation.

use glam::{DQuat, DVec3};

/// Midpoint of the segment `a`–`b`.
#[inline]
#[must_use]
pub fn midpoint(a: DVec3, b: DVec3) -> DVec3 {
    (a + b) * 0.5
}

/// Euclidean distance between two points.
#[inline]
#[must_use]
pub fn distance(a: DVec3, b: DVec3) -> f64 {
    (a - b).length()
}

/// Rotate `point` by `angle_degrees` around `axis`, passing through `pivot`.
///
/// The axis is normalized before use. When `pivot` is `None` the rotation is
/// about the coordinate origin. A zero-length axis or a zero angle returns
/// the point unchanged.
#[must_use]
pub fn rotate_point(point: DVec3, angle_degrees: f64, axis: DVec3, pivot: Option<DVec3>) -> DVec3 {
    let axis = axis.normalize_or_zero();
    if axis == DVec3::ZERO || angle_degrees == 0.0 {
        return point;
    }
    let pivot = pivot.unwrap_or(DVec3::ZERO);
    let rotation = DQuat::from_axis_angle(axis, angle_degrees.to_radians());
    pivot + rotation * (point - pivot)
}

/// Rigid orientation applied to every sample of a patch.
///
/// Used to turn the shared `+Z`-facing local plane into one of the six
/// faces of a cube.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    /// Rotation axis (need not be unit length).
    pub axis: DVec3,
    /// Rotation angle in degrees.
    pub angle_degrees: f64,
    /// Point the rotation axis passes through.
    pub pivot: DVec3,
}

impl Orientation {
    /// No rotation.
    pub const IDENTITY: Self = Self {
        axis: DVec3::Z,
        angle_degrees: 0.0,
        pivot: DVec3::ZERO,
    };

    /// Rotation of `angle_degrees` about `axis` through `pivot`.
    #[must_use]
    pub fn new(axis: DVec3, angle_degrees: f64, pivot: DVec3) -> Self {
        Self {
            axis,
            angle_degrees,
            pivot,
        }
    }

    /// Rotate a position.
    #[inline]
    #[must_use]
    pub fn apply_point(&self, point: DVec3) -> DVec3 {
        rotate_point(point, self.angle_degrees, self.axis, Some(self.pivot))
    }

    /// Rotate a direction (the pivot is ignored).
    #[inline]
    #[must_use]
    pub fn apply_direction(&self, direction: DVec3) -> DVec3 {
        rotate_point(direction, self.angle_degrees, self.axis, None)
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}
