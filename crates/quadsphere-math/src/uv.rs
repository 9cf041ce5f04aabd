//! Texture-coordinate sub-rectangles.

use glam::DVec2;

/// An axis-aligned rectangle in UV space.
///
/// Each quadtree split hands one quarter of its parent's rectangle to each
/// child, so a leaf samples exactly its share of the texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvRect {
    /// Lower-left UV.
    pub min: DVec2,
    /// Upper-right UV.
    pub max: DVec2,
}

impl UvRect {
    /// The whole `[0, 1]²` texture.
    pub const FULL: Self = Self {
        min: DVec2::ZERO,
        max: DVec2::ONE,
    };

    /// Rectangle spanning `min` to `max`.
    #[must_use]
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// UV at normalized position `(s, t)` within the rectangle.
    #[inline]
    #[must_use]
    pub fn lerp(&self, s: f64, t: f64) -> DVec2 {
        DVec2::new(
            self.min.x + (self.max.x - self.min.x) * s,
            self.min.y + (self.max.y - self.min.y) * t,
        )
    }

    /// Centre of the rectangle.
    #[must_use]
    pub fn centre(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// The four quarters ordered bottom-left, bottom-right, top-left, top-right.
    #[must_use]
    pub fn quarters(&self) -> [UvRect; 4] {
        let c = self.centre();
        [
            UvRect::new(self.min, c),
            UvRect::new(DVec2::new(c.x, self.min.y), DVec2::new(self.max.x, c.y)),
            UvRect::new(DVec2::new(self.min.x, c.y), DVec2::new(c.x, self.max.y)),
            UvRect::new(c, self.max),
        ]
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_corners() {
        let r = UvRect::new(DVec2::new(0.25, 0.5), DVec2::new(0.5, 1.0));
        assert_eq!(r.lerp(0.0, 0.0), r.min);
        assert_eq!(r.lerp(1.0, 1.0), r.max);
        assert_eq!(r.lerp(0.5, 0.5), r.centre());
    }

    #[test]
    fn test_quarters_tile_parent() {
        let q = UvRect::FULL.quarters();
        assert_eq!(q[0], UvRect::new(DVec2::ZERO, DVec2::splat(0.5)));
        assert_eq!(q[1].min, DVec2::new(0.5, 0.0));
        assert_eq!(q[2].min, DVec2::new(0.0, 0.5));
        assert_eq!(q[3], UvRect::new(DVec2::splat(0.5), DVec2::ONE));
        let area: f64 = q
            .iter()
            .map(|r| (r.max.x - r.min.x) * (r.max.y - r.min.y))
            .sum();
        assert!((area - 1.0).abs() < 1e-12);
    }
}
