//! Patch sides, quadrants, and the active-edge bitmask.

/// One of the four edges of a patch, in its local (unrotated) frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Side {
    /// Column 0 (decreasing x).
    Left = 0,
    /// Row 0 (decreasing y).
    Bottom = 1,
    /// Last column (increasing x).
    Right = 2,
    /// Last row (increasing y).
    Top = 3,
}

impl Side {
    /// All four sides in canonical order.
    pub const ALL: [Side; 4] = [Side::Left, Side::Bottom, Side::Right, Side::Top];

    /// The side facing the other way.
    #[must_use]
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Bottom => Side::Top,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
        }
    }

    /// The two child quadrants whose own `self` edge lies on this edge.
    #[must_use]
    pub fn quadrants(self) -> [Quadrant; 2] {
        match self {
            Side::Left => [Quadrant::BottomLeft, Quadrant::TopLeft],
            Side::Bottom => [Quadrant::BottomLeft, Quadrant::BottomRight],
            Side::Right => [Quadrant::BottomRight, Quadrant::TopRight],
            Side::Top => [Quadrant::TopLeft, Quadrant::TopRight],
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Child slot of a subdivided patch.
///
/// The discriminant is the slot index, and also the order in which child
/// mesh data is concatenated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Quadrant {
    /// Lower-left child.
    BottomLeft = 0,
    /// Lower-right child.
    BottomRight = 1,
    /// Upper-left child.
    TopLeft = 2,
    /// Upper-right child.
    TopRight = 3,
}

impl Quadrant {
    /// All quadrants in slot order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
        Quadrant::TopLeft,
        Quadrant::TopRight,
    ];

    /// Unit offset `(x, y)` from the parent's centre towards this quadrant's corner.
    #[must_use]
    pub fn corner_sign(self) -> (f64, f64) {
        match self {
            Quadrant::BottomLeft => (-1.0, -1.0),
            Quadrant::BottomRight => (1.0, -1.0),
            Quadrant::TopLeft => (-1.0, 1.0),
            Quadrant::TopRight => (1.0, 1.0),
        }
    }

    /// Digit used in topology keys.
    #[must_use]
    pub fn digit(self) -> char {
        match self {
            Quadrant::BottomLeft => '0',
            Quadrant::BottomRight => '1',
            Quadrant::TopLeft => '2',
            Quadrant::TopRight => '3',
        }
    }
}

/// Bitmask of active sides.
///
/// Bit 0 = left, bit 1 = bottom, bit 2 = right, bit 3 = top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Sides(u8);

impl Sides {
    /// No side active.
    pub const NONE: Self = Self(0);
    /// All four sides active.
    pub const ALL: Self = Self(0b1111);

    /// Returns `true` if `side` is in the set.
    #[must_use]
    pub fn contains(self, side: Side) -> bool {
        self.0 & side.bit() != 0
    }

    /// Adds `side`.
    pub fn insert(&mut self, side: Side) {
        self.0 |= side.bit();
    }

    /// Removes `side`.
    pub fn remove(&mut self, side: Side) {
        self.0 &= !side.bit();
    }

    /// Adds every side in `other`.
    pub fn insert_all(&mut self, other: Sides) {
        self.0 |= other.0;
    }

    /// Removes every side in `other`.
    pub fn remove_all(&mut self, other: Sides) {
        self.0 &= !other.0;
    }

    /// Raw mask, as used in topology keys.
    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if no side is active.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained sides in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Side> {
        Side::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl From<Side> for Sides {
    fn from(side: Side) -> Self {
        Self(side.bit())
    }
}

impl FromIterator<Side> for Sides {
    fn from_iter<I: IntoIterator<Item = Side>>(iter: I) -> Self {
        let mut sides = Sides::NONE;
        for side in iter {
            sides.insert(side);
        }
        sides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for side in Side::ALL {
            assert_eq!(side.opposite().opposite(), side);
            assert_ne!(side.opposite(), side);
        }
    }

    #[test]
    fn test_side_quadrants_touch_that_side() {
        for side in Side::ALL {
            for q in side.quadrants() {
                let (x, y) = q.corner_sign();
                let touches = match side {
                    Side::Left => x < 0.0,
                    Side::Right => x > 0.0,
                    Side::Bottom => y < 0.0,
                    Side::Top => y > 0.0,
                };
                assert!(touches, "{q:?} does not touch {side:?}");
            }
        }
    }

    #[test]
    fn test_sides_insert_remove() {
        let mut s = Sides::NONE;
        s.insert(Side::Top);
        s.insert(Side::Left);
        assert!(s.contains(Side::Top));
        assert!(!s.contains(Side::Right));
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![Side::Left, Side::Top]);
        s.remove(Side::Top);
        assert_eq!(s, Sides::from(Side::Left));
    }

    #[test]
    fn test_sides_from_iter_all() {
        let s: Sides = Side::ALL.into_iter().collect();
        assert_eq!(s, Sides::ALL);
        assert_eq!(s.bits(), 0b1111);
    }

    #[test]
    fn test_quadrant_slot_order() {
        for (i, q) in Quadrant::ALL.iter().enumerate() {
            assert_eq!(*q as usize, i);
        }
    }
}
