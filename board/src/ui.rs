//! Minimal pixel-rectangle primitives.
//!
//! Coordinates are signed: floating pieces may hang off the left/top edge of the widget while
//! being dragged, and `pixel_to_square` callers routinely probe points outside the board.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn from_size(w: i32, h: i32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    /// One past the last column.
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// One past the last row.
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Overlapping area of both rects; empty (zero-sized) if they do not overlap.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return Rect::new(x0, y0, 0, 0);
        }
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Bounding box of both rects. Empty rects do not contribute.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Returns the rectangle inset by `insets` (i.e. the inner content area).
    ///
    /// If insets exceed the rect size, the resulting width/height will saturate to 0.
    pub fn inset(&self, insets: Insets) -> Self {
        let w = (self.w - (insets.left + insets.right)).max(0);
        let h = (self.h - (insets.top + insets.bottom)).max(0);
        Self {
            x: self.x + insets.left,
            y: self.y + insets.top,
            w,
            h,
        }
    }

    /// The parts of `self` not covered by `hole`, as up to four disjoint strips
    /// (above, below, left, right).
    pub fn subtract(&self, hole: &Rect) -> [Rect; 4] {
        let cut = self.intersection(hole);
        if cut.is_empty() {
            return [*self, Rect::default(), Rect::default(), Rect::default()];
        }
        [
            Rect::new(self.x, self.y, self.w, cut.y - self.y),
            Rect::new(self.x, cut.bottom(), self.w, self.bottom() - cut.bottom()),
            Rect::new(self.x, cut.y, cut.x - self.x, cut.h),
            Rect::new(cut.right(), cut.y, self.right() - cut.right(), cut.h),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    pub const ZERO: Insets = Insets {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub fn all(v: i32) -> Self {
        Self {
            left: v,
            top: v,
            right: v,
            bottom: v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_shrinks_rect_and_moves_origin() {
        let r = Rect::from_size(100, 80);
        let inner = r.inset(Insets::all(10));
        assert_eq!(inner, Rect::new(10, 10, 80, 60));
    }

    #[test]
    fn inset_saturates_to_empty() {
        let r = Rect::new(5, 5, 10, 10);
        assert!(r.inset(Insets::all(6)).is_empty());
    }

    #[test]
    fn intersection_of_disjoint_rects_is_empty() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(a.intersection(&b).is_empty());
        assert!(!a.intersects(&b));
        assert_eq!(a.intersection(&Rect::new(5, 5, 10, 10)), Rect::new(5, 5, 5, 5));
    }

    #[test]
    fn union_ignores_empty_rects() {
        let a = Rect::new(3, 4, 5, 6);
        assert_eq!(a.union(&Rect::default()), a);
        assert_eq!(Rect::default().union(&a), a);
        assert_eq!(a.union(&Rect::new(-2, 0, 1, 1)), Rect::new(-2, 0, 10, 10));
    }

    #[test]
    fn subtract_leaves_four_strips_around_hole() {
        let outer = Rect::from_size(10, 10);
        let strips = outer.subtract(&Rect::new(2, 3, 4, 5));
        let area: i32 = strips
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| r.w * r.h)
            .sum();
        assert_eq!(area, 100 - 20);
        for s in strips.iter().filter(|r| !r.is_empty()) {
            assert!(!s.intersects(&Rect::new(2, 3, 4, 5)));
        }
    }
}
