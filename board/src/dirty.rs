//! Dirty-square bookkeeping and the host repaint-request queue.
//!
//! Two kinds of damage are queued for the host:
//! - board damage: pixels whose squares/border must be re-rendered into the cached board image;
//!   at paint time these rects are classified back into squares and border cells;
//! - overlay damage: pixels that only need refreshing from the cached board image (floating
//!   pieces moving over it).

use crate::geometry::Geometry;
use crate::square::{ALL_SQUARES, SquareMask, square_bit, square_coords};
use crate::ui::Rect;

#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    mask: SquareMask,
    realized: bool,
    damage: Vec<Rect>,
    overlay_damage: Vec<Rect>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_realized(&self) -> bool {
        self.realized
    }

    pub fn set_realized(&mut self, realized: bool) {
        self.realized = realized;
        if !realized {
            self.damage.clear();
            self.overlay_damage.clear();
        }
    }

    pub fn mask(&self) -> SquareMask {
        self.mask
    }

    /// Marks a square; queues its rect for the host only the first time before a paint.
    pub fn invalidate_square(&mut self, geometry: &Geometry, index: usize) {
        let bit = square_bit(index);
        if self.mask & bit != 0 {
            return;
        }
        self.mask |= bit;
        if self.realized {
            let (col, row) = square_coords(index);
            self.damage.push(geometry.square_rect(col, row));
        }
    }

    /// Marks every square in `mask` without queueing host damage. Used while a paint is already
    /// in progress, where the result is folded into the same paint.
    pub fn mark(&mut self, mask: SquareMask) {
        self.mask |= mask;
    }

    pub fn invalidate_board(&mut self, geometry: &Geometry) {
        self.mask = ALL_SQUARES;
        if self.realized {
            self.damage.push(geometry.board_rect());
        }
    }

    /// Queues the border ring for repaint. Never touches the square mask.
    pub fn invalidate_border(&mut self, geometry: &Geometry) {
        if !self.realized || geometry.border <= 0 {
            return;
        }
        self.damage
            .extend(geometry.border_rects().into_iter().filter(|r| !r.is_empty()));
    }

    /// Host-reported damage (window exposed, resized, ...).
    pub fn expose(&mut self, rect: Rect) {
        if self.realized && !rect.is_empty() {
            self.damage.push(rect);
        }
    }

    pub fn invalidate_overlay(&mut self, rect: Rect) {
        if self.realized && !rect.is_empty() {
            self.overlay_damage.push(rect);
        }
    }

    pub fn damage(&self) -> &[Rect] {
        &self.damage
    }

    pub fn overlay_damage(&self) -> &[Rect] {
        &self.overlay_damage
    }

    pub fn has_pending(&self) -> bool {
        self.mask != 0 || !self.damage.is_empty() || !self.overlay_damage.is_empty()
    }

    /// Bounding box of everything queued for the host.
    pub fn pending_bounds(&self) -> Rect {
        self.damage
            .iter()
            .chain(self.overlay_damage.iter())
            .fold(Rect::default(), |acc, r| acc.union(r))
    }

    /// Returns the pending mask and clears it.
    pub fn consume(&mut self) -> SquareMask {
        std::mem::take(&mut self.mask)
    }

    pub fn take_damage(&mut self) -> (Vec<Rect>, Vec<Rect>) {
        (
            std::mem::take(&mut self.damage),
            std::mem::take(&mut self.overlay_damage),
        )
    }
}
