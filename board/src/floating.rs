//! Free-positioned pieces (drag-and-drop) drawn on top of everything else.
//!
//! Floating pieces never touch the cached board image: moving one only refreshes the pixels it
//! left and entered from that image, then composites the pool again.

use crate::square::Piece;
use crate::ui::Rect;

pub const FLOATING_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloatingHandle(usize);

impl FloatingHandle {
    pub const fn slot(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatingPiece {
    pub piece: Piece,
    /// Top-left pixel of the glyph tile.
    pub x: i32,
    pub y: i32,
    pub moved: bool,
    pub tracked: bool,
}

impl FloatingPiece {
    pub fn rect(&self, side: i32) -> Rect {
        Rect::new(self.x, self.y, side, side)
    }
}

/// Converts a pointer coordinate (the intended glyph center) to the tile's top-left pixel.
/// Truncates toward zero, so `-0.5` becomes `0`, not `-1`.
pub fn top_left(center: f64, side: i32) -> i32 {
    (center - side as f64 / 2.0) as i32
}

#[derive(Debug, Clone)]
pub struct FloatingPieces {
    slots: [Option<FloatingPiece>; FLOATING_CAPACITY],
}

impl Default for FloatingPieces {
    fn default() -> Self {
        Self::new()
    }
}

impl FloatingPieces {
    pub const fn new() -> Self {
        Self {
            slots: [None; FLOATING_CAPACITY],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn tracked(&self) -> Option<FloatingHandle> {
        self.slots
            .iter()
            .position(|s| s.is_some_and(|p| p.tracked))
            .map(FloatingHandle)
    }

    /// Places a piece centered on `(x, y)`. Returns the new handle and the rect to refresh.
    pub fn add(&mut self, piece: Piece, x: f64, y: f64, tracked: bool, side: i32) -> Option<(FloatingHandle, Rect)> {
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            debug_assert!(false, "floating piece pool exhausted ({FLOATING_CAPACITY} slots)");
            log::warn!("floating piece pool exhausted; piece not added");
            return None;
        };

        let tracked = if tracked && self.tracked().is_some() {
            log::warn!("a tracked floating piece already exists; new piece added untracked");
            false
        } else {
            tracked
        };

        let fp = FloatingPiece {
            piece,
            x: top_left(x, side),
            y: top_left(y, side),
            moved: false,
            tracked,
        };
        self.slots[slot] = Some(fp);
        Some((FloatingHandle(slot), fp.rect(side)))
    }

    pub fn get(&self, handle: FloatingHandle) -> Option<&FloatingPiece> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    fn live_mut(&mut self, handle: FloatingHandle, op: &str) -> Option<&mut FloatingPiece> {
        let found = self.slots.get_mut(handle.0).and_then(Option::as_mut);
        if found.is_none() {
            debug_assert!(false, "{op}: stale floating piece handle {handle:?}");
            log::warn!("{op}: stale floating piece handle {handle:?} ignored");
        }
        found
    }

    /// Re-centers a piece on `(x, y)`. Returns the union of the old and new rects.
    pub fn move_to(&mut self, handle: FloatingHandle, x: f64, y: f64, side: i32) -> Option<Rect> {
        let fp = self.live_mut(handle, "move_floating_piece")?;
        let old = fp.rect(side);
        fp.x = top_left(x, side);
        fp.y = top_left(y, side);
        fp.moved = true;
        Some(old.union(&fp.rect(side)))
    }

    /// Frees the slot. Returns the rect the piece last covered.
    pub fn remove(&mut self, handle: FloatingHandle, side: i32) -> Option<Rect> {
        let rect = self.live_mut(handle, "remove_floating_piece")?.rect(side);
        self.slots[handle.0] = None;
        Some(rect)
    }

    /// Live pieces in slot order (the draw order).
    pub fn iter(&self) -> impl Iterator<Item = (FloatingHandle, &FloatingPiece)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|p| (FloatingHandle(i), p)))
    }

    /// Clears the `moved` flags once the moves have been presented.
    pub fn settle(&mut self) {
        for fp in self.slots.iter_mut().flatten() {
            fp.moved = false;
        }
    }
}
