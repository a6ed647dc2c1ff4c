//! Square ↔ pixel mapping for the current widget size.
//!
//! "Display" coordinates count columns left to right and rows top to bottom as drawn on screen.
//! Board coordinates are files/ranks: row 0 is the bottom rank unless the board is flipped, in
//! which case both axes are mirrored.

use crate::square::{BOARD_SIZE, SquareMask};
use crate::surface::SurfaceSize;
use crate::ui::Rect;

pub const MIN_SQUARE_SIDE: i32 = 10;
pub const MIN_BORDER_WIDTH: i32 = 8;
/// Largest board-plus-border extent the layout search considers.
pub const MAX_BOARD_EXTENT: i32 = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub side: i32,
    pub border: i32,
    /// Pixel position of the board's top-left corner (inside the border).
    pub x: i32,
    pub y: i32,
    pub flipped: bool,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            side: MIN_SQUARE_SIDE,
            border: 0,
            x: 0,
            y: 0,
            flipped: false,
        }
    }
}

/// Border width for a square side; monotonic in `side`.
pub fn border_width(side: i32, want_border: bool) -> i32 {
    if !want_border {
        return 0;
    }
    (side / 3).max(MIN_BORDER_WIDTH)
}

impl Geometry {
    /// Finds the largest square side that fits the board plus its border in the available area
    /// and centers the result.
    pub fn recompute(available: SurfaceSize, want_border: bool, flipped: bool) -> Self {
        let width = available.width.min(i32::MAX as u32) as i32;
        let height = available.height.min(i32::MAX as u32) as i32;
        let limit = width.min(height).min(MAX_BOARD_EXTENT);

        let mut side = (limit / BOARD_SIZE).max(MIN_SQUARE_SIDE);
        while side > MIN_SQUARE_SIDE
            && BOARD_SIZE * side + 2 * border_width(side, want_border) > limit
        {
            side -= 1;
        }

        let border = border_width(side, want_border);
        let total = BOARD_SIZE * side + 2 * border;
        Self {
            side,
            border,
            x: ((width - total) / 2).max(0) + border,
            y: ((height - total) / 2).max(0) + border,
            flipped,
        }
    }

    pub fn board_extent(&self) -> i32 {
        BOARD_SIZE * self.side
    }

    pub fn board_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.board_extent(), self.board_extent())
    }

    /// Board plus border ring.
    pub fn outer_rect(&self) -> Rect {
        Rect::new(
            self.x - self.border,
            self.y - self.border,
            self.board_extent() + 2 * self.border,
            self.board_extent() + 2 * self.border,
        )
    }

    /// The four border strips (top, bottom, left, right); the corners belong to top/bottom.
    pub fn border_rects(&self) -> [Rect; 4] {
        self.outer_rect().subtract(&self.board_rect())
    }

    pub fn to_display(&self, col: i32, row: i32) -> (i32, i32) {
        if self.flipped {
            (BOARD_SIZE - 1 - col, row)
        } else {
            (col, BOARD_SIZE - 1 - row)
        }
    }

    /// Inverse of `to_display` (the mapping is an involution up to the axis swap of rows).
    pub fn from_display(&self, dcol: i32, drow: i32) -> (i32, i32) {
        if self.flipped {
            (BOARD_SIZE - 1 - dcol, drow)
        } else {
            (dcol, BOARD_SIZE - 1 - drow)
        }
    }

    /// Square rect relative to the board's top-left corner (HUD layer coordinates).
    pub fn local_square_rect(&self, col: i32, row: i32) -> Rect {
        let (dc, dr) = self.to_display(col, row);
        Rect::new(dc * self.side, dr * self.side, self.side, self.side)
    }

    pub fn square_rect(&self, col: i32, row: i32) -> Rect {
        self.local_square_rect(col, row).translate(self.x, self.y)
    }

    /// Returns values outside `0..8` for points off the board; never fails.
    pub fn pixel_to_square(&self, px: i32, py: i32) -> (i32, i32) {
        let cell = |p: i32, origin: i32| {
            (i64::from(p) - i64::from(origin))
                .div_euclid(i64::from(self.side))
                .clamp(-1, i64::from(BOARD_SIZE)) as i32
        };
        self.from_display(cell(px, self.x), cell(py, self.y))
    }

    /// Converts a display-ordered mask (bit `drow * 8 + dcol`) into board square indices.
    pub fn display_mask_to_board(&self, display: SquareMask) -> SquareMask {
        if self.flipped {
            display.reverse_bits().swap_bytes()
        } else {
            display.swap_bytes()
        }
    }

    /// Bounding rect of all squares in `mask`; empty for an empty mask.
    pub fn mask_rect(&self, mask: SquareMask) -> Rect {
        crate::square::Squares::new(mask).fold(Rect::default(), |acc, idx| {
            let (col, row) = crate::square::square_coords(idx);
            acc.union(&self.square_rect(col, row))
        })
    }
}
