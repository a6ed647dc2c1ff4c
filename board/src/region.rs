//! Region algebra: turns damaged pixel rectangles into squares and border cells.
//!
//! Each axis is cut into five bands around the board:
//!
//! ```text
//!   0: before the border ring | 1: leading ring | 2: board | 3: trailing ring | 4: beyond
//! ```
//!
//! which gives 25 zones (`zone = band_y * 5 + band_x`). A rectangle's top-left pixel covers every
//! zone at or after it on both axes, its bottom-right pixel every zone at or before it; ANDing the
//! two zone masks yields exactly the zones the rectangle spans. The same prefix/suffix idea,
//! applied to the eight cells of the board band, gives the touched column and row ranges.

use std::ops::{BitOr, BitOrAssign};

use bitflags::bitflags;

use crate::geometry::Geometry;
use crate::square::{BOARD_SIZE, SquareMask};
use crate::ui::Rect;

pub const BANDS: usize = 5;
pub const ZONES: usize = BANDS * BANDS;

/// Which corner of the damaged rectangle a point stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    TopLeft,
    BottomRight,
}

const fn zone_table(top_left: bool) -> [u32; ZONES] {
    let mut table = [0u32; ZONES];
    let mut zone = 0;
    while zone < ZONES {
        let (zx, zy) = (zone % BANDS, zone / BANDS);
        let mut covered = 0u32;
        let mut other = 0;
        while other < ZONES {
            let (ox, oy) = (other % BANDS, other / BANDS);
            let inside = if top_left {
                ox >= zx && oy >= zy
            } else {
                ox <= zx && oy <= zy
            };
            if inside {
                covered |= 1 << other;
            }
            other += 1;
        }
        table[zone] = covered;
        zone += 1;
    }
    table
}

/// Zones covered, inclusively, from a top-left extent in each zone.
pub const TOP_LEFT_ZONES: [u32; ZONES] = zone_table(true);
/// Zones covered, inclusively, from a bottom-right extent in each zone.
pub const BOTTOM_RIGHT_ZONES: [u32; ZONES] = zone_table(false);

bitflags! {
    /// Macro regions of the board ring a damaged area touches.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Segments: u16 {
        const TOP_LEFT = 1 << 0;
        const TOP = 1 << 1;
        const TOP_RIGHT = 1 << 2;
        const LEFT = 1 << 3;
        const INTERIOR = 1 << 4;
        const RIGHT = 1 << 5;
        const BOTTOM_LEFT = 1 << 6;
        const BOTTOM = 1 << 7;
        const BOTTOM_RIGHT = 1 << 8;

        const CORNERS = Self::TOP_LEFT.bits()
            | Self::TOP_RIGHT.bits()
            | Self::BOTTOM_LEFT.bits()
            | Self::BOTTOM_RIGHT.bits();
        const EDGES = Self::TOP.bits() | Self::LEFT.bits() | Self::RIGHT.bits() | Self::BOTTOM.bits();
    }
}

impl Segments {
    /// Keeps the nine zones of the ring and board (bands 1..=3 on both axes).
    pub fn from_zones(zones: u32) -> Self {
        const RING: [(usize, Segments); 9] = [
            (6, Segments::TOP_LEFT),
            (7, Segments::TOP),
            (8, Segments::TOP_RIGHT),
            (11, Segments::LEFT),
            (12, Segments::INTERIOR),
            (13, Segments::RIGHT),
            (16, Segments::BOTTOM_LEFT),
            (17, Segments::BOTTOM),
            (18, Segments::BOTTOM_RIGHT),
        ];
        RING.iter()
            .filter(|(zone, _)| zones & (1 << zone) != 0)
            .fold(Segments::empty(), |acc, (_, seg)| acc | *seg)
    }
}

/// What one (or an accumulation of) damaged rectangle(s) needs redrawn.
///
/// Border-edge bytes are in display order: bit `k` is the `k`-th cell from the left (top and
/// bottom edges) or from the top (left and right edges).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentsMask {
    pub squares: SquareMask,
    pub segments: Segments,
    pub top: u8,
    pub bottom: u8,
    pub left: u8,
    pub right: u8,
}

impl SegmentsMask {
    pub fn is_empty(&self) -> bool {
        *self == SegmentsMask::default()
    }

    /// Anything of the border ring to repaint.
    pub fn touches_border(&self) -> bool {
        self.segments.intersects(Segments::CORNERS)
            || (self.top | self.bottom | self.left | self.right) != 0
    }
}

impl BitOr for SegmentsMask {
    type Output = SegmentsMask;

    fn bitor(self, rhs: SegmentsMask) -> SegmentsMask {
        SegmentsMask {
            squares: self.squares | rhs.squares,
            segments: self.segments | rhs.segments,
            top: self.top | rhs.top,
            bottom: self.bottom | rhs.bottom,
            left: self.left | rhs.left,
            right: self.right | rhs.right,
        }
    }
}

impl BitOrAssign for SegmentsMask {
    fn bitor_assign(&mut self, rhs: SegmentsMask) {
        *self = *self | rhs;
    }
}

/// Classification of one coordinate along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisClass {
    pub band: usize,
    /// Touched cell while inside the board band.
    pub cell: Option<i32>,
    /// Cells covered from this extent: a suffix for top-left, a prefix for bottom-right.
    pub fill: u8,
}

pub fn classify_axis(p: i32, origin: i32, side: i32, border: i32, extent: Extent) -> AxisClass {
    let end = origin + BOARD_SIZE * side;
    let (band, cell) = if p < origin - border {
        (0, None)
    } else if p < origin {
        (1, None)
    } else if p < end {
        (2, Some((p - origin) / side))
    } else if p < end + border {
        (3, None)
    } else {
        (4, None)
    };

    let fill = match (extent, cell) {
        (Extent::TopLeft, Some(c)) => 0xFFu8 << c,
        (Extent::BottomRight, Some(c)) => 0xFFu8 >> (BOARD_SIZE - 1 - c),
        (Extent::TopLeft, None) if band < 2 => 0xFF,
        (Extent::BottomRight, None) if band > 2 => 0xFF,
        _ => 0,
    };
    AxisClass { band, cell, fill }
}

/// A classified corner of a damaged rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointClass {
    pub x: AxisClass,
    pub y: AxisClass,
}

impl PointClass {
    pub fn zone(&self) -> usize {
        self.y.band * BANDS + self.x.band
    }

    /// Zones covered inclusively from this point in the direction of its extent.
    pub fn zones(&self, extent: Extent) -> u32 {
        match extent {
            Extent::TopLeft => TOP_LEFT_ZONES[self.zone()],
            Extent::BottomRight => BOTTOM_RIGHT_ZONES[self.zone()],
        }
    }
}

pub fn classify_point(geometry: &Geometry, x: i32, y: i32, extent: Extent) -> PointClass {
    PointClass {
        x: classify_axis(x, geometry.x, geometry.side, geometry.border, extent),
        y: classify_axis(y, geometry.y, geometry.side, geometry.border, extent),
    }
}

/// Classifies a damaged pixel rectangle against the board and its border ring.
pub fn classify_rect(geometry: &Geometry, rect: Rect) -> SegmentsMask {
    if rect.is_empty() {
        return SegmentsMask::default();
    }
    let tl = classify_point(geometry, rect.x, rect.y, Extent::TopLeft);
    let br = classify_point(
        geometry,
        rect.right() - 1,
        rect.bottom() - 1,
        Extent::BottomRight,
    );

    let zones = tl.zones(Extent::TopLeft) & br.zones(Extent::BottomRight);
    let segments = Segments::from_zones(zones);
    let cols = tl.x.fill & br.x.fill;
    let rows = tl.y.fill & br.y.fill;

    let squares = if segments.contains(Segments::INTERIOR) {
        let display = (0..BOARD_SIZE)
            .filter(|r| rows & (1 << r) != 0)
            .fold(0u64, |acc, r| acc | (cols as u64) << (r * BOARD_SIZE));
        geometry.display_mask_to_board(display)
    } else {
        0
    };

    let edge = |seg: Segments, cells: u8| if segments.contains(seg) { cells } else { 0 };
    SegmentsMask {
        squares,
        segments,
        top: edge(Segments::TOP, cols),
        bottom: edge(Segments::BOTTOM, cols),
        left: edge(Segments::LEFT, rows),
        right: edge(Segments::RIGHT, rows),
    }
}

/// Classifies and ORs a list of damaged rectangles.
pub fn classify_all<'a>(geometry: &Geometry, rects: impl IntoIterator<Item = &'a Rect>) -> SegmentsMask {
    rects
        .into_iter()
        .fold(SegmentsMask::default(), |acc, r| acc | classify_rect(geometry, *r))
}
