//! Square compositing and border painting into the cached board image.

use crate::artist::GlyphCache;
use crate::font;
use crate::geometry::Geometry;
use crate::hud::{Hud, HudLayer};
use crate::palette::Palette;
use crate::pixmap::{Color, Pixmap};
use crate::region::{Segments, SegmentsMask};
use crate::square::{BOARD_SIZE, Side, SquareCode, square_bit, square_coords};
use crate::ui::Rect;

/// Smallest border that still fits a one-pixel-padded 3x5 label.
pub const MIN_LABEL_BORDER: i32 = 7;

const COLOR_WHITE_TO_MOVE: Color = [240, 240, 236, 255];
const COLOR_BLACK_TO_MOVE: Color = [16, 16, 18, 255];

/// One compositing step of a square, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerStep {
    Background,
    MarkerBelow,
    HudUnder,
    Marker,
    Cursor,
    Piece,
    HudOver,
}

/// The steps that contribute pixels to one square, in z-order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositePlan {
    steps: Vec<LayerStep>,
}

impl CompositePlan {
    pub fn steps(&self) -> &[LayerStep] {
        &self.steps
    }

    pub fn contains(&self, step: LayerStep) -> bool {
        self.steps.contains(&step)
    }

    /// Position of `step` in the plan, if present.
    pub fn position(&self, step: LayerStep) -> Option<usize> {
        self.steps.iter().position(|s| *s == step)
    }

    fn push_if(&mut self, cond: bool, step: LayerStep) {
        if cond {
            self.steps.push(step);
        }
    }
}

/// Pixel thickness of a ring drawn at `fraction` of the square side; never below one pixel.
pub fn ring_thickness(side: i32, fraction: f32) -> i32 {
    ((side as f32 * fraction.clamp(0.0, 0.5)).round() as i32).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorStyle {
    pub index: usize,
    pub color: Color,
    pub thickness: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareStyle {
    pub light: Color,
    pub dark: Color,
    pub marker_thickness: i32,
    pub marker_below: bool,
    /// `Some` while the cursor is shown.
    pub cursor: Option<CursorStyle>,
}

/// Everything needed to composite a square, borrowed from the widget for one paint.
pub struct SquareRenderer<'a> {
    pub geometry: &'a Geometry,
    pub palette: &'a Palette,
    pub style: &'a SquareStyle,
    pub hud: &'a Hud,
    pub glyphs: &'a GlyphCache,
}

impl SquareRenderer<'_> {
    pub fn plan(&self, index: usize, code: &SquareCode) -> CompositePlan {
        let bit = square_bit(index);
        let has_marker = code.marker.is_some();
        let below = self.style.marker_below;

        let mut plan = CompositePlan::default();
        plan.push_if(true, LayerStep::Background);
        plan.push_if(has_marker && below, LayerStep::MarkerBelow);
        plan.push_if(self.hud.has_content(HudLayer::Under) & bit != 0, LayerStep::HudUnder);
        plan.push_if(has_marker && !below, LayerStep::Marker);
        plan.push_if(
            self.style.cursor.is_some_and(|c| c.index == index),
            LayerStep::Cursor,
        );
        plan.push_if(code.piece.is_some(), LayerStep::Piece);
        plan.push_if(self.hud.has_content(HudLayer::Over) & bit != 0, LayerStep::HudOver);
        plan
    }

    fn background(&self, col: i32, row: i32, code: &SquareCode) -> Color {
        match code.background {
            Some(handle) => self.palette.get(handle).opaque(),
            None if (col + row) % 2 == 0 => self.style.dark,
            None => self.style.light,
        }
    }

    /// Repaints square `index` completely; the result depends only on the square's own state.
    pub fn render(&self, target: &mut Pixmap, index: usize, code: &SquareCode) {
        let (col, row) = square_coords(index);
        let cell = self.geometry.square_rect(col, row);

        for step in self.plan(index, code).steps() {
            match step {
                LayerStep::Background => target.fill_rect(cell, self.background(col, row, code)),
                LayerStep::MarkerBelow | LayerStep::Marker => {
                    if let Some(handle) = code.marker {
                        let color = self.palette.get(handle).opaque();
                        target.fill_ring(cell, self.style.marker_thickness, color);
                    }
                }
                LayerStep::HudUnder => {
                    self.hud
                        .composite_square(HudLayer::Under, self.geometry, col, row, target, cell)
                }
                LayerStep::Cursor => {
                    if let Some(cursor) = self.style.cursor {
                        target.fill_ring(cell, cursor.thickness, cursor.color);
                    }
                }
                LayerStep::Piece => {
                    if let Some(tile) = code.piece.and_then(|p| self.glyphs.tile(p)) {
                        target.composite(tile, tile.rect(), cell.x, cell.y);
                    }
                }
                LayerStep::HudOver => {
                    self.hud
                        .composite_square(HudLayer::Over, self.geometry, col, row, target, cell)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderStyle {
    pub color: Color,
    pub label: Color,
    pub show_labels: bool,
    /// Side whose turn it is, if the indicator is shown.
    pub to_move: Option<Side>,
}

/// Rect of one border cell; `k` counts display columns (top/bottom) or display rows (left/right).
pub fn edge_cell_rect(geometry: &Geometry, edge: Segments, k: i32) -> Rect {
    let (x, y, s, b) = (geometry.x, geometry.y, geometry.side, geometry.border);
    let far = BOARD_SIZE * s;
    if edge == Segments::TOP {
        Rect::new(x + k * s, y - b, s, b)
    } else if edge == Segments::BOTTOM {
        Rect::new(x + k * s, y + far, s, b)
    } else if edge == Segments::LEFT {
        Rect::new(x - b, y + k * s, b, s)
    } else if edge == Segments::RIGHT {
        Rect::new(x + far, y + k * s, b, s)
    } else {
        Rect::default()
    }
}

pub fn corner_rect(geometry: &Geometry, corner: Segments) -> Rect {
    let (x, y, b) = (geometry.x, geometry.y, geometry.border);
    let far = BOARD_SIZE * geometry.side;
    if corner == Segments::TOP_LEFT {
        Rect::new(x - b, y - b, b, b)
    } else if corner == Segments::TOP_RIGHT {
        Rect::new(x + far, y - b, b, b)
    } else if corner == Segments::BOTTOM_LEFT {
        Rect::new(x - b, y + far, b, b)
    } else if corner == Segments::BOTTOM_RIGHT {
        Rect::new(x + far, y + far, b, b)
    } else {
        Rect::default()
    }
}

/// The right-hand corner next to the side to move.
pub fn indicator_corner(geometry: &Geometry, to_move: Side) -> Segments {
    let bottom_side = if geometry.flipped { Side::Black } else { Side::White };
    if to_move == bottom_side {
        Segments::BOTTOM_RIGHT
    } else {
        Segments::TOP_RIGHT
    }
}

fn edge_label(geometry: &Geometry, edge: Segments, k: i32) -> Option<char> {
    if edge == Segments::BOTTOM {
        let (col, _) = geometry.from_display(k, 0);
        char::from_u32('a' as u32 + col as u32)
    } else if edge == Segments::LEFT {
        let (_, row) = geometry.from_display(0, k);
        char::from_digit((row + 1) as u32, 10)
    } else {
        None
    }
}

/// Repaints the border cells and corners named by `segments`. Returns the number painted.
pub fn paint_border(target: &mut Pixmap, geometry: &Geometry, segments: &SegmentsMask, style: &BorderStyle) -> u32 {
    if geometry.border <= 0 {
        return 0;
    }
    let labels = style.show_labels && geometry.border >= MIN_LABEL_BORDER;
    let mut painted = 0;

    let edges = [
        (Segments::TOP, segments.top),
        (Segments::BOTTOM, segments.bottom),
        (Segments::LEFT, segments.left),
        (Segments::RIGHT, segments.right),
    ];
    for (edge, cells) in edges {
        for k in 0..BOARD_SIZE {
            if cells & (1 << k) == 0 {
                continue;
            }
            let cell = edge_cell_rect(geometry, edge, k);
            target.fill_rect(cell, style.color);
            if labels {
                if let Some(ch) = edge_label(geometry, edge, k) {
                    font::draw_char_centered(target, cell.x + 1, cell.y + 1, cell.w - 2, cell.h - 2, ch, style.label);
                }
            }
            painted += 1;
        }
    }

    let indicator = style.to_move.map(|side| (indicator_corner(geometry, side), side));
    for corner in [
        Segments::TOP_LEFT,
        Segments::TOP_RIGHT,
        Segments::BOTTOM_LEFT,
        Segments::BOTTOM_RIGHT,
    ] {
        if !segments.segments.contains(corner) {
            continue;
        }
        let cell = corner_rect(geometry, corner);
        target.fill_rect(cell, style.color);
        if let Some((_, side)) = indicator.filter(|(c, _)| *c == corner) {
            let color = match side {
                Side::White => COLOR_WHITE_TO_MOVE,
                Side::Black => COLOR_BLACK_TO_MOVE,
            };
            fill_disc(target, cell, 0.6, color);
        }
        painted += 1;
    }
    painted
}

fn fill_disc(target: &mut Pixmap, cell: Rect, fraction: f32, color: Color) {
    let radius = cell.w.min(cell.h) as f32 * fraction / 2.0;
    let cx = cell.x as f32 + cell.w as f32 / 2.0;
    let cy = cell.y as f32 + cell.h as f32 / 2.0;
    for y in cell.y..cell.bottom() {
        for x in cell.x..cell.right() {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= radius * radius {
                target.blend_pixel(x, y, color);
            }
        }
    }
}

/// Fills the part of `damage` outside the board and its border ring.
pub fn paint_outside(target: &mut Pixmap, geometry: &Geometry, damage: Rect, color: Color) {
    for strip in damage.subtract(&geometry.outer_rect()) {
        target.fill_rect(strip, color);
    }
}
