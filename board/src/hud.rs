//! Heads-up-display layers: two transparent board-sized images composited into each square,
//! one below the piece glyph and one above it.
//!
//! Each layer tracks which squares hold content (`has_content`) and which must be regenerated
//! before the next composite (`need_redraw`). Content comes from an optional [`HudPainter`] and
//! from arrows.

use crate::arrow::Arrows;
use crate::geometry::Geometry;
use crate::pixmap::{Color, Pixmap};
use crate::square::{ALL_SQUARES, BOARD_SIZE, SquareMask, Squares, square_bit, square_coords, square_index};
use crate::surface::SurfaceSize;
use crate::ui::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HudLayer {
    /// Drawn between the square background and the piece.
    Under,
    /// Drawn over the piece.
    Over,
}

impl HudLayer {
    pub const ALL: [HudLayer; 2] = [HudLayer::Under, HudLayer::Over];

    pub const fn index(self) -> usize {
        match self {
            HudLayer::Under => 0,
            HudLayer::Over => 1,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            HudLayer::Under => HudLayer::Over,
            HudLayer::Over => HudLayer::Under,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        HudLayer::ALL.get(index).copied()
    }
}

/// Supplies HUD content. Called during a paint with a canvas that only accepts drawing into the
/// squares being regenerated.
pub trait HudPainter {
    fn paint(&mut self, layer: HudLayer, canvas: &mut HudCanvas<'_>);
}

/// Drawing target handed to a [`HudPainter`]. All operations are per square and silently skip
/// squares outside the clip mask or off the board.
pub struct HudCanvas<'a> {
    image: &'a mut Pixmap,
    geometry: &'a Geometry,
    clip: SquareMask,
    touched: SquareMask,
}

impl<'a> HudCanvas<'a> {
    pub fn new(image: &'a mut Pixmap, geometry: &'a Geometry, clip: SquareMask) -> Self {
        Self {
            image,
            geometry,
            clip,
            touched: 0,
        }
    }

    pub fn clip(&self) -> SquareMask {
        self.clip
    }

    pub fn side(&self) -> i32 {
        self.geometry.side
    }

    /// Squares drawn into so far.
    pub fn touched(&self) -> SquareMask {
        self.touched
    }

    fn target(&mut self, col: i32, row: i32) -> Option<Rect> {
        let idx = square_index(col, row)?;
        if self.clip & square_bit(idx) == 0 {
            return None;
        }
        self.touched |= square_bit(idx);
        Some(self.geometry.local_square_rect(col, row))
    }

    pub fn fill_square(&mut self, col: i32, row: i32, color: Color) {
        if let Some(cell) = self.target(col, row) {
            self.image.blend_rect(cell, color);
        }
    }

    /// Hollow frame inside the square.
    pub fn frame_square(&mut self, col: i32, row: i32, thickness: i32, color: Color) {
        if let Some(cell) = self.target(col, row) {
            self.image.fill_ring(cell, thickness, color);
        }
    }

    /// Fills `rect`, given relative to the square's top-left, clipped to the square.
    pub fn fill_in_square(&mut self, col: i32, row: i32, rect: Rect, color: Color) {
        if let Some(cell) = self.target(col, row) {
            let r = rect.translate(cell.x, cell.y).intersection(&cell);
            self.image.blend_rect(r, color);
        }
    }

    /// A centered dot whose diameter is `fraction` of the square side.
    pub fn dot(&mut self, col: i32, row: i32, fraction: f32, color: Color) {
        let Some(cell) = self.target(col, row) else {
            return;
        };
        let radius = (cell.w as f32 * fraction.clamp(0.0, 1.0)) / 2.0;
        let (cx, cy) = (cell.x as f32 + cell.w as f32 / 2.0, cell.y as f32 + cell.h as f32 / 2.0);
        for y in cell.y..cell.bottom() {
            for x in cell.x..cell.right() {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= radius * radius {
                    self.image.blend_pixel(x, y, color);
                }
            }
        }
    }

    pub fn fill_mask(&mut self, mask: SquareMask, color: Color) {
        for idx in Squares::new(mask) {
            let (col, row) = square_coords(idx);
            self.fill_square(col, row, color);
        }
    }
}

/// State of one HUD layer.
pub struct HudState {
    pub has_content: SquareMask,
    pub need_redraw: SquareMask,
    pub enabled: bool,
    image: Pixmap,
    painter: Option<Box<dyn HudPainter>>,
}

impl std::fmt::Debug for HudState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HudState")
            .field("has_content", &format_args!("{:#018x}", self.has_content))
            .field("need_redraw", &format_args!("{:#018x}", self.need_redraw))
            .field("enabled", &self.enabled)
            .field("painter", &self.painter.is_some())
            .finish()
    }
}

impl Default for HudState {
    fn default() -> Self {
        Self {
            has_content: 0,
            need_redraw: 0,
            enabled: false,
            image: Pixmap::new(SurfaceSize::new(0, 0)),
            painter: None,
        }
    }
}

impl HudState {
    pub fn image(&self) -> &Pixmap {
        &self.image
    }

    /// Drops all content and schedules a full regeneration at `side`.
    pub fn reset(&mut self, side: i32) {
        let extent = (BOARD_SIZE * side).max(0) as u32;
        self.image.reset(SurfaceSize::new(extent, extent));
        self.has_content = 0;
        self.need_redraw = ALL_SQUARES;
    }
}

/// Both HUD layers.
#[derive(Debug, Default)]
pub struct Hud {
    layers: [HudState; 2],
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self, layer: HudLayer) -> &HudState {
        &self.layers[layer.index()]
    }

    pub fn has_content(&self, layer: HudLayer) -> SquareMask {
        self.layers[layer.index()].has_content
    }

    pub fn need_redraw(&self, layer: HudLayer) -> SquareMask {
        self.layers[layer.index()].need_redraw
    }

    pub fn is_enabled(&self, layer: HudLayer) -> bool {
        self.layers[layer.index()].enabled
    }

    pub fn any_need_redraw(&self) -> bool {
        self.layers.iter().any(|l| l.need_redraw != 0)
    }

    pub fn set_enabled(&mut self, layer: HudLayer, enabled: bool) {
        let state = &mut self.layers[layer.index()];
        state.enabled = enabled;
        state.need_redraw = ALL_SQUARES;
    }

    pub fn set_painter(&mut self, layer: HudLayer, painter: Option<Box<dyn HudPainter>>) {
        let state = &mut self.layers[layer.index()];
        state.painter = painter;
        state.need_redraw = ALL_SQUARES;
    }

    pub fn invalidate(&mut self, layer: HudLayer, mask: SquareMask) {
        self.layers[layer.index()].need_redraw |= mask;
    }

    pub fn reset(&mut self, side: i32) {
        for state in &mut self.layers {
            state.reset(side);
        }
    }

    /// Regenerates the squares of `layer` that need it. Returns the board squares whose
    /// composite changed (erased or drawn into).
    pub fn redraw(&mut self, layer: HudLayer, geometry: &Geometry, arrows: &Arrows) -> SquareMask {
        let state = &mut self.layers[layer.index()];
        let need = state.need_redraw;
        if need == 0 {
            return 0;
        }

        let erase = state.has_content & need;
        for idx in Squares::new(erase) {
            let (col, row) = square_coords(idx);
            state.image.clear_rect(geometry.local_square_rect(col, row));
        }
        state.has_content &= !erase;
        let mut changed = erase;

        if state.enabled {
            if let Some(painter) = state.painter.as_mut() {
                let mut canvas = HudCanvas::new(&mut state.image, geometry, need);
                painter.paint(layer, &mut canvas);
                let touched = canvas.touched();
                state.has_content |= touched;
                changed |= touched;
            }

            for arrow in arrows.iter() {
                let footprint = arrow.footprint(layer);
                if footprint & need == 0 {
                    continue;
                }
                let clip = if arrow.footprint(layer.other()) & need != 0 {
                    need & footprint
                } else {
                    need
                };
                arrow.draw(&mut state.image, geometry, clip);
                state.has_content |= footprint;
                changed |= footprint & need;
            }
        }

        log::trace!(
            "hud {layer:?}: need={need:#x} erased={erase:#x} content={:#x}",
            state.has_content
        );
        state.need_redraw = 0;
        changed
    }

    /// Alpha-composites this layer's tile for square `(col, row)` onto `target` at `dst`.
    pub fn composite_square(&self, layer: HudLayer, geometry: &Geometry, col: i32, row: i32, target: &mut Pixmap, dst: Rect) {
        let state = &self.layers[layer.index()];
        let src = geometry.local_square_rect(col, row);
        target.composite(&state.image, src, dst.x, dst.y);
    }
}
