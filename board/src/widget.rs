//! The board widget: owns all per-board state and turns invalidations into partial repaints.
//!
//! A paint cycle runs in this order:
//! 1. take the host damage queued since the last paint and classify it into squares and border
//!    cells;
//! 2. regenerate whatever the HUD layers need, folding every square they change into the dirty
//!    mask;
//! 3. composite each dirty square into the cached board image, then the damaged border cells and
//!    the area outside the board;
//! 4. refresh the damaged parts of the presented frame from the board image and draw the
//!    floating pieces over them.

use std::time::Instant;

use crate::arrow::{Arrow, ArrowHandle, Arrows};
use crate::artist::{GlyphCache, LetterArtist, PieceArtist};
use crate::config::{BoardConfig, clamp_fraction};
use crate::dirty::DirtyTracker;
use crate::floating::{FloatingHandle, FloatingPiece, FloatingPieces};
use crate::geometry::Geometry;
use crate::hud::{Hud, HudLayer, HudPainter};
use crate::palette::{ColorHandle, Palette, Rgb};
use crate::pixmap::{Color, Pixmap, composite_into_frame};
use crate::profiling::{PaintTimings, Profiler};
use crate::region::{SegmentsMask, classify_all, classify_rect};
use crate::render::{
    BorderStyle, CompositePlan, CursorStyle, SquareRenderer, SquareStyle, paint_border, paint_outside,
    ring_thickness,
};
use crate::rules::PositionSource;
use crate::square::{
    NUM_SQUARES, Piece, Side, SquareCode, SquareMask, Squares, square_coords, square_index,
};
use crate::surface::{Surface, SurfaceSize};
use crate::ui::Rect;

/// What one paint did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub frame: u64,
    /// Squares re-composited into the board image.
    pub squares: SquareMask,
    /// Classification of the host damage.
    pub segments: SegmentsMask,
    /// Squares whose HUD content changed.
    pub hud_changed: SquareMask,
    pub border_cells: u32,
    pub damage_rects: usize,
    pub refreshed_rects: usize,
}

impl PaintStats {
    pub fn squares_painted(&self) -> u32 {
        self.squares.count_ones()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    index: usize,
    visible: bool,
}

pub struct BoardWidget {
    config: BoardConfig,
    size: SurfaceSize,
    geometry: Geometry,
    squares: [SquareCode; NUM_SQUARES],
    palette: Palette,
    tracker: DirtyTracker,
    hud: Hud,
    arrows: Arrows,
    floating: FloatingPieces,
    artist: Box<dyn PieceArtist>,
    glyphs: GlyphCache,
    board_image: Pixmap,
    cursor: Cursor,
    to_move: Side,
    frame: u64,
}

impl std::fmt::Debug for BoardWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardWidget")
            .field("size", &self.size)
            .field("geometry", &self.geometry)
            .field("realized", &self.tracker.is_realized())
            .field("hud", &self.hud)
            .field("arrows", &self.arrows.len())
            .field("floating", &self.floating.len())
            .field("frame", &self.frame)
            .finish()
    }
}

impl Default for BoardWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardWidget {
    pub fn new() -> Self {
        Self::with_config(BoardConfig::default())
    }

    pub fn with_config(config: BoardConfig) -> Self {
        let config = config.sanitized();
        let size = SurfaceSize::new(0, 0);
        Self {
            geometry: Geometry::recompute(size, config.show_border, config.flipped),
            config,
            size,
            squares: [SquareCode::EMPTY; NUM_SQUARES],
            palette: Palette::new(),
            tracker: DirtyTracker::new(),
            hud: Hud::new(),
            arrows: Arrows::new(),
            floating: FloatingPieces::new(),
            artist: Box::new(LetterArtist::default()),
            glyphs: GlyphCache::new(),
            board_image: Pixmap::new(size),
            cursor: Cursor {
                index: 0,
                visible: false,
            },
            to_move: Side::White,
            frame: 0,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Replaces the whole configuration and repaints everything.
    pub fn apply_config(&mut self, config: BoardConfig) {
        self.config = config.sanitized();
        self.relayout();
    }

    pub fn set_piece_artist(&mut self, artist: Box<dyn PieceArtist>) {
        self.artist = artist;
        self.glyphs.invalidate();
        self.invalidate_pieces();
        self.refresh_floating();
    }

    fn invalidate(&mut self, index: usize) {
        self.tracker.invalidate_square(&self.geometry, index);
    }

    fn invalidate_matching(&mut self, pred: impl Fn(&SquareCode) -> bool) {
        for idx in 0..NUM_SQUARES {
            if pred(&self.squares[idx]) {
                self.invalidate(idx);
            }
        }
    }

    fn invalidate_markers(&mut self) {
        self.invalidate_matching(|code| code.marker.is_some());
    }

    fn invalidate_pieces(&mut self) {
        self.invalidate_matching(|code| code.piece.is_some());
    }

    fn invalidate_cursor(&mut self) {
        if self.cursor.visible {
            self.invalidate(self.cursor.index);
        }
    }

    fn update_square(&mut self, col: i32, row: i32, f: impl FnOnce(&mut SquareCode)) {
        let Some(idx) = square_index(col, row) else {
            return;
        };
        let before = self.squares[idx];
        f(&mut self.squares[idx]);
        if self.squares[idx] != before {
            self.invalidate(idx);
        }
    }

    pub fn set_square(&mut self, col: i32, row: i32, code: SquareCode) {
        self.update_square(col, row, |sq| *sq = code);
    }

    pub fn get_square(&self, col: i32, row: i32) -> Option<SquareCode> {
        square_index(col, row).map(|idx| self.squares[idx])
    }

    pub fn set_piece(&mut self, col: i32, row: i32, piece: Option<Piece>) {
        self.update_square(col, row, |sq| sq.piece = piece);
    }

    /// Copies every square's piece and the side to move from `source`.
    pub fn sync_position(&mut self, source: &dyn PositionSource) {
        for idx in 0..NUM_SQUARES {
            let (col, row) = square_coords(idx);
            self.set_piece(col, row, source.piece_at(col, row));
        }
        let to_move = source.to_move();
        if to_move != self.to_move {
            self.to_move = to_move;
            self.tracker.invalidate_border(&self.geometry);
        }
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    pub fn allocate_color(&mut self, r: u8, g: u8, b: u8) -> Option<ColorHandle> {
        self.palette.allocate(Rgb::new(r, g, b))
    }

    /// The caller must already have dropped every reference to `handle`.
    pub fn free_color(&mut self, handle: ColorHandle) {
        debug_assert!(
            !self
                .squares
                .iter()
                .any(|sq| sq.background == Some(handle) || sq.marker == Some(handle)),
            "freeing color handle {} still referenced by a square",
            handle.get()
        );
        self.palette.free(handle);
    }

    pub fn set_background_color(&mut self, col: i32, row: i32, handle: Option<ColorHandle>) {
        self.update_square(col, row, |sq| sq.background = handle);
    }

    pub fn set_marker_color(&mut self, col: i32, row: i32, handle: Option<ColorHandle>) {
        self.update_square(col, row, |sq| sq.marker = handle);
    }

    pub fn set_all_background_colors(&mut self, handle: Option<ColorHandle>) {
        for idx in 0..NUM_SQUARES {
            let (col, row) = square_coords(idx);
            self.set_background_color(col, row, handle);
        }
    }

    pub fn set_all_marker_colors(&mut self, handle: Option<ColorHandle>) {
        for idx in 0..NUM_SQUARES {
            let (col, row) = square_coords(idx);
            self.set_marker_color(col, row, handle);
        }
    }

    pub fn clear_markers(&mut self) {
        self.set_all_marker_colors(None);
    }

    pub fn set_marker_thickness(&mut self, fraction: f32) {
        let fraction = clamp_fraction(fraction);
        if fraction != self.config.marker_thickness {
            self.config.marker_thickness = fraction;
            self.invalidate_markers();
        }
    }

    pub fn set_marker_below(&mut self, below: bool) {
        if below != self.config.marker_below {
            self.config.marker_below = below;
            self.invalidate_markers();
        }
    }

    pub fn show_cursor(&mut self) {
        if !self.cursor.visible {
            self.cursor.visible = true;
            self.invalidate_cursor();
        }
    }

    pub fn hide_cursor(&mut self) {
        if self.cursor.visible {
            self.invalidate_cursor();
            self.cursor.visible = false;
        }
    }

    pub fn is_cursor_visible(&self) -> bool {
        self.cursor.visible
    }

    pub fn set_cursor(&mut self, col: i32, row: i32) {
        let Some(idx) = square_index(col, row) else {
            return;
        };
        if idx == self.cursor.index {
            return;
        }
        self.invalidate_cursor();
        self.cursor.index = idx;
        self.invalidate_cursor();
    }

    pub fn cursor(&self) -> (i32, i32) {
        square_coords(self.cursor.index)
    }

    /// Ring thickness as a fraction of the square side, clamped to `0.0..=0.5`.
    pub fn set_cursor_thickness(&mut self, fraction: f32) {
        let fraction = clamp_fraction(fraction);
        if fraction != self.config.cursor_thickness {
            self.config.cursor_thickness = fraction;
            self.invalidate_cursor();
        }
    }

    pub fn set_cursor_color(&mut self, color: Rgb) {
        if color != self.config.cursor_color {
            self.config.cursor_color = color;
            self.invalidate_cursor();
        }
    }

    pub fn enable_hud_layer(&mut self, layer: HudLayer) {
        self.hud.set_enabled(layer, true);
    }

    pub fn disable_hud_layer(&mut self, layer: HudLayer) {
        self.hud.set_enabled(layer, false);
    }

    pub fn is_hud_layer_enabled(&self, layer: HudLayer) -> bool {
        self.hud.is_enabled(layer)
    }

    pub fn set_hud_painter(&mut self, layer: HudLayer, painter: Option<Box<dyn HudPainter>>) {
        self.hud.set_painter(layer, painter);
    }

    /// Asks for the painter to be re-run on `mask` at the next paint.
    pub fn invalidate_hud_squares(&mut self, layer: HudLayer, mask: SquareMask) {
        self.hud.invalidate(layer, mask);
    }

    pub fn hud_has_content(&self, layer: HudLayer) -> SquareMask {
        self.hud.has_content(layer)
    }

    pub fn hud_need_redraw(&self, layer: HudLayer) -> SquareMask {
        self.hud.need_redraw(layer)
    }

    fn invalidate_arrow(&mut self, arrow: &Arrow) {
        for layer in HudLayer::ALL {
            self.hud.invalidate(layer, arrow.footprint(layer));
        }
    }

    /// An arrow is drawn only on enabled HUD layers. `None` if an end is off the board.
    pub fn add_arrow(&mut self, begin: (i32, i32), end: (i32, i32), color: Color) -> Option<ArrowHandle> {
        let arrow = Arrow::new(begin, end, color)?;
        self.invalidate_arrow(&arrow);
        Some(self.arrows.insert(arrow))
    }

    pub fn remove_arrow(&mut self, handle: ArrowHandle) {
        if let Some(arrow) = self.arrows.remove(handle) {
            self.invalidate_arrow(&arrow);
        }
    }

    pub fn clear_arrows(&mut self) {
        let removed: Vec<Arrow> = self.arrows.drain().collect();
        for arrow in &removed {
            self.invalidate_arrow(arrow);
        }
    }

    pub fn arrow(&self, handle: ArrowHandle) -> Option<&Arrow> {
        self.arrows.get(handle)
    }

    pub fn arrow_count(&self) -> usize {
        self.arrows.len()
    }

    /// Floats `piece` centered on `(x, y)`. At most one piece is tracked at a time.
    pub fn add_floating_piece(&mut self, piece: Piece, x: f64, y: f64, tracked: bool) -> Option<FloatingHandle> {
        let (handle, rect) = self.floating.add(piece, x, y, tracked, self.geometry.side)?;
        self.tracker.invalidate_overlay(rect);
        Some(handle)
    }

    pub fn move_floating_piece(&mut self, handle: FloatingHandle, x: f64, y: f64) {
        if let Some(rect) = self.floating.move_to(handle, x, y, self.geometry.side) {
            self.tracker.invalidate_overlay(rect);
        }
    }

    pub fn remove_floating_piece(&mut self, handle: FloatingHandle) {
        if let Some(rect) = self.floating.remove(handle, self.geometry.side) {
            self.tracker.invalidate_overlay(rect);
        }
    }

    pub fn get_floating_piece(&self, handle: FloatingHandle) -> Option<FloatingPiece> {
        self.floating.get(handle).copied()
    }

    pub fn tracked_floating_piece(&self) -> Option<FloatingHandle> {
        self.floating.tracked()
    }

    fn refresh_floating(&mut self) {
        let side = self.geometry.side;
        let rects: Vec<Rect> = self.floating.iter().map(|(_, fp)| fp.rect(side)).collect();
        for rect in rects {
            self.tracker.invalidate_overlay(rect);
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn square_side(&self) -> i32 {
        self.geometry.side
    }

    /// Pixel origin (top-left) of square a1.
    pub fn square_origin(&self) -> (i32, i32) {
        let r = self.geometry.square_rect(0, 0);
        (r.x, r.y)
    }

    /// The square under pixel `(x, y)`, if any.
    pub fn square_at(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        let (col, row) = self.geometry.pixel_to_square(x, y);
        self.is_on_board(col, row).then_some((col, row))
    }

    pub fn is_on_board(&self, col: i32, row: i32) -> bool {
        crate::square::is_on_board(col, row)
    }

    pub fn square_rect(&self, col: i32, row: i32) -> Rect {
        self.geometry.square_rect(col, row)
    }

    fn relayout(&mut self) {
        self.geometry = Geometry::recompute(self.size, self.config.show_border, self.config.flipped);
        self.board_image.reset(self.size);
        self.hud.reset(self.geometry.side);
        self.tracker.invalidate_board(&self.geometry);
        self.tracker.expose(self.size.rect());
        log::debug!("relayout {:?} -> {:?}", self.size, self.geometry);
    }

    pub fn is_realized(&self) -> bool {
        self.tracker.is_realized()
    }

    /// The host surface now exists at `size`; everything is repainted.
    pub fn realize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.tracker.set_realized(true);
        self.relayout();
    }

    pub fn unrealize(&mut self) {
        self.tracker.set_realized(false);
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        if size == self.size && self.tracker.is_realized() {
            return;
        }
        self.size = size;
        self.relayout();
    }

    pub fn set_border(&mut self, show: bool) {
        if show != self.config.show_border {
            self.config.show_border = show;
            self.relayout();
        }
    }

    pub fn set_flipped(&mut self, flipped: bool) {
        if flipped != self.config.flipped {
            self.config.flipped = flipped;
            self.relayout();
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.config.flipped
    }

    /// Host-reported damage, e.g. after the window was uncovered.
    pub fn expose(&mut self, rect: Rect) {
        self.tracker.expose(rect);
    }

    pub fn needs_paint(&self) -> bool {
        self.tracker.is_realized() && (self.tracker.has_pending() || self.hud.any_need_redraw())
    }

    /// Bounding box of the host damage queued since the last paint.
    pub fn pending_damage(&self) -> Rect {
        self.tracker.pending_bounds()
    }

    pub fn dirty_squares(&self) -> SquareMask {
        self.tracker.mask()
    }

    pub fn classify(&self, rect: Rect) -> SegmentsMask {
        classify_rect(&self.geometry, rect)
    }

    fn square_style(&self) -> SquareStyle {
        let side = self.geometry.side;
        SquareStyle {
            light: self.config.light_square.opaque(),
            dark: self.config.dark_square.opaque(),
            marker_thickness: ring_thickness(side, self.config.marker_thickness),
            marker_below: self.config.marker_below,
            cursor: self.cursor.visible.then(|| CursorStyle {
                index: self.cursor.index,
                color: self.config.cursor_color.opaque(),
                thickness: ring_thickness(side, self.config.cursor_thickness),
            }),
        }
    }

    /// The compositing steps square `(col, row)` would get if painted now.
    pub fn plan_square(&self, col: i32, row: i32) -> Option<CompositePlan> {
        let idx = square_index(col, row)?;
        let style = self.square_style();
        let renderer = SquareRenderer {
            geometry: &self.geometry,
            palette: &self.palette,
            style: &style,
            hud: &self.hud,
            glyphs: &self.glyphs,
        };
        Some(renderer.plan(idx, &self.squares[idx]))
    }

    /// The cached board image (everything except floating pieces).
    pub fn board_image(&self) -> &Pixmap {
        &self.board_image
    }

    pub fn paint<S: Surface>(&mut self, surface: &mut S) -> Result<PaintStats, S::Error> {
        self.paint_timed(surface).map(|(stats, _)| stats)
    }

    pub fn paint_profiled<S: Surface, P: Profiler>(
        &mut self,
        surface: &mut S,
        profiler: &mut P,
    ) -> Result<PaintStats, S::Error> {
        let (stats, timings) = self.paint_timed(surface)?;
        profiler.on_paint(stats.frame, &stats, timings);
        Ok(stats)
    }

    fn paint_timed<S: Surface>(&mut self, surface: &mut S) -> Result<(PaintStats, PaintTimings), S::Error> {
        let mut timings = PaintTimings::default();
        if !self.tracker.is_realized() {
            return Ok((PaintStats::default(), timings));
        }
        let total_start = Instant::now();

        let mut refresh_all = false;
        if surface.size() != self.size {
            surface.resize(self.size)?;
            refresh_all = true;
        }

        let (damage, overlay_damage) = self.tracker.take_damage();
        let segments = classify_all(&self.geometry, damage.iter());

        let hud_start = Instant::now();
        let mut hud_changed = 0;
        for layer in HudLayer::ALL {
            hud_changed |= self.hud.redraw(layer, &self.geometry, &self.arrows);
        }
        self.tracker.mark(hud_changed);
        timings.hud = hud_start.elapsed();

        let squares_start = Instant::now();
        self.glyphs.ensure(self.geometry.side, self.artist.as_ref());
        let squares = self.tracker.consume() | segments.squares;
        let style = self.square_style();
        let renderer = SquareRenderer {
            geometry: &self.geometry,
            palette: &self.palette,
            style: &style,
            hud: &self.hud,
            glyphs: &self.glyphs,
        };
        for idx in Squares::new(squares) {
            renderer.render(&mut self.board_image, idx, &self.squares[idx]);
        }
        timings.squares = squares_start.elapsed();

        let border_start = Instant::now();
        let border_style = BorderStyle {
            color: self.config.border.opaque(),
            label: self.config.label.opaque(),
            show_labels: self.config.show_labels,
            to_move: self.config.show_turn_indicator.then_some(self.to_move),
        };
        let border_cells = paint_border(&mut self.board_image, &self.geometry, &segments, &border_style);
        let background = self.config.background.opaque();
        for rect in &damage {
            paint_outside(&mut self.board_image, &self.geometry, *rect, background);
        }
        timings.border = border_start.elapsed();

        let overlay_start = Instant::now();
        let damage_rects = damage.len();
        let mut refresh = damage;
        refresh.extend(overlay_damage);
        refresh.extend(Squares::new(squares).map(|idx| {
            let (col, row) = square_coords(idx);
            self.geometry.square_rect(col, row)
        }));
        if refresh_all {
            refresh = vec![self.size.rect()];
        }

        let bounds = self.size.rect();
        let frame = surface.frame_mut();
        let mut refreshed_rects = 0;
        for rect in refresh.iter().map(|r| r.intersection(&bounds)) {
            if rect.is_empty() {
                continue;
            }
            self.board_image.copy_to_frame(frame, rect);
            for (_, fp) in self.floating.iter() {
                if let Some(tile) = self.glyphs.tile(fp.piece) {
                    composite_into_frame(frame, self.size, tile, fp.x, fp.y, rect);
                }
            }
            refreshed_rects += 1;
        }
        self.floating.settle();
        timings.overlay = overlay_start.elapsed();

        self.frame += 1;
        let stats = PaintStats {
            frame: self.frame,
            squares,
            segments,
            hud_changed,
            border_cells,
            damage_rects,
            refreshed_rects,
        };
        timings.total = total_start.elapsed();
        log::debug!(
            "paint #{}: {} squares, {} border cells, {} damage rects, {} refreshed",
            stats.frame,
            stats.squares_painted(),
            border_cells,
            damage_rects,
            refreshed_rects
        );
        Ok((stats, timings))
    }
}
