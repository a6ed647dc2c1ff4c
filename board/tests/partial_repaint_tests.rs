//! Any sequence of mutations painted incrementally must end on the same pixels as a widget that
//! receives the same mutations and paints once.

use board::hud::{HudCanvas, HudLayer, HudPainter};
use board::square::{NUM_SQUARES, square_coords};
use board::{
    ArrowHandle, BoardWidget, ColorHandle, FloatingHandle, Piece, PieceKind, Placement, Rect, RgbaBufferSurface,
    Side, Surface, SurfaceSize,
};
use proptest::prelude::*;

struct Pattern;

impl HudPainter for Pattern {
    fn paint(&mut self, layer: HudLayer, canvas: &mut HudCanvas<'_>) {
        for idx in 0..NUM_SQUARES {
            let (col, row) = square_coords(idx);
            match layer {
                HudLayer::Under if idx % 5 == 0 => canvas.fill_square(col, row, [20, 180, 90, 120]),
                HudLayer::Over if idx % 7 == 0 => canvas.frame_square(col, row, 2, [200, 40, 160, 200]),
                _ => {}
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    Piece(i32, i32, Option<usize>),
    Background(i32, i32, Option<usize>),
    Marker(i32, i32, Option<usize>),
    Cursor(i32, i32),
    ShowCursor(bool),
    MarkerBelow(bool),
    AddArrow((i32, i32), (i32, i32)),
    RemoveArrow(usize),
    Hud(usize, bool),
    Float(f64, f64),
    MoveFloat(usize, f64, f64),
    RemoveFloat(usize),
    Flip(bool),
    Border(bool),
    Resize(u32, u32),
    Expose(Rect),
    ToMove(bool),
    Paint,
}

fn square() -> impl Strategy<Value = (i32, i32)> {
    (0i32..8, 0i32..8)
}

fn op() -> impl Strategy<Value = Op> {
    let coord = -30.0f64..260.0;
    prop_oneof![
        3 => (square(), proptest::option::of(0usize..12)).prop_map(|((c, r), p)| Op::Piece(c, r, p)),
        1 => (square(), proptest::option::of(0usize..3)).prop_map(|((c, r), h)| Op::Background(c, r, h)),
        2 => (square(), proptest::option::of(0usize..3)).prop_map(|((c, r), h)| Op::Marker(c, r, h)),
        1 => square().prop_map(|(c, r)| Op::Cursor(c, r)),
        1 => any::<bool>().prop_map(Op::ShowCursor),
        1 => any::<bool>().prop_map(Op::MarkerBelow),
        2 => (square(), square()).prop_map(|(a, b)| Op::AddArrow(a, b)),
        1 => any::<usize>().prop_map(Op::RemoveArrow),
        1 => (0usize..2, any::<bool>()).prop_map(|(l, on)| Op::Hud(l, on)),
        1 => (coord.clone(), coord.clone()).prop_map(|(x, y)| Op::Float(x, y)),
        2 => (any::<usize>(), coord.clone(), coord.clone()).prop_map(|(i, x, y)| Op::MoveFloat(i, x, y)),
        1 => any::<usize>().prop_map(Op::RemoveFloat),
        1 => any::<bool>().prop_map(Op::Flip),
        1 => any::<bool>().prop_map(Op::Border),
        1 => (120u32..260, 120u32..260).prop_map(|(w, h)| Op::Resize(w, h)),
        1 => (0i32..240, 0i32..240, 1i32..80, 1i32..80).prop_map(|(x, y, w, h)| Op::Expose(Rect::new(x, y, w, h))),
        1 => any::<bool>().prop_map(Op::ToMove),
        4 => Just(Op::Paint),
    ]
}

/// A widget plus the handles the op stream refers to by index.
struct Driver {
    widget: BoardWidget,
    surface: RgbaBufferSurface,
    placement: Placement,
    colors: Vec<ColorHandle>,
    arrows: Vec<ArrowHandle>,
    floating: Vec<FloatingHandle>,
}

impl Driver {
    fn new() -> Self {
        let size = SurfaceSize::new(200, 200);
        let mut widget = BoardWidget::new();
        let colors = [(200, 60, 60), (60, 60, 200), (90, 200, 90)]
            .into_iter()
            .map(|(r, g, b)| widget.allocate_color(r, g, b).unwrap())
            .collect();
        widget.set_hud_painter(HudLayer::Under, Some(Box::new(Pattern)));
        widget.set_hud_painter(HudLayer::Over, Some(Box::new(Pattern)));
        widget.realize(size);
        Self {
            widget,
            surface: RgbaBufferSurface::new(size),
            placement: Placement::empty(),
            colors,
            arrows: Vec::new(),
            floating: Vec::new(),
        }
    }

    fn paint(&mut self) {
        self.widget.paint(&mut self.surface).unwrap();
    }

    fn apply(&mut self, op: &Op, paint: bool) {
        let w = &mut self.widget;
        match *op {
            Op::Piece(col, row, piece) => {
                let piece = piece.map(|i| {
                    let side = if i < 6 { Side::White } else { Side::Black };
                    Piece::new(PieceKind::ALL[i % 6], side)
                });
                self.placement.put(col, row, piece);
                w.set_piece(col, row, piece);
            }
            Op::Background(col, row, h) => w.set_background_color(col, row, h.map(|i| self.colors[i])),
            Op::Marker(col, row, h) => w.set_marker_color(col, row, h.map(|i| self.colors[i])),
            Op::Cursor(col, row) => w.set_cursor(col, row),
            Op::ShowCursor(true) => w.show_cursor(),
            Op::ShowCursor(false) => w.hide_cursor(),
            Op::MarkerBelow(below) => w.set_marker_below(below),
            Op::AddArrow(a, b) => {
                if let Some(handle) = w.add_arrow(a, b, [30, 80, 230, 170]) {
                    self.arrows.push(handle);
                }
            }
            Op::RemoveArrow(i) => {
                if !self.arrows.is_empty() {
                    let handle = self.arrows.remove(i % self.arrows.len());
                    w.remove_arrow(handle);
                }
            }
            Op::Hud(layer, true) => w.enable_hud_layer(HudLayer::ALL[layer]),
            Op::Hud(layer, false) => w.disable_hud_layer(HudLayer::ALL[layer]),
            Op::Float(x, y) => {
                let piece = Piece::new(PieceKind::Queen, Side::Black);
                if let Some(handle) = w.add_floating_piece(piece, x, y, false) {
                    self.floating.push(handle);
                }
            }
            Op::MoveFloat(i, x, y) => {
                if !self.floating.is_empty() {
                    w.move_floating_piece(self.floating[i % self.floating.len()], x, y);
                }
            }
            Op::RemoveFloat(i) => {
                if !self.floating.is_empty() {
                    let handle = self.floating.remove(i % self.floating.len());
                    w.remove_floating_piece(handle);
                }
            }
            Op::Flip(flipped) => w.set_flipped(flipped),
            Op::Border(show) => w.set_border(show),
            Op::Resize(width, height) => w.resize(SurfaceSize::new(width, height)),
            Op::Expose(rect) => w.expose(rect),
            Op::ToMove(black) => {
                self.placement.to_move = if black { Side::Black } else { Side::White };
                w.sync_position(&self.placement);
            }
            Op::Paint => {
                if paint {
                    self.paint();
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn incremental_paints_match_a_single_full_paint(ops in proptest::collection::vec(op(), 1..40)) {
        let mut incremental = Driver::new();
        let mut fresh = Driver::new();
        incremental.paint();
        for op in &ops {
            incremental.apply(op, true);
            fresh.apply(op, false);
        }
        incremental.paint();
        fresh.paint();

        prop_assert_eq!(incremental.surface.size(), fresh.surface.size());
        prop_assert!(
            incremental.widget.board_image().data() == fresh.widget.board_image().data(),
            "board images differ"
        );
        prop_assert!(incremental.surface.frame() == fresh.surface.frame(), "frames differ");
    }
}

#[test]
fn moving_pieces_between_paints_matches_full_paint() {
    let mut incremental = Driver::new();
    let mut fresh = Driver::new();
    incremental.paint();
    let ops = [
        Op::Piece(4, 1, Some(0)),
        Op::Hud(0, true),
        Op::AddArrow((4, 1), (4, 3)),
        Op::Paint,
        Op::Piece(4, 1, None),
        Op::Piece(4, 3, Some(0)),
        Op::Float(120.0, 100.0),
        Op::Paint,
        Op::Hud(1, true),
        Op::AddArrow((1, 0), (2, 2)),
        Op::RemoveArrow(0),
        Op::MoveFloat(0, 10.0, 190.0),
        Op::Paint,
        Op::Flip(true),
        Op::Marker(2, 2, Some(1)),
        Op::ToMove(true),
    ];
    for op in &ops {
        incremental.apply(op, true);
        fresh.apply(op, false);
    }
    incremental.paint();
    fresh.paint();
    assert!(incremental.surface.frame() == fresh.surface.frame());
}
