use board::hud::{HudCanvas, HudLayer, HudPainter};
use board::pixmap::Color;
use board::profiling::{PaintTimings, Profiler};
use board::square::{SquareMask, square_bit, square_index};
use board::{
    BoardConfig, BoardWidget, LayerStep, PaintStats, Piece, PieceKind, Placement, Rect, RgbaBufferSurface, Side,
    SquareCode, Surface, SurfaceSize,
};

fn bit(col: i32, row: i32) -> SquareMask {
    square_bit(square_index(col, row).unwrap())
}

fn painted(width: u32, height: u32) -> (BoardWidget, RgbaBufferSurface) {
    painted_with(BoardConfig::default(), width, height)
}

fn painted_with(config: BoardConfig, width: u32, height: u32) -> (BoardWidget, RgbaBufferSurface) {
    let size = SurfaceSize::new(width, height);
    let mut widget = BoardWidget::with_config(config);
    widget.realize(size);
    let mut surface = RgbaBufferSurface::new(size);
    widget.paint(&mut surface).unwrap();
    (widget, surface)
}

fn paint(widget: &mut BoardWidget, surface: &mut RgbaBufferSurface) -> PaintStats {
    widget.paint(surface).unwrap()
}

fn center_pixel(widget: &BoardWidget, col: i32, row: i32) -> Color {
    let r = widget.square_rect(col, row);
    widget.board_image().pixel(r.x + r.w / 2, r.y + r.h / 2).unwrap()
}

/// Fills a fixed set of squares on each layer.
struct MaskPainter {
    under: SquareMask,
    over: SquareMask,
}

impl HudPainter for MaskPainter {
    fn paint(&mut self, layer: HudLayer, canvas: &mut HudCanvas<'_>) {
        match layer {
            HudLayer::Under => canvas.fill_mask(self.under, [40, 200, 60, 150]),
            HudLayer::Over => canvas.fill_mask(self.over, [255, 0, 0, 160]),
        }
    }
}

#[test]
fn exposing_one_square_repaints_only_that_square() {
    let (mut widget, mut surface) = painted(240, 240);
    widget.expose(widget.square_rect(3, 4));
    let stats = paint(&mut widget, &mut surface);
    assert_eq!(stats.squares, 1u64 << 35);
    assert_eq!(stats.border_cells, 0);
    assert_eq!(stats.damage_rects, 1);
}

#[test]
fn changing_a_piece_repaints_only_its_square() {
    let (mut widget, mut surface) = painted(240, 240);
    widget.set_piece(3, 4, Some(Piece::new(PieceKind::Queen, Side::Black)));
    assert_eq!(widget.dirty_squares(), 1u64 << 35);
    assert_eq!(widget.pending_damage(), widget.square_rect(3, 4));
    let stats = paint(&mut widget, &mut surface);
    assert_eq!(stats.squares, 1u64 << 35);
    assert!(!widget.needs_paint());
}

#[test]
fn set_square_replaces_the_whole_code() {
    let (mut widget, mut surface) = painted(240, 240);
    let rook = Piece::new(PieceKind::Rook, Side::White);
    widget.set_square(0, 0, SquareCode::with_piece(rook));
    assert_eq!(widget.get_square(0, 0), Some(SquareCode::with_piece(rook)));
    assert_eq!(paint(&mut widget, &mut surface).squares, bit(0, 0));

    widget.set_square(0, 0, SquareCode::with_piece(rook));
    assert!(!widget.needs_paint());
    widget.set_square(0, 0, SquareCode::EMPTY);
    assert_eq!(widget.get_square(0, 0).unwrap().piece, None);
}

#[test]
fn sync_position_invalidates_changed_squares_and_turn_indicator() {
    let (mut widget, mut surface) = painted(240, 240);
    let mut placement = Placement::starting();
    widget.sync_position(&placement);
    assert_eq!(paint(&mut widget, &mut surface).squares.count_ones(), 32);

    placement.relocate((4, 1), (4, 3));
    placement.to_move = Side::Black;
    widget.sync_position(&placement);
    assert_eq!(widget.dirty_squares(), bit(4, 1) | bit(4, 3));
    let stats = paint(&mut widget, &mut surface);
    assert_eq!(stats.squares, bit(4, 1) | bit(4, 3));
    assert!(stats.border_cells > 0);
    assert_eq!(widget.to_move(), Side::Black);
}

#[test]
fn composite_order_follows_marker_placement() {
    let (mut widget, mut surface) = painted(240, 240);
    let red = widget.allocate_color(200, 30, 30).unwrap();
    widget.set_marker_color(2, 2, Some(red));
    widget.set_piece(2, 2, Some(Piece::new(PieceKind::Knight, Side::White)));
    widget.set_cursor(2, 2);
    widget.show_cursor();
    widget.set_hud_painter(
        HudLayer::Under,
        Some(Box::new(MaskPainter {
            under: bit(2, 2),
            over: 0,
        })),
    );
    widget.set_hud_painter(
        HudLayer::Over,
        Some(Box::new(MaskPainter {
            under: 0,
            over: bit(2, 2),
        })),
    );
    widget.enable_hud_layer(HudLayer::Under);
    widget.enable_hud_layer(HudLayer::Over);
    paint(&mut widget, &mut surface);

    let plan = widget.plan_square(2, 2).unwrap();
    assert_eq!(
        plan.steps(),
        &[
            LayerStep::Background,
            LayerStep::HudUnder,
            LayerStep::Marker,
            LayerStep::Cursor,
            LayerStep::Piece,
            LayerStep::HudOver,
        ]
    );

    widget.set_marker_below(true);
    assert_eq!(widget.dirty_squares(), bit(2, 2));
    let plan = widget.plan_square(2, 2).unwrap();
    assert_eq!(
        plan.steps(),
        &[
            LayerStep::Background,
            LayerStep::MarkerBelow,
            LayerStep::HudUnder,
            LayerStep::Cursor,
            LayerStep::Piece,
            LayerStep::HudOver,
        ]
    );
    assert_eq!(widget.plan_square(5, 5).unwrap().steps(), &[LayerStep::Background]);
    assert!(widget.plan_square(8, 0).is_none());
}

#[test]
fn disabling_a_hud_layer_erases_its_content() {
    let (mut widget, mut surface) = painted(240, 240);
    let plain = center_pixel(&widget, 4, 4);

    widget.set_hud_painter(
        HudLayer::Over,
        Some(Box::new(MaskPainter {
            under: 0,
            over: bit(4, 4),
        })),
    );
    widget.enable_hud_layer(HudLayer::Over);
    let stats = paint(&mut widget, &mut surface);
    assert_eq!(widget.hud_has_content(HudLayer::Over), bit(4, 4));
    assert_eq!(stats.hud_changed, bit(4, 4));
    assert_eq!(stats.squares, bit(4, 4));
    assert_ne!(center_pixel(&widget, 4, 4), plain);

    widget.disable_hud_layer(HudLayer::Over);
    assert!(widget.needs_paint());
    let stats = paint(&mut widget, &mut surface);
    assert_eq!(widget.hud_has_content(HudLayer::Over), 0);
    assert_eq!(stats.squares, bit(4, 4));
    assert_eq!(center_pixel(&widget, 4, 4), plain);
}

#[test]
fn invalidated_hud_squares_are_regenerated() {
    let (mut widget, mut surface) = painted(240, 240);
    widget.set_hud_painter(
        HudLayer::Under,
        Some(Box::new(MaskPainter {
            under: bit(0, 0) | bit(7, 7),
            over: 0,
        })),
    );
    widget.enable_hud_layer(HudLayer::Under);
    paint(&mut widget, &mut surface);

    widget.invalidate_hud_squares(HudLayer::Under, bit(7, 7));
    assert_eq!(widget.hud_need_redraw(HudLayer::Under), bit(7, 7));
    let stats = paint(&mut widget, &mut surface);
    assert_eq!(stats.hud_changed, bit(7, 7));
    assert_eq!(stats.squares, bit(7, 7));
    assert_eq!(widget.hud_has_content(HudLayer::Under), bit(0, 0) | bit(7, 7));
}

#[test]
fn removing_an_arrow_restores_the_frame() {
    let (mut widget, mut surface) = painted(240, 240);
    widget.enable_hud_layer(HudLayer::Under);
    widget.enable_hud_layer(HudLayer::Over);
    paint(&mut widget, &mut surface);
    let before = surface.frame().to_vec();

    let handle = widget.add_arrow((1, 1), (1, 5), [0, 0, 255, 200]).unwrap();
    assert_eq!(widget.arrow_count(), 1);
    let stats = paint(&mut widget, &mut surface);
    assert_eq!(widget.hud_has_content(HudLayer::Under), bit(1, 1));
    let over = widget.hud_has_content(HudLayer::Over);
    assert_eq!(over, bit(1, 2) | bit(1, 3) | bit(1, 4) | bit(1, 5));
    assert_eq!(stats.squares, bit(1, 1) | over);
    assert_ne!(surface.frame(), &before[..]);

    widget.remove_arrow(handle);
    assert!(widget.arrow(handle).is_none());
    paint(&mut widget, &mut surface);
    assert_eq!(widget.hud_has_content(HudLayer::Under), 0);
    assert_eq!(widget.hud_has_content(HudLayer::Over), 0);
    assert_eq!(surface.frame(), &before[..]);
}

#[test]
fn arrows_on_disabled_layers_leave_no_content() {
    let (mut widget, mut surface) = painted(240, 240);
    widget.add_arrow((0, 0), (2, 1), [0, 0, 0, 255]).unwrap();
    paint(&mut widget, &mut surface);
    assert_eq!(widget.hud_has_content(HudLayer::Under), 0);
    assert_eq!(widget.hud_has_content(HudLayer::Over), 0);

    widget.enable_hud_layer(HudLayer::Over);
    paint(&mut widget, &mut surface);
    assert_ne!(widget.hud_has_content(HudLayer::Over), 0);

    widget.clear_arrows();
    assert_eq!(widget.arrow_count(), 0);
    paint(&mut widget, &mut surface);
    assert_eq!(widget.hud_has_content(HudLayer::Over), 0);
}

#[test]
fn floating_piece_never_touches_the_board_image() {
    let config = BoardConfig {
        show_border: false,
        ..BoardConfig::default()
    };
    let (mut widget, mut surface) = painted_with(config, 160, 160);
    assert_eq!(widget.square_side(), 20);
    let image = widget.board_image().data().to_vec();
    let frame = surface.frame().to_vec();

    let knight = Piece::new(PieceKind::Knight, Side::Black);
    let handle = widget.add_floating_piece(knight, 10.6, 10.6, true).unwrap();
    let fp = widget.get_floating_piece(handle).unwrap();
    assert_eq!((fp.x, fp.y), (0, 0));
    assert!(fp.tracked);
    assert_eq!(widget.pending_damage(), Rect::new(0, 0, 20, 20));

    let stats = paint(&mut widget, &mut surface);
    assert_eq!(stats.squares, 0);
    assert_eq!(stats.refreshed_rects, 1);
    assert_eq!(widget.board_image().data(), &image[..]);
    assert_ne!(surface.frame(), &frame[..]);

    widget.move_floating_piece(handle, 75.0, 75.0);
    assert_eq!(widget.pending_damage(), Rect::new(0, 0, 85, 85));
    paint(&mut widget, &mut surface);
    assert!(!widget.get_floating_piece(handle).unwrap().moved);

    widget.remove_floating_piece(handle);
    assert!(widget.get_floating_piece(handle).is_none());
    paint(&mut widget, &mut surface);
    assert_eq!(widget.board_image().data(), &image[..]);
    assert_eq!(surface.frame(), &frame[..]);
}

#[test]
fn floating_positions_truncate_toward_zero() {
    let config = BoardConfig {
        show_border: false,
        ..BoardConfig::default()
    };
    let (mut widget, _) = painted_with(config, 160, 160);
    let pawn = Piece::new(PieceKind::Pawn, Side::White);
    for (center, expected) in [(9.5, 0), (10.0, 0), (11.9, 1), (4.0, -6), (-0.5, -10)] {
        let handle = widget.add_floating_piece(pawn, center, center, false).unwrap();
        let fp = widget.get_floating_piece(handle).unwrap();
        assert_eq!((fp.x, fp.y), (expected, expected), "center {center}");
        widget.remove_floating_piece(handle);
    }
}

#[test]
fn only_one_floating_piece_is_tracked() {
    let (mut widget, _) = painted(200, 200);
    let pawn = Piece::new(PieceKind::Pawn, Side::White);
    let first = widget.add_floating_piece(pawn, 50.0, 50.0, true).unwrap();
    let second = widget.add_floating_piece(pawn, 80.0, 80.0, true).unwrap();
    assert!(!widget.get_floating_piece(second).unwrap().tracked);
    assert_eq!(widget.tracked_floating_piece(), Some(first));
}

#[test]
fn cursor_moves_invalidate_old_and_new_square() {
    let (mut widget, mut surface) = painted(200, 200);
    widget.show_cursor();
    assert_eq!(widget.dirty_squares(), bit(0, 0));
    paint(&mut widget, &mut surface);

    widget.set_cursor(1, 0);
    assert_eq!(widget.dirty_squares(), bit(0, 0) | bit(1, 0));
    assert_eq!(widget.cursor(), (1, 0));
    paint(&mut widget, &mut surface);

    widget.hide_cursor();
    assert_eq!(widget.dirty_squares(), bit(1, 0));
    paint(&mut widget, &mut surface);

    widget.set_cursor(5, 5);
    assert!(!widget.needs_paint());
}

#[test]
fn marker_thickness_invalidates_marked_squares_only() {
    let (mut widget, mut surface) = painted(200, 200);
    let green = widget.allocate_color(0, 160, 0).unwrap();
    widget.set_marker_color(6, 1, Some(green));
    paint(&mut widget, &mut surface);

    widget.set_marker_thickness(0.3);
    assert_eq!(widget.dirty_squares(), bit(6, 1));
    paint(&mut widget, &mut surface);

    widget.set_marker_thickness(0.3);
    assert!(!widget.needs_paint());

    widget.clear_markers();
    assert_eq!(widget.dirty_squares(), bit(6, 1));
    paint(&mut widget, &mut surface);
    widget.free_color(green);
}

#[test]
fn background_colors_override_square_shading() {
    let (mut widget, mut surface) = painted(200, 200);
    let blue = widget.allocate_color(0, 0, 200).unwrap();
    widget.set_all_background_colors(Some(blue));
    assert_eq!(widget.dirty_squares(), u64::MAX);
    paint(&mut widget, &mut surface);
    assert_eq!(center_pixel(&widget, 0, 0), [0, 0, 200, 255]);
    assert_eq!(center_pixel(&widget, 1, 0), [0, 0, 200, 255]);

    widget.set_background_color(1, 0, None);
    paint(&mut widget, &mut surface);
    let light = widget.config().light_square;
    assert_eq!(center_pixel(&widget, 1, 0), light.opaque());
}

#[test]
fn flipping_mirrors_the_board() {
    let (mut widget, mut surface) = painted(240, 240);
    let a1 = widget.square_rect(0, 0);
    widget.set_flipped(true);
    assert!(widget.is_flipped());
    assert_eq!(paint(&mut widget, &mut surface).squares, u64::MAX);
    assert_eq!(widget.square_rect(7, 7), a1);
    assert_eq!(widget.square_at(a1.x + 1, a1.y + 1), Some((7, 7)));
}

#[test]
fn resize_and_border_changes_repaint_everything() {
    let (mut widget, mut surface) = painted(200, 200);
    widget.resize(SurfaceSize::new(320, 240));
    let stats = paint(&mut widget, &mut surface);
    assert_eq!(stats.squares, u64::MAX);
    assert_eq!(surface.size(), SurfaceSize::new(320, 240));

    let border = widget.geometry().border;
    assert!(border > 0);
    widget.set_border(false);
    assert_eq!(widget.geometry().border, 0);
    assert_eq!(paint(&mut widget, &mut surface).border_cells, 0);

    widget.resize(SurfaceSize::new(320, 240));
    assert!(!widget.needs_paint());
}

#[test]
fn unrealized_widget_queues_no_damage() {
    let (mut widget, mut surface) = painted(200, 200);
    widget.unrealize();
    widget.expose(Rect::new(0, 0, 50, 50));
    widget.add_floating_piece(Piece::new(PieceKind::King, Side::White), 20.0, 20.0, false);
    assert!(!widget.needs_paint());
    assert_eq!(paint(&mut widget, &mut surface), PaintStats::default());

    widget.realize(SurfaceSize::new(200, 200));
    assert_eq!(paint(&mut widget, &mut surface).squares, u64::MAX);
}

#[derive(Default)]
struct Recorder {
    frames: Vec<u64>,
}

impl Profiler for Recorder {
    fn on_paint(&mut self, frame: u64, stats: &PaintStats, timings: PaintTimings) {
        assert_eq!(frame, stats.frame);
        assert!(timings.total >= timings.squares);
        self.frames.push(frame);
    }
}

#[test]
fn profiler_sees_every_paint() {
    let (mut widget, mut surface) = painted(200, 200);
    let mut recorder = Recorder::default();
    widget.expose(Rect::new(0, 0, 10, 10));
    widget.paint_profiled(&mut surface, &mut recorder).unwrap();
    widget.paint_profiled(&mut surface, &mut recorder).unwrap();
    assert_eq!(recorder.frames, vec![2, 3]);
}
