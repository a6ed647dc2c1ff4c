//! Pointer and keyboard handling for the viewer, kept free of window-system types so it can be
//! driven headlessly.
//!
//! - primary drag: lifts the piece under the pointer into a tracked floating piece and drops it
//!   on release (off-board or same-square drops put it back);
//! - secondary drag: draws an arrow from the pressed square to the released one;
//! - in marker mode a primary click toggles the marker of the clicked square instead.

use std::cell::Cell;
use std::rc::Rc;

use board::pixmap::Color;
use board::{BoardWidget, ColorHandle, FloatingHandle, HudLayer, Piece, Placement, PositionSource, Side};

use crate::highlight::{LastMove, LastMoveHighlight};

pub const ARROW_COLOR: Color = [40, 110, 220, 180];
const MARKER_RGB: (u8, u8, u8) = (214, 70, 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Flip,
    ToggleBorder,
    ToggleCursor,
    /// Moves the cursor in screen directions; `+y` is down.
    MoveCursor(i32, i32),
    ToggleMarkerMode,
    MarkCursor,
    ClearAnnotations,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    from: (i32, i32),
    piece: Piece,
    handle: FloatingHandle,
}

#[derive(Debug)]
pub struct Controller {
    placement: Placement,
    last_move: Rc<Cell<Option<LastMove>>>,
    marker: Option<ColorHandle>,
    marker_mode: bool,
    pointer: (f64, f64),
    drag: Option<Drag>,
    arrow_from: Option<(i32, i32)>,
}

impl Controller {
    /// Sets up `widget` with the starting position and the last-move highlight.
    pub fn new(widget: &mut BoardWidget) -> Self {
        Self::with_placement(widget, Placement::starting())
    }

    pub fn with_placement(widget: &mut BoardWidget, placement: Placement) -> Self {
        let last_move = Rc::new(Cell::new(None));
        widget.set_hud_painter(
            HudLayer::Under,
            Some(Box::new(LastMoveHighlight::new(Rc::clone(&last_move)))),
        );
        widget.enable_hud_layer(HudLayer::Under);
        widget.enable_hud_layer(HudLayer::Over);
        widget.sync_position(&placement);

        let (r, g, b) = MARKER_RGB;
        let marker = widget.allocate_color(r, g, b);
        if marker.is_none() {
            log::warn!("palette full; markers disabled");
        }

        Self {
            placement,
            last_move,
            marker,
            marker_mode: false,
            pointer: (0.0, 0.0),
            drag: None,
            arrow_from: None,
        }
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move.get()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn marker_mode(&self) -> bool {
        self.marker_mode
    }

    fn square_under_pointer(&self, widget: &BoardWidget) -> Option<(i32, i32)> {
        let (x, y) = self.pointer;
        widget.square_at(x.floor() as i32, y.floor() as i32)
    }

    pub fn pointer_moved(&mut self, widget: &mut BoardWidget, x: f64, y: f64) {
        self.pointer = (x, y);
        if let Some(drag) = self.drag {
            widget.move_floating_piece(drag.handle, x, y);
        }
    }

    pub fn primary_pressed(&mut self, widget: &mut BoardWidget) {
        if self.drag.is_some() {
            return;
        }
        let Some((col, row)) = self.square_under_pointer(widget) else {
            return;
        };
        if self.marker_mode {
            self.toggle_marker(widget, col, row);
            return;
        }
        let Some(piece) = self.placement.piece_at(col, row) else {
            return;
        };
        let (x, y) = self.pointer;
        let Some(handle) = widget.add_floating_piece(piece, x, y, true) else {
            return;
        };
        widget.set_piece(col, row, None);
        self.drag = Some(Drag {
            from: (col, row),
            piece,
            handle,
        });
        log::debug!("lifted {piece:?} from {:?}", (col, row));
    }

    pub fn primary_released(&mut self, widget: &mut BoardWidget) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        widget.remove_floating_piece(drag.handle);

        match self.square_under_pointer(widget) {
            Some(to) if to != drag.from => {
                self.placement.relocate(drag.from, to);
                self.placement.to_move = self.placement.to_move.opposite();
                widget.sync_position(&self.placement);
                self.set_last_move(widget, LastMove { from: drag.from, to });
                log::debug!("moved {:?} {:?} -> {:?}", drag.piece, drag.from, to);
            }
            _ => widget.set_piece(drag.from.0, drag.from.1, Some(drag.piece)),
        }
    }

    pub fn secondary_pressed(&mut self, widget: &mut BoardWidget) {
        self.arrow_from = self.square_under_pointer(widget);
    }

    pub fn secondary_released(&mut self, widget: &mut BoardWidget) {
        let Some(from) = self.arrow_from.take() else {
            return;
        };
        if let Some(to) = self.square_under_pointer(widget).filter(|to| *to != from) {
            widget.add_arrow(from, to, ARROW_COLOR);
        }
    }

    fn set_last_move(&mut self, widget: &mut BoardWidget, mv: LastMove) {
        let mut mask = mv.mask();
        if let Some(old) = self.last_move.replace(Some(mv)) {
            mask |= old.mask();
        }
        widget.invalidate_hud_squares(HudLayer::Under, mask);
    }

    fn toggle_marker(&mut self, widget: &mut BoardWidget, col: i32, row: i32) {
        let Some(code) = widget.get_square(col, row) else {
            return;
        };
        let marker = if code.marker.is_some() { None } else { self.marker };
        widget.set_marker_color(col, row, marker);
    }

    pub fn command(&mut self, widget: &mut BoardWidget, command: Command) {
        match command {
            Command::Flip => {
                let flipped = !widget.is_flipped();
                widget.set_flipped(flipped);
            }
            Command::ToggleBorder => {
                let show = !widget.config().show_border;
                widget.set_border(show);
            }
            Command::ToggleCursor => {
                if widget.is_cursor_visible() {
                    widget.hide_cursor();
                } else {
                    widget.show_cursor();
                }
            }
            Command::MoveCursor(dx, dy) => {
                let (col, row) = widget.cursor();
                let (dcol, drow) = if widget.is_flipped() { (-dx, dy) } else { (dx, -dy) };
                widget.set_cursor((col + dcol).clamp(0, 7), (row + drow).clamp(0, 7));
            }
            Command::ToggleMarkerMode => self.marker_mode = !self.marker_mode,
            Command::MarkCursor => {
                let (col, row) = widget.cursor();
                self.toggle_marker(widget, col, row);
            }
            Command::ClearAnnotations => {
                widget.clear_arrows();
                widget.clear_markers();
            }
        }
    }

    pub fn to_move(&self) -> Side {
        self.placement.to_move
    }
}
