use std::cell::Cell;
use std::rc::Rc;

use board::hud::{HudCanvas, HudLayer, HudPainter};
use board::Rgb;
use board::pixmap::Color;
use board::square::{SquareMask, square_bit, square_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastMove {
    pub from: (i32, i32),
    pub to: (i32, i32),
}

impl LastMove {
    pub fn mask(&self) -> SquareMask {
        [self.from, self.to]
            .into_iter()
            .filter_map(|(col, row)| square_index(col, row))
            .fold(0, |acc, idx| acc | square_bit(idx))
    }
}

/// Tints the origin and destination of the last move on the under-piece HUD layer.
pub struct LastMoveHighlight {
    last: Rc<Cell<Option<LastMove>>>,
    color: Color,
}

impl LastMoveHighlight {
    pub const DEFAULT_COLOR: Color = Rgb::new(250, 214, 70).with_alpha(110);

    pub fn new(last: Rc<Cell<Option<LastMove>>>) -> Self {
        Self {
            last,
            color: Self::DEFAULT_COLOR,
        }
    }
}

impl HudPainter for LastMoveHighlight {
    fn paint(&mut self, layer: HudLayer, canvas: &mut HudCanvas<'_>) {
        if layer != HudLayer::Under {
            return;
        }
        if let Some(mv) = self.last.get() {
            canvas.fill_square(mv.from.0, mv.from.1, self.color);
            canvas.fill_square(mv.to.0, mv.to.1, self.color);
        }
    }
}
