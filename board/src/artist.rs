//! Piece artwork and the per-size glyph cache.

use crate::font;
use crate::pixmap::{Color, Pixmap};
use crate::square::{Piece, Side};
use crate::surface::SurfaceSize;

/// Draws one piece into a transparent `side` x `side` tile.
pub trait PieceArtist {
    fn draw_piece(&self, piece: Piece, side: i32, tile: &mut Pixmap);
}

/// Default artwork: a disc in the piece's color carrying the piece letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterArtist {
    pub white_fill: Color,
    pub black_fill: Color,
    pub outline: Color,
}

impl Default for LetterArtist {
    fn default() -> Self {
        Self {
            white_fill: [245, 240, 228, 255],
            black_fill: [40, 38, 36, 255],
            outline: [20, 20, 20, 255],
        }
    }
}

impl PieceArtist for LetterArtist {
    fn draw_piece(&self, piece: Piece, side: i32, tile: &mut Pixmap) {
        let (fill, ink) = match piece.side {
            Side::White => (self.white_fill, self.black_fill),
            Side::Black => (self.black_fill, self.white_fill),
        };

        let c = side as f32 / 2.0;
        let outer = side as f32 * 0.42;
        let inner = outer - (side as f32 * 0.05).max(1.0);
        for y in 0..side {
            for x in 0..side {
                let dx = x as f32 + 0.5 - c;
                let dy = y as f32 + 0.5 - c;
                let d2 = dx * dx + dy * dy;
                if d2 <= inner * inner {
                    tile.blend_pixel(x, y, fill);
                } else if d2 <= outer * outer {
                    tile.blend_pixel(x, y, self.outline);
                }
            }
        }

        let box_side = side / 2;
        let origin = (side - box_side) / 2;
        font::draw_char_centered(tile, origin, origin, box_side, box_side, piece.kind.letter(), ink);
    }
}

/// Twelve pre-rendered tiles, one per piece, rebuilt whenever the square side changes.
#[derive(Debug, Clone, Default)]
pub struct GlyphCache {
    side: i32,
    tiles: Vec<Pixmap>,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn side(&self) -> i32 {
        self.side
    }

    pub fn is_ready(&self, side: i32) -> bool {
        self.side == side && self.tiles.len() == Piece::COUNT
    }

    /// Renders all tiles at `side` unless they already are.
    pub fn ensure(&mut self, side: i32, artist: &dyn PieceArtist) {
        if self.is_ready(side) {
            return;
        }
        let extent = side.max(0) as u32;
        let mut tiles = vec![Pixmap::new(SurfaceSize::new(extent, extent)); Piece::COUNT];
        for piece in Piece::all() {
            artist.draw_piece(piece, side, &mut tiles[piece.index()]);
        }
        log::debug!("glyph cache rebuilt at side {side}");
        self.side = side;
        self.tiles = tiles;
    }

    pub fn invalidate(&mut self) {
        self.tiles.clear();
        self.side = 0;
    }

    pub fn tile(&self, piece: Piece) -> Option<&Pixmap> {
        self.tiles.get(piece.index())
    }
}
