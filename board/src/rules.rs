//! The narrow view of a rules engine the widget consumes.

use crate::square::{NUM_SQUARES, Piece, PieceKind, Side, square_coords, square_index};

/// Read-only access to a position.
pub trait PositionSource {
    fn piece_at(&self, col: i32, row: i32) -> Option<Piece>;
    fn to_move(&self) -> Side;
}

/// A plain position: one optional piece per square plus the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub squares: [Option<Piece>; NUM_SQUARES],
    pub to_move: Side,
}

impl Default for Placement {
    fn default() -> Self {
        Self::empty()
    }
}

impl Placement {
    pub const fn empty() -> Self {
        Self {
            squares: [None; NUM_SQUARES],
            to_move: Side::White,
        }
    }

    /// The standard chess starting position.
    pub fn starting() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut placement = Self::empty();
        for (col, kind) in BACK_RANK.into_iter().enumerate() {
            let col = col as i32;
            placement.put(col, 0, Some(Piece::new(kind, Side::White)));
            placement.put(col, 1, Some(Piece::new(PieceKind::Pawn, Side::White)));
            placement.put(col, 6, Some(Piece::new(PieceKind::Pawn, Side::Black)));
            placement.put(col, 7, Some(Piece::new(kind, Side::Black)));
        }
        placement
    }

    /// Off-board squares are ignored.
    pub fn put(&mut self, col: i32, row: i32, piece: Option<Piece>) {
        if let Some(idx) = square_index(col, row) {
            self.squares[idx] = piece;
        }
    }

    /// Moves whatever stands on `from` to `to`, returning what was captured.
    pub fn relocate(&mut self, from: (i32, i32), to: (i32, i32)) -> Option<Piece> {
        let (Some(src), Some(dst)) = (square_index(from.0, from.1), square_index(to.0, to.1)) else {
            return None;
        };
        if src == dst {
            return None;
        }
        let moving = self.squares[src].take();
        std::mem::replace(&mut self.squares[dst], moving)
    }

    pub fn occupied(&self) -> impl Iterator<Item = ((i32, i32), Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(idx, p)| p.map(|p| (square_coords(idx), p)))
    }
}

impl PositionSource for Placement {
    fn piece_at(&self, col: i32, row: i32) -> Option<Piece> {
        square_index(col, row).and_then(|idx| self.squares[idx])
    }

    fn to_move(&self) -> Side {
        self.to_move
    }
}
