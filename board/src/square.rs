//! Per-square state and 64-bit square masks.
//!
//! Squares are indexed `col | (row << 3)`, so bit `i` of a mask is square `i`, a1 = 0, h8 = 63.

use serde::{Deserialize, Serialize};

use crate::palette::ColorHandle;

pub const BOARD_SIZE: i32 = 8;
pub const NUM_SQUARES: usize = 64;

pub type SquareMask = u64;

pub const ALL_SQUARES: SquareMask = u64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub const fn index(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    pub const COUNT: usize = 12;

    pub const fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }

    /// Dense index in `0..12`, used by the glyph cache.
    pub const fn index(self) -> usize {
        self.side.index() * 6 + self.kind.index()
    }

    pub fn all() -> impl Iterator<Item = Piece> {
        [Side::White, Side::Black]
            .into_iter()
            .flat_map(|side| PieceKind::ALL.into_iter().map(move |kind| Piece::new(kind, side)))
    }
}

/// Everything the widget knows about one square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquareCode {
    pub piece: Option<Piece>,
    /// `None` paints the default light/dark pattern.
    pub background: Option<ColorHandle>,
    pub marker: Option<ColorHandle>,
}

impl SquareCode {
    pub const EMPTY: SquareCode = SquareCode {
        piece: None,
        background: None,
        marker: None,
    };

    pub const fn with_piece(piece: Piece) -> Self {
        Self {
            piece: Some(piece),
            background: None,
            marker: None,
        }
    }
}

pub const fn is_on_board(col: i32, row: i32) -> bool {
    col >= 0 && col < BOARD_SIZE && row >= 0 && row < BOARD_SIZE
}

pub const fn square_index(col: i32, row: i32) -> Option<usize> {
    if is_on_board(col, row) {
        Some((col | (row << 3)) as usize)
    } else {
        None
    }
}

pub const fn square_coords(index: usize) -> (i32, i32) {
    ((index & 7) as i32, (index >> 3) as i32)
}

pub const fn square_bit(index: usize) -> SquareMask {
    1u64 << index
}

/// Iterates the set bits of a mask, lowest square first.
#[derive(Debug, Clone, Copy)]
pub struct Squares(SquareMask);

impl Squares {
    pub const fn new(mask: SquareMask) -> Self {
        Self(mask)
    }
}

impl Iterator for Squares {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let idx = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}
