//! Move representation.

use crate::{PieceKind, Square};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a move acts on the board beyond relocating one piece.
///
/// A closed variant: the applier matches exhaustively on it, so every special
/// move rule is handled or the crate does not compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// Plain relocation, possibly capturing the destination piece.
    Normal,
    /// Pawn double step from its starting rank; sets the en-passant target.
    DoublePush,
    /// En passant capture; removes the pawn behind the destination square.
    EnPassant,
    /// Kingside castling (O-O); also relocates the h-file rook.
    CastleKingside,
    /// Queenside castling (O-O-O); also relocates the a-file rook.
    CastleQueenside,
    /// Pawn promotion to the given kind (queen, rook, bishop, or knight).
    Promotion(PieceKind),
}

/// A chess move: source square, destination square, and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
}

impl Move {
    /// Creates a new move.
    #[inline]
    pub const fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Move { from, to, kind }
    }

    /// Creates a plain move.
    #[inline]
    pub const fn normal(from: Square, to: Square) -> Self {
        Move::new(from, to, MoveKind::Normal)
    }

    /// Returns the promotion kind if this is a promotion move.
    #[inline]
    pub const fn promotion(self) -> Option<PieceKind> {
        match self.kind {
            MoveKind::Promotion(kind) => Some(kind),
            _ => None,
        }
    }

    /// Returns true if this is a castling move.
    #[inline]
    pub const fn is_castle(self) -> bool {
        matches!(
            self.kind,
            MoveKind::CastleKingside | MoveKind::CastleQueenside
        )
    }

    /// Returns true if this is an en passant capture.
    #[inline]
    pub const fn is_en_passant(self) -> bool {
        matches!(self.kind, MoveKind::EnPassant)
    }
}

impl fmt::Display for Move {
    /// Formats as coordinate notation ("e2e4", "e7e8q").
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion() {
            write!(f, "{}", kind.san_letter().to_ascii_lowercase())?;
        }
        Ok(())
    }
}
