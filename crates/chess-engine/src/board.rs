//! Mailbox board representation.

use crate::movegen;
use crate::notation::{self, NotationError};
use chess_core::{Color, Piece, PieceKind, Square};

/// The four independent castling permissions.
///
/// Rights are monotonically non-increasing: the applier only ever clears
/// flags, never restores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    pub const NONE: CastlingRights = CastlingRights {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    /// Returns true if the given side may still castle kingside.
    #[inline]
    pub const fn kingside(self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    /// Returns true if the given side may still castle queenside.
    #[inline]
    pub const fn queenside(self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    /// Clears kingside castling for a color.
    pub fn clear_kingside(&mut self, color: Color) {
        match color {
            Color::White => self.white_kingside = false,
            Color::Black => self.black_kingside = false,
        }
    }

    /// Clears queenside castling for a color.
    pub fn clear_queenside(&mut self, color: Color) {
        match color {
            Color::White => self.white_queenside = false,
            Color::Black => self.black_queenside = false,
        }
    }

    /// Clears both wings for a color (king moved).
    pub fn clear_color(&mut self, color: Color) {
        self.clear_kingside(color);
        self.clear_queenside(color);
    }

    /// Returns true if any right remains.
    pub const fn any(self) -> bool {
        self.white_kingside || self.white_queenside || self.black_kingside || self.black_queenside
    }
}

/// Complete board state: piece placement plus the bookkeeping fields that
/// position notation carries.
///
/// `Board` has value semantics; `Clone` is cheap and is the primitive the
/// move generator uses for speculative application when filtering for king
/// safety. The engine passes boards in and out of every call and keeps no
/// state of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; 64],

    /// The side to move.
    pub side_to_move: Color,

    /// Castling rights.
    pub castling: CastlingRights,

    /// En-passant target square, valid for exactly one ply after a double
    /// pawn push.
    pub en_passant: Option<Square>,

    /// Plies since the last capture or pawn move, for the fifty-move rule.
    pub halfmove_clock: u32,

    /// Fullmove number (starts at 1, increments after Black's move).
    pub fullmove_number: u32,
}

impl Board {
    /// Creates an empty board with White to move.
    pub fn empty() -> Self {
        Board {
            squares: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(notation::START_FEN).expect("standard starting position is valid")
    }

    /// Creates a board from position notation.
    pub fn from_fen(fen: &str) -> Result<Self, NotationError> {
        notation::parse_fen(fen)
    }

    /// Encodes this board as position notation.
    pub fn to_fen(&self) -> String {
        notation::encode_fen(self)
    }

    /// Returns the piece on the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    /// Places a piece on a square, replacing whatever was there.
    pub(crate) fn put(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.index()] = Some(piece);
    }

    /// Removes and returns the piece on a square.
    pub(crate) fn take(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()].take()
    }

    /// Iterates over all occupied squares of one color.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.piece_at(sq) {
            Some(p) if p.color == color => Some((sq, p)),
            _ => None,
        })
    }

    /// Returns the square of the given color's king.
    ///
    /// `None` only on malformed boards; decoded notation always has exactly
    /// one king per side.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(_, p)| p.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// Returns true if any piece of `color` attacks `target`, ignoring pins.
    /// This is the probe used for check detection and castling safety.
    pub fn attacked_by(&self, color: Color, target: Square) -> bool {
        movegen::is_attacked(self, color, target)
    }

    /// Returns true if the given color's king is attacked.
    pub fn in_check(&self, color: Color) -> bool {
        movegen::is_king_attacked(self, color)
    }

    /// Returns the repetition key for this position: piece placement, side to
    /// move, castling rights, and en-passant target. Two positions draw by
    /// threefold repetition when this key has occurred three times.
    pub fn repetition_key(&self) -> String {
        notation::position_key(self)
    }
}
