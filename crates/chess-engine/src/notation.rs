//! Position and move notation.
//!
//! Position notation is FEN: piece placement by rank, side to move, castling
//! rights, en-passant target, halfmove clock, and fullmove number. Decoding is
//! strict and round-trips exactly with encoding. Move notation is rendered as
//! SAN ("e4", "Nbd2", "exd6", "e8=Q#", "O-O"); the request layer speaks in
//! from/to squares, so SAN parsing is not provided.

use crate::apply::apply_move;
use crate::board::{Board, CastlingRights};
use crate::movegen::{all_legal_moves, is_king_attacked, legal_moves};
use chess_core::{Color, Move, MoveKind, Piece, PieceKind, Square};
use thiserror::Error;

/// The standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Errors produced when decoding position notation.
///
/// A malformed string fails the load path; the engine never substitutes a
/// fabricated position for one it could not decode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("expected 6 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid piece placement: {0}")]
    Placement(String),

    #[error("invalid side to move: '{0}'")]
    SideToMove(String),

    #[error("invalid castling rights: '{0}'")]
    Castling(String),

    #[error("invalid en passant square: '{0}'")]
    EnPassant(String),

    #[error("invalid halfmove clock: '{0}'")]
    HalfmoveClock(String),

    #[error("invalid fullmove number: '{0}'")]
    FullmoveNumber(String),
}

/// Decodes position notation into a board.
pub fn parse_fen(fen: &str) -> Result<Board, NotationError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(NotationError::FieldCount(fields.len()));
    }

    let mut board = Board::empty();
    parse_placement(&mut board, fields[0])?;

    board.side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(NotationError::SideToMove(other.to_string())),
    };

    board.castling = parse_castling(fields[2])?;

    board.en_passant = match fields[3] {
        "-" => None,
        name => {
            let sq = Square::from_name(name)
                .filter(|sq| sq.rank() == 2 || sq.rank() == 5)
                .ok_or_else(|| NotationError::EnPassant(name.to_string()))?;
            Some(sq)
        }
    };

    board.halfmove_clock = fields[4]
        .parse::<u32>()
        .map_err(|_| NotationError::HalfmoveClock(fields[4].to_string()))?;

    board.fullmove_number = fields[5]
        .parse::<u32>()
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| NotationError::FullmoveNumber(fields[5].to_string()))?;

    Ok(board)
}

fn parse_placement(board: &mut Board, placement: &str) -> Result<(), NotationError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(NotationError::Placement(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    for (i, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - i as u8; // notation lists rank 8 first
        let mut file = 0u8;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                if skip == 0 || skip > 8 {
                    return Err(NotationError::Placement(format!(
                        "invalid empty-square count '{}' in rank {}",
                        c,
                        rank + 1
                    )));
                }
                file += skip as u8;
            } else if let Some(piece) = Piece::from_fen_char(c) {
                let sq = Square::new(file, rank).ok_or_else(|| {
                    NotationError::Placement(format!("rank {} overflows 8 squares", rank + 1))
                })?;
                board.put(sq, piece);
                file += 1;
            } else {
                return Err(NotationError::Placement(format!(
                    "invalid character '{}' in rank {}",
                    c,
                    rank + 1
                )));
            }
            if file > 8 {
                return Err(NotationError::Placement(format!(
                    "rank {} overflows 8 squares",
                    rank + 1
                )));
            }
        }
        if file != 8 {
            return Err(NotationError::Placement(format!(
                "rank {} has {} squares, expected 8",
                rank + 1,
                file
            )));
        }
    }

    for color in [Color::White, Color::Black] {
        let kings = board
            .pieces(color)
            .filter(|(_, p)| p.kind == PieceKind::King)
            .count();
        if kings != 1 {
            return Err(NotationError::Placement(format!(
                "{} has {} kings, expected 1",
                color, kings
            )));
        }
    }

    Ok(())
}

fn parse_castling(s: &str) -> Result<CastlingRights, NotationError> {
    if s == "-" {
        return Ok(CastlingRights::NONE);
    }
    let mut rights = CastlingRights::NONE;
    for c in s.chars() {
        match c {
            'K' => rights.white_kingside = true,
            'Q' => rights.white_queenside = true,
            'k' => rights.black_kingside = true,
            'q' => rights.black_queenside = true,
            _ => return Err(NotationError::Castling(s.to_string())),
        }
    }
    Ok(rights)
}

/// Encodes a board as position notation.
pub fn encode_fen(board: &Board) -> String {
    format!(
        "{} {} {}",
        position_key(board),
        board.halfmove_clock,
        board.fullmove_number
    )
}

/// The first four notation fields: placement, side to move, castling rights,
/// en-passant target. This is exactly the tuple threefold repetition compares.
pub(crate) fn position_key(board: &Board) -> String {
    format!(
        "{} {} {} {}",
        encode_placement(board),
        board.side_to_move.fen_char(),
        encode_castling(board.castling),
        match board.en_passant {
            Some(sq) => sq.name(),
            None => "-".to_string(),
        }
    )
}

fn encode_placement(board: &Board) -> String {
    let mut out = String::new();
    for rank in (0..8).rev() {
        let mut empty = 0;
        for file in 0..8 {
            let sq = Square::new(file, rank).expect("file and rank are in range");
            match board.piece_at(sq) {
                Some(piece) => {
                    if empty > 0 {
                        out.push(char::from_digit(empty, 10).expect("at most 8 empties"));
                        empty = 0;
                    }
                    out.push(piece.fen_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push(char::from_digit(empty, 10).expect("at most 8 empties"));
        }
        if rank > 0 {
            out.push('/');
        }
    }
    out
}

fn encode_castling(rights: CastlingRights) -> String {
    if !rights.any() {
        return "-".to_string();
    }
    let mut out = String::new();
    if rights.white_kingside {
        out.push('K');
    }
    if rights.white_queenside {
        out.push('Q');
    }
    if rights.black_kingside {
        out.push('k');
    }
    if rights.black_queenside {
        out.push('q');
    }
    out
}

/// Renders a move as SAN, given the board it is about to be played on.
///
/// The move must be legal; the check/checkmate suffix is derived by applying
/// it to a copy.
pub fn move_to_san(board: &Board, m: Move) -> String {
    let mut san = match m.kind {
        MoveKind::CastleKingside => "O-O".to_string(),
        MoveKind::CastleQueenside => "O-O-O".to_string(),
        _ => {
            let piece = board
                .piece_at(m.from)
                .expect("san rendering requires a piece on the from-square");
            let mut s = String::new();

            if piece.kind != PieceKind::Pawn {
                s.push(piece.kind.san_letter());
                s.push_str(&disambiguation(board, m, piece.kind));
            }

            let is_capture = board.piece_at(m.to).is_some() || m.is_en_passant();
            if is_capture {
                if piece.kind == PieceKind::Pawn {
                    s.push(m.from.file_char());
                }
                s.push('x');
            }

            s.push(m.to.file_char());
            s.push(m.to.rank_char());

            if let Some(kind) = m.promotion() {
                s.push('=');
                s.push(kind.san_letter());
            }
            s
        }
    };

    let next = apply_move(board, m);
    if is_king_attacked(&next, next.side_to_move) {
        san.push(if all_legal_moves(&next).is_empty() {
            '#'
        } else {
            '+'
        });
    }
    san
}

/// Returns the file/rank prefix that distinguishes the moving piece from
/// other same-kind pieces that could legally reach the same destination.
fn disambiguation(board: &Board, m: Move, kind: PieceKind) -> String {
    let rivals: Vec<Square> = board
        .pieces(board.side_to_move)
        .filter(|&(sq, p)| sq != m.from && p.kind == kind)
        .filter(|&(sq, _)| legal_moves(board, sq).iter().any(|r| r.to == m.to))
        .map(|(sq, _)| sq)
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|r| r.file() != m.from.file()) {
        m.from.file_char().to_string()
    } else if rivals.iter().all(|r| r.rank() != m.from.rank()) {
        m.from.rank_char().to_string()
    } else {
        format!("{}{}", m.from.file_char(), m.from.rank_char())
    }
}
