//! Move generation.
//!
//! Generation happens in two stages. [`pseudo_legal_moves`] enumerates
//! destinations obeying each piece kind's geometry and board edges, without
//! asking whether the mover's king ends up safe. [`legal_moves`] filters that
//! set by applying each candidate to a board copy and rejecting any that
//! leave the mover's own king attacked — a constant-factor cost taken
//! deliberately over incremental pin tracking.

use crate::apply::apply_move;
use crate::board::Board;
use chess_core::{Color, Move, MoveKind, PieceKind, Square};

/// Rook / queen ray directions.
const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Bishop / queen ray directions.
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// King steps and queen rays: all eight directions.
const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Knight jumps.
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// The movement-rule table for sliding pieces, keyed by kind.
fn slider_directions(kind: PieceKind) -> &'static [(i8, i8)] {
    match kind {
        PieceKind::Bishop => &DIAGONAL,
        PieceKind::Rook => &ORTHOGONAL,
        PieceKind::Queen => &ALL_DIRECTIONS,
        _ => &[],
    }
}

/// Enumerates pseudo-legal moves for the piece on `from`: movement geometry
/// and occupancy only, no king-safety filtering. Castling candidates require
/// the right to exist and the path to be empty; the attack conditions are
/// checked in [`legal_moves`].
pub fn pseudo_legal_moves(board: &Board, from: Square) -> Vec<Move> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };
    let mut moves = Vec::new();

    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, piece.color, &mut moves),
        PieceKind::Knight => step_moves(board, from, piece.color, &KNIGHT_JUMPS, &mut moves),
        PieceKind::King => {
            step_moves(board, from, piece.color, &ALL_DIRECTIONS, &mut moves);
            castle_candidates(board, from, piece.color, &mut moves);
        }
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
            for &(df, dr) in slider_directions(piece.kind) {
                let mut sq = from;
                while let Some(to) = sq.offset(df, dr) {
                    match board.piece_at(to) {
                        None => moves.push(Move::normal(from, to)),
                        Some(other) => {
                            if other.color != piece.color {
                                moves.push(Move::normal(from, to));
                            }
                            break;
                        }
                    }
                    sq = to;
                }
            }
        }
    }

    moves
}

fn step_moves(
    board: &Board,
    from: Square,
    color: Color,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(df, dr) in offsets {
        if let Some(to) = from.offset(df, dr) {
            match board.piece_at(to) {
                Some(other) if other.color == color => {}
                _ => moves.push(Move::normal(from, to)),
            }
        }
    }
}

fn pawn_moves(board: &Board, from: Square, color: Color, moves: &mut Vec<Move>) {
    let dir = color.forward();

    // Single and double forward steps, never capturing.
    if let Some(one) = from.offset(0, dir) {
        if board.piece_at(one).is_none() {
            push_pawn_move(from, one, MoveKind::Normal, color, moves);
            if from.rank() == color.pawn_rank() {
                if let Some(two) = one.offset(0, dir) {
                    if board.piece_at(two).is_none() {
                        moves.push(Move::new(from, two, MoveKind::DoublePush));
                    }
                }
            }
        }
    }

    // Diagonal captures, including en passant.
    for df in [-1, 1] {
        let Some(to) = from.offset(df, dir) else {
            continue;
        };
        match board.piece_at(to) {
            Some(other) if other.color != color => {
                push_pawn_move(from, to, MoveKind::Normal, color, moves);
            }
            None if board.en_passant == Some(to) => {
                moves.push(Move::new(from, to, MoveKind::EnPassant));
            }
            _ => {}
        }
    }
}

/// Pushes a pawn move, expanding into the four promotion choices when the
/// destination is the promotion rank.
fn push_pawn_move(from: Square, to: Square, kind: MoveKind, color: Color, moves: &mut Vec<Move>) {
    if to.rank() == color.promotion_rank() {
        for promo in [
            PieceKind::Queen,
            PieceKind::Rook,
            PieceKind::Bishop,
            PieceKind::Knight,
        ] {
            moves.push(Move::new(from, to, MoveKind::Promotion(promo)));
        }
    } else {
        moves.push(Move::new(from, to, kind));
    }
}

fn castle_candidates(board: &Board, from: Square, color: Color, moves: &mut Vec<Move>) {
    let (king_home, rook_kingside, rook_queenside) = match color {
        Color::White => (Square::E1, Square::H1, Square::A1),
        Color::Black => (Square::E8, Square::H8, Square::A8),
    };
    if from != king_home {
        return;
    }
    let own_rook = |sq: Square| {
        board
            .piece_at(sq)
            .is_some_and(|p| p.kind == PieceKind::Rook && p.color == color)
    };
    let empty = |df: i8| {
        from.offset(df, 0)
            .is_some_and(|sq| board.piece_at(sq).is_none())
    };

    if board.castling.kingside(color) && own_rook(rook_kingside) && empty(1) && empty(2) {
        let to = from.offset(2, 0).expect("g-file square exists");
        moves.push(Move::new(from, to, MoveKind::CastleKingside));
    }
    if board.castling.queenside(color) && own_rook(rook_queenside) && empty(-1) && empty(-2) && empty(-3) {
        let to = from.offset(-2, 0).expect("c-file square exists");
        moves.push(Move::new(from, to, MoveKind::CastleQueenside));
    }
}

/// Returns the legal moves for the piece on `from`.
///
/// Only the side to move has legal moves; a square holding an opponent piece
/// (or nothing) yields an empty list. Each pseudo-legal candidate is applied
/// to a board copy and kept only if the mover's king is not attacked
/// afterwards. Castling additionally requires the king to be out of check and
/// the transit square unattacked; the landing square is covered by the
/// simulation like any other move.
pub fn legal_moves(board: &Board, from: Square) -> Vec<Move> {
    let us = board.side_to_move;
    match board.piece_at(from) {
        Some(p) if p.color == us => {}
        _ => return Vec::new(),
    }

    pseudo_legal_moves(board, from)
        .into_iter()
        .filter(|&m| {
            if m.is_castle() {
                if is_king_attacked(board, us) {
                    return false;
                }
                let transit_df = match m.kind {
                    MoveKind::CastleKingside => 1,
                    _ => -1,
                };
                let transit = m
                    .from
                    .offset(transit_df, 0)
                    .expect("castle transit square exists");
                if is_attacked(board, us.opposite(), transit) {
                    return false;
                }
            }
            !is_king_attacked(&apply_move(board, m), us)
        })
        .collect()
}

/// Returns all legal moves for the side to move. A side in check with an
/// empty set is checkmated; not in check with an empty set is stalemated.
pub fn all_legal_moves(board: &Board) -> Vec<Move> {
    board
        .pieces(board.side_to_move)
        .flat_map(|(sq, _)| legal_moves(board, sq))
        .collect()
}

/// Returns true if any piece of `by` attacks `target`, ignoring pins.
///
/// Implemented as a reverse probe from the target square: cheaper than
/// enumerating every attacker's moves and equivalent to asking whether some
/// piece of that color could pseudo-legally move there.
pub fn is_attacked(board: &Board, by: Color, target: Square) -> bool {
    // Pawns attack diagonally forward, so look one rank backward from the
    // target along both diagonals.
    for df in [-1, 1] {
        if let Some(sq) = target.offset(df, -by.forward()) {
            if board.piece_at(sq)
                == Some(chess_core::Piece::new(by, PieceKind::Pawn))
            {
                return true;
            }
        }
    }

    for &(df, dr) in &KNIGHT_JUMPS {
        if let Some(sq) = target.offset(df, dr) {
            if board.piece_at(sq) == Some(chess_core::Piece::new(by, PieceKind::Knight)) {
                return true;
            }
        }
    }

    for &(df, dr) in &ALL_DIRECTIONS {
        if let Some(sq) = target.offset(df, dr) {
            if board.piece_at(sq) == Some(chess_core::Piece::new(by, PieceKind::King)) {
                return true;
            }
        }
    }

    for (dirs, kinds) in [
        (&ORTHOGONAL, [PieceKind::Rook, PieceKind::Queen]),
        (&DIAGONAL, [PieceKind::Bishop, PieceKind::Queen]),
    ] {
        for &(df, dr) in dirs {
            let mut sq = target;
            while let Some(next) = sq.offset(df, dr) {
                if let Some(piece) = board.piece_at(next) {
                    if piece.color == by && kinds.contains(&piece.kind) {
                        return true;
                    }
                    break;
                }
                sq = next;
            }
        }
    }

    false
}

/// Returns true if the given color's king is attacked by the opponent.
pub fn is_king_attacked(board: &Board, color: Color) -> bool {
    match board.king_square(color) {
        Some(sq) => is_attacked(board, color.opposite(), sq),
        None => false,
    }
}
