//! Move application.

use crate::board::Board;
use chess_core::{Color, Move, MoveKind, Piece, PieceKind, Square};

/// Applies a validated move to a board, returning the resulting board.
///
/// The caller is responsible for legality; moves come from the generator.
/// Handles captures (including the displaced en-passant pawn), rook
/// relocation on castles, promotion, castling-right and en-passant updates,
/// the halfmove clock, the fullmove number, and the side-to-move flip.
pub fn apply_move(board: &Board, m: Move) -> Board {
    let mut next = board.clone();
    let us = board.side_to_move;

    let piece = next
        .take(m.from)
        .expect("apply_move requires a piece on the from-square");
    let mut captured = next.take(m.to);

    if m.kind == MoveKind::EnPassant {
        // The captured pawn sits behind the destination square.
        let victim = m
            .to
            .offset(0, -us.forward())
            .expect("en passant victim square exists");
        captured = next.take(victim);
    }

    let placed = match m.kind {
        MoveKind::Promotion(kind) => Piece::new(us, kind),
        _ => piece,
    };
    next.put(m.to, placed);

    // Castling also relocates the rook.
    let rook_shift = match (m.kind, us) {
        (MoveKind::CastleKingside, Color::White) => Some((Square::H1, Square::F1)),
        (MoveKind::CastleQueenside, Color::White) => Some((Square::A1, Square::D1)),
        (MoveKind::CastleKingside, Color::Black) => Some((Square::H8, Square::F8)),
        (MoveKind::CastleQueenside, Color::Black) => Some((Square::A8, Square::D8)),
        _ => None,
    };
    if let Some((rook_from, rook_to)) = rook_shift {
        if let Some(rook) = next.take(rook_from) {
            next.put(rook_to, rook);
        }
    }

    // A king move clears both wings for the mover. Independently, vacating
    // or landing on a rook home square clears that wing for its owner,
    // whether by the rook moving away or by its capture.
    if piece.kind == PieceKind::King {
        next.castling.clear_color(us);
    }
    for sq in [m.from, m.to] {
        match sq {
            Square::A1 => next.castling.clear_queenside(Color::White),
            Square::H1 => next.castling.clear_kingside(Color::White),
            Square::A8 => next.castling.clear_queenside(Color::Black),
            Square::H8 => next.castling.clear_kingside(Color::Black),
            _ => {}
        }
    }

    // The en-passant target lives for exactly one ply.
    next.en_passant = match m.kind {
        MoveKind::DoublePush => m.from.offset(0, us.forward()),
        _ => None,
    };

    if piece.kind == PieceKind::Pawn || captured.is_some() {
        next.halfmove_clock = 0;
    } else {
        next.halfmove_clock += 1;
    }

    if us == Color::Black {
        next.fullmove_number += 1;
    }
    next.side_to_move = us.opposite();

    next
}
