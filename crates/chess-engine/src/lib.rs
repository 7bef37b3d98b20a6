//! Chess rules engine with a mailbox board representation.
//!
//! This crate provides:
//! - [`Board`] - Full position state: piece placement, castling rights,
//!   en-passant target, and move counters
//! - [`GameRecord`] - Complete game management: move history, status
//!   transitions, clocks, and termination detection
//! - Move generation and validation (pseudo-legal generation filtered by
//!   king safety)
//! - FEN parsing/encoding and SAN rendering
//! - Per-side clocks with increment and flag-fall detection
//!
//! # Architecture
//!
//! The board is an 8x8 mailbox: one `Option<Piece>` slot per square. Move
//! generation produces pseudo-legal moves from per-kind movement tables and
//! filters them by applying each move to a copy of the board and rejecting
//! those that leave the mover's king attacked. All position values have
//! value semantics; applying a move returns a new board.
//!
//! # Example
//!
//! ```
//! use chess_engine::{Board, GameClock, GameRecord, MoveOutcome};
//! use chess_core::{Color, Square};
//! use std::time::SystemTime;
//!
//! // Querying a position directly.
//! let board = Board::startpos();
//! let moves = chess_engine::all_legal_moves(&board);
//! assert_eq!(moves.len(), 20);
//!
//! // Playing through a game record.
//! let mut game = GameRecord::new(GameClock::unlimited());
//! game.start().unwrap();
//! let e2 = Square::from_name("e2").unwrap();
//! let e4 = Square::from_name("e4").unwrap();
//! let outcome = game
//!     .apply_move(Color::White, e2, e4, None, SystemTime::now())
//!     .unwrap();
//! assert!(matches!(outcome, MoveOutcome::Applied(_)));
//! assert_eq!(game.transcript(), "1. e4");
//! ```

mod apply;
mod board;
mod clock;
mod game;
pub mod movegen;
pub mod notation;

pub use apply::apply_move;
pub use board::{Board, CastlingRights};
pub use clock::{ClockStatus, GameClock};
pub use game::{
    DrawCause, GameError, GameRecord, GameSnapshot, GameStatus, GameUpdate, MoveOutcome,
    MoveRecord,
};
pub use movegen::{all_legal_moves, is_attacked, is_king_attacked, legal_moves};
pub use notation::{move_to_san, NotationError, START_FEN};
