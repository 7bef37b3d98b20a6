//! Core value types for chess.
//!
//! This crate provides the fundamental types shared by the rules engine and
//! its callers:
//! - [`Color`] and [`PieceKind`] / [`Piece`] for piece representation
//! - [`Square`] for board coordinates
//! - [`Move`] and [`MoveKind`] for move representation
//!
//! Everything here is a small `Copy` value with no engine logic attached;
//! board state, move generation, and game bookkeeping live in `chess-engine`.

mod color;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use mov::{Move, MoveKind};
pub use piece::{Piece, PieceKind};
pub use square::Square;
