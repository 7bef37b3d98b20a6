//! Game records: move history, status, clocks, and termination detection.
//!
//! A [`GameRecord`] is a value the surrounding service checks out of
//! persistence, mutates through exactly one engine call at a time, and writes
//! back. The engine keeps no state of its own between calls; callers must
//! serialize move applications per game (concurrent applications against the
//! same snapshot would race on the side to move).

use crate::apply::apply_move;
use crate::board::Board;
use crate::clock::GameClock;
use crate::movegen::{all_legal_moves, is_king_attacked, legal_moves};
use crate::notation::{move_to_san, NotationError};
use chess_core::{Color, Move, PieceKind, Square};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Errors from game operations. All are deterministic for identical inputs
/// and leave the record unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The move is not available: wrong turn, no piece, destination not in
    /// the legal set, or a bad promotion selection.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// A mutating operation was attempted before the game started.
    #[error("game has not started")]
    GameNotStarted,

    /// A mutating operation was attempted on a finished game.
    #[error("game has already ended")]
    GameAlreadyOver,

    /// A position string failed to decode while loading a record.
    #[error(transparent)]
    InvalidNotation(#[from] NotationError),
}

/// Why a game ended in a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrawCause {
    /// 100 plies without a capture or pawn move.
    FiftyMoveRule,
    /// King vs king, or king and one minor piece vs king.
    InsufficientMaterial,
    /// The same placement, side to move, castling rights, and en-passant
    /// target occurred three times.
    ThreefoldRepetition,
    /// Both players agreed to a draw.
    Agreement,
}

/// Overall game status. Everything past `InProgress` is terminal and
/// absorbing: no transition leads out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Waiting,
    InProgress,
    Checkmate,
    Stalemate,
    Draw(DrawCause),
    Resignation,
    Timeout,
    Abandoned,
}

impl GameStatus {
    /// Returns true if the game has ended.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Waiting | GameStatus::InProgress)
    }
}

/// One applied move, as persisted and shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Fullmove number the move was played on.
    pub move_number: u32,
    pub from: Square,
    pub to: Square,
    /// Kind of the piece that moved.
    pub piece: PieceKind,
    /// Kind of the captured piece, if any.
    pub captured: Option<PieceKind>,
    /// Promotion choice, if the move promoted.
    pub promotion: Option<PieceKind>,
    pub is_capture: bool,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_en_passant: bool,
    pub is_castle: bool,
    /// Rendered move notation.
    pub san: String,
    /// Position notation after the move.
    pub resulting_fen: String,
}

/// Result of a move-application call that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was legal and has been applied.
    Applied(MoveRecord),
    /// The mover's flag fell before the move could be considered; the game
    /// is over by timeout regardless of the move's validity.
    FlagFall { winner: Color },
}

/// Notification payload pushed to spectators after each accepted operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameUpdate {
    pub fen: String,
    pub status: GameStatus,
    pub is_check: bool,
    pub winner: Option<Color>,
}

/// The persisted shape of a game, exchanged with the storage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub start_fen: String,
    pub fen: String,
    pub moves: Vec<MoveRecord>,
    pub status: GameStatus,
    pub winner: Option<Color>,
    pub clock: GameClock,
    pub last_move_at: Option<SystemTime>,
    pub ended_at: Option<SystemTime>,
}

/// A full game: current board, append-only move history, status, and clocks.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    start_board: Board,
    board: Board,
    moves: Vec<MoveRecord>,
    status: GameStatus,
    winner: Option<Color>,
    clock: GameClock,
    last_move_at: Option<SystemTime>,
    ended_at: Option<SystemTime>,
    /// Position keys seen so far (including the start), for threefold
    /// repetition.
    repetition: Vec<String>,
}

impl GameRecord {
    /// Creates a game from the standard starting position, waiting for the
    /// second player.
    pub fn new(clock: GameClock) -> Self {
        Self::from_board(Board::startpos(), clock)
    }

    /// Creates a game from a custom starting position.
    pub fn from_fen(fen: &str, clock: GameClock) -> Result<Self, GameError> {
        Ok(Self::from_board(Board::from_fen(fen)?, clock))
    }

    fn from_board(board: Board, clock: GameClock) -> Self {
        let key = board.repetition_key();
        GameRecord {
            start_board: board.clone(),
            board,
            moves: Vec::new(),
            status: GameStatus::Waiting,
            winner: None,
            clock,
            last_move_at: None,
            ended_at: None,
            repetition: vec![key],
        }
    }

    /// Marks the game as started (the second player joined). Idempotent
    /// while the game is running.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }
        self.status = GameStatus::InProgress;
        Ok(())
    }

    /// Returns the current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the current status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the winner, when the game ended decisively.
    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    /// Returns the move history in play order.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// Returns the clocks.
    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// Returns when the last move was applied.
    pub fn last_move_at(&self) -> Option<SystemTime> {
        self.last_move_at
    }

    /// Returns when the game reached a terminal status.
    pub fn ended_at(&self) -> Option<SystemTime> {
        self.ended_at
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        is_king_attacked(&self.board, self.board.side_to_move)
    }

    /// Returns the legal moves for the piece on `from`, or an empty list
    /// once the game is over.
    pub fn legal_moves_from(&self, from: Square) -> Vec<Move> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        legal_moves(&self.board, from)
    }

    /// Renders the move-list transcript, e.g. `"1. e4 e5 2. Nf3"`.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        let mut side = self.start_board.side_to_move;
        for (i, rec) in self.moves.iter().enumerate() {
            if !out.is_empty() {
                out.push(' ');
            }
            match side {
                Color::White => {
                    out.push_str(&format!("{}. {}", rec.move_number, rec.san));
                }
                Color::Black if i == 0 => {
                    out.push_str(&format!("{}... {}", rec.move_number, rec.san));
                }
                Color::Black => out.push_str(&rec.san),
            }
            side = side.opposite();
        }
        out
    }

    /// Applies a move for `color` at wall-clock time `now`.
    ///
    /// The flag-fall check runs before legality: if the mover's clock is
    /// exhausted by the time spent since the previous move, the game ends in
    /// a timeout no matter what was played. An illegal move leaves the
    /// record, including the clocks, untouched.
    pub fn apply_move(
        &mut self,
        color: Color,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
        now: SystemTime,
    ) -> Result<MoveOutcome, GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }
        if self.status == GameStatus::Waiting {
            return Err(GameError::GameNotStarted);
        }
        let mover = self.board.side_to_move;
        if color != mover {
            return Err(GameError::IllegalMove(format!(
                "it is {}'s turn",
                mover
            )));
        }

        let elapsed = self
            .last_move_at
            .map(|t| now.duration_since(t).unwrap_or(Duration::ZERO));
        if let Some(elapsed) = elapsed {
            if self.clock.flags(mover, elapsed) {
                self.clock.charge(mover, elapsed);
                let winner = mover.opposite();
                self.finish(GameStatus::Timeout, Some(winner), now);
                return Ok(MoveOutcome::FlagFall { winner });
            }
        }

        let m = self.resolve_move(from, to, promotion)?;

        // The move is accepted; only now does the clock pay for it.
        if let Some(elapsed) = elapsed {
            self.clock.charge(mover, elapsed);
        }

        let piece = self
            .board
            .piece_at(from)
            .expect("resolve_move verified the from-square");
        let captured = if m.is_en_passant() {
            Some(PieceKind::Pawn)
        } else {
            self.board.piece_at(to).map(|p| p.kind)
        };
        let san = move_to_san(&self.board, m);
        let move_number = self.board.fullmove_number;

        let next = apply_move(&self.board, m);
        let opponent_replies = all_legal_moves(&next);
        let gives_check = is_king_attacked(&next, next.side_to_move);

        let record = MoveRecord {
            move_number,
            from,
            to,
            piece: piece.kind,
            captured,
            promotion: m.promotion(),
            is_capture: captured.is_some(),
            is_check: gives_check,
            is_checkmate: gives_check && opponent_replies.is_empty(),
            is_en_passant: m.is_en_passant(),
            is_castle: m.is_castle(),
            san,
            resulting_fen: next.to_fen(),
        };

        self.board = next;
        self.repetition.push(self.board.repetition_key());
        self.last_move_at = Some(now);
        self.moves.push(record.clone());

        if opponent_replies.is_empty() {
            if gives_check {
                self.finish(GameStatus::Checkmate, Some(mover), now);
            } else {
                self.finish(GameStatus::Stalemate, None, now);
            }
        } else if self.board.halfmove_clock >= 100 {
            self.finish(GameStatus::Draw(DrawCause::FiftyMoveRule), None, now);
        } else if insufficient_material(&self.board) {
            self.finish(GameStatus::Draw(DrawCause::InsufficientMaterial), None, now);
        } else if self.repetition_count() >= 3 {
            self.finish(GameStatus::Draw(DrawCause::ThreefoldRepetition), None, now);
        }

        Ok(MoveOutcome::Applied(record))
    }

    /// Matches the request against the legal-move set, resolving the
    /// promotion choice. A promotion-triggering move without a selection is
    /// rejected rather than silently promoted to a queen; a selection on a
    /// non-promoting move is ignored.
    fn resolve_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Move, GameError> {
        let piece = self
            .board
            .piece_at(from)
            .ok_or_else(|| GameError::IllegalMove(format!("no piece on {}", from)))?;
        if piece.color != self.board.side_to_move {
            return Err(GameError::IllegalMove(format!(
                "the piece on {} is not yours",
                from
            )));
        }

        let candidates: Vec<Move> = legal_moves(&self.board, from)
            .into_iter()
            .filter(|m| m.to == to)
            .collect();
        let Some(first) = candidates.first() else {
            return Err(GameError::IllegalMove(format!(
                "{}{} is not legal",
                from, to
            )));
        };

        if first.promotion().is_none() {
            return Ok(*first);
        }

        let Some(kind) = promotion else {
            return Err(GameError::IllegalMove(
                "a promotion piece is required".to_string(),
            ));
        };
        if !kind.is_promotion_choice() {
            return Err(GameError::IllegalMove(format!(
                "cannot promote to {}",
                kind
            )));
        }
        candidates
            .into_iter()
            .find(|m| m.promotion() == Some(kind))
            .ok_or_else(|| {
                GameError::IllegalMove(format!("cannot promote to {} here", kind))
            })
    }

    /// Resigns the game for `color`; the opponent wins.
    pub fn resign(&mut self, color: Color, now: SystemTime) -> Result<(), GameError> {
        self.require_in_progress()?;
        self.finish(GameStatus::Resignation, Some(color.opposite()), now);
        Ok(())
    }

    /// Ends the game as a draw by agreement.
    pub fn agree_draw(&mut self, now: SystemTime) -> Result<(), GameError> {
        self.require_in_progress()?;
        self.finish(GameStatus::Draw(DrawCause::Agreement), None, now);
        Ok(())
    }

    /// Ends the game as abandoned (e.g. by a disconnect policy). Valid from
    /// both the waiting and the running state.
    pub fn abandon(&mut self, now: SystemTime) -> Result<(), GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }
        self.finish(GameStatus::Abandoned, None, now);
        Ok(())
    }

    fn require_in_progress(&self) -> Result<(), GameError> {
        match self.status {
            GameStatus::Waiting => Err(GameError::GameNotStarted),
            s if s.is_terminal() => Err(GameError::GameAlreadyOver),
            _ => Ok(()),
        }
    }

    /// Records a terminal status. The end timestamp is fixed exactly once;
    /// terminal states are absorbing, so this never runs twice.
    fn finish(&mut self, status: GameStatus, winner: Option<Color>, now: SystemTime) {
        self.status = status;
        self.winner = winner;
        if self.ended_at.is_none() {
            self.ended_at = Some(now);
        }
    }

    fn repetition_count(&self) -> usize {
        let current = self.board.repetition_key();
        self.repetition.iter().filter(|k| **k == current).count()
    }

    /// Builds the payload broadcast to spectators.
    pub fn update_payload(&self) -> GameUpdate {
        GameUpdate {
            fen: self.board.to_fen(),
            status: self.status,
            is_check: self.is_check(),
            winner: self.winner,
        }
    }

    /// Exports the persisted shape of this game.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            start_fen: self.start_board.to_fen(),
            fen: self.board.to_fen(),
            moves: self.moves.clone(),
            status: self.status,
            winner: self.winner,
            clock: self.clock.clone(),
            last_move_at: self.last_move_at,
            ended_at: self.ended_at,
        }
    }

    /// Rebuilds a game from its persisted shape, re-deriving the board and
    /// the repetition history from the recorded position strings. Malformed
    /// notation fails the load; nothing is fabricated in its place.
    pub fn restore(snapshot: GameSnapshot) -> Result<Self, GameError> {
        let start_board = Board::from_fen(&snapshot.start_fen)?;
        let board = Board::from_fen(&snapshot.fen)?;

        let mut repetition = vec![start_board.repetition_key()];
        for rec in &snapshot.moves {
            repetition.push(Board::from_fen(&rec.resulting_fen)?.repetition_key());
        }

        Ok(GameRecord {
            start_board,
            board,
            moves: snapshot.moves,
            status: snapshot.status,
            winner: snapshot.winner,
            clock: snapshot.clock,
            last_move_at: snapshot.last_move_at,
            ended_at: snapshot.ended_at,
            repetition,
        })
    }
}

/// Recognized dead-material configurations: king vs king, and king plus one
/// minor piece vs king.
fn insufficient_material(board: &Board) -> bool {
    let extras: Vec<PieceKind> = Square::all()
        .filter_map(|sq| board.piece_at(sq))
        .filter(|p| p.kind != PieceKind::King)
        .map(|p| p.kind)
        .collect();
    match extras.as_slice() {
        [] => true,
        [kind] => kind.is_minor(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn sq(name: &str) -> Square {
        Square::from_name(name).unwrap()
    }

    fn started() -> GameRecord {
        let mut game = GameRecord::new(GameClock::unlimited());
        game.start().unwrap();
        game
    }

    fn play(game: &mut GameRecord, color: Color, from: &str, to: &str) -> MoveRecord {
        match game
            .apply_move(color, sq(from), sq(to), None, at(0))
            .unwrap()
        {
            MoveOutcome::Applied(rec) => rec,
            MoveOutcome::FlagFall { .. } => panic!("unexpected flag fall"),
        }
    }

    #[test]
    fn moves_rejected_before_start() {
        let mut game = GameRecord::new(GameClock::unlimited());
        assert_eq!(game.status(), GameStatus::Waiting);
        let result = game.apply_move(Color::White, sq("e2"), sq("e4"), None, at(0));
        assert_eq!(result, Err(GameError::GameNotStarted));
    }

    #[test]
    fn opening_moves_and_side_to_move() {
        let mut game = started();
        let rec = play(&mut game, Color::White, "e2", "e4");
        assert_eq!(rec.san, "e4");
        assert_eq!(rec.move_number, 1);
        assert!(!rec.is_capture);
        assert!(game.board().to_fen().contains(" b "));

        play(&mut game, Color::Black, "e7", "e5");
        assert!(game.board().to_fen().contains(" w "));
        assert_eq!(game.moves().len(), 2);
    }

    #[test]
    fn wrong_turn_is_illegal() {
        let mut game = started();
        let result = game.apply_move(Color::Black, sq("e7"), sq("e5"), None, at(0));
        assert!(matches!(result, Err(GameError::IllegalMove(_))));
        assert_eq!(game.moves().len(), 0);
    }

    #[test]
    fn illegal_destination_leaves_record_unchanged() {
        let mut game = started();
        let before = game.clone();
        let result = game.apply_move(Color::White, sq("e2"), sq("e5"), None, at(0));
        assert!(matches!(result, Err(GameError::IllegalMove(_))));
        assert_eq!(game, before);
    }

    #[test]
    fn capture_flags_are_recorded() {
        let mut game = started();
        play(&mut game, Color::White, "e2", "e4");
        play(&mut game, Color::Black, "d7", "d5");
        let rec = play(&mut game, Color::White, "e4", "d5");
        assert!(rec.is_capture);
        assert_eq!(rec.captured, Some(PieceKind::Pawn));
        assert_eq!(rec.san, "exd5");
    }

    #[test]
    fn scholars_mate_ends_the_game() {
        let mut game = started();
        play(&mut game, Color::White, "e2", "e4");
        play(&mut game, Color::Black, "e7", "e5");
        play(&mut game, Color::White, "f1", "c4");
        play(&mut game, Color::Black, "b8", "c6");
        play(&mut game, Color::White, "d1", "h5");
        play(&mut game, Color::Black, "g8", "f6");
        let rec = play(&mut game, Color::White, "h5", "f7");
        assert!(rec.is_checkmate);
        assert_eq!(rec.san, "Qxf7#");
        assert_eq!(game.status(), GameStatus::Checkmate);
        assert_eq!(game.winner(), Some(Color::White));
        assert!(game.ended_at().is_some());

        let result = game.apply_move(Color::Black, sq("e8"), sq("f7"), None, at(1));
        assert_eq!(result, Err(GameError::GameAlreadyOver));
    }

    #[test]
    fn stalemate_is_a_terminal_draw_without_winner() {
        let mut game =
            GameRecord::from_fen("7k/8/6K1/8/8/5Q2/8/8 w - - 0 1", GameClock::unlimited())
                .unwrap();
        game.start().unwrap();
        // Qf7 leaves the h8 king no move but no check either.
        let rec = play(&mut game, Color::White, "f3", "f7");
        assert!(!rec.is_check);
        assert!(!rec.is_checkmate);
        assert_eq!(game.status(), GameStatus::Stalemate);
        assert_eq!(game.winner(), None);
        assert!(game.ended_at().is_some());
    }

    #[test]
    fn promotion_requires_a_selection() {
        let mut game =
            GameRecord::from_fen("k7/4P3/8/8/8/8/8/K7 w - - 0 1", GameClock::unlimited())
                .unwrap();
        game.start().unwrap();

        let missing = game.apply_move(Color::White, sq("e7"), sq("e8"), None, at(0));
        assert!(matches!(missing, Err(GameError::IllegalMove(_))));

        let king = game.apply_move(
            Color::White,
            sq("e7"),
            sq("e8"),
            Some(PieceKind::King),
            at(0),
        );
        assert!(matches!(king, Err(GameError::IllegalMove(_))));

        let outcome = game
            .apply_move(
                Color::White,
                sq("e7"),
                sq("e8"),
                Some(PieceKind::Queen),
                at(0),
            )
            .unwrap();
        let MoveOutcome::Applied(rec) = outcome else {
            panic!("expected an applied move");
        };
        assert_eq!(rec.promotion, Some(PieceKind::Queen));
        assert_eq!(rec.san, "e8=Q+");
    }

    #[test]
    fn fifty_move_rule_draws_automatically() {
        let mut game =
            GameRecord::from_fen("8/8/8/8/8/8/8/R3K2k w Q - 99 60", GameClock::unlimited())
                .unwrap();
        game.start().unwrap();
        play(&mut game, Color::White, "a1", "a2");
        assert_eq!(game.status(), GameStatus::Draw(DrawCause::FiftyMoveRule));
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn threefold_repetition_draws_automatically() {
        let mut game = started();
        for _ in 0..2 {
            play(&mut game, Color::White, "g1", "f3");
            play(&mut game, Color::Black, "g8", "f6");
            play(&mut game, Color::White, "f3", "g1");
            play(&mut game, Color::Black, "f6", "g8");
        }
        assert_eq!(
            game.status(),
            GameStatus::Draw(DrawCause::ThreefoldRepetition)
        );
    }

    #[test]
    fn insufficient_material_draws() {
        // Capturing the last rook leaves king + bishop vs king.
        let mut game =
            GameRecord::from_fen("k7/8/8/8/8/8/r7/KB6 w - - 0 1", GameClock::unlimited())
                .unwrap();
        game.start().unwrap();
        play(&mut game, Color::White, "a1", "a2");
        assert_eq!(
            game.status(),
            GameStatus::Draw(DrawCause::InsufficientMaterial)
        );
    }

    #[test]
    fn resignation_names_the_opponent_winner() {
        let mut game = started();
        game.resign(Color::White, at(5)).unwrap();
        assert_eq!(game.status(), GameStatus::Resignation);
        assert_eq!(game.winner(), Some(Color::Black));
        assert_eq!(game.ended_at(), Some(at(5)));
        assert_eq!(game.resign(Color::Black, at(6)), Err(GameError::GameAlreadyOver));
        // The end timestamp was fixed once.
        assert_eq!(game.ended_at(), Some(at(5)));
    }

    #[test]
    fn draw_by_agreement_and_abandonment() {
        let mut game = started();
        game.agree_draw(at(1)).unwrap();
        assert_eq!(game.status(), GameStatus::Draw(DrawCause::Agreement));

        let mut waiting = GameRecord::new(GameClock::unlimited());
        waiting.abandon(at(2)).unwrap();
        assert_eq!(waiting.status(), GameStatus::Abandoned);
        assert_eq!(waiting.start(), Err(GameError::GameAlreadyOver));
    }

    #[test]
    fn resign_before_start_is_rejected() {
        let mut game = GameRecord::new(GameClock::unlimited());
        assert_eq!(game.resign(Color::White, at(0)), Err(GameError::GameNotStarted));
    }

    #[test]
    fn clock_charges_only_accepted_moves() {
        let clock = GameClock::with_time_control(Duration::from_secs(60), None);
        let mut game = GameRecord::new(clock);
        game.start().unwrap();

        // First move: nothing to charge yet.
        game.apply_move(Color::White, sq("e2"), sq("e4"), None, at(100))
            .unwrap();
        assert_eq!(
            game.clock().remaining(Color::White),
            Some(Duration::from_secs(60))
        );

        // Black thinks for 10 seconds.
        game.apply_move(Color::Black, sq("e7"), sq("e5"), None, at(110))
            .unwrap();
        assert_eq!(
            game.clock().remaining(Color::Black),
            Some(Duration::from_secs(50))
        );

        // An illegal attempt does not touch the clock or the timestamp.
        let result = game.apply_move(Color::White, sq("e4"), sq("e6"), None, at(130));
        assert!(matches!(result, Err(GameError::IllegalMove(_))));
        assert_eq!(
            game.clock().remaining(Color::White),
            Some(Duration::from_secs(60))
        );
        assert_eq!(game.last_move_at(), Some(at(110)));
    }

    #[test]
    fn flag_fall_beats_move_validity() {
        let clock = GameClock::with_time_control(Duration::from_secs(30), None);
        let mut game = GameRecord::new(clock);
        game.start().unwrap();
        game.apply_move(Color::White, sq("e2"), sq("e4"), None, at(0))
            .unwrap();
        game.apply_move(Color::Black, sq("e7"), sq("e5"), None, at(10))
            .unwrap();

        // White returns 40 seconds later with an illegal move; the flag
        // fell first, so the outcome is a timeout, not IllegalMove.
        let outcome = game
            .apply_move(Color::White, sq("e4"), sq("e6"), None, at(50))
            .unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::FlagFall {
                winner: Color::Black
            }
        );
        assert_eq!(game.status(), GameStatus::Timeout);
        assert_eq!(game.winner(), Some(Color::Black));
        assert_eq!(game.clock().remaining(Color::White), Some(Duration::ZERO));
    }

    #[test]
    fn increment_applies_after_accepted_moves() {
        let clock =
            GameClock::with_time_control(Duration::from_secs(60), Some(Duration::from_secs(5)));
        let mut game = GameRecord::new(clock);
        game.start().unwrap();
        game.apply_move(Color::White, sq("e2"), sq("e4"), None, at(0))
            .unwrap();
        game.apply_move(Color::Black, sq("e7"), sq("e5"), None, at(10))
            .unwrap();
        game.apply_move(Color::White, sq("g1"), sq("f3"), None, at(30))
            .unwrap();
        // White thought for 20 seconds after Black's reply and got 5 back.
        assert_eq!(
            game.clock().remaining(Color::White),
            Some(Duration::from_secs(45))
        );
    }

    #[test]
    fn transcript_numbers_fullmoves() {
        let mut game = started();
        play(&mut game, Color::White, "e2", "e4");
        play(&mut game, Color::Black, "e7", "e5");
        play(&mut game, Color::White, "g1", "f3");
        assert_eq!(game.transcript(), "1. e4 e5 2. Nf3");
    }

    #[test]
    fn transcript_from_black_to_move_position() {
        let mut game = GameRecord::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            GameClock::unlimited(),
        )
        .unwrap();
        game.start().unwrap();
        play(&mut game, Color::Black, "e7", "e5");
        play(&mut game, Color::White, "g1", "f3");
        assert_eq!(game.transcript(), "1... e5 2. Nf3");
    }

    #[test]
    fn legal_moves_query_empties_after_game_over() {
        let mut game = started();
        assert_eq!(game.legal_moves_from(sq("e2")).len(), 2);
        assert_eq!(game.legal_moves_from(sq("e7")).len(), 0);
        game.resign(Color::White, at(0)).unwrap();
        assert!(game.legal_moves_from(sq("e2")).is_empty());
    }

    #[test]
    fn snapshot_roundtrips_through_json() {
        let mut game = started();
        play(&mut game, Color::White, "e2", "e4");
        play(&mut game, Color::Black, "e7", "e5");

        let snapshot = game.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);

        let restored = GameRecord::restore(back).unwrap();
        assert_eq!(restored, game);
    }

    #[test]
    fn restore_rejects_malformed_notation() {
        let mut game = started();
        play(&mut game, Color::White, "e2", "e4");
        let mut snapshot = game.snapshot();
        snapshot.fen = "not a position".to_string();
        assert!(matches!(
            GameRecord::restore(snapshot),
            Err(GameError::InvalidNotation(_))
        ));
    }

    #[test]
    fn restored_game_still_detects_repetition() {
        let mut game = started();
        play(&mut game, Color::White, "g1", "f3");
        play(&mut game, Color::Black, "g8", "f6");
        play(&mut game, Color::White, "f3", "g1");
        play(&mut game, Color::Black, "f6", "g8");

        let mut restored = GameRecord::restore(game.snapshot()).unwrap();
        play(&mut restored, Color::White, "g1", "f3");
        play(&mut restored, Color::Black, "g8", "f6");
        play(&mut restored, Color::White, "f3", "g1");
        play(&mut restored, Color::Black, "f6", "g8");
        assert_eq!(
            restored.status(),
            GameStatus::Draw(DrawCause::ThreefoldRepetition)
        );
    }

    #[test]
    fn update_payload_reflects_termination() {
        let mut game = started();
        play(&mut game, Color::White, "e2", "e4");
        let update = game.update_payload();
        assert_eq!(update.status, GameStatus::InProgress);
        assert!(!update.is_check);
        assert_eq!(update.winner, None);

        game.resign(Color::Black, at(1)).unwrap();
        let update = game.update_payload();
        assert_eq!(update.status, GameStatus::Resignation);
        assert_eq!(update.winner, Some(Color::White));
    }

    #[test]
    fn status_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&GameStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(
            serde_json::to_string(&GameStatus::Draw(DrawCause::FiftyMoveRule)).unwrap(),
            "{\"DRAW\":\"FIFTY_MOVE_RULE\"}"
        );
    }
}
