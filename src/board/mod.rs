pub mod cozy;
pub mod zobrist;

use crate::book::BookMove;
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

/// Repetition status of the position reached by a candidate move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repetition {
    None,
    Draw,
    /// The side to move after the repetition wins, i.e. the mover loses.
    Win,
    /// The side to move after the repetition loses.
    Loss,
}

/// Game state the book search walks over. Moves pushed on a search path
/// are always popped before that path returns.
pub trait PositionContext {
    /// Book key of the current position.
    fn current_key(&self) -> u64;

    fn push_move(&mut self, mv: BookMove) -> Result<()>;

    fn pop_move(&mut self);

    fn side_to_move(&self) -> Side;

    /// Repetition status as if `mv` were played. Leaves the position unchanged.
    fn classify_if_played(&mut self, mv: BookMove) -> Result<Repetition>;

    fn reset_to_start(&mut self);

    fn set_from_encoded(&mut self, encoded: &str) -> Result<()>;

    fn parse_move(&self, token: &str) -> Result<BookMove>;

    fn move_to_token(&self, mv: BookMove) -> String;

    /// Protocol tokens for a line starting at the current position. The
    /// line is cut at the first move that cannot be played.
    fn line_tokens(&mut self, line: &[BookMove]) -> Vec<String> {
        let mut tokens = Vec::with_capacity(line.len());
        for &mv in line {
            let token = self.move_to_token(mv);
            if self.push_move(mv).is_err() { break; }
            tokens.push(token);
        }
        for _ in 0..tokens.len() { self.pop_move(); }
        tokens
    }

    /// Apply protocol move tokens in order. Stops at the first bad token.
    fn apply_move_sequence(&mut self, tokens: &[&str]) -> Result<()> {
        for token in tokens {
            let mv = self.parse_move(token)?;
            self.push_move(mv)?;
        }
        Ok(())
    }
}
