use log::warn;

use crate::board::{PositionContext, Repetition, Side};
use crate::book::{BookMove, BookRecord, BookStore};

/// Returned when the book has no entry for a position. Outside every score
/// the search can produce, so callers can tell "line ended" from a real value.
pub const BOOK_END: i32 = 32_602;
pub const INFINITE: i32 = 100_000;
/// Score for the mover when the repetition rule awards the game.
pub const REPETITION_SCORE: i32 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub score: i32,
    pub pv: Vec<BookMove>,
}

impl Line {
    pub fn book_end() -> Self { Self { score: BOOK_END, pv: Vec::new() } }

    pub fn is_book_end(&self) -> bool { self.score == BOOK_END }
}

/// Negamax over book continuations only. Scores are from the side to move.
pub struct BookSearcher<'a, P> {
    pub(super) book: &'a BookStore,
    pub(super) pos: &'a mut P,
    draw_eval: i32,
    pub(super) nodes: u64,
}

impl<'a, P: PositionContext> BookSearcher<'a, P> {
    pub fn new(book: &'a BookStore, pos: &'a mut P, draw_eval: i32) -> Self {
        Self { book, pos, draw_eval, nodes: 0 }
    }

    /// Positions visited so far, root included.
    pub fn nodes(&self) -> u64 { self.nodes }

    pub fn search(&mut self, mut alpha: i32, beta: i32, depth: u32) -> Line {
        self.nodes += 1;
        let book = self.book;
        let entries = book.lookup_range(self.pos.current_key());
        if entries.is_empty() {
            return Line::book_end();
        }

        let mut ceiling = INFINITE;
        let mut best_score = -INFINITE;
        let mut best_pv = Vec::new();
        let mut scored = 0;
        for entry in entries {
            let Some(line) = self.score_entry(entry, &mut ceiling, alpha, beta, depth) else { continue };
            scored += 1;
            if line.score > best_score {
                best_score = line.score;
                best_pv = line.pv;
            }
            alpha = alpha.max(line.score);
            if alpha >= beta {
                break;
            }
        }
        // Nothing playable here is the same as no coverage.
        if scored == 0 {
            return Line::book_end();
        }
        Line { score: alpha, pv: best_pv }
    }

    /// Effective score of one book entry, with the line it starts.
    ///
    /// `ceiling` is the running minimum of raw sibling scores; it is lowered
    /// before any repetition override so later siblings still see this raw
    /// score. Returns `None` for an entry whose move cannot be played here.
    pub(super) fn score_entry(
        &mut self,
        entry: &BookRecord,
        ceiling: &mut i32,
        alpha: i32,
        beta: i32,
        depth: u32,
    ) -> Option<Line> {
        *ceiling = (*ceiling).min(entry.score);
        let mut line = Line { score: *ceiling, pv: vec![entry.mv] };

        let status = match self.pos.classify_if_played(entry.mv) {
            Ok(s) => s,
            Err(e) => {
                warn!("skipping book entry at {:#018x}: {}", entry.key, e);
                return None;
            }
        };
        match status {
            Repetition::Draw => line.score = self.draw_score(),
            Repetition::Win => line.score = -REPETITION_SCORE,
            Repetition::Loss => line.score = REPETITION_SCORE,
            Repetition::None if depth > 0 => {
                if let Err(e) = self.pos.push_move(entry.mv) {
                    warn!("skipping book entry at {:#018x}: {}", entry.key, e);
                    return None;
                }
                let child = self.search(-beta, -alpha, depth - 1);
                self.pos.pop_move();
                // A child without book coverage leaves the ceiling value as final.
                if !child.is_book_end() {
                    line.score = -child.score;
                    line.pv.extend(child.pv);
                }
            }
            Repetition::None => {}
        }
        Some(line)
    }

    fn draw_score(&self) -> i32 {
        match self.pos.side_to_move() {
            Side::First => -self.draw_eval,
            Side::Second => self.draw_eval,
        }
    }
}
