use log::{debug, info};

use super::negamax::{BookSearcher, INFINITE};
use crate::board::PositionContext;
use crate::book::{BookMove, BookStore};
use crate::config::EngineConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMove {
    pub mv: BookMove,
    pub score: i32,
    /// Line starting with `mv`.
    pub pv: Vec<BookMove>,
}

impl CandidateMove {
    /// Logistic win-rate estimate for the side to move.
    pub fn win_rate(&self, eval_coef: i32) -> f64 {
        1.0 / (1.0 + (-(self.score as f64) / eval_coef.max(1) as f64).exp())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RootRanking {
    /// Best first, at most MultiPV entries. Empty means resign.
    pub candidates: Vec<CandidateMove>,
    pub nodes: u64,
}

impl RootRanking {
    pub fn is_resign(&self) -> bool { self.candidates.is_empty() }

    pub fn best(&self) -> Option<&CandidateMove> { self.candidates.first() }

    /// Expected reply in the best line.
    pub fn ponder_move(&self) -> Option<BookMove> { self.best().and_then(|c| c.pv.get(1).copied()) }
}

impl<P: PositionContext> BookSearcher<'_, P> {
    /// Score every book move at the current position with a full window.
    /// Sorted best first; ties keep book order.
    pub fn rank_root(&mut self, depth: u32) -> Vec<CandidateMove> {
        self.nodes += 1;
        let book = self.book;
        let entries = book.lookup_range(self.pos.current_key());
        let mut ceiling = INFINITE;
        let mut candidates = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(line) = self.score_entry(entry, &mut ceiling, -INFINITE, INFINITE, depth) {
                candidates.push(CandidateMove { mv: entry.mv, score: line.score, pv: line.pv });
            }
        }
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates
    }
}

pub fn rank_root_moves<P: PositionContext>(book: &BookStore, pos: &mut P, config: &EngineConfig) -> RootRanking {
    let mut searcher = BookSearcher::new(book, pos, config.draw_eval);
    let mut candidates = searcher.rank_root(config.pv_depth);
    let nodes = searcher.nodes();
    candidates.truncate(config.multipv.max(1));
    for (i, c) in candidates.iter().enumerate() {
        debug!("rank {} move {:?} score {} winrate {:.3} pv len {}", i + 1, c.mv, c.score, c.win_rate(config.eval_coef), c.pv.len());
    }
    info!("book search: {} candidates, {} nodes, pv depth {}", candidates.len(), nodes, config.pv_depth);
    RootRanking { candidates, nodes }
}
