pub mod negamax;
pub mod root;

pub use negamax::{BookSearcher, Line, BOOK_END, INFINITE, REPETITION_SCORE};
pub use root::{rank_root_moves, CandidateMove, RootRanking};
