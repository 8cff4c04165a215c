// Book-driven engine: ranks opening-book continuations with a book-only negamax
pub mod board;
pub mod book;
pub mod config;
pub mod error;
pub mod search;
pub mod uci;
pub mod worker;

pub use error::{EngineError, Result};
