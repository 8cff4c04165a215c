use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("read book file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("book file {path} is {len} bytes, not a multiple of the {record} byte record size")]
    BookSize { path: PathBuf, len: u64, record: usize },

    #[error("illegal or malformed move: {token}")]
    IllegalMove { token: String },

    #[error("bad position: {0}")]
    BadPosition(String),

    #[error("book move {code:#06x} is not playable in this position")]
    UnplayableBookMove { code: u16 },

    #[error("spawn search worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("search worker exited before delivering a result")]
    WorkerGone,
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
