use anyhow::{Context, Result};
use clap::Parser;
use piebook::board::cozy::Position;
use piebook::board::PositionContext;
use piebook::book::BookStore;
use piebook::config::EngineConfig;
use piebook::search::rank_root_moves;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "book-probe", about = "Print book entries and ranked candidates for a position as JSON lines")]
struct Args {
    /// Book file
    #[arg(long)]
    book: PathBuf,

    /// FEN string or 'startpos'
    #[arg(long, default_value = "startpos")]
    fen: String,

    /// Moves to play from the base position, space separated
    #[arg(long, default_value = "")]
    moves: String,

    #[arg(long, default_value_t = 10)]
    multipv: usize,

    #[arg(long, default_value_t = 1)]
    pv_depth: u32,

    #[arg(long, default_value_t = 30)]
    draw_eval: i32,

    #[arg(long, default_value_t = 756)]
    eval_coef: i32,
}

#[derive(Serialize)]
struct EntryOut {
    kind: &'static str,
    key: String,
    mv: String,
    count: u16,
    score: i32,
}

#[derive(Serialize)]
struct CandidateOut {
    kind: &'static str,
    rank: usize,
    score: i32,
    winrate: f64,
    pv: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let book = BookStore::load(&args.book).with_context(|| format!("load book {}", args.book.display()))?;

    let mut pos = if args.fen == "startpos" { Position::startpos() } else { Position::from_fen(&args.fen)? };
    let moves: Vec<&str> = args.moves.split_whitespace().collect();
    pos.apply_move_sequence(&moves)?;

    let key = pos.current_key();
    for e in book.lookup_range(key) {
        let out = EntryOut { kind: "entry", key: format!("{:016x}", e.key), mv: pos.move_to_token(e.mv), count: e.count, score: e.score };
        println!("{}", serde_json::to_string(&out)?);
    }

    let config = EngineConfig {
        book_path: args.book.clone(),
        multipv: args.multipv,
        eval_coef: args.eval_coef,
        draw_eval: args.draw_eval,
        pv_depth: args.pv_depth,
    }
    .normalized();
    let ranking = rank_root_moves(&book, &mut pos, &config);
    if ranking.is_resign() {
        eprintln!("no book moves for key {:016x}", key);
    }
    for (i, c) in ranking.candidates.iter().enumerate() {
        let out = CandidateOut {
            kind: "candidate",
            rank: i + 1,
            score: c.score,
            winrate: c.win_rate(config.eval_coef),
            pv: pos.line_tokens(&c.pv),
        };
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}
