use anyhow::{Context, Result};
use clap::Parser;
use piebook::board::cozy::Position;
use piebook::config::EngineConfig;
use piebook::uci::Engine;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Opening-book engine speaking USI/UCI over stdin/stdout", long_about = None)]
struct Args {
    /// JSON config file, applied before the flags below
    #[arg(long)]
    config: Option<PathBuf>,

    /// Book file (16-byte records sorted by key)
    #[arg(long)]
    book: Option<PathBuf>,

    /// Number of ranked lines to report (1..10)
    #[arg(long)]
    multipv: Option<usize>,

    /// Score-to-winrate scale (1..10000)
    #[arg(long)]
    eval_coef: Option<i32>,

    /// Score of a repetition draw for the second player (0..10000)
    #[arg(long)]
    draw_eval: Option<i32>,

    /// Plies searched below each root move (0..1000)
    #[arg(long)]
    pv_depth: Option<u32>,
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
            serde_json::from_str::<EngineConfig>(&text).with_context(|| format!("parse config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(b) = &args.book { config.book_path = b.clone(); }
    if let Some(v) = args.multipv { config.multipv = v; }
    if let Some(v) = args.eval_coef { config.eval_coef = v; }
    if let Some(v) = args.draw_eval { config.draw_eval = v; }
    if let Some(v) = args.pv_depth { config.pv_depth = v; }
    Ok(config.normalized())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(&args)?;
    log::info!("starting with {:?}", config);

    let mut engine = Engine::new(Position::startpos(), config, io::stdout()).context("start engine")?;
    let stdin = io::stdin();
    engine.run(stdin.lock()).context("protocol loop")?;
    Ok(())
}
