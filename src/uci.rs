//! Line protocol front end (USI, with UCI spellings accepted).
//!
//! The position is lent to the search worker for the duration of a `go`
//! and handed back when the pending search is joined. Commands that need
//! the position join first, so at most one search is ever in flight.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, error, info, warn};

use crate::board::PositionContext;
use crate::book::BookStore;
use crate::config::{EngineConfig, OPTIONS};
use crate::error::{EngineError, Result};
use crate::search::rank_root_moves;
use crate::worker::{PendingSearch, SearchWorker};

pub const ENGINE_NAME: &str = "piebook";
pub const ENGINE_AUTHOR: &str = "PieBot Team";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Usi,
    Uci,
}

impl Dialect {
    fn ack(self) -> &'static str {
        match self {
            Dialect::Usi => "usiok",
            Dialect::Uci => "uciok",
        }
    }

    fn resign(self) -> &'static str {
        match self {
            Dialect::Usi => "resign",
            Dialect::Uci => "0000",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Ready,
    Searching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Limits sent with `go`. Parsed for protocol compliance only: the book
/// search is bounded by PVDepth, not by the clock.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GoLimits {
    pub btime: Option<u64>,
    pub wtime: Option<u64>,
    pub binc: Option<u64>,
    pub winc: Option<u64>,
    pub byoyomi: Option<u64>,
    pub movetime: Option<u64>,
    pub nodes: Option<u64>,
    pub ponder: bool,
    pub infinite: bool,
}

impl GoLimits {
    pub fn parse(args: &[&str]) -> Self {
        let mut limits = Self::default();
        let mut it = args.iter();
        while let Some(&tok) = it.next() {
            let slot = match tok {
                "ponder" => { limits.ponder = true; continue; }
                "infinite" => { limits.infinite = true; continue; }
                "btime" => &mut limits.btime,
                "wtime" => &mut limits.wtime,
                "binc" => &mut limits.binc,
                "winc" => &mut limits.winc,
                "byoyomi" => &mut limits.byoyomi,
                "movetime" => &mut limits.movetime,
                "nodes" => &mut limits.nodes,
                _ => continue,
            };
            *slot = it.next().and_then(|v| v.parse().ok());
        }
        limits
    }

    /// Whether the worker reports `bestmove` itself when it finishes.
    pub fn reports_on_completion(&self) -> bool { !self.ponder && !self.infinite }
}

/// What a finished search reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub info: Vec<String>,
    pub bestmove: String,
    pub ponder: Option<String>,
}

impl SearchReport {
    pub fn bestmove_line(&self) -> String {
        match &self.ponder {
            Some(p) => format!("bestmove {} ponder {}", self.bestmove, p),
            None => format!("bestmove {}", self.bestmove),
        }
    }
}

/// Rank the book moves at `pos` and format the protocol output.
pub fn search_report<P: PositionContext>(
    book: &BookStore,
    pos: &mut P,
    config: &EngineConfig,
    resign: &str,
) -> SearchReport {
    let ranking = rank_root_moves(book, pos, config);
    let Some(best) = ranking.best() else {
        return SearchReport { info: Vec::new(), bestmove: resign.to_string(), ponder: None };
    };
    let info = ranking
        .candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let pv = pos.line_tokens(&c.pv).join(" ");
            if config.multipv == 1 {
                format!("info score cp {} pv {}", c.score, pv)
            } else {
                format!("info multipv {} score cp {} pv {}", i + 1, c.score, pv)
            }
        })
        .collect();
    let mut tokens = pos.line_tokens(&best.pv[..best.pv.len().min(2)]).into_iter();
    SearchReport {
        info,
        bestmove: tokens.next().unwrap_or_else(|| resign.to_string()),
        ponder: tokens.next(),
    }
}

fn emit<W: Write>(out: &Arc<Mutex<W>>, lines: &[String]) {
    let mut w = out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    for line in lines {
        if let Err(e) = writeln!(w, "{}", line) {
            error!("write protocol output: {}", e);
            return;
        }
    }
    if let Err(e) = w.flush() {
        error!("flush protocol output: {}", e);
    }
}

struct InFlight<P> {
    handle: PendingSearch<(P, SearchReport)>,
    /// Set by whoever sends `bestmove`, so it goes out exactly once.
    reported: Arc<AtomicBool>,
}

pub struct Engine<P, W> {
    config: EngineConfig,
    book: Arc<BookStore>,
    pos: Option<P>,
    ready: bool,
    dialect: Dialect,
    in_flight: Option<InFlight<P>>,
    out: Arc<Mutex<W>>,
    // Declared last: dropping it joins the worker thread.
    worker: SearchWorker,
}

impl<P, W> Engine<P, W>
where
    P: PositionContext + Send + 'static,
    W: Write + Send + 'static,
{
    pub fn new(pos: P, config: EngineConfig, out: W) -> Result<Self> {
        Ok(Self {
            config,
            book: Arc::new(BookStore::default()),
            pos: Some(pos),
            ready: false,
            dialect: Dialect::Usi,
            in_flight: None,
            out: Arc::new(Mutex::new(out)),
            worker: SearchWorker::spawn()?,
        })
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn book(&self) -> &BookStore { &self.book }

    pub fn dialect(&self) -> Dialect { self.dialect }

    pub fn state(&self) -> EngineState {
        if self.in_flight.is_some() {
            EngineState::Searching
        } else if self.ready {
            EngineState::Ready
        } else {
            EngineState::Idle
        }
    }

    /// The live position, unless it is lent to an outstanding search.
    pub fn position(&self) -> Option<&P> { self.pos.as_ref() }

    /// Process commands until `quit` or end of input. A bad `position` is
    /// reported and skipped; any other error ends the loop.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        for line in input.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!("stdin closed: {}", e);
                    break;
                }
            };
            match self.handle_line(&line) {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e @ (EngineError::IllegalMove { .. } | EngineError::BadPosition(_))) => {
                    error!("{}: {}", line.trim(), e);
                    emit(&self.out, &[format!("info string {}", e)]);
                }
                Err(e) => return Err(e),
            }
        }
        self.join_in_flight()
    }

    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&cmd, args)) = tokens.split_first() else { return Ok(Flow::Continue) };
        debug!("<< {}", line.trim());
        match cmd {
            "usi" => self.cmd_identify(Dialect::Usi),
            "uci" => self.cmd_identify(Dialect::Uci),
            "setoption" => self.cmd_setoption(args)?,
            "isready" => self.cmd_isready()?,
            "usinewgame" | "ucinewgame" => self.join_in_flight()?,
            "position" => self.cmd_position(args)?,
            "go" => self.cmd_go(args)?,
            "stop" | "ponderhit" => self.finish_search()?,
            "quit" => {
                self.join_in_flight()?;
                return Ok(Flow::Quit);
            }
            _ => debug!("ignoring unknown command {:?}", cmd),
        }
        Ok(Flow::Continue)
    }

    fn cmd_identify(&mut self, dialect: Dialect) {
        self.dialect = dialect;
        let mut lines = vec![format!("id name {}", ENGINE_NAME), format!("id author {}", ENGINE_AUTHOR)];
        lines.extend(OPTIONS.iter().map(|o| o.declaration()));
        lines.push(dialect.ack().to_string());
        emit(&self.out, &lines);
    }

    fn cmd_setoption(&mut self, args: &[&str]) -> Result<()> {
        self.join_in_flight()?;
        let name_at = args.iter().position(|&t| t == "name");
        let value_at = args.iter().position(|&t| t == "value");
        if let (Some(ni), Some(vi)) = (name_at, value_at) {
            if ni < vi {
                let name = args[ni + 1..vi].join(" ");
                let value = args[vi + 1..].join(" ");
                if self.config.set_option(&name, &value) {
                    debug!("option {} = {}", name, value);
                }
            }
        }
        Ok(())
    }

    fn cmd_isready(&mut self) -> Result<()> {
        self.join_in_flight()?;
        let book = BookStore::load(&self.config.book_path)?;
        self.book = Arc::new(book);
        self.ready = true;
        emit(&self.out, &["readyok".to_string()]);
        Ok(())
    }

    fn cmd_position(&mut self, args: &[&str]) -> Result<()> {
        self.join_in_flight()?;
        let (base, moves) = match args.iter().position(|&t| t == "moves") {
            Some(i) => (&args[..i], &args[i + 1..]),
            None => (args, &[][..]),
        };
        let pos = self.pos.as_mut().ok_or(EngineError::WorkerGone)?;
        match base.split_first() {
            Some((&"startpos", _)) => pos.reset_to_start(),
            Some((&("sfen" | "fen"), encoded)) => pos.set_from_encoded(&encoded.join(" "))?,
            _ => return Err(EngineError::BadPosition(base.join(" "))),
        }
        pos.apply_move_sequence(moves)
    }

    fn cmd_go(&mut self, args: &[&str]) -> Result<()> {
        self.join_in_flight()?;
        let limits = GoLimits::parse(args);
        debug!("go {:?}", limits);
        let mut pos = self.pos.take().ok_or(EngineError::WorkerGone)?;
        let book = Arc::clone(&self.book);
        let config = self.config.clone();
        let resign = self.dialect.resign();
        let out = Arc::clone(&self.out);
        let reported = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&reported);
        let auto_report = limits.reports_on_completion();

        let handle = self.worker.submit(move || {
            let report = search_report(&book, &mut pos, &config, resign);
            emit(&out, &report.info);
            if auto_report && !flag.swap(true, Ordering::AcqRel) {
                emit(&out, &[report.bestmove_line()]);
            }
            (pos, report)
        })?;
        self.in_flight = Some(InFlight { handle, reported });
        Ok(())
    }

    /// `stop` / `ponderhit`: wait for the search and send its best move
    /// unless the worker already did.
    fn finish_search(&mut self) -> Result<()> {
        let Some(job) = self.in_flight.take() else { return Ok(()) };
        let ours = !job.reported.swap(true, Ordering::AcqRel);
        let (pos, report) = job.handle.wait()?;
        self.pos = Some(pos);
        if ours {
            emit(&self.out, &[report.bestmove_line()]);
        }
        Ok(())
    }

    /// Wait for any outstanding search and take the position back. A report
    /// nobody asked for yet is dropped.
    fn join_in_flight(&mut self) -> Result<()> {
        if let Some(job) = self.in_flight.take() {
            let (pos, report) = job.handle.wait()?;
            if !job.reported.load(Ordering::Acquire) {
                info!("discarding unreported search result {}", report.bestmove_line());
            }
            self.pos = Some(pos);
        }
        Ok(())
    }
}
