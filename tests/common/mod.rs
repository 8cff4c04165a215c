#![allow(dead_code)]

use piebook::board::{PositionContext, Repetition, Side};
use piebook::book::{BookMove, BookRecord, BookStore};
use piebook::error::{EngineError, Result};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Game tree where the key of a child is `parent * 10 + move`, moves are
/// 1..=9, and the root key is 1. Reads well in test books: key 132 is the
/// position after moves 3 then 2.
#[derive(Clone, Debug, Default)]
pub struct TreePosition {
    path: Vec<u64>,
    repetitions: HashMap<(u64, u16), Repetition>,
    pub max_ply_seen: usize,
}

pub const ROOT: u64 = 1;

impl TreePosition {
    pub fn new() -> Self { Self { path: vec![ROOT], ..Default::default() } }

    pub fn with_repetition(mut self, key: u64, mv: u16, r: Repetition) -> Self {
        self.repetitions.insert((key, mv), r);
        self
    }

    pub fn ply(&self) -> usize { self.path.len() - 1 }
}

impl PositionContext for TreePosition {
    fn current_key(&self) -> u64 { *self.path.last().unwrap() }

    fn push_move(&mut self, mv: BookMove) -> Result<()> {
        if !(1..=9).contains(&mv.0) {
            return Err(EngineError::UnplayableBookMove { code: mv.0 });
        }
        let key = self.current_key() * 10 + mv.0 as u64;
        self.path.push(key);
        self.max_ply_seen = self.max_ply_seen.max(self.ply());
        Ok(())
    }

    fn pop_move(&mut self) {
        assert!(self.path.len() > 1, "pop past base position");
        self.path.pop();
    }

    fn side_to_move(&self) -> Side {
        if self.ply() % 2 == 0 { Side::First } else { Side::Second }
    }

    fn classify_if_played(&mut self, mv: BookMove) -> Result<Repetition> {
        if !(1..=9).contains(&mv.0) {
            return Err(EngineError::UnplayableBookMove { code: mv.0 });
        }
        Ok(*self.repetitions.get(&(self.current_key(), mv.0)).unwrap_or(&Repetition::None))
    }

    fn reset_to_start(&mut self) { self.path = vec![ROOT]; }

    fn set_from_encoded(&mut self, encoded: &str) -> Result<()> {
        let key = encoded.trim().parse().map_err(|_| EngineError::BadPosition(encoded.to_string()))?;
        self.path = vec![key];
        Ok(())
    }

    fn parse_move(&self, token: &str) -> Result<BookMove> {
        token
            .strip_prefix('m')
            .and_then(|d| d.parse::<u16>().ok())
            .filter(|d| (1..=9).contains(d))
            .map(BookMove)
            .ok_or_else(|| EngineError::IllegalMove { token: token.to_string() })
    }

    fn move_to_token(&self, mv: BookMove) -> String { format!("m{}", mv.0) }
}

/// Book from `(key, move, score)` triples; stable-sorted by key so records
/// sharing a key keep the listed order.
pub fn book(entries: &[(u64, u16, i32)]) -> BookStore {
    let mut records: Vec<BookRecord> = entries.iter().map(|&(k, m, s)| BookRecord::new(k, m, s)).collect();
    records.sort_by_key(|r| r.key);
    BookStore::from_records(records)
}

pub fn moves(codes: &[u16]) -> Vec<BookMove> { codes.iter().map(|&c| BookMove(c)).collect() }

pub fn write_book(name: &str, store: &BookStore) -> std::path::PathBuf {
    std::fs::create_dir_all("target/test_books").unwrap();
    let path = std::path::PathBuf::from(format!("target/test_books/{name}.bin"));
    std::fs::write(&path, store.to_bytes()).unwrap();
    path
}

/// Cloneable in-memory sink standing in for stdout.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap().lines().map(str::to_owned).collect()
    }

    pub fn take_lines(&self) -> Vec<String> {
        let lines = self.lines();
        self.0.lock().unwrap().clear();
        lines
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
}
