//! Sorted opening book: fixed-size records keyed by position.
//!
//! The store never re-sorts; lookups rely on the file already being in
//! ascending key order.

pub mod loader;

use std::fmt;

/// Packed 16-bit move code as stored in the book. Its layout belongs to the
/// position adapter that produced the book.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BookMove(pub u16);

impl fmt::Debug for BookMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BookMove({:#06x})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookRecord {
    pub key: u64,
    pub mv: BookMove,
    /// Number of games the move was seen in when the book was built.
    pub count: u16,
    pub score: i32,
}

impl BookRecord {
    pub fn new(key: u64, mv: u16, score: i32) -> Self {
        Self { key, mv: BookMove(mv), count: 1, score }
    }
}

#[derive(Debug, Default, Clone)]
pub struct BookStore {
    records: Vec<BookRecord>,
}

impl BookStore {
    /// Build a store from records already sorted by key.
    pub fn from_records(records: Vec<BookRecord>) -> Self {
        debug_assert!(records.windows(2).all(|w| w[0].key <= w[1].key), "book records not sorted by key");
        Self { records }
    }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn records(&self) -> &[BookRecord] { &self.records }

    /// All records for `key`, in file order. Empty when the key is absent.
    pub fn lookup_range(&self, key: u64) -> &[BookRecord] {
        let lo = self.records.partition_point(|r| r.key < key);
        let hi = lo + self.records[lo..].partition_point(|r| r.key <= key);
        &self.records[lo..hi]
    }

    pub fn lookup_first(&self, key: u64) -> Option<&BookRecord> {
        self.lookup_range(key).first()
    }
}
