use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::info;

use super::{BookMove, BookRecord, BookStore};
use crate::error::{EngineError, Result};

/// On-disk record size in bytes.
pub const RECORD_SIZE: usize = 16;

// Record layout, little-endian:
//   u64 key
//   u16 move
//   u16 count
//   i32 score
fn decode_record(b: &[u8; RECORD_SIZE]) -> BookRecord {
    let mut k = [0u8; 8];
    k.copy_from_slice(&b[0..8]);
    BookRecord {
        key: u64::from_le_bytes(k),
        mv: BookMove(u16::from_le_bytes([b[8], b[9]])),
        count: u16::from_le_bytes([b[10], b[11]]),
        score: i32::from_le_bytes([b[12], b[13], b[14], b[15]]),
    }
}

pub fn encode_record(r: &BookRecord) -> [u8; RECORD_SIZE] {
    let mut out = [0u8; RECORD_SIZE];
    out[0..8].copy_from_slice(&r.key.to_le_bytes());
    out[8..10].copy_from_slice(&r.mv.0.to_le_bytes());
    out[10..12].copy_from_slice(&r.count.to_le_bytes());
    out[12..16].copy_from_slice(&r.score.to_le_bytes());
    out
}

impl BookStore {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| EngineError::Io { path: path.to_path_buf(), source };
        let f = File::open(path).map_err(io_err)?;
        let len = f.metadata().map_err(io_err)?.len();
        if len % RECORD_SIZE as u64 != 0 {
            return Err(EngineError::BookSize { path: path.to_path_buf(), len, record: RECORD_SIZE });
        }
        let n = (len / RECORD_SIZE as u64) as usize;
        let mut r = BufReader::new(f);
        let mut records = Vec::with_capacity(n);
        let mut buf = [0u8; RECORD_SIZE];
        for _ in 0..n {
            r.read_exact(&mut buf).map_err(io_err)?;
            records.push(decode_record(&buf));
        }
        info!("loaded {} book records from {}", records.len(), path.display());
        Ok(Self { records })
    }

    /// Parse an in-memory book image with the same layout as [`BookStore::load`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % RECORD_SIZE != 0 {
            return Err(EngineError::BookSize { path: "<memory>".into(), len: bytes.len() as u64, record: RECORD_SIZE });
        }
        let records = bytes
            .chunks_exact(RECORD_SIZE)
            .map(|c| {
                let mut b = [0u8; RECORD_SIZE];
                b.copy_from_slice(c);
                decode_record(&b)
            })
            .collect();
        Ok(Self { records })
    }

    /// Serialize back to the on-disk layout. Used by tools and tests that
    /// need a book file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.records.len() * RECORD_SIZE);
        for r in &self.records { out.extend_from_slice(&encode_record(r)); }
        out
    }
}
