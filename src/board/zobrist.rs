//! Book key for chess positions: Zobrist hashing over a splitmix64 table.

use cozy_chess::{Board, Color, Piece};
use std::sync::OnceLock;

const PIECES: [Piece; 6] = [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King];

fn piece_index(color: Color, piece: Piece) -> usize {
    let c = if color == Color::White { 0 } else { 1 };
    c * 6 + piece as usize
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

struct Keys {
    pieces: [u64; 12 * 64],
    side: u64,
    // white short, white long, black short, black long
    castle: [u64; 4],
    en_passant: [u64; 8],
}

static KEYS: OnceLock<Keys> = OnceLock::new();

fn keys() -> &'static Keys {
    KEYS.get_or_init(|| {
        let mut seed = 0xF00D_F00D_DEAD_BEEF;
        let mut next = || {
            seed = splitmix64(seed);
            seed
        };
        let mut pieces = [0u64; 12 * 64];
        for v in &mut pieces { *v = next(); }
        let side = next();
        let castle = [next(), next(), next(), next()];
        let mut en_passant = [0u64; 8];
        for v in &mut en_passant { *v = next(); }
        Keys { pieces, side, castle, en_passant }
    })
}

pub fn compute(board: &Board) -> u64 {
    let k = keys();
    let mut key = 0u64;
    for color in [Color::White, Color::Black] {
        for piece in PIECES {
            for sq in board.colors(color) & board.pieces(piece) {
                key ^= k.pieces[piece_index(color, piece) * 64 + sq as usize];
            }
        }
        let rights = board.castle_rights(color);
        let base = if color == Color::White { 0 } else { 2 };
        if rights.short.is_some() { key ^= k.castle[base]; }
        if rights.long.is_some() { key ^= k.castle[base + 1]; }
    }
    if let Some(file) = board.en_passant() { key ^= k.en_passant[file as usize]; }
    if board.side_to_move() == Color::Black { key ^= k.side; }
    key
}
