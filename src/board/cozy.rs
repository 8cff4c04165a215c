use cozy_chess::{Board as CozyBoard, Color, File, Move, Piece, Rank, Square};

use super::{zobrist, PositionContext, Repetition, Side};
use crate::book::BookMove;
use crate::error::{EngineError, Result};

/// Chess position with an undo stack and key history for repetition checks.
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
    stack: Vec<CozyBoard>,
    keys: Vec<u64>,
}

impl Default for Position {
    fn default() -> Self { Self::startpos() }
}

impl Position {
    pub fn startpos() -> Self { Self::with_board(CozyBoard::default()) }

    pub fn from_fen(fen: &str) -> Result<Self> {
        CozyBoard::from_fen(fen, false)
            .map(Self::with_board)
            .map_err(|e| EngineError::BadPosition(format!("FEN error: {e:?}")))
    }

    fn with_board(board: CozyBoard) -> Self {
        let key = zobrist::compute(&board);
        Self { board, stack: Vec::with_capacity(128), keys: vec![key] }
    }

    pub fn board(&self) -> &CozyBoard { &self.board }

    /// Plies pushed since the base position was set.
    pub fn ply(&self) -> usize { self.stack.len() }

    fn legal_move(&self, from: Square, to: Square, promotion: Option<Piece>) -> Option<Move> {
        let mut found = None;
        self.board.generate_moves(|moves| {
            for m in moves {
                if m.from == from && m.to == to && m.promotion == promotion { found = Some(m); break; }
            }
            found.is_some()
        });
        found
    }

    fn decode(&self, mv: BookMove) -> Result<Move> {
        let code = mv.0;
        let to = Square::index((code & 0x3f) as usize);
        let from = Square::index(((code >> 6) & 0x3f) as usize);
        let promotion = match (code >> 12) & 0x7 {
            0 => None,
            1 => Some(Piece::Knight),
            2 => Some(Piece::Bishop),
            3 => Some(Piece::Rook),
            4 => Some(Piece::Queen),
            _ => return Err(EngineError::UnplayableBookMove { code }),
        };
        self.legal_move(from, to, promotion).ok_or(EngineError::UnplayableBookMove { code })
    }

    fn play(&mut self, m: Move) {
        self.stack.push(self.board.clone());
        self.board.play(m);
        self.keys.push(zobrist::compute(&self.board));
    }

    fn is_castle(&self, m: &Move) -> bool {
        self.board.piece_on(m.from) == Some(Piece::King)
            && self.board.colors(self.board.side_to_move()).has(m.to)
    }
}

/// Polyglot-style packing: to bits 0..5, from bits 6..11, promotion 12..14.
pub fn encode_move(m: Move) -> BookMove {
    let promo: u16 = match m.promotion {
        None => 0,
        Some(Piece::Knight) => 1,
        Some(Piece::Bishop) => 2,
        Some(Piece::Rook) => 3,
        Some(_) => 4,
    };
    BookMove((m.to as u16) | ((m.from as u16) << 6) | (promo << 12))
}

impl PositionContext for Position {
    fn current_key(&self) -> u64 { zobrist::compute(&self.board) }

    fn push_move(&mut self, mv: BookMove) -> Result<()> {
        let m = self.decode(mv)?;
        self.play(m);
        Ok(())
    }

    fn pop_move(&mut self) {
        if let Some(prev) = self.stack.pop() {
            self.board = prev;
            self.keys.pop();
        }
    }

    fn side_to_move(&self) -> Side {
        if self.board.side_to_move() == Color::White { Side::First } else { Side::Second }
    }

    fn classify_if_played(&mut self, mv: BookMove) -> Result<Repetition> {
        let m = self.decode(mv)?;
        let mut child = self.board.clone();
        child.play(m);
        let key = zobrist::compute(&child);
        // Positions before the last irreversible move cannot recur.
        let window = child.halfmove_clock() as usize;
        let seen = self.keys.iter().rev().take(window).filter(|&&k| k == key).count();
        Ok(if seen >= 2 { Repetition::Draw } else { Repetition::None })
    }

    fn reset_to_start(&mut self) { *self = Self::startpos(); }

    fn set_from_encoded(&mut self, encoded: &str) -> Result<()> {
        *self = Self::from_fen(encoded)?;
        Ok(())
    }

    fn parse_move(&self, token: &str) -> Result<BookMove> {
        let bad = || EngineError::IllegalMove { token: token.to_string() };
        let mut m: Move = token.parse().map_err(|_| bad())?;
        // Standard castling notation moves the king two files; internally
        // the king captures its own rook.
        if self.board.piece_on(m.from) == Some(Piece::King) && m.from.rank() == m.to.rank() {
            let df = m.to.file() as i32 - m.from.file() as i32;
            if df.abs() == 2 {
                let rook_file = if df > 0 { File::H } else { File::A };
                m.to = Square::new(rook_file, m.from.rank());
            }
        }
        self.legal_move(m.from, m.to, m.promotion).map(encode_move).ok_or_else(bad)
    }

    fn move_to_token(&self, mv: BookMove) -> String {
        match self.decode(mv) {
            Ok(m) if self.is_castle(&m) => {
                let file = if (m.to.file() as i32) > (m.from.file() as i32) { File::G } else { File::C };
                let rank: Rank = m.from.rank();
                format!("{}{}", m.from, Square::new(file, rank))
            }
            Ok(m) => format!("{}", m),
            Err(_) => format!("{:04x}", mv.0),
        }
    }
}
