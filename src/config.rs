use log::warn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BOOK: &str = "book.bin";
pub const DEFAULT_MULTIPV: usize = 10;
pub const DEFAULT_EVAL_COEF: i32 = 756;
pub const DEFAULT_DRAW_EVAL: i32 = 30;
pub const DEFAULT_PV_DEPTH: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub book_path: PathBuf,
    pub multipv: usize,
    pub eval_coef: i32,
    pub draw_eval: i32,
    pub pv_depth: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            book_path: PathBuf::from(DEFAULT_BOOK),
            multipv: DEFAULT_MULTIPV,
            eval_coef: DEFAULT_EVAL_COEF,
            draw_eval: DEFAULT_DRAW_EVAL,
            pv_depth: DEFAULT_PV_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String { default: &'static str },
    Spin { default: i64, min: i64, max: i64 },
}

#[derive(Debug, Clone, Copy)]
pub struct OptionDecl {
    pub name: &'static str,
    pub kind: OptionKind,
}

impl OptionDecl {
    /// Declaration line as sent during the handshake.
    pub fn declaration(&self) -> String {
        match self.kind {
            OptionKind::String { default } => format!("option name {} type string default {}", self.name, default),
            OptionKind::Spin { default, min, max } => {
                format!("option name {} type spin default {} min {} max {}", self.name, default, min, max)
            }
        }
    }
}

pub const OPTIONS: [OptionDecl; 5] = [
    OptionDecl { name: "BookFile", kind: OptionKind::String { default: DEFAULT_BOOK } },
    OptionDecl { name: "MultiPV", kind: OptionKind::Spin { default: DEFAULT_MULTIPV as i64, min: 1, max: 10 } },
    OptionDecl { name: "EvalCoef", kind: OptionKind::Spin { default: DEFAULT_EVAL_COEF as i64, min: 1, max: 10000 } },
    OptionDecl { name: "DrawEval", kind: OptionKind::Spin { default: DEFAULT_DRAW_EVAL as i64, min: 0, max: 10000 } },
    OptionDecl { name: "PVDepth", kind: OptionKind::Spin { default: DEFAULT_PV_DEPTH as i64, min: 0, max: 1000 } },
];

impl EngineConfig {
    /// Apply a `setoption`. Unknown names are ignored; spin values are
    /// clamped to their declared range. Returns whether a field changed.
    pub fn set_option(&mut self, name: &str, value: &str) -> bool {
        let Some(decl) = OPTIONS.iter().find(|d| d.name.eq_ignore_ascii_case(name)) else {
            return false;
        };
        let spin = match decl.kind {
            OptionKind::String { .. } => {
                self.book_path = PathBuf::from(value);
                return true;
            }
            OptionKind::Spin { min, max, .. } => match value.trim().parse::<i64>() {
                Ok(v) => {
                    if v < min || v > max { warn!("{} value {} out of range {}..={}, clamping", decl.name, v, min, max); }
                    v.clamp(min, max)
                }
                Err(_) => {
                    warn!("ignoring non-numeric value {:?} for {}", value, decl.name);
                    return false;
                }
            },
        };
        match decl.name {
            "MultiPV" => self.multipv = spin as usize,
            "EvalCoef" => self.eval_coef = spin as i32,
            "DrawEval" => self.draw_eval = spin as i32,
            "PVDepth" => self.pv_depth = spin as u32,
            _ => return false,
        }
        true
    }

    /// Clamp every field into its declared range, e.g. after loading a file.
    pub fn normalized(mut self) -> Self {
        self.multipv = self.multipv.clamp(1, 10);
        self.eval_coef = self.eval_coef.clamp(1, 10000);
        self.draw_eval = self.draw_eval.clamp(0, 10000);
        self.pv_depth = self.pv_depth.min(1000);
        self
    }
}
