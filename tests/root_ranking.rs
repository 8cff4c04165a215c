mod common;

use common::{book, moves, TreePosition, ROOT};
use piebook::book::BookMove;
use piebook::config::EngineConfig;
use piebook::search::rank_root_moves;
use piebook::uci::search_report;
use pretty_assertions::assert_eq;

fn config(multipv: usize, pv_depth: u32) -> EngineConfig {
    EngineConfig { multipv, pv_depth, ..EngineConfig::default() }
}

/// Root moves 1..=4 whose replies make their effective scores 10, 30, 30, -5.
fn tied_book() -> piebook::book::BookStore {
    book(&[
        (ROOT, 1, 1000),
        (ROOT, 2, 1000),
        (ROOT, 3, 1000),
        (ROOT, 4, 1000),
        (11, 1, -10),
        (12, 1, -30),
        (13, 1, -30),
        (14, 1, 5),
    ])
}

#[test]
fn ties_keep_book_order_and_list_is_truncated() {
    let store = tied_book();
    let mut pos = TreePosition::new();
    let ranking = rank_root_moves(&store, &mut pos, &config(2, 1));
    let got: Vec<(BookMove, i32)> = ranking.candidates.iter().map(|c| (c.mv, c.score)).collect();
    assert_eq!(got, vec![(BookMove(2), 30), (BookMove(3), 30)]);
    assert_eq!(ranking.candidates[0].pv, moves(&[2, 1]));
    assert_eq!(ranking.ponder_move(), Some(BookMove(1)));
}

#[test]
fn all_root_moves_are_ranked_without_pruning() {
    let store = tied_book();
    let mut pos = TreePosition::new();
    let ranking = rank_root_moves(&store, &mut pos, &config(10, 1));
    let scores: Vec<i32> = ranking.candidates.iter().map(|c| c.score).collect();
    assert_eq!(scores, vec![30, 30, 10, -5]);
    // root plus one depth-0 child per root move
    assert_eq!(ranking.nodes, 5);
}

#[test]
fn no_book_entry_means_resign() {
    let store = book(&[(99, 1, 10)]);
    let mut pos = TreePosition::new();
    let ranking = rank_root_moves(&store, &mut pos, &config(3, 2));
    assert!(ranking.is_resign());
    assert!(ranking.best().is_none());
    assert!(ranking.ponder_move().is_none());

    let report = search_report(&store, &mut pos, &config(3, 2), "resign");
    assert!(report.info.is_empty());
    assert_eq!(report.bestmove_line(), "bestmove resign");
}

#[test]
fn pv_depth_zero_reports_single_move_lines() {
    let store = tied_book();
    let mut pos = TreePosition::new();
    let ranking = rank_root_moves(&store, &mut pos, &config(4, 0));
    assert!(ranking.candidates.iter().all(|c| c.pv.len() == 1));
    // Every raw score is 1000, so the ceiling never drops and book order stands.
    let order: Vec<u16> = ranking.candidates.iter().map(|c| c.mv.0).collect();
    assert_eq!(order, vec![1, 2, 3, 4]);
}

#[test]
fn report_lines_for_multipv() {
    let store = tied_book();
    let mut pos = TreePosition::new();
    let report = search_report(&store, &mut pos, &config(2, 1), "resign");
    assert_eq!(
        report.info,
        vec![
            "info multipv 1 score cp 30 pv m2 m1".to_string(),
            "info multipv 2 score cp 30 pv m3 m1".to_string(),
        ]
    );
    assert_eq!(report.bestmove_line(), "bestmove m2 ponder m1");
    assert_eq!(pos.ply(), 0);
}

#[test]
fn report_line_for_single_pv() {
    let store = tied_book();
    let mut pos = TreePosition::new();
    let report = search_report(&store, &mut pos, &config(1, 0), "resign");
    assert_eq!(report.info, vec!["info score cp 1000 pv m1".to_string()]);
    assert_eq!(report.bestmove_line(), "bestmove m1");
}

#[test]
fn win_rate_is_logistic_in_score() {
    let store = tied_book();
    let mut pos = TreePosition::new();
    let ranking = rank_root_moves(&store, &mut pos, &config(10, 1));
    let best = &ranking.candidates[0];
    let worst = ranking.candidates.last().unwrap();
    assert!(best.win_rate(756) > 0.5 && best.win_rate(756) < 1.0);
    assert!(worst.win_rate(756) < 0.5);
    let even = piebook::search::CandidateMove { mv: BookMove(1), score: 0, pv: vec![] };
    assert!((even.win_rate(756) - 0.5).abs() < 1e-12);
}
