use hooplog::advanced_stats::BoxScoreInputs;
use hooplog::advice::MatchAnalysis;
use hooplog::box_score::{QuarterStats, QuarterlyCounts};
use hooplog::shot_ledger::ShotEvent;
use hooplog::state::{AppState, Delta, TrackedMatch, apply_delta};

fn seeded_state() -> AppState {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::SetMatches(vec![TrackedMatch::new("m1", "Opening Game", 1_700_000_000)]),
    );
    state
}

#[test]
fn add_shot_recomputes_the_report() {
    let mut state = seeded_state();
    for _ in 0..3 {
        apply_delta(
            &mut state,
            Delta::AddShot {
                id: "m1".to_string(),
                shot: ShotEvent { made: true, is_three: true, x: None, y: None },
            },
        );
    }

    let tracked = state.match_by_id("m1").unwrap();
    assert_eq!(tracked.shots.len(), 3);
    assert_eq!(tracked.report.fga, 3);
    assert_eq!(tracked.report.three_pm, 3);
    // points are derived from makes, never entered
    assert_eq!(tracked.report.points, 9);
    let (expected, _) = tracked.computed_report();
    assert_eq!(tracked.report, expected);
}

#[test]
fn quarterly_points_do_not_touch_the_reconciled_points() {
    let mut state = seeded_state();
    apply_delta(
        &mut state,
        Delta::AddShot {
            id: "m1".to_string(),
            shot: ShotEvent { made: true, is_three: false, x: None, y: None },
        },
    );
    apply_delta(
        &mut state,
        Delta::SetQuarterly {
            id: "m1".to_string(),
            quarterly: QuarterlyCounts {
                points: QuarterStats { q1: 30, q2: 30, q3: 30, q4: 30 },
                ..QuarterlyCounts::default()
            },
        },
    );

    let tracked = state.match_by_id("m1").unwrap();
    // one made two-pointer: the report keeps the identity, whatever the
    // quarter scoreboard says
    assert_eq!(tracked.report.points, 2);
}

#[test]
fn box_score_edit_recomputes_and_flags_violations() {
    let mut state = seeded_state();
    apply_delta(
        &mut state,
        Delta::SetBoxScore {
            id: "m1".to_string(),
            box_score: BoxScoreInputs {
                fgm: 8,
                fga: 5,
                ftm: 2,
                fta: 4,
                ..BoxScoreInputs::default()
            },
        },
    );

    let tracked = state.match_by_id("m1").unwrap();
    assert_eq!(tracked.report.fgm, 8);
    assert!(
        state
            .logs
            .iter()
            .any(|line| line.contains("field goals made exceed attempts"))
    );
}

#[test]
fn negative_quarter_entries_are_logged_not_fatal() {
    let mut state = seeded_state();
    apply_delta(
        &mut state,
        Delta::SetQuarterly {
            id: "m1".to_string(),
            quarterly: QuarterlyCounts {
                turnovers: QuarterStats { q1: -2, q2: 3, q3: 0, q4: 1 },
                ..QuarterlyCounts::default()
            },
        },
    );

    let tracked = state.match_by_id("m1").unwrap();
    let (effective, issues) = tracked.effective_box_score();
    assert_eq!(effective.tov, 4);
    assert_eq!(issues.len(), 1);
    assert!(state.logs.iter().any(|line| line.contains("negative value")));
}

#[test]
fn upsert_replaces_and_remove_clears_history() {
    let mut state = seeded_state();
    let mut replacement = TrackedMatch::new("m1", "Rivalry Match", 1_700_100_000);
    replacement.box_score.fga = 10;
    replacement.box_score.fgm = 4;
    apply_delta(&mut state, Delta::UpsertMatch(replacement));
    assert_eq!(state.matches.len(), 1);
    assert_eq!(state.match_by_id("m1").unwrap().title, "Rivalry Match");

    apply_delta(
        &mut state,
        Delta::PushAnalysis {
            id: "m1".to_string(),
            analysis: MatchAnalysis {
                phase: "game".to_string(),
                ..MatchAnalysis::default()
            },
        },
    );
    assert_eq!(state.analyses.get("m1").map(Vec::len), Some(1));

    apply_delta(&mut state, Delta::RemoveMatch { id: "m1".to_string() });
    assert!(state.matches.is_empty());
    assert!(state.analyses.get("m1").is_none());
}

#[test]
fn duplicate_phase_is_rejected_case_insensitively() {
    let mut state = seeded_state();
    apply_delta(
        &mut state,
        Delta::PushAnalysis {
            id: "m1".to_string(),
            analysis: MatchAnalysis {
                phase: "Playoff".to_string(),
                ..MatchAnalysis::default()
            },
        },
    );
    apply_delta(
        &mut state,
        Delta::PushAnalysis {
            id: "m1".to_string(),
            analysis: MatchAnalysis {
                phase: "playoff".to_string(),
                ..MatchAnalysis::default()
            },
        },
    );

    assert_eq!(state.analyses.get("m1").map(Vec::len), Some(1));
    assert!(state.logs.iter().any(|line| line.contains("already exists")));
}

#[test]
fn unknown_match_deltas_only_log() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::AddShot {
            id: "nope".to_string(),
            shot: ShotEvent::default(),
        },
    );
    assert!(state.matches.is_empty());
    assert!(state.logs.iter().any(|line| line.contains("unknown match")));
}

#[test]
fn log_ring_is_bounded() {
    let mut state = AppState::new();
    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("line 50"));
}
