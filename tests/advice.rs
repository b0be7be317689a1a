use std::fs;
use std::path::PathBuf;

use hooplog::advice::{
    advice_request_for_match, parse_analyses_response, parse_analyze_response, phase_exists,
};
use hooplog::box_score::{QuarterStats, QuarterlyCounts, aggregate};
use hooplog::fake_advice::fake_analysis;
use hooplog::shot_ledger::ShotEvent;
use hooplog::state::TrackedMatch;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn tracked_match() -> TrackedMatch {
    let mut tracked = TrackedMatch::new("m1", "Court Clash", 1_717_171_717);
    for i in 0..24 {
        tracked.shots.push(ShotEvent {
            made: i % 2 == 0,
            is_three: i % 4 == 0,
            x: None,
            y: None,
        });
    }
    tracked.quarterly = QuarterlyCounts {
        turnovers: QuarterStats { q1: 2, q2: 1, q3: 3, q4: 1 },
        assists: QuarterStats { q1: 3, q2: 2, q3: 2, q4: 4 },
        rebounds: QuarterStats { q1: 5, q2: 4, q3: 6, q4: 4 },
        points: QuarterStats { q1: 16, q2: 14, q3: 18, q4: 13 },
    };
    tracked.recompute_report();
    tracked
}

#[test]
fn request_payload_mirrors_aggregator_totals() {
    let tracked = tracked_match();
    let request = advice_request_for_match(&tracked, "playoff");

    let (totals, _) = aggregate(&tracked.quarterly);
    assert_eq!(request.timestamp, tracked.timestamp);
    assert_eq!(request.phase, "playoff");
    assert_eq!(request.shots, tracked.shots.len() as u32);
    assert_eq!(request.turnovers, totals.tov);
    assert_eq!(request.assists, totals.ast);
    assert_eq!(request.rebounds, totals.reb);
    assert_eq!(request.points, totals.pts);
    assert_eq!(request.turnovers, 7);
    assert_eq!(request.points, 61);
}

#[test]
fn analyze_response_fixture_parses() {
    let analysis = parse_analyze_response(&read_fixture("analyze_response.json")).unwrap();
    assert_eq!(analysis.key, "user-42#1717171717");
    assert_eq!(analysis.phase, "playoff");
    assert_eq!(analysis.points, 64);
    assert_eq!(analysis.result.main_advice.title, "Protect the ball");
    assert_eq!(analysis.result.secondary_advices.len(), 2);
    assert_eq!(
        analysis.result.main_advice.tags,
        vec!["turnovers", "ball-security"]
    );
}

#[test]
fn analyses_response_fixture_parses_in_order() {
    let items = parse_analyses_response(&read_fixture("analyses_response.json")).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].phase, "training");
    assert_eq!(items[1].phase, "game");
    assert!(phase_exists(&items, "GAME"));
    assert!(!phase_exists(&items, "playoff"));
}

#[test]
fn malformed_responses_error_cleanly() {
    assert!(parse_analyze_response("{}").is_err());
    assert!(parse_analyze_response("not json").is_err());
    assert!(parse_analyses_response("[1,2,3]").is_err());
}

#[test]
fn offline_analysis_round_trips_through_the_wire_shape() {
    let tracked = tracked_match();
    let request = advice_request_for_match(&tracked, "scrimmage");
    let analysis = fake_analysis(&request);

    // serialize the locally generated record and read it back through the
    // same parser the live path uses
    let wire = serde_json::json!({ "message": "ok", "advice": analysis });
    let parsed = parse_analyze_response(&wire.to_string()).unwrap();
    assert_eq!(parsed.phase, "scrimmage");
    assert_eq!(parsed.turnovers, request.turnovers);
    assert!(!parsed.result.main_advice.text.is_empty());
    assert!(parsed.result.secondary_advices.len() >= 2);
}
