use rand::Rng;
use serde_json::{Value, json};

use crate::advanced_stats::{BoxScoreInputs, OpponentInputs};
use crate::box_score::QuarterStats;
use crate::shot_ledger::normalize_shots;
use crate::state::TrackedMatch;

/// Build a demo match so the tool has something to show against an empty
/// store. The raw shot records deliberately mix every upstream shape the
/// normalizer understands, because that is what real feeds look like.
pub fn demo_match(id: &str, title: &str, timestamp: i64) -> TrackedMatch {
    let mut rng = rand::thread_rng();

    let mut raw_shots: Vec<Value> = Vec::new();
    let attempts = rng.gen_range(28..44);
    for _ in 0..attempts {
        let made = rng.gen_bool(0.47);
        let is_three = rng.gen_bool(0.32);
        let x = rng.gen_range(0.0..700.0_f64);
        let y = rng.gen_range(0.0..350.0_f64);
        raw_shots.push(match rng.gen_range(0..4) {
            0 => json!({ "x": x, "y": y, "made": made, "isThree": is_three }),
            1 if is_three => json!({ "x": x, "y": y, "isMade": made, "points": 3 }),
            1 => json!({ "x": x, "y": y, "isMade": made, "points": 2 }),
            2 => json!({
                "x": x,
                "y": y,
                "success": made,
                "type": if is_three { "3pt_jumper" } else { "midrange" }
            }),
            _ => json!({ "x": x, "y": y, "made": made, "is_three": is_three }),
        });
    }

    let mut tracked = TrackedMatch::new(id, title, timestamp);
    tracked.shots = normalize_shots(&Value::Array(raw_shots));

    tracked.quarterly.turnovers = random_quarters(&mut rng, 0..5);
    tracked.quarterly.assists = random_quarters(&mut rng, 0..6);
    tracked.quarterly.rebounds = random_quarters(&mut rng, 2..8);
    tracked.quarterly.points = random_quarters(&mut rng, 10..26);

    let ftm = rng.gen_range(2..10);
    tracked.box_score = BoxScoreInputs {
        ftm,
        fta: ftm + rng.gen_range(0..4),
        orb: rng.gen_range(2..8),
        drb: rng.gen_range(8..20),
        stl: rng.gen_range(0..7),
        blk: rng.gen_range(0..5),
        pf: rng.gen_range(5..16),
        ..BoxScoreInputs::default()
    };

    tracked.opponent = Some(OpponentInputs {
        drb: rng.gen_range(8..20),
        points: rng.gen_range(55..95),
        fga: rng.gen_range(50..80),
        fta: rng.gen_range(10..25),
        tov: rng.gen_range(6..18),
    });

    tracked.recompute_report();
    tracked
}

fn random_quarters(rng: &mut impl Rng, range: std::ops::Range<i64>) -> QuarterStats {
    QuarterStats {
        q1: rng.gen_range(range.clone()),
        q2: rng.gen_range(range.clone()),
        q3: rng.gen_range(range.clone()),
        q4: rng.gen_range(range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shot_ledger::reduce_shots;

    #[test]
    fn demo_match_is_internally_consistent() {
        let tracked = demo_match("demo-1", "Opening Game", 1_700_000_000);
        let totals = reduce_shots(&tracked.shots);
        assert!(totals.attempts >= 28);
        assert!(totals.three_attempts <= totals.attempts);
        assert!(totals.makes <= totals.attempts);
        assert!(tracked.box_score.ftm <= tracked.box_score.fta);
        assert!(tracked.box_score.validate().is_empty());
        // the ledger is non-empty, so its counts drive the report
        assert_eq!(tracked.report.fga, totals.attempts);
        let (expected, _) = tracked.computed_report();
        assert_eq!(tracked.report, expected);
    }
}
