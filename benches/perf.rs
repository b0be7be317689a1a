use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::Value;

use hooplog::advanced_stats::{BoxScoreInputs, OpponentInputs, compute_advanced};
use hooplog::box_score::{QuarterStats, QuarterlyCounts};
use hooplog::season::season_summary;
use hooplog::shot_ledger::{ShotEvent, normalize_shots, reduce_shots};
use hooplog::state::TrackedMatch;

fn sample_ledger(len: usize) -> Vec<ShotEvent> {
    (0..len)
        .map(|i| ShotEvent {
            made: i % 2 == 0,
            is_three: i % 3 == 0,
            x: Some((i % 700) as f64),
            y: Some((i % 350) as f64),
        })
        .collect()
}

fn sample_match(id: usize) -> TrackedMatch {
    let mut tracked = TrackedMatch::new(format!("m{id}"), "Court Clash", 1_700_000_000 + id as i64);
    tracked.shots = sample_ledger(40);
    tracked.quarterly = QuarterlyCounts {
        turnovers: QuarterStats { q1: 2, q2: 1, q3: 3, q4: 1 },
        assists: QuarterStats { q1: 3, q2: 2, q3: 2, q4: 4 },
        rebounds: QuarterStats { q1: 5, q2: 4, q3: 6, q4: 4 },
        points: QuarterStats { q1: 16, q2: 14, q3: 18, q4: 13 },
    };
    tracked.box_score = BoxScoreInputs {
        ftm: 5,
        fta: 6,
        orb: 4,
        drb: 10,
        ..BoxScoreInputs::default()
    };
    tracked.opponent = Some(OpponentInputs {
        drb: 8,
        points: 71,
        fga: 60,
        fta: 15,
        tov: 10,
    });
    tracked.recompute_report();
    tracked
}

fn bench_shot_normalize(c: &mut Criterion) {
    let raw: Value = serde_json::from_str(SHOTS_JSON).expect("valid fixture json");
    c.bench_function("shot_normalize", |b| {
        b.iter(|| {
            let shots = normalize_shots(black_box(&raw));
            black_box(shots.len());
        })
    });
}

fn bench_reduce_shots(c: &mut Criterion) {
    let shots = sample_ledger(500);
    c.bench_function("reduce_shots_500", |b| {
        b.iter(|| {
            let totals = reduce_shots(black_box(&shots));
            black_box(totals.attempts);
        })
    });
}

fn bench_compute_advanced(c: &mut Criterion) {
    let shots = reduce_shots(&sample_ledger(40));
    let box_score = BoxScoreInputs {
        ftm: 5,
        fta: 6,
        orb: 4,
        drb: 10,
        ast: 8,
        tov: 4,
        ..BoxScoreInputs::default()
    };
    let opponent = OpponentInputs {
        drb: 8,
        points: 95,
        fga: 88,
        fta: 20,
        tov: 11,
    };
    c.bench_function("compute_advanced", |b| {
        b.iter(|| {
            let report = compute_advanced(
                black_box(&shots),
                black_box(&box_score),
                Some(black_box(&opponent)),
            );
            black_box(report.points);
        })
    });
}

fn bench_full_recompute(c: &mut Criterion) {
    let tracked = sample_match(1);
    c.bench_function("match_recompute", |b| {
        b.iter(|| {
            let (report, issues) = black_box(&tracked).computed_report();
            black_box((report.points, issues.len()));
        })
    });
}

fn bench_season_summary(c: &mut Criterion) {
    let matches: Vec<TrackedMatch> = (0..64).map(sample_match).collect();
    c.bench_function("season_summary_64", |b| {
        b.iter(|| {
            let summary = season_summary(black_box(&matches));
            black_box(summary.total_points);
        })
    });
}

criterion_group!(
    perf,
    bench_shot_normalize,
    bench_reduce_shots,
    bench_compute_advanced,
    bench_full_recompute,
    bench_season_summary
);
criterion_main!(perf);

static SHOTS_JSON: &str = include_str!("../tests/fixtures/heterogeneous_shots.json");
