use rayon::prelude::*;
use serde::Serialize;

use crate::advanced_stats::DerivedMetricsReport;
use crate::state::TrackedMatch;

#[derive(Debug, Clone, Serialize)]
pub struct SeasonRow {
    pub id: String,
    pub title: String,
    pub timestamp: i64,
    pub report: DerivedMetricsReport,
    pub assists: u32,
    pub turnovers: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SeasonSummary {
    pub matches: usize,
    pub total_points: u64,
    pub total_shot_attempts: u64,
    pub total_rebounds: u64,
    pub total_assists: u64,
    pub total_turnovers: u64,
    pub avg_efg_pct: f64,
    pub avg_ts_pct: f64,
    pub avg_net_rating: f64,
    pub rows: Vec<SeasonRow>,
}

/// Season-wide view over every stored match. Reports are recomputed from
/// the current inputs rather than trusted from whatever the caller cached,
/// one match per rayon task.
pub fn season_summary(matches: &[TrackedMatch]) -> SeasonSummary {
    let mut rows: Vec<SeasonRow> = matches
        .par_iter()
        .map(|tracked| {
            let (report, _) = tracked.computed_report();
            let (effective, _) = tracked.effective_box_score();
            SeasonRow {
                id: tracked.id.clone(),
                title: tracked.title.clone(),
                timestamp: tracked.timestamp,
                report,
                assists: effective.ast,
                turnovers: effective.tov,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

    let mut summary = SeasonSummary {
        matches: rows.len(),
        ..SeasonSummary::default()
    };
    for row in &rows {
        summary.total_points += u64::from(row.report.points);
        summary.total_shot_attempts += u64::from(row.report.fga);
        summary.total_rebounds += u64::from(row.report.total_rebounds);
        summary.total_assists += u64::from(row.assists);
        summary.total_turnovers += u64::from(row.turnovers);
    }
    if !rows.is_empty() {
        let n = rows.len() as f64;
        summary.avg_efg_pct = rows.iter().map(|r| r.report.efg_pct).sum::<f64>() / n;
        summary.avg_ts_pct = rows.iter().map(|r| r.report.ts_pct).sum::<f64>() / n;
        summary.avg_net_rating = rows.iter().map(|r| r.report.net_rating).sum::<f64>() / n;
    }

    summary.rows = rows;
    summary
}
