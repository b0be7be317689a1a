use std::path::Path;

use anyhow::{Context, Result};
use chrono::DateTime;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::box_score::aggregate;
use crate::state::TrackedMatch;

pub struct ExportReport {
    pub matches: usize,
    pub shots: usize,
    pub quarter_rows: usize,
    pub errors: Vec<String>,
}

/// Write every match, its derived report, quarter breakdown and shot ledger
/// into one workbook. Input problems become error strings in the summary
/// instead of aborting the export.
pub fn export_matches(path: &Path, matches: &[TrackedMatch]) -> Result<ExportReport> {
    let mut errors = Vec::new();

    let mut match_rows = vec![vec![
        "Match ID".to_string(),
        "Title".to_string(),
        "Date".to_string(),
        "Shots".to_string(),
        "Points".to_string(),
        "Assists".to_string(),
        "Rebounds".to_string(),
        "Turnovers".to_string(),
    ]];

    let mut report_rows = vec![vec![
        "Match ID".to_string(),
        "FGM".to_string(),
        "FGA".to_string(),
        "3PM".to_string(),
        "3PA".to_string(),
        "PTS".to_string(),
        "eFG%".to_string(),
        "TS%".to_string(),
        "Possessions".to_string(),
        "ORtg".to_string(),
        "DRtg".to_string(),
        "Net".to_string(),
        "TOV%".to_string(),
        "AST/TOV".to_string(),
        "ORB%".to_string(),
        "REB".to_string(),
        "STL".to_string(),
        "BLK".to_string(),
        "PF".to_string(),
    ]];

    let mut quarter_rows = vec![vec![
        "Match ID".to_string(),
        "Category".to_string(),
        "Q1".to_string(),
        "Q2".to_string(),
        "Q3".to_string(),
        "Q4".to_string(),
    ]];

    let mut shot_rows = vec![vec![
        "Match ID".to_string(),
        "#".to_string(),
        "Made".to_string(),
        "Three".to_string(),
        "X".to_string(),
        "Y".to_string(),
    ]];

    let mut shots_total = 0usize;
    for tracked in matches {
        let (report, issues) = tracked.computed_report();
        for issue in issues {
            errors.push(format!("{}: {issue}", tracked.id));
        }
        for violation in tracked.box_score.validate() {
            errors.push(format!("{}: {violation}", tracked.id));
        }

        let (totals, _) = aggregate(&tracked.quarterly);
        match_rows.push(vec![
            tracked.id.clone(),
            tracked.title.clone(),
            format_match_date(tracked.timestamp),
            tracked.shots.len().to_string(),
            report.points.to_string(),
            totals.ast.to_string(),
            totals.reb.to_string(),
            totals.tov.to_string(),
        ]);

        report_rows.push(vec![
            tracked.id.clone(),
            report.fgm.to_string(),
            report.fga.to_string(),
            report.three_pm.to_string(),
            report.three_pa.to_string(),
            report.points.to_string(),
            format_pct(report.efg_pct),
            format_pct(report.ts_pct),
            format!("{:.2}", report.possessions),
            format!("{:.1}", report.off_rating),
            format!("{:.1}", report.def_rating),
            format!("{:.1}", report.net_rating),
            format_pct(report.tov_pct),
            format!("{:.2}", report.ast_to_tov),
            format_pct(report.orb_pct),
            report.total_rebounds.to_string(),
            report.steals.to_string(),
            report.blocks.to_string(),
            report.fouls.to_string(),
        ]);

        for (label, stats) in [
            ("turnovers", &tracked.quarterly.turnovers),
            ("assists", &tracked.quarterly.assists),
            ("rebounds", &tracked.quarterly.rebounds),
            ("points", &tracked.quarterly.points),
        ] {
            let values = stats.values();
            quarter_rows.push(vec![
                tracked.id.clone(),
                label.to_string(),
                values[0].to_string(),
                values[1].to_string(),
                values[2].to_string(),
                values[3].to_string(),
            ]);
        }

        for (idx, shot) in tracked.shots.iter().enumerate() {
            shots_total += 1;
            shot_rows.push(vec![
                tracked.id.clone(),
                (idx + 1).to_string(),
                if shot.made { "yes" } else { "no" }.to_string(),
                if shot.is_three { "3PT" } else { "2PT" }.to_string(),
                shot.x.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string()),
                shot.y.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string()),
            ]);
        }
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matches")?;
        write_rows(sheet, &match_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Reports")?;
        write_rows(sheet, &report_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Quarters")?;
        write_rows(sheet, &quarter_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Shots")?;
        write_rows(sheet, &shot_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        matches: matches.len(),
        shots: shots_total,
        quarter_rows: quarter_rows.len() - 1,
        errors,
    })
}

pub fn format_match_date(timestamp_secs: i64) -> String {
    DateTime::from_timestamp(timestamp_secs, 0)
        .map(|dt| dt.format("%m/%d/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn format_pct(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell {row_idx}:{col_idx}"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_dates_from_unix_seconds() {
        assert_eq!(format_match_date(0), "01/01/1970");
        assert_eq!(format_match_date(1_700_000_000), "11/14/2023");
    }

    #[test]
    fn formats_ratios_as_percentages() {
        assert_eq!(format_pct(0.575), "57.5%");
        assert_eq!(format_pct(0.0), "0.0%");
    }
}
