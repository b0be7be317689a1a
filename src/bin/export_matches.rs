use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use hooplog::match_store;
use hooplog::report_export::export_matches;

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let db_path = parse_path_arg(&args, "--db")
        .or_else(match_store::default_db_path)
        .context("unable to resolve sqlite path")?;
    let out_path =
        parse_path_arg(&args, "--out").unwrap_or_else(|| PathBuf::from("hooplog_export.xlsx"));

    let conn = match_store::open_db(&db_path)?;
    let matches = match_store::list_matches(&conn)?;
    if matches.is_empty() {
        return Err(anyhow!("no matches in {}", db_path.display()));
    }

    let report = export_matches(&out_path, &matches)?;

    println!("Export complete");
    println!("DB: {}", db_path.display());
    println!("Out: {}", out_path.display());
    println!(
        "Matches: {}  Shots: {}  Quarter rows: {}",
        report.matches, report.shots, report.quarter_rows
    );
    if !report.errors.is_empty() {
        println!("  input problems: {}", report.errors.len());
        for err in report.errors.iter().take(6) {
            println!("   - {err}");
        }
    }

    Ok(())
}

fn parse_path_arg(args: &[String], flag: &str) -> Option<PathBuf> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
        {
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next.trim()));
            }
        }
    }
    None
}
