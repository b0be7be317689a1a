use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;

use hooplog::advice::{
    advice_base_url, advice_request_for_match, fetch_analyses, phase_exists, post_analyze,
};
use hooplog::box_score::{StatCategory, parse_quarter_stats};
use hooplog::demo::demo_match;
use hooplog::fake_advice::fake_analysis;
use hooplog::match_store;
use hooplog::persist;
use hooplog::report_export::{export_matches, format_match_date};
use hooplog::season::season_summary;
use hooplog::shot_ledger::ShotEvent;
use hooplog::state::{AppState, Delta, TrackedMatch, apply_delta, next_match_title};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        print_usage();
        return Ok(());
    };
    let rest = &args[1..];

    match command {
        "list" => cmd_list(rest),
        "new" => cmd_new(rest),
        "show" => cmd_show(rest),
        "shot" => cmd_shot(rest),
        "quarters" => cmd_quarters(rest),
        "box" => cmd_box(rest),
        "opponent" => cmd_opponent(rest),
        "report" => cmd_report(rest),
        "season" => cmd_season(rest),
        "advice" => cmd_advice(rest),
        "demo" => cmd_demo(rest),
        "export" => cmd_export(rest),
        "delete" => cmd_delete(rest),
        other => {
            print_usage();
            Err(anyhow!("unknown command {other}"))
        }
    }
}

fn print_usage() {
    println!("hooplog - basketball match tracking in the terminal");
    println!();
    println!("Usage: hooplog <command> [args]");
    println!("  list                          list tracked matches");
    println!("  new [title]                   create a match");
    println!("  show <id>                     show one match");
    println!("  shot <id> [--made] [--three] [--x N] [--y N]");
    println!("  quarters <id> <category> <q1,q2,q3,q4>");
    println!("  box <id> [--fgm N] [--fga N] [--three-pm N] [--three-pa N]");
    println!("           [--ftm N] [--fta N] [--orb N] [--drb N] [--ast N]");
    println!("           [--tov N] [--stl N] [--blk N] [--pf N]");
    println!("  opponent <id> [--drb N] [--points N] [--fga N] [--fta N] [--tov N]");
    println!("  report <id>                   print the derived report");
    println!("  season                        season totals across matches");
    println!("  advice <id> --phase <name>    request post-game advice");
    println!("  demo                          seed a demo match");
    println!("  export [--out FILE]           write an xlsx workbook");
    println!("  delete <id>                   remove a match");
    println!();
    println!("Common flags: --db PATH (or HOOPLOG_DB) selects the archive.");
}

fn cmd_list(args: &[String]) -> Result<()> {
    let state = load_state(args)?;
    if state.matches.is_empty() {
        println!("No matches tracked yet. Try `hooplog demo` or `hooplog new`.");
        return Ok(());
    }
    for tracked in &state.matches {
        println!(
            "{}  {}  {}  shots={} pts={}",
            tracked.id,
            format_match_date(tracked.timestamp),
            tracked.title,
            tracked.shots.len(),
            tracked.report.points
        );
    }
    Ok(())
}

fn cmd_new(args: &[String]) -> Result<()> {
    let conn = open_store(args)?;
    let existing = match_store::list_matches(&conn)?;
    let title = positionals(args)
        .into_iter()
        .next()
        .unwrap_or_else(|| next_match_title(existing.len()).to_string());

    let timestamp = Utc::now().timestamp();
    let tracked = TrackedMatch::new(format!("m{timestamp}"), title, timestamp);
    match_store::upsert_match(&conn, &tracked)?;
    save_session(&conn);
    println!("Created match {}: {}", tracked.id, tracked.title);
    Ok(())
}

fn cmd_show(args: &[String]) -> Result<()> {
    let state = load_state(args)?;
    let tracked = required_match(&state, args)?;
    println!("{}  {}", tracked.id, tracked.title);
    println!("Date: {}", format_match_date(tracked.timestamp));
    println!("Shots recorded: {}", tracked.shots.len());
    for (label, stats) in [
        ("turnovers", &tracked.quarterly.turnovers),
        ("assists", &tracked.quarterly.assists),
        ("rebounds", &tracked.quarterly.rebounds),
        ("points", &tracked.quarterly.points),
    ] {
        let v = stats.values();
        println!("  {label:<9} q1={} q2={} q3={} q4={}", v[0], v[1], v[2], v[3]);
    }
    let b = &tracked.box_score;
    println!(
        "Box: FG {}/{}  3P {}/{}  FT {}/{}  ORB {} DRB {}  AST {} TOV {}  STL {} BLK {} PF {}",
        b.fgm, b.fga, b.three_pm, b.three_pa, b.ftm, b.fta, b.orb, b.drb, b.ast, b.tov, b.stl,
        b.blk, b.pf
    );
    if let Some(opp) = &tracked.opponent {
        println!(
            "Opponent: PTS {}  DRB {}  FGA {}  FTA {}  TOV {}",
            opp.points, opp.drb, opp.fga, opp.fta, opp.tov
        );
    }
    Ok(())
}

fn cmd_shot(args: &[String]) -> Result<()> {
    let conn = open_store(args)?;
    let mut state = state_from_store(&conn)?;
    let id = required_id(args)?;

    let shot = ShotEvent {
        made: has_flag(args, "--made"),
        is_three: has_flag(args, "--three"),
        x: flag_value(args, "--x").and_then(|v| v.parse().ok()),
        y: flag_value(args, "--y").and_then(|v| v.parse().ok()),
    };
    apply_delta(&mut state, Delta::AddShot { id: id.clone(), shot });
    finish_mutation(&conn, &mut state, &id)?;
    let tracked = state
        .match_by_id(&id)
        .ok_or_else(|| anyhow!("unknown match {id}"))?;
    println!(
        "Recorded {} {}; ledger now {} shots, {} pts",
        if shot.is_three { "3PT" } else { "2PT" },
        if shot.made { "make" } else { "miss" },
        tracked.shots.len(),
        tracked.report.points
    );
    Ok(())
}

fn cmd_quarters(args: &[String]) -> Result<()> {
    let conn = open_store(args)?;
    let mut state = state_from_store(&conn)?;
    let positional = positionals(args);
    let id = positional
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("expected a match id"))?;
    let category = match positional.get(1).map(String::as_str) {
        Some("turnovers") => StatCategory::Turnovers,
        Some("assists") => StatCategory::Assists,
        Some("rebounds") => StatCategory::Rebounds,
        Some("points") => StatCategory::Points,
        other => {
            return Err(anyhow!(
                "expected category turnovers|assists|rebounds|points, got {other:?}"
            ));
        }
    };
    let values: Vec<String> = positional
        .get(2)
        .map(|raw| raw.split(',').map(|v| v.trim().to_string()).collect())
        .unwrap_or_default();
    if values.len() != 4 {
        return Err(anyhow!("expected four comma-separated quarter values"));
    }

    // Route through the tolerant parser so typos degrade instead of failing.
    let raw = json!({
        "q1": values[0], "q2": values[1], "q3": values[2], "q4": values[3],
    });
    let (stats, issues) = parse_quarter_stats(category, &raw);
    for issue in &issues {
        println!("[WARN] {issue}");
    }

    let mut quarterly = state
        .match_by_id(&id)
        .map(|m| m.quarterly.clone())
        .ok_or_else(|| anyhow!("unknown match {id}"))?;
    match category {
        StatCategory::Turnovers => quarterly.turnovers = stats,
        StatCategory::Assists => quarterly.assists = stats,
        StatCategory::Rebounds => quarterly.rebounds = stats,
        StatCategory::Points => quarterly.points = stats,
    }
    apply_delta(&mut state, Delta::SetQuarterly { id: id.clone(), quarterly });
    finish_mutation(&conn, &mut state, &id)?;
    println!("Updated {} for {}", category.label(), id);
    Ok(())
}

fn cmd_box(args: &[String]) -> Result<()> {
    let conn = open_store(args)?;
    let mut state = state_from_store(&conn)?;
    let id = required_id(args)?;
    let mut box_score = state
        .match_by_id(&id)
        .map(|m| m.box_score)
        .ok_or_else(|| anyhow!("unknown match {id}"))?;

    apply_u32_flag(args, "--fgm", &mut box_score.fgm)?;
    apply_u32_flag(args, "--fga", &mut box_score.fga)?;
    apply_u32_flag(args, "--three-pm", &mut box_score.three_pm)?;
    apply_u32_flag(args, "--three-pa", &mut box_score.three_pa)?;
    apply_u32_flag(args, "--ftm", &mut box_score.ftm)?;
    apply_u32_flag(args, "--fta", &mut box_score.fta)?;
    apply_u32_flag(args, "--orb", &mut box_score.orb)?;
    apply_u32_flag(args, "--drb", &mut box_score.drb)?;
    apply_u32_flag(args, "--ast", &mut box_score.ast)?;
    apply_u32_flag(args, "--tov", &mut box_score.tov)?;
    apply_u32_flag(args, "--stl", &mut box_score.stl)?;
    apply_u32_flag(args, "--blk", &mut box_score.blk)?;
    apply_u32_flag(args, "--pf", &mut box_score.pf)?;

    for violation in box_score.validate() {
        println!("[WARN] {violation}");
    }
    apply_delta(&mut state, Delta::SetBoxScore { id: id.clone(), box_score });
    finish_mutation(&conn, &mut state, &id)?;
    println!("Updated box score for {id}");
    Ok(())
}

fn cmd_opponent(args: &[String]) -> Result<()> {
    let conn = open_store(args)?;
    let mut state = state_from_store(&conn)?;
    let id = required_id(args)?;
    let mut opponent = state
        .match_by_id(&id)
        .ok_or_else(|| anyhow!("unknown match {id}"))?
        .opponent
        .unwrap_or_default();

    if let Some(v) = parse_u32_flag(args, "--drb")? {
        opponent.drb = v;
    }
    if let Some(v) = parse_u32_flag(args, "--points")? {
        opponent.points = v;
    }
    if let Some(v) = parse_u32_flag(args, "--fga")? {
        opponent.fga = v;
    }
    if let Some(v) = parse_u32_flag(args, "--fta")? {
        opponent.fta = v;
    }
    if let Some(v) = parse_u32_flag(args, "--tov")? {
        opponent.tov = v;
    }

    apply_delta(
        &mut state,
        Delta::SetOpponent { id: id.clone(), opponent: Some(opponent) },
    );
    finish_mutation(&conn, &mut state, &id)?;
    println!("Updated opponent inputs for {id}");
    Ok(())
}

fn cmd_report(args: &[String]) -> Result<()> {
    let state = load_state(args)?;
    let tracked = required_match(&state, args)?;
    let (report, issues) = tracked.computed_report();
    for issue in issues {
        println!("[WARN] {issue}");
    }

    println!("{}  {}", tracked.title, format_match_date(tracked.timestamp));
    println!("  FG {}/{}  3P {}/{}  PTS {}", report.fgm, report.fga, report.three_pm, report.three_pa, report.points);
    println!("  eFG% {:.1}  TS% {:.1}", report.efg_pct * 100.0, report.ts_pct * 100.0);
    println!("  Possessions {:.2}", report.possessions);
    println!(
        "  ORtg {:.1}  DRtg {:.1}  Net {:+.1}",
        report.off_rating, report.def_rating, report.net_rating
    );
    println!(
        "  TOV% {:.1}  AST/TOV {:.2}  ORB% {:.1}",
        report.tov_pct * 100.0,
        report.ast_to_tov,
        report.orb_pct * 100.0
    );
    println!(
        "  REB {}  STL {}  BLK {}  PF {}",
        report.total_rebounds, report.steals, report.blocks, report.fouls
    );
    Ok(())
}

fn cmd_season(args: &[String]) -> Result<()> {
    let state = load_state(args)?;
    let summary = season_summary(&state.matches);
    println!("Season: {} matches", summary.matches);
    println!(
        "  PTS {}  FGA {}  REB {}  AST {}  TOV {}",
        summary.total_points,
        summary.total_shot_attempts,
        summary.total_rebounds,
        summary.total_assists,
        summary.total_turnovers
    );
    println!(
        "  avg eFG% {:.1}  avg TS% {:.1}  avg Net {:+.1}",
        summary.avg_efg_pct * 100.0,
        summary.avg_ts_pct * 100.0,
        summary.avg_net_rating
    );
    for row in &summary.rows {
        println!(
            "  {}  {}  {:<18} eFG% {:.1}  Net {:+.1}",
            row.id,
            format_match_date(row.timestamp),
            row.title,
            row.report.efg_pct * 100.0,
            row.report.net_rating
        );
    }
    Ok(())
}

fn cmd_advice(args: &[String]) -> Result<()> {
    let conn = open_store(args)?;
    let mut state = state_from_store(&conn)?;
    let tracked = required_match(&state, args)?;
    let id = tracked.id.clone();
    let phase = flag_value(args, "--phase")
        .ok_or_else(|| anyhow!("advice requires --phase <name>"))?;

    let history = match_store::list_analyses(&conn, &id)?;
    if phase_exists(&history, &phase) {
        return Err(anyhow!("phase '{phase}' already exists for match {id}"));
    }

    let request = advice_request_for_match(tracked, &phase);
    let timestamp = tracked.timestamp;
    let base_url = advice_base_url();
    let analysis = match &base_url {
        Some(base_url) => {
            println!("Requesting advice from {base_url} ...");
            post_analyze(base_url, &request)?
        }
        None => {
            println!("No ADVICE_API_URL configured; generating offline advice.");
            fake_analysis(&request)
        }
    };

    match_store::insert_analysis(&conn, &id, &analysis)?;
    apply_delta(
        &mut state,
        Delta::PushAnalysis { id: id.clone(), analysis: analysis.clone() },
    );

    // Refresh the stored history from the service so later runs see any
    // server-side additions, as the live flow did after each generation.
    if let Some(base_url) = &base_url {
        match fetch_analyses(base_url, timestamp) {
            Ok(items) => {
                for item in &items {
                    match_store::insert_analysis(&conn, &id, item)?;
                }
                apply_delta(&mut state, Delta::SetAnalyses { id: id.clone(), items });
            }
            Err(err) => println!("[WARN] could not refresh analyses: {err:#}"),
        }
    }
    persist::save_from_state(&state);

    println!();
    println!("Main advice: {}", analysis.result.main_advice.title);
    println!("  {}", analysis.result.main_advice.text);
    println!("  {}", analysis.result.main_advice.comment);
    for advice in &analysis.result.secondary_advices {
        println!("Also: {}: {}", advice.title, advice.text);
    }
    Ok(())
}

fn cmd_demo(args: &[String]) -> Result<()> {
    let conn = open_store(args)?;
    let existing = match_store::list_matches(&conn)?;
    let timestamp = Utc::now().timestamp();
    let tracked = demo_match(
        &format!("demo{timestamp}"),
        next_match_title(existing.len()),
        timestamp,
    );
    match_store::upsert_match(&conn, &tracked)?;
    save_session(&conn);
    println!(
        "Seeded demo match {}: {} shots, {} pts",
        tracked.id,
        tracked.shots.len(),
        tracked.report.points
    );
    Ok(())
}

fn cmd_export(args: &[String]) -> Result<()> {
    let state = load_state(args)?;
    let out = flag_value(args, "--out").unwrap_or_else(|| "hooplog_export.xlsx".to_string());
    let report = export_matches(PathBuf::from(&out).as_path(), &state.matches)?;
    println!(
        "Exported {} matches ({} shots, {} quarter rows) to {out}",
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

fn cmd_delete(args: &[String]) -> Result<()> {
    let conn = open_store(args)?;
    let id = required_id(args)?;
    if match_store::delete_match(&conn, &id)? {
        save_session(&conn);
        println!("Deleted match {id}");
        Ok(())
    } else {
        Err(anyhow!("no match with id {id}"))
    }
}

// --- shared plumbing ---

fn resolve_db_path(args: &[String]) -> Result<PathBuf> {
    if let Some(path) = flag_value(args, "--db") {
        return Ok(PathBuf::from(path));
    }
    if let Ok(path) = std::env::var("HOOPLOG_DB") {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    match_store::default_db_path().context("unable to resolve sqlite path")
}

fn open_store(args: &[String]) -> Result<Connection> {
    match_store::open_db(&resolve_db_path(args)?)
}

fn state_from_store(conn: &Connection) -> Result<AppState> {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetMatches(match_store::list_matches(conn)?));
    let ids: Vec<String> = state.matches.iter().map(|m| m.id.clone()).collect();
    for id in ids {
        let items = match_store::list_analyses(conn, &id)?;
        if !items.is_empty() {
            apply_delta(&mut state, Delta::SetAnalyses { id, items });
        }
    }
    for line in &state.logs {
        println!("{line}");
    }
    state.logs.clear();
    Ok(state)
}

/// Read-only commands fall back to the session cache when the archive
/// cannot be opened.
fn load_state(args: &[String]) -> Result<AppState> {
    match open_store(args) {
        Ok(conn) => state_from_store(&conn),
        Err(err) => {
            let mut state = AppState::new();
            persist::load_into_state(&mut state);
            if state.matches.is_empty() {
                return Err(err.context("archive unavailable and session cache empty"));
            }
            println!("[WARN] archive unavailable, using cached session ({err:#})");
            Ok(state)
        }
    }
}

fn finish_mutation(conn: &Connection, state: &mut AppState, id: &str) -> Result<()> {
    for line in &state.logs {
        println!("{line}");
    }
    state.logs.clear();
    let tracked = state
        .match_by_id(id)
        .ok_or_else(|| anyhow!("unknown match {id}"))?;
    match_store::upsert_match(conn, tracked)?;
    persist::save_from_state(state);
    Ok(())
}

fn save_session(conn: &Connection) {
    if let Ok(state) = state_from_store(conn) {
        persist::save_from_state(&state);
    }
}

/// Positional arguments: anything that is neither a `--flag` nor the value
/// directly following a value-taking flag.
fn positionals(args: &[String]) -> Vec<String> {
    const VALUE_FLAGS: [&str; 19] = [
        "--db", "--out", "--phase", "--x", "--y", "--fgm", "--fga", "--three-pm", "--three-pa",
        "--ftm", "--fta", "--orb", "--drb", "--ast", "--tov", "--stl", "--blk", "--pf",
        "--points",
    ];
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            if VALUE_FLAGS.contains(&arg.as_str()) {
                skip_next = true;
            }
            continue;
        }
        out.push(arg.clone());
    }
    out
}

fn required_id(args: &[String]) -> Result<String> {
    positionals(args)
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("expected a match id"))
}

fn required_match<'a>(state: &'a AppState, args: &[String]) -> Result<&'a TrackedMatch> {
    let id = required_id(args)?;
    state
        .match_by_id(&id)
        .ok_or_else(|| anyhow!("no match with id {id}"))
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            if !value.trim().is_empty() {
                return Some(value.trim().to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
        {
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn parse_u32_flag(args: &[String], flag: &str) -> Result<Option<u32>> {
    let Some(raw) = flag_value(args, flag) else {
        return Ok(None);
    };
    let value = raw
        .parse::<u32>()
        .with_context(|| format!("{flag} expects a non-negative integer, got '{raw}'"))?;
    Ok(Some(value))
}

fn apply_u32_flag(args: &[String], flag: &str, slot: &mut u32) -> Result<()> {
    if let Some(value) = parse_u32_flag(args, flag)? {
        *slot = value;
    }
    Ok(())
}
