use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::advice::MatchAnalysis;
use crate::persist::app_cache_dir;
use crate::state::TrackedMatch;

/// Durable archive of tracked matches and their advice history: the full
/// create/list/update/delete surface over a single sqlite file.
pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("matches.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS matches (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            shots_json TEXT NOT NULL,
            quarterly_json TEXT NOT NULL,
            box_score_json TEXT NOT NULL,
            opponent_json TEXT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_matches_timestamp ON matches(timestamp);

        CREATE TABLE IF NOT EXISTS analyses (
            match_id TEXT NOT NULL,
            phase TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            analysis_json TEXT NOT NULL,
            PRIMARY KEY (match_id, phase)
        );
        CREATE INDEX IF NOT EXISTS idx_analyses_match ON analyses(match_id);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

pub fn upsert_match(conn: &Connection, tracked: &TrackedMatch) -> Result<()> {
    let shots_json = serde_json::to_string(&tracked.shots).context("serialize shots")?;
    let quarterly_json =
        serde_json::to_string(&tracked.quarterly).context("serialize quarterly counts")?;
    let box_score_json =
        serde_json::to_string(&tracked.box_score).context("serialize box score")?;
    let opponent_json = tracked
        .opponent
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .context("serialize opponent inputs")?;

    conn.execute(
        r#"
        INSERT INTO matches (
            id, title, timestamp, shots_json, quarterly_json,
            box_score_json, opponent_json, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            timestamp = excluded.timestamp,
            shots_json = excluded.shots_json,
            quarterly_json = excluded.quarterly_json,
            box_score_json = excluded.box_score_json,
            opponent_json = excluded.opponent_json,
            updated_at = excluded.updated_at
        "#,
        params![
            tracked.id,
            tracked.title,
            tracked.timestamp,
            shots_json,
            quarterly_json,
            box_score_json,
            opponent_json,
            Utc::now().to_rfc3339(),
        ],
    )
    .with_context(|| format!("upsert match {}", tracked.id))?;
    Ok(())
}

pub fn get_match(conn: &Connection, id: &str) -> Result<Option<TrackedMatch>> {
    let row = conn
        .query_row(
            r#"
            SELECT id, title, timestamp, shots_json, quarterly_json,
                   box_score_json, opponent_json
            FROM matches WHERE id = ?1
            "#,
            params![id],
            row_to_raw_match,
        )
        .optional()
        .with_context(|| format!("load match {id}"))?;
    row.map(raw_to_tracked).transpose()
}

/// All matches ordered by date, reports recomputed on the way out.
pub fn list_matches(conn: &Connection) -> Result<Vec<TrackedMatch>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT id, title, timestamp, shots_json, quarterly_json,
                   box_score_json, opponent_json
            FROM matches ORDER BY timestamp ASC, id ASC
            "#,
        )
        .context("prepare match listing")?;
    let rows = stmt
        .query_map([], row_to_raw_match)
        .context("query matches")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(raw_to_tracked(row.context("read match row")?)?);
    }
    Ok(out)
}

pub fn delete_match(conn: &Connection, id: &str) -> Result<bool> {
    conn.execute("DELETE FROM analyses WHERE match_id = ?1", params![id])
        .with_context(|| format!("delete analyses for match {id}"))?;
    let affected = conn
        .execute("DELETE FROM matches WHERE id = ?1", params![id])
        .with_context(|| format!("delete match {id}"))?;
    Ok(affected > 0)
}

pub fn insert_analysis(conn: &Connection, match_id: &str, analysis: &MatchAnalysis) -> Result<()> {
    let analysis_json = serde_json::to_string(analysis).context("serialize analysis")?;
    conn.execute(
        r#"
        INSERT INTO analyses (match_id, phase, timestamp, analysis_json)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(match_id, phase) DO UPDATE SET
            timestamp = excluded.timestamp,
            analysis_json = excluded.analysis_json
        "#,
        params![match_id, analysis.phase, analysis.timestamp, analysis_json],
    )
    .with_context(|| format!("insert analysis for match {match_id}"))?;
    Ok(())
}

pub fn list_analyses(conn: &Connection, match_id: &str) -> Result<Vec<MatchAnalysis>> {
    let mut stmt = conn
        .prepare("SELECT analysis_json FROM analyses WHERE match_id = ?1 ORDER BY timestamp ASC")
        .context("prepare analysis listing")?;
    let rows = stmt
        .query_map(params![match_id], |row| row.get::<_, String>(0))
        .context("query analyses")?;

    let mut out = Vec::new();
    for raw in rows {
        let raw = raw.context("read analysis row")?;
        out.push(serde_json::from_str(&raw).context("parse stored analysis")?);
    }
    Ok(out)
}

struct RawMatchRow {
    id: String,
    title: String,
    timestamp: i64,
    shots_json: String,
    quarterly_json: String,
    box_score_json: String,
    opponent_json: Option<String>,
}

fn row_to_raw_match(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMatchRow> {
    Ok(RawMatchRow {
        id: row.get(0)?,
        title: row.get(1)?,
        timestamp: row.get(2)?,
        shots_json: row.get(3)?,
        quarterly_json: row.get(4)?,
        box_score_json: row.get(5)?,
        opponent_json: row.get(6)?,
    })
}

fn raw_to_tracked(raw: RawMatchRow) -> Result<TrackedMatch> {
    let mut tracked = TrackedMatch {
        id: raw.id,
        title: raw.title,
        timestamp: raw.timestamp,
        shots: serde_json::from_str(&raw.shots_json).context("parse stored shots")?,
        quarterly: serde_json::from_str(&raw.quarterly_json)
            .context("parse stored quarterly counts")?,
        box_score: serde_json::from_str(&raw.box_score_json).context("parse stored box score")?,
        opponent: raw
            .opponent_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("parse stored opponent inputs")?,
        ..TrackedMatch::default()
    };
    tracked.recompute_report();
    Ok(tracked)
}
