use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::box_score::aggregate;
use crate::http_client::http_client;
use crate::state::TrackedMatch;

/// One piece of structured advice as returned by the analysis service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Advice {
    pub title: String,
    pub text: String,
    pub comment: String,
    #[serde(rename = "tag")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceResult {
    #[serde(rename = "mainAdvice")]
    pub main_advice: Advice,
    #[serde(rename = "secondaryAdvices")]
    pub secondary_advices: Vec<Advice>,
}

/// A stored analysis: the aggregates that were sent plus the advice that
/// came back, keyed by the phase label the user chose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchAnalysis {
    #[serde(rename = "user_id#timestamp")]
    pub key: String,
    pub phase: String,
    pub timestamp: i64,
    pub shots: u32,
    pub turnovers: u32,
    pub assists: u32,
    pub rebounds: u32,
    pub points: u32,
    pub result: AdviceResult,
}

/// The flat aggregate payload the service expects. This core only supplies
/// the numbers; it never interprets the advice text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceRequest {
    pub timestamp: i64,
    pub phase: String,
    pub shots: u32,
    pub turnovers: u32,
    pub assists: u32,
    pub rebounds: u32,
    pub points: u32,
}

/// Build the advice payload from a match: ledger length plus the box-score
/// aggregator's quarter sums. Input issues were already surfaced when the
/// quarters were entered, so they are not re-reported here.
pub fn advice_request_for_match(tracked: &TrackedMatch, phase: &str) -> AdviceRequest {
    let (totals, _) = aggregate(&tracked.quarterly);
    AdviceRequest {
        timestamp: tracked.timestamp,
        phase: phase.to_string(),
        shots: tracked.shots.len() as u32,
        turnovers: totals.tov,
        assists: totals.ast,
        rebounds: totals.reb,
        points: totals.pts,
    }
}

/// Phase labels are unique per match, compared case-insensitively.
pub fn phase_exists(items: &[MatchAnalysis], phase: &str) -> bool {
    let want = phase.trim().to_lowercase();
    items
        .iter()
        .any(|item| item.phase.trim().to_lowercase() == want)
}

#[derive(Debug, Clone, Deserialize)]
struct PostAnalyzeResponse {
    advice: MatchAnalysis,
    #[serde(default)]
    #[allow(dead_code)]
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GetAnalysesResponse {
    #[serde(default)]
    items: Vec<MatchAnalysis>,
    #[serde(default)]
    #[allow(dead_code)]
    message: String,
}

pub fn parse_analyze_response(raw: &str) -> Result<MatchAnalysis> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("empty analyze response"));
    }
    let parsed: PostAnalyzeResponse =
        serde_json::from_str(trimmed).context("invalid analyze json")?;
    Ok(parsed.advice)
}

pub fn parse_analyses_response(raw: &str) -> Result<Vec<MatchAnalysis>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("empty analyses response"));
    }
    let parsed: GetAnalysesResponse =
        serde_json::from_str(trimmed).context("invalid analyses json")?;
    Ok(parsed.items)
}

pub fn advice_base_url() -> Option<String> {
    let raw = std::env::var("ADVICE_API_URL").ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.trim_end_matches('/').to_string())
}

fn api_token() -> Option<String> {
    let raw = std::env::var("ADVICE_API_TOKEN").ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn post_analyze(base_url: &str, request: &AdviceRequest) -> Result<MatchAnalysis> {
    let client = http_client()?;
    let url = format!("{}/analyze", base_url.trim_end_matches('/'));
    let mut builder = client.post(&url).json(request);
    if let Some(token) = api_token() {
        builder = builder.bearer_auth(token);
    }
    let response = builder.send().with_context(|| format!("post {url}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("analyze request failed with status {status}"));
    }
    let raw = response.text().context("read analyze response")?;
    parse_analyze_response(&raw)
}

pub fn fetch_analyses(base_url: &str, timestamp: i64) -> Result<Vec<MatchAnalysis>> {
    let client = http_client()?;
    let url = format!(
        "{}/analyze?timestamp={timestamp}",
        base_url.trim_end_matches('/')
    );
    let mut builder = client.get(&url);
    if let Some(token) = api_token() {
        builder = builder.bearer_auth(token);
    }
    let response = builder.send().with_context(|| format!("get {url}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("analyses request failed with status {status}"));
    }
    let raw = response.text().context("read analyses response")?;
    parse_analyses_response(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_comparison_ignores_case_and_whitespace() {
        let items = vec![MatchAnalysis {
            phase: "Playoff".to_string(),
            ..MatchAnalysis::default()
        }];
        assert!(phase_exists(&items, "playoff"));
        assert!(phase_exists(&items, "  PLAYOFF "));
        assert!(!phase_exists(&items, "training"));
    }

    #[test]
    fn analyze_response_parses_wire_shape() {
        let raw = r#"{
            "message": "ok",
            "advice": {
                "user_id#timestamp": "u1#1700000000",
                "phase": "game",
                "timestamp": 1700000000,
                "shots": 24,
                "turnovers": 5,
                "assists": 9,
                "rebounds": 12,
                "points": 61,
                "result": {
                    "mainAdvice": {
                        "title": "Protect the ball",
                        "text": "Turnovers spiked in the second quarter.",
                        "comment": "Focus drills on pass timing.",
                        "tag": ["turnovers"]
                    },
                    "secondaryAdvices": []
                }
            }
        }"#;
        let analysis = parse_analyze_response(raw).unwrap();
        assert_eq!(analysis.phase, "game");
        assert_eq!(analysis.points, 61);
        assert_eq!(analysis.result.main_advice.title, "Protect the ball");
        assert_eq!(analysis.result.main_advice.tags, vec!["turnovers"]);
    }

    #[test]
    fn empty_response_is_an_error() {
        assert!(parse_analyze_response("   ").is_err());
        assert!(parse_analyses_response("").is_err());
    }

    #[test]
    fn analyses_response_defaults_missing_items() {
        let items = parse_analyses_response(r#"{ "message": "none yet" }"#).unwrap();
        assert!(items.is_empty());
    }
}
