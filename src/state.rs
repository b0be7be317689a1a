use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::advanced_stats::{
    BoxScoreInputs, DerivedMetricsReport, OpponentInputs, compute_advanced,
};
use crate::advice::MatchAnalysis;
use crate::box_score::{QuarterlyCounts, StatIssue, aggregate};
use crate::shot_ledger::{ShotEvent, reduce_shots};

/// Default titles cycle as matches are created.
pub const MATCH_TITLE_ROTATION: [&str; 7] = [
    "Opening Game",
    "Rivalry Match",
    "Court Clash",
    "Playoff 1",
    "Playoff 2",
    "Playoff 3",
    "Championship Trial",
];

pub fn next_match_title(existing_matches: usize) -> &'static str {
    MATCH_TITLE_ROTATION[existing_matches % MATCH_TITLE_ROTATION.len()]
}

/// One tracked match: the shot ledger, the quarter counters, the manual box
/// score, and the derived report. The report is never persisted or patched
/// in place; it is recomputed from the other fields on every edit and on
/// every load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackedMatch {
    pub id: String,
    pub title: String,
    pub timestamp: i64,
    pub shots: Vec<ShotEvent>,
    pub quarterly: QuarterlyCounts,
    pub box_score: BoxScoreInputs,
    pub opponent: Option<OpponentInputs>,
    #[serde(skip)]
    pub report: DerivedMetricsReport,
}

impl TrackedMatch {
    pub fn new(id: impl Into<String>, title: impl Into<String>, timestamp: i64) -> Self {
        let mut tracked = Self {
            id: id.into(),
            title: title.into(),
            timestamp,
            ..Self::default()
        };
        tracked.recompute_report();
        tracked
    }

    /// The box score actually fed to the calculator. Quarter-tracked
    /// turnover/assist totals take precedence over the flat fields when
    /// present; rebounds stay flat because the quarterly counter has no
    /// offensive/defensive split.
    pub fn effective_box_score(&self) -> (BoxScoreInputs, Vec<StatIssue>) {
        let (totals, issues) = aggregate(&self.quarterly);
        let mut effective = self.box_score;
        if totals.tov > 0 {
            effective.tov = totals.tov;
        }
        if totals.ast > 0 {
            effective.ast = totals.ast;
        }
        (effective, issues)
    }

    pub fn computed_report(&self) -> (DerivedMetricsReport, Vec<StatIssue>) {
        let (effective, issues) = self.effective_box_score();
        let totals = reduce_shots(&self.shots);
        (
            compute_advanced(&totals, &effective, self.opponent.as_ref()),
            issues,
        )
    }

    /// Full recomputation, applied after every input-touching delta so the
    /// stored report can never go stale.
    pub fn recompute_report(&mut self) -> Vec<StatIssue> {
        let (report, issues) = self.computed_report();
        self.report = report;
        issues
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub matches: Vec<TrackedMatch>,
    /// Advice history per match id.
    pub analyses: HashMap<String, Vec<MatchAnalysis>>,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn match_by_id(&self, id: &str) -> Option<&TrackedMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    fn match_by_id_mut(&mut self, id: &str) -> Option<&mut TrackedMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetMatches(Vec<TrackedMatch>),
    UpsertMatch(TrackedMatch),
    RemoveMatch { id: String },
    AddShot { id: String, shot: ShotEvent },
    SetQuarterly { id: String, quarterly: QuarterlyCounts },
    SetBoxScore { id: String, box_score: BoxScoreInputs },
    SetOpponent { id: String, opponent: Option<OpponentInputs> },
    SetAnalyses { id: String, items: Vec<MatchAnalysis> },
    PushAnalysis { id: String, analysis: MatchAnalysis },
    Log(String),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetMatches(mut matches) => {
            let mut issues = Vec::new();
            for tracked in &mut matches {
                issues.extend(
                    tracked
                        .recompute_report()
                        .into_iter()
                        .map(|issue| (tracked.id.clone(), issue)),
                );
            }
            state.matches = matches;
            for (id, issue) in issues {
                state.push_log(format!("[WARN] {id}: {issue}"));
            }
        }
        Delta::UpsertMatch(mut tracked) => {
            let issues = tracked.recompute_report();
            let id = tracked.id.clone();
            if let Some(existing) = state.match_by_id_mut(&tracked.id) {
                *existing = tracked;
            } else {
                state.matches.push(tracked);
            }
            log_issues(state, &id, &issues);
        }
        Delta::RemoveMatch { id } => {
            state.matches.retain(|m| m.id != id);
            state.analyses.remove(&id);
        }
        Delta::AddShot { id, shot } => {
            let Some(issues) = state.match_by_id_mut(&id).map(|tracked| {
                tracked.shots.push(shot);
                tracked.recompute_report()
            }) else {
                state.push_log(format!("[WARN] AddShot for unknown match {id}"));
                return;
            };
            log_issues(state, &id, &issues);
        }
        Delta::SetQuarterly { id, quarterly } => {
            let Some(issues) = state.match_by_id_mut(&id).map(|tracked| {
                tracked.quarterly = quarterly;
                tracked.recompute_report()
            }) else {
                state.push_log(format!("[WARN] SetQuarterly for unknown match {id}"));
                return;
            };
            log_issues(state, &id, &issues);
        }
        Delta::SetBoxScore { id, box_score } => {
            let Some(issues) = state.match_by_id_mut(&id).map(|tracked| {
                tracked.box_score = box_score;
                tracked.recompute_report()
            }) else {
                state.push_log(format!("[WARN] SetBoxScore for unknown match {id}"));
                return;
            };
            for violation in box_score.validate() {
                state.push_log(format!("[WARN] {id}: {violation}"));
            }
            log_issues(state, &id, &issues);
        }
        Delta::SetOpponent { id, opponent } => {
            let Some(issues) = state.match_by_id_mut(&id).map(|tracked| {
                tracked.opponent = opponent;
                tracked.recompute_report()
            }) else {
                state.push_log(format!("[WARN] SetOpponent for unknown match {id}"));
                return;
            };
            log_issues(state, &id, &issues);
        }
        Delta::SetAnalyses { id, items } => {
            state.analyses.insert(id, items);
        }
        Delta::PushAnalysis { id, analysis } => {
            let duplicate = state
                .analyses
                .get(&id)
                .is_some_and(|items| crate::advice::phase_exists(items, &analysis.phase));
            if duplicate {
                let phase = analysis.phase.clone();
                state.push_log(format!("[WARN] {id}: phase '{phase}' already exists"));
                return;
            }
            state.analyses.entry(id).or_default().push(analysis);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn log_issues(state: &mut AppState, id: &str, issues: &[StatIssue]) {
    for issue in issues {
        state.push_log(format!("[WARN] {id}: {issue}"));
    }
}
