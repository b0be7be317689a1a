use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shot_ledger::ShotTotals;

/// Manually entered per-match counters. `made` exceeding `attempted` is a
/// validation error surfaced by [`BoxScoreInputs::validate`], never clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxScoreInputs {
    pub fgm: u32,
    pub fga: u32,
    pub three_pm: u32,
    pub three_pa: u32,
    pub ftm: u32,
    pub fta: u32,
    pub orb: u32,
    pub drb: u32,
    pub ast: u32,
    pub tov: u32,
    pub stl: u32,
    pub blk: u32,
    pub pf: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxScoreViolation {
    FieldGoals,
    ThreePointers,
    FreeThrows,
}

impl fmt::Display for BoxScoreViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BoxScoreViolation::FieldGoals => "field goals made exceed attempts",
            BoxScoreViolation::ThreePointers => "three-pointers made exceed attempts",
            BoxScoreViolation::FreeThrows => "free throws made exceed attempts",
        };
        write!(f, "{label}")
    }
}

impl BoxScoreInputs {
    pub fn validate(&self) -> Vec<BoxScoreViolation> {
        let mut violations = Vec::new();
        if self.fgm > self.fga {
            violations.push(BoxScoreViolation::FieldGoals);
        }
        if self.three_pm > self.three_pa {
            violations.push(BoxScoreViolation::ThreePointers);
        }
        if self.ftm > self.fta {
            violations.push(BoxScoreViolation::FreeThrows);
        }
        violations
    }
}

/// Opponent-side counters needed for the rating and rebounding math.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentInputs {
    pub drb: u32,
    pub points: u32,
    pub fga: u32,
    pub fta: u32,
    pub tov: u32,
}

/// The full derived report. Read-only by construction: every call to
/// [`compute_advanced`] rebuilds every field from the current inputs, so it
/// can never drift out of sync with them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivedMetricsReport {
    pub fgm: u32,
    pub fga: u32,
    pub three_pm: u32,
    pub three_pa: u32,
    pub points: u32,
    pub efg_pct: f64,
    pub ts_pct: f64,
    pub possessions: f64,
    pub off_rating: f64,
    pub def_rating: f64,
    pub net_rating: f64,
    pub tov_pct: f64,
    pub ast_to_tov: f64,
    pub orb_pct: f64,
    pub total_rebounds: u32,
    pub steals: u32,
    pub blocks: u32,
    pub fouls: u32,
}

/// Points follow from makes: two-point makes are inferred as FGM minus 3PM,
/// floored at zero to tolerate transiently inconsistent manual entry.
pub fn reconcile_points(fgm: u32, three_pm: u32, ftm: u32) -> u32 {
    fgm.saturating_sub(three_pm) * 2 + three_pm * 3 + ftm
}

/// Compute the advanced-stats report from the shot ledger totals, the manual
/// box score and (when known) the opponent inputs.
///
/// When the ledger has at least one event its counts are authoritative for
/// FGM/FGA/3PM/3PA; the flat box-score values cover matches entered after
/// the fact with no shot chart. Every division is guarded, so the report
/// never carries NaN or infinity; degenerate inputs read as 0.
pub fn compute_advanced(
    shots: &ShotTotals,
    box_score: &BoxScoreInputs,
    opponent: Option<&OpponentInputs>,
) -> DerivedMetricsReport {
    let (fgm, fga, three_pm, three_pa) = if shots.attempts > 0 {
        (
            shots.makes,
            shots.attempts,
            shots.three_makes,
            shots.three_attempts,
        )
    } else {
        (
            box_score.fgm,
            box_score.fga,
            box_score.three_pm,
            box_score.three_pa,
        )
    };

    let points = reconcile_points(fgm, three_pm, box_score.ftm);

    let fga_f = f64::from(fga);
    let fta_f = f64::from(box_score.fta);
    let pts_f = f64::from(points);
    let orb_f = f64::from(box_score.orb);
    let tov_f = f64::from(box_score.tov);
    let ast_f = f64::from(box_score.ast);

    let efg_pct = if fga > 0 {
        (f64::from(fgm) + 0.5 * f64::from(three_pm)) / fga_f
    } else {
        0.0
    };

    let ts_denom = 2.0 * (fga_f + 0.44 * fta_f);
    let ts_pct = if ts_denom > 0.0 { pts_f / ts_denom } else { 0.0 };

    // Single-team estimate. Negative only on pathological input; floored
    // before it is stored or used as a divisor.
    let possessions = (fga_f + 0.44 * fta_f - orb_f + tov_f).max(0.0);

    let off_rating = if possessions > 0.0 {
        pts_f / possessions * 100.0
    } else {
        0.0
    };

    let opp_points = opponent.map(|o| f64::from(o.points)).unwrap_or(0.0);
    let def_rating = if possessions > 0.0 && opp_points > 0.0 {
        opp_points / possessions * 100.0
    } else {
        0.0
    };
    let net_rating = off_rating - def_rating;

    let tov_pct = if possessions > 0.0 {
        tov_f / possessions
    } else {
        0.0
    };

    let opp_drb = opponent.map(|o| f64::from(o.drb)).unwrap_or(0.0);
    let orb_denom = orb_f + opp_drb;
    let orb_pct = if orb_denom > 0.0 { orb_f / orb_denom } else { 0.0 };

    // With zero turnovers the ratio reports the raw assist count instead
    // of an undefined division. Callers rely on this fallback.
    let ast_to_tov = if box_score.tov > 0 { ast_f / tov_f } else { ast_f };

    DerivedMetricsReport {
        fgm,
        fga,
        three_pm,
        three_pa,
        points,
        efg_pct,
        ts_pct,
        possessions,
        off_rating,
        def_rating,
        net_rating,
        tov_pct,
        ast_to_tov,
        orb_pct,
        total_rebounds: box_score.orb + box_score.drb,
        steals: box_score.stl,
        blocks: box_score.blk,
        fouls: box_score.pf,
    }
}
