use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-quarter counter, used uniformly for turnovers, assists, rebounds and
/// points. All four keys are always present; absent upstream keys load as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarterStats {
    pub q1: i64,
    pub q2: i64,
    pub q3: i64,
    pub q4: i64,
}

impl QuarterStats {
    pub fn values(&self) -> [i64; 4] {
        [self.q1, self.q2, self.q3, self.q4]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarterlyCounts {
    pub turnovers: QuarterStats,
    pub assists: QuarterStats,
    pub rebounds: QuarterStats,
    pub points: QuarterStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxTotals {
    pub tov: u32,
    pub ast: u32,
    pub reb: u32,
    pub pts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatCategory {
    Turnovers,
    Assists,
    Rebounds,
    Points,
}

impl StatCategory {
    pub fn label(&self) -> &'static str {
        match self {
            StatCategory::Turnovers => "turnovers",
            StatCategory::Assists => "assists",
            StatCategory::Rebounds => "rebounds",
            StatCategory::Points => "points",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn key(&self) -> &'static str {
        match self {
            Quarter::Q1 => "q1",
            Quarter::Q2 => "q2",
            Quarter::Q3 => "q3",
            Quarter::Q4 => "q4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatProblem {
    Negative,
    NonNumeric,
    Fractional,
}

/// A recoverable input problem. The offending value counts as zero and the
/// issue is handed back to the caller for display; nothing here is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatIssue {
    pub category: StatCategory,
    pub quarter: Quarter,
    pub problem: StatProblem,
}

impl fmt::Display for StatIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let problem = match self.problem {
            StatProblem::Negative => "negative value",
            StatProblem::NonNumeric => "non-numeric value",
            StatProblem::Fractional => "fractional value",
        };
        write!(
            f,
            "{} in {} {}",
            problem,
            self.category.label(),
            self.quarter.key()
        )
    }
}

/// Sum the four quarter values per category. Missing categories arrive as
/// all-zero via serde defaults; negative entries are reported and count as
/// zero so a bad keystroke can never sink the whole display.
pub fn aggregate(counts: &QuarterlyCounts) -> (BoxTotals, Vec<StatIssue>) {
    let mut issues = Vec::new();
    let totals = BoxTotals {
        tov: sum_category(StatCategory::Turnovers, &counts.turnovers, &mut issues),
        ast: sum_category(StatCategory::Assists, &counts.assists, &mut issues),
        reb: sum_category(StatCategory::Rebounds, &counts.rebounds, &mut issues),
        pts: sum_category(StatCategory::Points, &counts.points, &mut issues),
    };
    (totals, issues)
}

fn sum_category(
    category: StatCategory,
    stats: &QuarterStats,
    issues: &mut Vec<StatIssue>,
) -> u32 {
    let mut total: u32 = 0;
    for (quarter, value) in Quarter::ALL.into_iter().zip(stats.values()) {
        if value < 0 {
            issues.push(StatIssue {
                category,
                quarter,
                problem: StatProblem::Negative,
            });
            continue;
        }
        total = total.saturating_add(u32::try_from(value).unwrap_or(u32::MAX));
    }
    total
}

/// Tolerant ingestion for one category of raw quarter counters. Accepts
/// numbers and numeric strings; anything else is reported and reads as zero.
/// Missing keys and `null` read as zero without an issue.
pub fn parse_quarter_stats(category: StatCategory, raw: &Value) -> (QuarterStats, Vec<StatIssue>) {
    let mut issues = Vec::new();
    let mut out = [0i64; 4];
    for (slot, quarter) in out.iter_mut().zip(Quarter::ALL) {
        match raw.get(quarter.key()) {
            None | Some(Value::Null) => {}
            Some(value) => match parse_count(value) {
                Ok(count) => *slot = count,
                Err(problem) => issues.push(StatIssue {
                    category,
                    quarter,
                    problem,
                }),
            },
        }
    }
    (
        QuarterStats {
            q1: out[0],
            q2: out[1],
            q3: out[2],
            q4: out[3],
        },
        issues,
    )
}

/// Tolerant ingestion for the whole quarterly block of a raw match record.
pub fn parse_quarterly(raw: &Value) -> (QuarterlyCounts, Vec<StatIssue>) {
    let mut issues = Vec::new();
    let mut category = |cat: StatCategory| {
        let (stats, mut found) =
            parse_quarter_stats(cat, raw.get(cat.label()).unwrap_or(&Value::Null));
        issues.append(&mut found);
        stats
    };
    let counts = QuarterlyCounts {
        turnovers: category(StatCategory::Turnovers),
        assists: category(StatCategory::Assists),
        rebounds: category(StatCategory::Rebounds),
        points: category(StatCategory::Points),
    };
    (counts, issues)
}

fn parse_count(value: &Value) -> Result<i64, StatProblem> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                return Ok(v);
            }
            match n.as_f64() {
                Some(v) if v.fract() == 0.0 => Ok(v as i64),
                Some(_) => Err(StatProblem::Fractional),
                None => Err(StatProblem::NonNumeric),
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(StatProblem::NonNumeric);
            }
            if let Ok(v) = trimmed.parse::<i64>() {
                return Ok(v);
            }
            match trimmed.parse::<f64>() {
                Ok(v) if v.fract() == 0.0 => Ok(v as i64),
                Ok(_) => Err(StatProblem::Fractional),
                Err(_) => Err(StatProblem::NonNumeric),
            }
        }
        _ => Err(StatProblem::NonNumeric),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aggregates_all_categories() {
        let counts = QuarterlyCounts {
            turnovers: QuarterStats { q1: 1, q2: 2, q3: 0, q4: 1 },
            assists: QuarterStats { q1: 3, q2: 1, q3: 2, q4: 2 },
            rebounds: QuarterStats { q1: 4, q2: 2, q3: 3, q4: 1 },
            points: QuarterStats { q1: 18, q2: 22, q3: 15, q4: 20 },
        };
        let (totals, issues) = aggregate(&counts);
        assert!(issues.is_empty());
        assert_eq!(totals, BoxTotals { tov: 4, ast: 8, reb: 10, pts: 75 });
    }

    #[test]
    fn missing_category_sums_to_zero() {
        let (totals, issues) = aggregate(&QuarterlyCounts::default());
        assert!(issues.is_empty());
        assert_eq!(totals, BoxTotals::default());
    }

    #[test]
    fn negative_quarter_counts_as_zero_with_issue() {
        let counts = QuarterlyCounts {
            turnovers: QuarterStats { q1: 2, q2: -3, q3: 1, q4: 0 },
            ..QuarterlyCounts::default()
        };
        let (totals, issues) = aggregate(&counts);
        assert_eq!(totals.tov, 3);
        assert_eq!(
            issues,
            vec![StatIssue {
                category: StatCategory::Turnovers,
                quarter: Quarter::Q2,
                problem: StatProblem::Negative,
            }]
        );
    }

    #[test]
    fn parses_numbers_and_numeric_strings() {
        let (stats, issues) = parse_quarter_stats(
            StatCategory::Points,
            &json!({ "q1": 18, "q2": "22", "q3": 15.0, "q4": null }),
        );
        assert!(issues.is_empty());
        assert_eq!(stats, QuarterStats { q1: 18, q2: 22, q3: 15, q4: 0 });
    }

    #[test]
    fn non_numeric_quarter_reads_as_zero_with_issue() {
        let (stats, issues) = parse_quarter_stats(
            StatCategory::Rebounds,
            &json!({ "q1": "lots", "q2": 4, "q3": true, "q4": 2.5 }),
        );
        assert_eq!(stats, QuarterStats { q1: 0, q2: 4, q3: 0, q4: 0 });
        let problems: Vec<StatProblem> = issues.iter().map(|i| i.problem).collect();
        assert_eq!(
            problems,
            vec![
                StatProblem::NonNumeric,
                StatProblem::NonNumeric,
                StatProblem::Fractional
            ]
        );
    }

    #[test]
    fn parse_quarterly_reads_all_blocks() {
        let raw = json!({
            "turnovers": { "q1": 1, "q2": 2, "q3": 1, "q4": 0 },
            "points": { "q1": "20", "q2": 18, "q3": 25, "q4": 12 }
        });
        let (counts, issues) = parse_quarterly(&raw);
        assert!(issues.is_empty());
        let (totals, _) = aggregate(&counts);
        assert_eq!(totals.tov, 4);
        assert_eq!(totals.pts, 75);
        assert_eq!(totals.ast, 0);
    }

    #[test]
    fn issue_display_is_log_friendly() {
        let issue = StatIssue {
            category: StatCategory::Points,
            quarter: Quarter::Q3,
            problem: StatProblem::Negative,
        };
        assert_eq!(issue.to_string(), "negative value in points q3");
    }
}
