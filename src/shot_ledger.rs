use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recorded shot attempt, normalized from whatever shape the upstream
/// source used. Immutable once appended to a match's ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotEvent {
    pub made: bool,
    pub is_three: bool,
    /// Court coordinates from the shot chart, when the source had them.
    /// Carried for display and persistence; the reducer ignores them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotTotals {
    pub attempts: u32,
    pub makes: u32,
    pub three_attempts: u32,
    pub three_makes: u32,
}

impl ShotTotals {
    pub fn misses(&self) -> u32 {
        self.attempts - self.makes
    }
}

/// Fold a ledger into made/attempted counts split by shot value. Pure and
/// cheap enough to rerun on every edit.
pub fn reduce_shots(shots: &[ShotEvent]) -> ShotTotals {
    let mut totals = ShotTotals::default();
    for shot in shots {
        totals.attempts += 1;
        if shot.made {
            totals.makes += 1;
        }
        if shot.is_three {
            totals.three_attempts += 1;
            if shot.made {
                totals.three_makes += 1;
            }
        }
    }
    totals
}

/// Normalize one raw shot record. Upstream sources disagree on field names,
/// so classification runs a fixed fallback order and always produces a
/// definite answer (worst case: missed two-point attempt).
///
/// Three-point, in priority order: explicit `isThree`/`is_three` boolean,
/// then `points == 3`, then a shot-type string containing "3" or "three".
/// Made: explicit `made` boolean, then truthy `isMade`/`success`.
pub fn normalize_shot(raw: &Value) -> ShotEvent {
    let made = match raw.get("made") {
        Some(Value::Bool(flag)) => *flag,
        _ => truthy(raw.get("isMade")) || truthy(raw.get("success")),
    };

    let is_three = match explicit_three_flag(raw) {
        Some(flag) => flag,
        None => points_is_three(raw) || shot_type_is_three(raw),
    };

    ShotEvent {
        made,
        is_three,
        x: raw.get("x").and_then(Value::as_f64),
        y: raw.get("y").and_then(Value::as_f64),
    }
}

/// Normalize a raw shot array. Anything that is not an array yields an
/// empty ledger; entries that are not objects normalize to missed twos.
pub fn normalize_shots(raw: &Value) -> Vec<ShotEvent> {
    let Some(entries) = raw.as_array() else {
        return Vec::new();
    };
    entries.iter().map(normalize_shot).collect()
}

fn explicit_three_flag(raw: &Value) -> Option<bool> {
    for key in ["isThree", "is_three"] {
        if let Some(Value::Bool(flag)) = raw.get(key) {
            return Some(*flag);
        }
    }
    None
}

fn points_is_three(raw: &Value) -> bool {
    raw.get("points").and_then(Value::as_f64) == Some(3.0)
}

fn shot_type_is_three(raw: &Value) -> bool {
    let label = raw
        .get("type")
        .or_else(|| raw.get("shotType"))
        .map(type_label)
        .unwrap_or_default();
    label.contains('3') || label.to_lowercase().contains("three")
}

fn type_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

// JS-style truthiness, since the legacy feeds were written against it.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}
