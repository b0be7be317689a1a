use rand::Rng;
use rand::seq::SliceRandom;

use crate::advice::{Advice, AdviceRequest, AdviceResult, MatchAnalysis};

/// Offline stand-in for the advice service, used when no API is configured.
/// Picks from canned coaching lines, keyed on the aggregates so the output
/// at least points in a plausible direction.
pub fn generate_fake_advice(request: &AdviceRequest) -> AdviceResult {
    let mut rng = rand::thread_rng();
    let mut candidates = triggered_advice(request);
    candidates.shuffle(&mut rng);

    let main_advice = candidates.pop().unwrap_or_else(|| generic_advice(&mut rng));
    let mut secondary_advices = candidates;
    while secondary_advices.len() < 2 {
        let filler = generic_advice(&mut rng);
        if filler.title != main_advice.title
            && secondary_advices.iter().all(|a| a.title != filler.title)
        {
            secondary_advices.push(filler);
        }
    }

    AdviceResult {
        main_advice,
        secondary_advices,
    }
}

/// Wrap fake advice in the same record shape the real service returns, so
/// callers store it the same way.
pub fn fake_analysis(request: &AdviceRequest) -> MatchAnalysis {
    MatchAnalysis {
        key: format!("local#{}", request.timestamp),
        phase: request.phase.clone(),
        timestamp: request.timestamp,
        shots: request.shots,
        turnovers: request.turnovers,
        assists: request.assists,
        rebounds: request.rebounds,
        points: request.points,
        result: generate_fake_advice(request),
    }
}

fn triggered_advice(request: &AdviceRequest) -> Vec<Advice> {
    let mut out = Vec::new();

    if request.turnovers > request.assists {
        out.push(advice(
            "Protect the ball",
            "Turnover count is high — ball handling and passing stability may need improvement.",
            "Run two-ball dribbling and pressured outlet drills this week.",
            &["turnovers", "ball-security"],
        ));
    }

    if request.shots > 0 && request.rebounds < request.shots / 4 {
        out.push(advice(
            "Crash the glass",
            "Rebounds are low for this shot volume — may indicate a need to improve boxing out and help-side awareness.",
            "Assign box-out matchups before the next game.",
            &["rebounds"],
        ));
    }

    if request.shots > 0 && request.points < request.shots {
        out.push(advice(
            "Shot selection",
            "Inconsistent shooting performance — consider adjusting substitutions and shot selection.",
            "Chart shot locations against makes to find the cold zones.",
            &["shooting", "efficiency"],
        ));
    }

    if request.assists >= request.turnovers && request.assists > 0 {
        out.push(advice(
            "Keep the ball moving",
            "Assists remained steady — a sign of strong team coordination that should be maintained.",
            "Keep the same primary actions in the half court.",
            &["assists", "offense"],
        ));
    }

    out
}

fn generic_advice(rng: &mut impl Rng) -> Advice {
    const GENERIC: [(&str, &str, &str); 3] = [
        (
            "Review the opening quarter",
            "Defensive struggles were concentrated early — consider reviewing the opening defensive setup.",
            "Watch the first five possessions together as a team.",
        ),
        (
            "Second-quarter surge",
            "Scoring improved significantly in Q2 — consider analyzing if there were changes in offensive strategy.",
            "Note which lineup was on the floor during the run.",
        ),
        (
            "Free-throw routine",
            "Trips to the line are wasted without a consistent routine.",
            "End each practice with pressured free-throw sets.",
        ),
    ];
    let (title, text, comment) = GENERIC[rng.gen_range(0..GENERIC.len())];
    advice(title, text, comment, &["general"])
}

fn advice(title: &str, text: &str, comment: &str, tags: &[&str]) -> Advice {
    Advice {
        title: title.to_string(),
        text: text.to_string(),
        comment: comment.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}
