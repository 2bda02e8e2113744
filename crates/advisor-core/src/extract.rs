//! Recommendation extraction from model-generated prose
//!
//! The upstream model's output format is not contractually guaranteed, so
//! extraction is two-tier: a strict pattern match over the expected labeled
//! structure, then a heuristic line scan for output whose formatting has
//! drifted. Extraction never fails; `Unknown` is a legitimate terminal
//! value, not an error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Default explanation when none can be extracted
pub const NO_EXPLANATION: &str = "No explanation provided";

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*{0,2}recommendation\*{0,2}\s*:\s*\*{0,2}\s*(buy|sell|hold)\b")
        .expect("action pattern is valid")
});

static EXPLANATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\*{0,2}explanation\*{0,2}\s*:\s*\*{0,2}\s*(.*)")
        .expect("explanation pattern is valid")
});

/// Normalized investment recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
    Unknown,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
            Self::Hold => write!(f, "Hold"),
            Self::Unknown => write!(f, "No clear recommendation found"),
        }
    }
}

/// A recommendation plus its supporting explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Recommendation,
    pub explanation: String,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "**Recommendation:** {}\n\n**Explanation:** {}",
            self.action, self.explanation
        )
    }
}

/// Extract a decision from a block of generated text.
///
/// Strict labeled structure first; if that pass is incomplete, the line-scan
/// fallback fills in whatever it can find; anything still missing gets its
/// documented default.
pub fn extract(text: &str) -> Decision {
    let (mut action, mut explanation) = primary_pass(text);

    if action.is_none() || explanation.is_none() {
        let (fallback_action, fallback_explanation) = fallback_pass(text);
        action = action.or(fallback_action);
        explanation = explanation.or(fallback_explanation);
    }

    Decision {
        action: action.unwrap_or(Recommendation::Unknown),
        explanation: explanation.unwrap_or_else(|| NO_EXPLANATION.to_string()),
    }
}

/// Strict pass: `Recommendation: <Buy|Sell|Hold>` and `Explanation: <rest>`,
/// case-insensitive, tolerating the model's `**bold**` markers.
fn primary_pass(text: &str) -> (Option<Recommendation>, Option<String>) {
    let action = ACTION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|word| action_from_word(word.as_str()));

    let explanation = EXPLANATION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|rest| rest.as_str().trim().to_string())
        .filter(|rest| !rest.is_empty());

    (action, explanation)
}

/// Heuristic pass over trimmed non-empty lines, walked in reverse.
///
/// A line mentioning "recommendation" is resolved by scanning forward from
/// itself for the first buy/sell/hold word (checked in that order per line);
/// a line mentioning "explanation" claims everything from itself to the end,
/// label included. Earlier lines overwrite later ones, so the earliest
/// labeled line wins overall.
fn fallback_pass(text: &str) -> (Option<Recommendation>, Option<String>) {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut action = None;
    let mut explanation = None;

    for i in (0..lines.len()).rev() {
        let line = lines[i].to_lowercase();

        if line.contains("recommendation") {
            for candidate in &lines[i..] {
                let candidate = candidate.to_lowercase();
                if candidate.contains("buy") {
                    action = Some(Recommendation::Buy);
                    break;
                } else if candidate.contains("sell") {
                    action = Some(Recommendation::Sell);
                    break;
                } else if candidate.contains("hold") {
                    action = Some(Recommendation::Hold);
                    break;
                }
            }
        }

        if line.contains("explanation") {
            explanation = Some(lines[i..].join(" "));
        }
    }

    (action, explanation)
}

fn action_from_word(word: &str) -> Recommendation {
    match word.to_lowercase().as_str() {
        "buy" => Recommendation::Buy,
        "sell" => Recommendation::Sell,
        _ => Recommendation::Hold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_markdown_output() {
        let decision = extract("**Recommendation:** Buy\n\n**Explanation:** Strong fundamentals.");

        assert_eq!(decision.action, Recommendation::Buy);
        assert_eq!(decision.explanation, "Strong fundamentals.");
    }

    #[test]
    fn test_plain_labels_without_markdown() {
        let decision = extract("Recommendation: Sell\nExplanation: Momentum is fading fast.");

        assert_eq!(decision.action, Recommendation::Sell);
        assert_eq!(decision.explanation, "Momentum is fading fast.");
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let decision = extract("RECOMMENDATION: HOLD\nEXPLANATION: Wait for earnings.");

        assert_eq!(decision.action, Recommendation::Hold);
        assert_eq!(decision.explanation, "Wait for earnings.");
    }

    #[test]
    fn test_unlabeled_input_yields_defaults() {
        let decision = extract("The market was quiet today.");

        assert_eq!(decision.action, Recommendation::Unknown);
        assert_eq!(decision.explanation, NO_EXPLANATION);
    }

    #[test]
    fn test_empty_input_yields_defaults() {
        let decision = extract("");

        assert_eq!(decision.action, Recommendation::Unknown);
        assert_eq!(decision.explanation, NO_EXPLANATION);
    }

    #[test]
    fn test_fallback_scans_forward_from_recommendation_line() {
        let text = "### Investment Recommendation\n\
                    Given current trends you should sell into strength.\n\
                    More detail follows.";
        let decision = extract(text);

        assert_eq!(decision.action, Recommendation::Sell);
    }

    #[test]
    fn test_fallback_checks_buy_before_sell_within_a_line() {
        let text = "Recommendation\nDo not sell; instead buy the dip.";
        let decision = extract(text);

        // "buy" is checked first within each candidate line.
        assert_eq!(decision.action, Recommendation::Buy);
    }

    #[test]
    fn test_fallback_earliest_labeled_line_wins() {
        let text = "Recommendation\nhold through the quarter\n\
                    Recommendation\nsell everything";
        let decision = extract(text);

        assert_eq!(decision.action, Recommendation::Hold);
    }

    #[test]
    fn test_fallback_explanation_keeps_label_line_to_end() {
        let text = "Some preamble.\nExplanation\nRevenue grew.\nMargins expanded.";
        let decision = extract(text);

        assert_eq!(
            decision.explanation,
            "Explanation Revenue grew. Margins expanded."
        );
    }

    #[test]
    fn test_action_without_explanation_gets_default() {
        let decision = extract("Recommendation: Buy");

        assert_eq!(decision.action, Recommendation::Buy);
        assert_eq!(decision.explanation, NO_EXPLANATION);
    }

    #[test]
    fn test_explanation_without_action_gets_unknown() {
        let decision = extract("Explanation: the outlook is murky.");

        assert_eq!(decision.action, Recommendation::Unknown);
        assert_eq!(decision.explanation, "the outlook is murky.");
    }

    #[test]
    fn test_unknown_renders_as_no_clear_recommendation() {
        assert_eq!(
            Recommendation::Unknown.to_string(),
            "No clear recommendation found"
        );
    }

    #[test]
    fn test_decision_display() {
        let decision = Decision {
            action: Recommendation::Buy,
            explanation: "Strong fundamentals.".to_string(),
        };

        assert_eq!(
            decision.to_string(),
            "**Recommendation:** Buy\n\n**Explanation:** Strong fundamentals."
        );
    }

    #[test]
    fn test_action_serializes_as_plain_word() {
        let json = serde_json::to_value(Decision {
            action: Recommendation::Hold,
            explanation: "Sideways market.".to_string(),
        })
        .unwrap();

        assert_eq!(json["action"], "Hold");
        assert_eq!(json["explanation"], "Sideways market.");
    }
}
