//! Multi-document comparison synthesis.
//!
//! [`parse_comparison`] turns raw model output into a [`ComparisonReport`]
//! keyed by the caller's document labels. Like the insight parser it is
//! total, and it additionally repairs partial output: every known label ends
//! up with strengths, weaknesses, and a risk row, whatever the model returned.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::extract;
use crate::domain::insight::NEUTRAL_RISK_SCORE;

/// Placeholder strengths entry for degraded results.
pub const FALLBACK_STRENGTH: &str = "No se pudieron extraer fortalezas de la respuesta.";

/// Placeholder weaknesses entry for degraded results.
pub const FALLBACK_WEAKNESS: &str = "No se pudieron extraer debilidades de la respuesta.";

/// Placeholder recommendation reasoning for degraded results.
pub const FALLBACK_REASONING: &str = "No se proporcionó una justificación estructurada.";

/// Placeholder improvement suggestion for degraded results.
pub const FALLBACK_IMPROVEMENT: &str =
    "Solicitar un nuevo análisis comparativo para obtener sugerencias de mejora.";

/// Per-document risk scores on a 1..=10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScores {
    /// Legal exposure.
    pub legal: u8,
    /// Financial exposure.
    pub financial: u8,
    /// Operational exposure.
    pub operational: u8,
}

impl RiskScores {
    /// The neutral mid-scale row used when the model gave nothing usable.
    pub fn neutral() -> Self {
        Self {
            legal: NEUTRAL_RISK_SCORE,
            financial: NEUTRAL_RISK_SCORE,
            operational: NEUTRAL_RISK_SCORE,
        }
    }
}

/// Which document the model recommends and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Label of the recommended document. Always one of the caller's labels
    /// (the first label when the model expressed no usable preference), or
    /// empty when the comparison had no documents.
    pub preferred: String,
    /// Why that document was preferred.
    pub reasoning: String,
    /// Suggested improvements, never empty.
    pub improvements: Vec<String>,
}

/// Structured comparison across tender documents.
///
/// Maps are keyed by document label (the context file names) and contain
/// exactly the labels the caller passed in, in `BTreeMap` order so serialized
/// output is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Executive summary (or the raw response verbatim when degraded).
    pub summary: String,
    /// Strengths per document.
    pub strengths: BTreeMap<String, Vec<String>>,
    /// Weaknesses per document.
    pub weaknesses: BTreeMap<String, Vec<String>>,
    /// Overall recommendation.
    pub recommendation: Recommendation,
    /// Risk scores per document.
    pub risk_matrix: BTreeMap<String, RiskScores>,
}

impl ComparisonReport {
    /// The deterministic degraded shape: raw text as summary, placeholder
    /// lists and a uniform neutral risk row for every known label, first
    /// label preferred.
    pub fn fallback(raw_text: &str, labels: &[String]) -> Self {
        let strengths = labels
            .iter()
            .map(|label| (label.clone(), vec![FALLBACK_STRENGTH.to_string()]))
            .collect();
        let weaknesses = labels
            .iter()
            .map(|label| (label.clone(), vec![FALLBACK_WEAKNESS.to_string()]))
            .collect();
        let risk_matrix = labels
            .iter()
            .map(|label| (label.clone(), RiskScores::neutral()))
            .collect();

        Self {
            summary: raw_text.to_string(),
            strengths,
            weaknesses,
            recommendation: Recommendation {
                preferred: labels.first().cloned().unwrap_or_default(),
                reasoning: FALLBACK_REASONING.to_string(),
                improvements: vec![FALLBACK_IMPROVEMENT.to_string()],
            },
            risk_matrix,
        }
    }
}

/// Parses raw model output into a [`ComparisonReport`]. Total: never fails.
///
/// `labels` are the document labels in caller order; they define the keys of
/// every map in the result and the default for `recommendation.preferred`.
pub fn parse_comparison(raw: &str, labels: &[String]) -> ComparisonReport {
    let candidate = match extract::extract_json_payload(raw) {
        Some(payload) => payload,
        None => {
            warn!(response_len = raw.len(), "comparison response carried no JSON payload, degrading");
            return ComparisonReport::fallback(raw, labels);
        }
    };

    let parsed: serde_json::Value = match serde_json::from_str(candidate) {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, "comparison payload failed to parse, degrading");
            return ComparisonReport::fallback(raw, labels);
        }
    };

    if !parsed.is_object() {
        warn!("comparison payload was not a JSON object, degrading");
        return ComparisonReport::fallback(raw, labels);
    }

    let summary = parsed["summary"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| raw.to_string());

    let strengths = labeled_lists(&parsed["strengths"], labels, FALLBACK_STRENGTH);
    let weaknesses = labeled_lists(&parsed["weaknesses"], labels, FALLBACK_WEAKNESS);
    let risk_matrix = labeled_risk_rows(&parsed["risk_matrix"], labels);
    let recommendation = parse_recommendation(&parsed["recommendation"], labels);

    ComparisonReport {
        summary,
        strengths,
        weaknesses,
        recommendation,
        risk_matrix,
    }
}

/// Per-label string lists, placeholder-filled so every known label is present.
/// Model-invented labels are dropped.
fn labeled_lists(
    value: &serde_json::Value,
    labels: &[String],
    placeholder: &str,
) -> BTreeMap<String, Vec<String>> {
    labels
        .iter()
        .map(|label| {
            let entries = value
                .get(label)
                .and_then(extract::string_list)
                .unwrap_or_else(|| vec![placeholder.to_string()]);
            (label.clone(), entries)
        })
        .collect()
}

/// Per-label risk rows; missing labels and unreadable scores go neutral.
fn labeled_risk_rows(
    value: &serde_json::Value,
    labels: &[String],
) -> BTreeMap<String, RiskScores> {
    labels
        .iter()
        .map(|label| {
            let row = match value.get(label) {
                Some(row) => RiskScores {
                    legal: extract::score_in_range(&row["legal"]).unwrap_or(NEUTRAL_RISK_SCORE),
                    financial: extract::score_in_range(&row["financial"])
                        .unwrap_or(NEUTRAL_RISK_SCORE),
                    operational: extract::score_in_range(&row["operational"])
                        .unwrap_or(NEUTRAL_RISK_SCORE),
                },
                None => RiskScores::neutral(),
            };
            (label.clone(), row)
        })
        .collect()
}

/// Lenient read of the recommendation object. The preferred label is matched
/// case-insensitively against the known labels and canonicalized; anything
/// unrecognized falls back to the first label.
fn parse_recommendation(value: &serde_json::Value, labels: &[String]) -> Recommendation {
    let preferred = value["preferred"]
        .as_str()
        .map(str::trim)
        .and_then(|candidate| {
            labels
                .iter()
                .find(|label| label.eq_ignore_ascii_case(candidate))
                .cloned()
        })
        .or_else(|| labels.first().cloned())
        .unwrap_or_default();

    let reasoning = value["reasoning"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| FALLBACK_REASONING.to_string());

    let improvements = extract::string_list(&value["improvements"])
        .unwrap_or_else(|| vec![FALLBACK_IMPROVEMENT.to_string()]);

    Recommendation {
        preferred,
        reasoning,
        improvements,
    }
}
