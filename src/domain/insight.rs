//! Single-document insight synthesis.
//!
//! [`parse_insight`] turns raw model output into an [`InsightReport`] and is
//! total: malformed output degrades to a deterministic fallback shape instead
//! of an error, so callers can always trust the result structure. Degradations
//! are logged, never thrown.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::extract;

/// Neutral mid-scale risk score used whenever the model gave none.
pub const NEUTRAL_RISK_SCORE: u8 = 5;

/// Placeholder finding for degraded results.
pub const FALLBACK_FINDING: &str =
    "No se pudieron extraer hallazgos estructurados de la respuesta.";

/// Placeholder recommendation for degraded results.
pub const FALLBACK_RECOMMENDATION: &str =
    "Revisar el análisis completo incluido en el resumen.";

/// Placeholder risk factor for degraded results.
pub const FALLBACK_RISK_FACTOR: &str = "Evaluación de riesgo automática no disponible.";

/// Qualitative risk level of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Parses a model-provided level, tolerating Spanish and casing drift.
    ///
    /// The prompt asks for `low|medium|high`, but a model instructed to write
    /// Spanish regularly answers `bajo|medio|alto` anyway.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "bajo" | "baja" => Some(RiskLevel::Low),
            "medium" | "medio" | "media" | "moderado" | "moderada" => Some(RiskLevel::Medium),
            "high" | "alto" | "alta" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}

/// Risk assessment section of an insight report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Qualitative level.
    pub level: RiskLevel,
    /// Score on a 1..=10 scale.
    pub score: u8,
    /// Factors supporting the assessment.
    pub factors: Vec<String>,
}

impl RiskAssessment {
    /// The neutral assessment used when nothing could be extracted.
    pub fn neutral() -> Self {
        Self {
            level: RiskLevel::Medium,
            score: NEUTRAL_RISK_SCORE,
            factors: vec![FALLBACK_RISK_FACTOR.to_string()],
        }
    }
}

/// Structured analysis of one tender document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightReport {
    /// Executive summary (or the raw response verbatim when degraded).
    pub summary: String,
    /// Key findings, never empty.
    pub key_findings: Vec<String>,
    /// Recommendations, never empty.
    pub recommendations: Vec<String>,
    /// Risk assessment.
    pub risk: RiskAssessment,
}

impl InsightReport {
    /// The deterministic degraded shape: the raw response survives verbatim
    /// as the summary, every other field takes its placeholder.
    pub fn fallback(raw_text: &str) -> Self {
        Self {
            summary: raw_text.to_string(),
            key_findings: vec![FALLBACK_FINDING.to_string()],
            recommendations: vec![FALLBACK_RECOMMENDATION.to_string()],
            risk: RiskAssessment::neutral(),
        }
    }
}

/// Result of a document-insight operation.
///
/// Structured mode produces a parsed [`InsightReport`]; question mode returns
/// the model's markdown verbatim. Callers branch on the variant; neither arm
/// is ever a parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DocumentInsight {
    /// Parsed (possibly degraded) structured report.
    Structured(InsightReport),
    /// Free-form markdown answer.
    Markdown(String),
}

impl DocumentInsight {
    /// Returns true for the structured arm.
    pub fn is_structured(&self) -> bool {
        matches!(self, DocumentInsight::Structured(_))
    }
}

/// Parses raw model output into an [`InsightReport`]. Total: never fails.
///
/// Attempts a JSON parse of the extracted payload; on success reads each
/// field leniently with per-field placeholders, on failure returns
/// [`InsightReport::fallback`] with the raw text as summary.
pub fn parse_insight(raw: &str) -> InsightReport {
    let candidate = match extract::extract_json_payload(raw) {
        Some(payload) => payload,
        None => {
            warn!(response_len = raw.len(), "insight response carried no JSON payload, degrading");
            return InsightReport::fallback(raw);
        }
    };

    let parsed: serde_json::Value = match serde_json::from_str(candidate) {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, "insight payload failed to parse, degrading");
            return InsightReport::fallback(raw);
        }
    };

    if !parsed.is_object() {
        warn!("insight payload was not a JSON object, degrading");
        return InsightReport::fallback(raw);
    }

    let summary = parsed["summary"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| raw.to_string());

    let key_findings = extract::string_list(&parsed["key_findings"])
        .unwrap_or_else(|| vec![FALLBACK_FINDING.to_string()]);

    let recommendations = extract::string_list(&parsed["recommendations"])
        .unwrap_or_else(|| vec![FALLBACK_RECOMMENDATION.to_string()]);

    // Tolerate both the schema key and the shorthand models drift toward.
    let null = serde_json::Value::Null;
    let risk_value = parsed
        .get("risk_assessment")
        .or_else(|| parsed.get("risk"))
        .unwrap_or(&null);

    InsightReport {
        summary,
        key_findings,
        recommendations,
        risk: parse_risk(risk_value),
    }
}

/// Lenient read of a risk-assessment object; every field has a default.
fn parse_risk(value: &serde_json::Value) -> RiskAssessment {
    let level = value["level"]
        .as_str()
        .and_then(RiskLevel::parse_lenient)
        .unwrap_or(RiskLevel::Medium);

    let score = extract::score_in_range(&value["score"]).unwrap_or(NEUTRAL_RISK_SCORE);

    let factors = extract::string_list(&value["factors"])
        .unwrap_or_else(|| vec![FALLBACK_RISK_FACTOR.to_string()]);

    RiskAssessment { level, score, factors }
}
