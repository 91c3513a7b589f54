//! AI-result decoder
//!
//! The backend's AI step sometimes returns structured JSON embedded as a
//! markdown-fenced string inside the `summary` text field, and sometimes
//! plain prose. `decode` normalizes both into a `DecodedInsight` without
//! the caller needing to know which it got. Pure and infallible: malformed
//! input degrades to defaults, it never errors.

use adaudit_common::types::{AnalysisJson, DecodedInsight, RiskLevel};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Structured payload the AI sometimes embeds inside the summary string
///
/// Findings turn up under several keys depending on the upstream prompt;
/// precedence is findings → points → suggestions.
#[derive(Debug, Deserialize)]
struct EmbeddedAnalysis {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    risk: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    findings: Option<Value>,
    #[serde(default)]
    points: Option<Value>,
    #[serde(default)]
    suggestions: Option<Value>,
}

/// Decode an audit's analysis payload into an always-valid insight
pub fn decode(analysis: Option<&AnalysisJson>) -> DecodedInsight {
    let Some(analysis) = analysis else {
        return DecodedInsight::default();
    };

    let outer_summary = analysis.summary.clone().unwrap_or_default();
    let mut insight = DecodedInsight {
        summary: outer_summary.clone(),
        risk: analysis
            .risk
            .as_deref()
            .map(RiskLevel::from_label)
            .unwrap_or_default(),
        confidence: analysis.confidence.unwrap_or(0.0),
        findings: Vec::new(),
    };

    // Only text containing a `{` can hold embedded JSON; everything else is
    // plain prose used verbatim.
    if !outer_summary.contains('{') {
        return insight;
    }

    match parse_embedded(&outer_summary) {
        Some(parsed) => {
            if let Some(summary) = parsed.summary {
                insight.summary = summary;
            }
            if let Some(risk) = parsed.risk {
                insight.risk = RiskLevel::from_label(&risk);
            }
            if let Some(confidence) = parsed.confidence {
                insight.confidence = confidence;
            }
            let raw_findings = [parsed.findings, parsed.points, parsed.suggestions]
                .into_iter()
                .flatten()
                .find(|v| !v.is_null());
            if let Some(raw) = raw_findings {
                insight.findings = normalize_findings(raw);
            }
        }
        None => {
            // Not valid structured data after all: the raw text stands as
            // the display summary
            debug!("Embedded analysis parse failed, using raw summary text");
        }
    }

    insight
}

/// Strip markdown code-fence markers, returning the text unchanged when
/// none are present
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Fallible structured-decode step: `None` means "no structured data"
fn parse_embedded(text: &str) -> Option<EmbeddedAnalysis> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(&cleaned).ok()
}

/// Coerce a findings value into a list of display strings
///
/// Non-list values wrap as a single-element list of their string form.
fn normalize_findings(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().map(value_to_display).collect(),
        other => vec![value_to_display(other)],
    }
}

fn value_to_display(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
