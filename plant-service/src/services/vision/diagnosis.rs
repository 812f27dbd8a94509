use crate::models::Severity;
use serde::{Deserialize, Serialize};

/// Instruction sent alongside every image.
pub const DIAGNOSIS_PROMPT: &str = "You are an expert plant pathologist. Examine the plant in this image \
and identify any disease, pest damage, or nutrient deficiency. Respond with a single JSON object and \
nothing else, using exactly these keys: \
\"diagnosis\" (string: the disease name, or \"Healthy\" if no problem is visible), \
\"confidence\" (number between 0 and 1), \
\"severity\" (one of \"none\", \"low\", \"moderate\", \"high\"), \
\"isHealthy\" (boolean), \
\"description\" (string: the visible symptoms and likely cause), \
\"treatment\" (string: recommended treatment and prevention steps).";

pub const UNKNOWN_DIAGNOSIS: &str = "Unknown";
pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_TREATMENT: &str = "No treatment recommendations available";

/// The model's verdict after defaults have been applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantDiagnosis {
    pub diagnosis: String,
    pub confidence: f64,
    pub severity: Severity,
    pub is_healthy: bool,
    pub description: String,
    pub treatment: String,
}

impl Default for PlantDiagnosis {
    fn default() -> Self {
        Self {
            diagnosis: UNKNOWN_DIAGNOSIS.to_string(),
            confidence: 0.0,
            severity: Severity::Unknown,
            is_healthy: false,
            description: NO_DESCRIPTION.to_string(),
            treatment: NO_TREATMENT.to_string(),
        }
    }
}

/// Whatever the model sent back; every field may be missing or mistyped.
#[derive(Debug, Deserialize)]
struct RawDiagnosis {
    #[serde(default, alias = "disease", alias = "diseaseName")]
    diagnosis: Option<serde_json::Value>,
    #[serde(default)]
    confidence: Option<serde_json::Value>,
    #[serde(default)]
    severity: Option<serde_json::Value>,
    #[serde(default, alias = "is_healthy", alias = "healthy")]
    #[serde(rename = "isHealthy")]
    is_healthy: Option<serde_json::Value>,
    #[serde(default)]
    description: Option<serde_json::Value>,
    #[serde(default, alias = "treatments", alias = "recommendation")]
    treatment: Option<serde_json::Value>,
}

/// Parse the model's text output, falling back field by field.
///
/// Markdown code fences are stripped first. Output that isn't a JSON object
/// yields the default diagnosis with the raw text kept as the description.
pub fn parse_diagnosis(text: &str) -> PlantDiagnosis {
    let body = strip_code_fence(text);

    let raw: RawDiagnosis = match serde_json::from_str(body) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "Vision model returned non-JSON output");
            let trimmed = text.trim();
            return PlantDiagnosis {
                description: if trimmed.is_empty() {
                    NO_DESCRIPTION.to_string()
                } else {
                    trimmed.to_string()
                },
                ..PlantDiagnosis::default()
            };
        }
    };

    let defaults = PlantDiagnosis::default();
    let severity = raw
        .severity
        .as_ref()
        .and_then(|v| v.as_str())
        .map(Severity::from_label)
        .unwrap_or(defaults.severity);

    PlantDiagnosis {
        diagnosis: non_empty_string(raw.diagnosis).unwrap_or(defaults.diagnosis),
        confidence: raw
            .confidence
            .as_ref()
            .and_then(as_number)
            .map(normalize_confidence)
            .unwrap_or(defaults.confidence),
        severity,
        is_healthy: raw
            .is_healthy
            .as_ref()
            .and_then(as_bool)
            .unwrap_or(defaults.is_healthy),
        description: non_empty_string(raw.description).unwrap_or(defaults.description),
        treatment: non_empty_string(raw.treatment).unwrap_or(defaults.treatment),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = match rest.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('{') => body,
        _ => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn non_empty_string(value: Option<serde_json::Value>) -> Option<String> {
    let text = match value? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn as_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Clamp to 0..=1, reading values in (1, 100] as percentages.
fn normalize_confidence(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let value = if value > 1.0 && value <= 100.0 {
        value / 100.0
    } else {
        value
    };
    value.clamp(0.0, 1.0)
}
