//! JSON-contract enforcement for model output.
//!
//! Model responses are expected to be valid JSON but frequently are not.
//! `ensure_valid_json` always produces a structured result: the parsed value,
//! the value salvaged from the first `{`..last `}` substring, or a typed
//! fallback carrying the raw text for diagnosis. Malformed output is never an
//! error and never aborts the pipeline.

use serde::Serialize;
use serde_json::Value;

/// Outcome of coercing a model response into the JSON contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValidatedJson {
    /// The response (or its salvaged substring) parsed cleanly.
    Parsed(Value),
    /// Nothing parseable; the raw text is preserved inside the fallback.
    Fallback(ContractFallback),
}

impl ValidatedJson {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ValidatedJson::Fallback(_))
    }
}

/// Diagnostic shape returned when a response cannot be coerced into JSON or
/// when the exchange itself failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractFallback {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    pub fallback_analysis: FallbackAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackAnalysis {
    pub primary_opportunity: FallbackOpportunity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_validation: Option<FallbackMarketValidation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackOpportunity {
    pub name: String,
    pub description: String,
    pub target_market: String,
    pub required_technologies: Vec<String>,
    pub competitive_advantage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FallbackMarketValidation {
    pub demand_signals: Vec<String>,
    pub skill_requirements: Vec<String>,
    pub target_industries: Vec<String>,
}

impl ContractFallback {
    /// Fallback for a response that could not be parsed as JSON.
    pub fn parse_failure(raw_response: &str) -> Self {
        Self {
            error: "Failed to parse model response as JSON".to_string(),
            raw_response: Some(raw_response.to_string()),
            fallback_analysis: FallbackAnalysis {
                primary_opportunity: FallbackOpportunity {
                    name: "Error in analysis".to_string(),
                    description: "Failed to parse model response".to_string(),
                    target_market: "Unknown".to_string(),
                    required_technologies: Vec::new(),
                    competitive_advantage: "Unknown".to_string(),
                },
                market_validation: Some(FallbackMarketValidation::default()),
            },
        }
    }

    /// Fallback for an exchange that failed before producing a response.
    pub fn exchange_failure(message: &str) -> Self {
        let description = format!("Analysis failed: {message}");
        Self {
            error: description.clone(),
            raw_response: None,
            fallback_analysis: FallbackAnalysis {
                primary_opportunity: FallbackOpportunity {
                    name: "Error in analysis".to_string(),
                    description,
                    target_market: "Unknown".to_string(),
                    required_technologies: Vec::new(),
                    competitive_advantage: "Unknown".to_string(),
                },
                market_validation: None,
            },
        }
    }
}

/// Coerces a model response into the JSON contract.
///
/// Strategy: direct parse; then the substring from the first `{` to the last
/// `}` (salvages responses wrapped in prose or code fences); then the typed
/// fallback with the raw text preserved verbatim.
pub fn ensure_valid_json(text: &str) -> ValidatedJson {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return ValidatedJson::Parsed(value);
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if end > start {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                return ValidatedJson::Parsed(value);
            }
        }
    }

    ValidatedJson::Fallback(ContractFallback::parse_failure(text))
}
