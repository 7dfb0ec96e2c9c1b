//! Query outcome payload and fallback responses.

use assist_store::types::SourceRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one assistant query.
///
/// Successful queries carry the answer, citations, and timing; failed
/// queries carry a localized fallback message with `error` set. The
/// pipeline never surfaces an Err to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub response: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(rename = "processingTime", skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
}

fn is_false(value: &bool) -> bool {
    !value
}

impl QueryOutcome {
    /// Fallback outcome for a failed query.
    pub fn fallback(language: &str) -> Self {
        Self {
            response: fallback_response(language).to_string(),
            sources: Vec::new(),
            confidence: None,
            processing_time_ms: None,
            language: None,
            timestamp: Utc::now(),
            error: true,
        }
    }
}

/// Localized apology used when the pipeline cannot produce an answer.
///
/// Unknown language codes fall back to English.
pub fn fallback_response(language: &str) -> &'static str {
    match language {
        "sw" => {
            "Nisamehe, lakini nina shida kuchakata ombi lako sasa. Tafadhali jaribu tena \
             baadaye au wasiliana na timu yetu ya msaada."
        }
        "lg" => {
            "Nsonyiwa, naye nnina obuzibu okuddamu ekiragiro kyo kati. Nsaba ogezaako \
             mulundi mulala oba otunuulire mu timu yaffe ey'obuyambi."
        }
        _ => {
            "I apologize, but I'm having trouble processing your request right now. Please \
             try again later or contact our support team for immediate assistance."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_language_table() {
        assert!(fallback_response("en").starts_with("I apologize"));
        assert!(fallback_response("sw").starts_with("Nisamehe"));
        assert!(fallback_response("lg").starts_with("Nsonyiwa"));
        // Unsupported codes get the English message
        assert_eq!(fallback_response("ar"), fallback_response("en"));
        assert_eq!(fallback_response("fr"), fallback_response("en"));
    }

    #[test]
    fn test_success_payload_has_no_error_field() {
        let outcome = QueryOutcome {
            response: "answer".to_string(),
            sources: vec![SourceRef::database("Registration Steps")],
            confidence: Some(0.8),
            processing_time_ms: Some(120),
            language: Some("en".to_string()),
            timestamp: Utc::now(),
            error: false,
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["processingTime"], 120);
        assert_eq!(json["sources"][0]["type"], "database");
    }

    #[test]
    fn test_fallback_payload_shape() {
        let outcome = QueryOutcome::fallback("sw");
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["error"], true);
        assert!(json.get("sources").is_none());
        assert!(json.get("processingTime").is_none());
        assert!(json.get("language").is_none());
        assert!(json.get("timestamp").is_some());
    }
}
