//! JSON reporter
//!
//! Pretty-printed JSON of any serializable record, for piping to jq.

use anyhow::Result;
use serde::Serialize;

pub fn render<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Single-line JSON
pub fn render_compact<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_result;

    #[test]
    fn test_json_render_valid() {
        let result = test_result();
        let json_str = render(&result).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["influencer_name"], "Test Trader");
        assert_eq!(parsed["explanation"]["source"], "template");
        assert!(parsed["credibility"]["flags"]["overconfident"].is_boolean());
    }

    #[test]
    fn test_predictions_live_under_evidence() {
        let parsed = serde_json::to_value(test_result()).expect("serialize result");
        let predictions = parsed["evidence"]["predictions"].as_array().unwrap();
        assert_eq!(predictions.len(), 1);
        assert!(predictions[0].as_str().unwrap().contains("$100k by the end"));
        assert!(parsed.get("predictions").is_none());
    }

    #[test]
    fn test_json_render_compact() {
        let json_str = render_compact(&test_result()).expect("render compact JSON");
        assert!(!json_str.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["channel_id"], "UCtest");
    }
}
