//! Decode structured responses from the reasoning service
//!
//! Models do not always honor "JSON only": responses may arrive wrapped in
//! prose or markdown fences. We take everything from the first `{` to the
//! last `}` and decode that strictly into the requested type.

use crate::core::error::{ArenaError, Result};
use crate::llm::service::ResponseSchema;

/// Extract JSON object from LLM response (handles surrounding text)
pub fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| ArenaError::Generation("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| ArenaError::Generation("No closing brace found in response".into()))?;
    if end < start {
        return Err(ArenaError::Generation(
            "Closing brace precedes opening brace".into(),
        ));
    }
    Ok(&response[start..=end])
}

/// Extract, decode and validate a schema-bound response
///
/// Decode and validation failures are reported as generation errors so the
/// caller handles them exactly like a transport failure.
pub fn decode_structured<T: ResponseSchema>(response: &str) -> Result<T> {
    let json_str = extract_json(response)?;
    let value: T = serde_json::from_str(json_str).map_err(|e| {
        ArenaError::Generation(format!(
            "Failed to decode response: {} - Response: {}",
            e, response
        ))
    })?;
    value
        .validate()
        .map_err(|e| ArenaError::Generation(format!("Response failed validation: {}", e)))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Pair {
        left: String,
        right: i32,
    }

    impl ResponseSchema for Pair {
        fn schema() -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }

        fn validate(&self) -> Result<()> {
            if self.right > 10 {
                return Err(ArenaError::Validation("right too large".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_extract_json_simple() {
        let response = r#"{"action": "Frost Blade", "power": 12}"#;
        let json = extract_json(response).unwrap();
        assert_eq!(json, response);
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = r#"Here is the move:
```json
{"action": "Shadow Step", "power": 0}
```
Good luck!"#;
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(json.contains("Shadow Step"));
    }

    #[test]
    fn test_extract_json_no_json() {
        let result = extract_json("The golem stares blankly.");
        assert!(matches!(result, Err(ArenaError::Generation(_))));
    }

    #[test]
    fn test_extract_json_reversed_braces() {
        assert!(extract_json("} nothing here {").is_err());
    }

    #[test]
    fn test_decode_structured() {
        let pair: Pair = decode_structured(r#"ok {"left": "a", "right": 3} done"#).unwrap();
        assert_eq!(pair.left, "a");
        assert_eq!(pair.right, 3);
    }

    #[test]
    fn test_decode_missing_field_is_generation_error() {
        let result: Result<Pair> = decode_structured(r#"{"left": "a"}"#);
        assert!(matches!(result, Err(ArenaError::Generation(_))));
    }

    #[test]
    fn test_decode_wrong_type_is_generation_error() {
        let result: Result<Pair> = decode_structured(r#"{"left": "a", "right": "three"}"#);
        assert!(matches!(result, Err(ArenaError::Generation(_))));
    }

    #[test]
    fn test_validation_failure_becomes_generation_error() {
        let result: Result<Pair> = decode_structured(r#"{"left": "a", "right": 30}"#);
        assert!(matches!(result, Err(ArenaError::Generation(_))));
    }
}
