//! Reasoning-service seam
//!
//! The battle engine only needs "send a system and user prompt, get text
//! back". Everything else (model choice, auth, proxies, retries) belongs to
//! the implementation behind [`ReasoningService`].

use crate::core::error::Result;
use crate::llm::parser::decode_structured;
use serde::de::DeserializeOwned;

/// One request to the reasoning service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt<'a> {
    pub system: &'a str,
    pub user: &'a str,
    /// Ask the transport for JSON-only output when it supports it
    pub expect_json: bool,
}

impl<'a> Prompt<'a> {
    pub fn text(system: &'a str, user: &'a str) -> Self {
        Self {
            system,
            user,
            expect_json: false,
        }
    }

    pub fn json(system: &'a str, user: &'a str) -> Self {
        Self {
            system,
            user,
            expect_json: true,
        }
    }
}

/// Anything that can answer a prompt with raw text
///
/// Implementations return `ArenaError::Generation` on transport failure.
#[allow(async_fn_in_trait)]
pub trait ReasoningService {
    async fn complete(&self, prompt: &Prompt<'_>) -> Result<String>;
}

/// A type the reasoning service can be asked to produce as JSON
pub trait ResponseSchema: DeserializeOwned {
    /// JSON Schema shown to the model
    fn schema() -> serde_json::Value;

    /// Range/sanity checks beyond what decoding enforces
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Free-text request; the raw response is returned trimmed
pub async fn generate_text<S: ReasoningService>(
    service: &S,
    system: &str,
    user: &str,
) -> Result<String> {
    let response = service.complete(&Prompt::text(system, user)).await?;
    Ok(response.trim().to_string())
}

/// Schema-bound request
///
/// Appends the schema to the system prompt, requests JSON mode, then
/// decodes and validates the response. Any failure along the way is an
/// `ArenaError::Generation`.
pub async fn generate_structured<T: ResponseSchema, S: ReasoningService>(
    service: &S,
    system: &str,
    user: &str,
) -> Result<T> {
    let system = with_schema_instructions(system, &T::schema());
    let response = service.complete(&Prompt::json(&system, user)).await?;
    decode_structured(&response)
}

fn with_schema_instructions(system: &str, schema: &serde_json::Value) -> String {
    let schema_text =
        serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    let instructions = format!(
        "Respond ONLY with a valid JSON object that strictly adheres to the following JSON Schema. \
         Do not include any other text, explanations, or markdown formatting.\n{}",
        schema_text
    );
    if system.trim().is_empty() {
        instructions
    } else {
        format!("{}\n\n{}", system.trim_end(), instructions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ArenaError;
    use serde::Deserialize;
    use std::sync::Mutex;

    /// Replays one canned response and records every prompt it sees
    struct Canned {
        response: std::result::Result<String, String>,
        seen: Mutex<Vec<(String, String, bool)>>,
    }

    impl Canned {
        fn ok(text: &str) -> Self {
            Self {
                response: Ok(text.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                response: Err(reason.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ReasoningService for Canned {
        async fn complete(&self, prompt: &Prompt<'_>) -> Result<String> {
            self.seen.lock().unwrap().push((
                prompt.system.to_string(),
                prompt.user.to_string(),
                prompt.expect_json,
            ));
            self.response.clone().map_err(ArenaError::Generation)
        }
    }

    #[derive(Debug, Deserialize)]
    struct Score {
        value: i32,
    }

    impl ResponseSchema for Score {
        fn schema() -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": { "value": { "type": "integer", "minimum": 0 } },
                "required": ["value"]
            })
        }

        fn validate(&self) -> Result<()> {
            if self.value < 0 {
                return Err(ArenaError::Generation("negative value".into()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_generate_text_trims() {
        let service = Canned::ok("  I see a wary foe.\n");
        let text = generate_text(&service, "sys", "user").await.unwrap();
        assert_eq!(text, "I see a wary foe.");
        assert!(!service.seen.lock().unwrap()[0].2);
    }

    #[tokio::test]
    async fn test_structured_appends_schema_and_requests_json() {
        let service = Canned::ok(r#"Sure! {"value": 7}"#);
        let score: Score = generate_structured(&service, "Rate it.", "now")
            .await
            .unwrap();
        assert_eq!(score.value, 7);

        let seen = service.seen.lock().unwrap();
        let (system, user, expect_json) = &seen[0];
        assert!(system.starts_with("Rate it."));
        assert!(system.contains("\"required\""));
        assert_eq!(user, "now");
        assert!(*expect_json);
    }

    #[tokio::test]
    async fn test_structured_runs_validation() {
        let service = Canned::ok(r#"{"value": -1}"#);
        let result: Result<Score> = generate_structured(&service, "", "").await;
        assert!(matches!(result, Err(ArenaError::Generation(_))));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let service = Canned::failing("connection reset");
        let result: Result<Score> = generate_structured(&service, "", "").await;
        assert!(result.unwrap_err().is_generation());
    }

    #[test]
    fn test_schema_only_system_prompt() {
        let text = with_schema_instructions("   ", &serde_json::json!({"type": "object"}));
        assert!(text.starts_with("Respond ONLY"));
    }
}
