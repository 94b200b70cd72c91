//! Rule-based well-being advice lookup.
//!
//! Keyword checks run in a fixed priority order (stress, then sadness, then
//! tiredness) so that exactly one tip is selected per input. Matching is a
//! case-insensitive substring test with a general-routine fallback.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::{Tool, ToolError};

const STRESS_TIP: &str = "Try deep breathing, take short breaks, and get enough sleep.";
const SADNESS_TIP: &str =
    "Talk to someone you trust, go for a short walk, and do something you enjoy.";
const TIREDNESS_TIP: &str = "Make sure you're hydrated and get proper rest.";
const DEFAULT_TIP: &str =
    "Maintain a balanced routine with proper sleep, hydration, and light exercise.";

/// Selects a well-being tip for the given message.
pub fn advice(user_input: &str) -> &'static str {
    let text = user_input.to_lowercase();
    if text.contains("stress") {
        STRESS_TIP
    } else if text.contains("sad") {
        SADNESS_TIP
    } else if text.contains("tired") {
        TIREDNESS_TIP
    } else {
        DEFAULT_TIP
    }
}

/// Tool exposing the advice lookup to the LLM.
pub struct HealthTipTool;

impl HealthTipTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HealthTipTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for HealthTipTool {
    fn name(&self) -> &str {
        "health_tip"
    }

    fn description(&self) -> &str {
        "Provides simple mental and physical well-being advice based on the user's message."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "user_input": {
                    "type": "string",
                    "description": "The user's message to match advice against"
                }
            },
            "required": ["user_input"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<String, ToolError> {
        let user_input = args
            .get("user_input")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ToolError::InvalidArguments("Missing 'user_input' parameter".to_string())
            })?;

        let tip = advice(user_input);
        debug!("health_tip: matched tip for {} chars of input", user_input.len());
        Ok(tip.to_string())
    }
}
