//! Core domain types and error definitions.
//!
//! This crate defines the fundamental types shared across the companion
//! system: errors, model configuration, and the tool-call types used for
//! LLM function calling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during agent operations.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    LlmError(String),

    #[error("Failed to parse structured output: {0}")]
    ParseError(String),

    #[error("Tool execution failed: {0}")]
    ToolFailed(String),

    #[error("Crew has no tasks to execute")]
    EmptyCrew,

    #[error("Max tool iterations exceeded")]
    MaxToolIterations,
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::ParseError(err.to_string())
    }
}

/// Configuration for an LLM model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    pub name: String,
    pub model: String,
    pub api_base: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Schema for a tool, used for LLM function calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool invocation requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_temperature_defaults_to_none() {
        let config: ModelConfig = serde_json::from_str(
            r#"{"id":"gemini-flash","name":"Gemini 2.5 Flash","model":"gemini-2.5-flash","api_base":null}"#,
        )
        .unwrap();
        assert!(config.temperature.is_none());
    }

    #[test]
    fn test_agent_error_from_serde() {
        let err = serde_json::from_str::<ModelConfig>("not json").unwrap_err();
        let agent_err: AgentError = err.into();
        assert!(matches!(agent_err, AgentError::ParseError(_)));
    }

    #[test]
    fn test_tool_call_roundtrip() {
        let call = ToolCall {
            id: "call_1".into(),
            name: "health_tip".into(),
            arguments: serde_json::json!({"user_input": "I'm stressed"}),
        };
        let json = serde_json::to_string(&call).unwrap();
        let back: ToolCall = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "health_tip");
        assert_eq!(back.arguments["user_input"], "I'm stressed");
    }
}
