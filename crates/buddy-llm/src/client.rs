//! Chat completion client with tool-calling support.

use std::time::Instant;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        FunctionCall, FunctionObject,
    },
    Client,
};
use tracing::info;

use buddy_core::{AgentError, ModelConfig, ToolCall, ToolSchema};

/// Token usage and timing metrics from an LLM call.
#[derive(Debug, Clone, Default)]
pub struct LlmMetrics {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub elapsed_ms: u64,
}

/// Complete response from an LLM call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub metrics: LlmMetrics,
}

/// Response from a tool-enabled chat: either final content or tool calls to run.
pub enum ChatResponse {
    Content(LlmResponse),
    ToolCalls { calls: Vec<ToolCall>, metrics: LlmMetrics },
}

/// Converts any error into an AgentError::LlmError.
fn llm_err(e: impl ToString) -> AgentError {
    AgentError::LlmError(e.to_string())
}

/// Parses a provider tool call into the domain type.
fn parse_tool_call(id: String, name: String, arguments: &str) -> Result<ToolCall, AgentError> {
    let arguments: serde_json::Value = serde_json::from_str(arguments)?;
    Ok(ToolCall { id, name, arguments })
}

/// Client for OpenAI-compatible chat completion APIs.
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl LlmClient {
    /// Creates a client for the given model config and API key.
    pub fn new(model: &ModelConfig, api_key: &str) -> Self {
        let config = match model.api_base.as_deref() {
            Some(base) => OpenAIConfig::new().with_api_base(base).with_api_key(api_key),
            None => OpenAIConfig::new().with_api_key(api_key),
        };

        Self {
            client: Client::with_config(config),
            model: model.model.clone(),
            temperature: model.temperature,
        }
    }

    /// Sends a chat request and returns the complete response.
    pub async fn chat(
        &self,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<LlmResponse, AgentError> {
        let messages = vec![Self::user_message(user_input)?];
        match self.chat_with_tools(system_prompt, messages, &[]).await? {
            ChatResponse::Content(response) => Ok(response),
            ChatResponse::ToolCalls { .. } => {
                Err(AgentError::LlmError("Unexpected tool calls without tools".into()))
            }
        }
    }

    /// Sends a chat request with tools and returns content or tool calls.
    pub async fn chat_with_tools(
        &self,
        system_prompt: &str,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: &[ToolSchema],
    ) -> Result<ChatResponse, AgentError> {
        let start = Instant::now();

        let openai_tools: Vec<ChatCompletionTool> = tools
            .iter()
            .map(|t| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: t.name.clone(),
                    description: Some(t.description.clone()),
                    parameters: Some(t.parameters.clone()),
                    strict: None,
                },
            })
            .collect();

        let mut all_messages = vec![ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(llm_err)?,
        )];
        all_messages.extend(messages);

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model).messages(all_messages);

        if let Some(temperature) = self.temperature {
            request_builder.temperature(temperature);
        }
        if !openai_tools.is_empty() {
            request_builder.tools(openai_tools);
        }

        let request = request_builder.build().map_err(llm_err)?;
        let response = self.client.chat().create(request).await.map_err(llm_err)?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let (input_tokens, output_tokens) = response
            .usage
            .as_ref()
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        let metrics = LlmMetrics { input_tokens, output_tokens, elapsed_ms };

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::LlmError("No response choices".into()))?;

        if let Some(tool_calls) = choice.message.tool_calls {
            if !tool_calls.is_empty() {
                let calls = tool_calls
                    .into_iter()
                    .map(|tc| parse_tool_call(tc.id, tc.function.name, &tc.function.arguments))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(ChatResponse::ToolCalls { calls, metrics });
            }
        }

        let content = choice
            .message
            .content
            .ok_or_else(|| AgentError::LlmError("No response content".into()))?;

        info!("LLM: {}ms, tokens: {}/{} (in/out)", elapsed_ms, input_tokens, output_tokens);

        Ok(ChatResponse::Content(LlmResponse { content, metrics }))
    }

    /// Helper to build a user message.
    pub fn user_message(content: &str) -> Result<ChatCompletionRequestMessage, AgentError> {
        Ok(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()
                .map_err(llm_err)?,
        ))
    }

    /// Helper to build an assistant message echoing requested tool calls.
    pub fn assistant_tool_calls_message(
        calls: &[ToolCall],
    ) -> Result<ChatCompletionRequestMessage, AgentError> {
        let tool_calls: Vec<ChatCompletionMessageToolCall> = calls
            .iter()
            .map(|c| ChatCompletionMessageToolCall {
                id: c.id.clone(),
                r#type: ChatCompletionToolType::Function,
                function: FunctionCall {
                    name: c.name.clone(),
                    arguments: c.arguments.to_string(),
                },
            })
            .collect();

        Ok(ChatCompletionRequestMessage::Assistant(
            ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls)
                .build()
                .map_err(llm_err)?,
        ))
    }

    /// Helper to build a tool result message.
    pub fn tool_result_message(
        tool_call_id: &str,
        content: &str,
    ) -> Result<ChatCompletionRequestMessage, AgentError> {
        Ok(ChatCompletionRequestMessage::Tool(
            ChatCompletionRequestToolMessageArgs::default()
                .tool_call_id(tool_call_id)
                .content(content)
                .build()
                .map_err(llm_err)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_call_valid_arguments() {
        let call = parse_tool_call(
            "call_1".into(),
            "health_tip".into(),
            r#"{"user_input":"I'm stressed"}"#,
        )
        .unwrap();
        assert_eq!(call.name, "health_tip");
        assert_eq!(call.arguments["user_input"], "I'm stressed");
    }

    #[test]
    fn test_parse_tool_call_malformed_arguments_is_parse_error() {
        let err = parse_tool_call("call_1".into(), "health_tip".into(), "{not json").unwrap_err();
        assert!(matches!(err, AgentError::ParseError(_)));
    }
}
