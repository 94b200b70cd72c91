//! Data transfer objects for HTTP message serialization.

use serde::{Deserialize, Serialize};

/// Request body for the chat endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Response body carrying the generated reply.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_deserializes_message() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"I'm stressed"}"#).unwrap();
        assert_eq!(req.message, "I'm stressed");
    }

    #[test]
    fn test_chat_request_missing_message_defaults_to_empty() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.message, "");
    }

    #[test]
    fn test_chat_reply_serializes_with_reply_key() {
        let json = serde_json::to_value(ChatReply { reply: "hi there".into() }).unwrap();
        assert_eq!(json["reply"], "hi there");
    }
}
