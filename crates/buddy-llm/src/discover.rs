//! Model listing against the OpenAI-compatible endpoint.
//!
//! Used at startup to verify the API base is reachable and the key is valid
//! before the first chat request arrives.

use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use buddy_core::AgentError;

/// Response from the /models endpoint.
#[derive(Debug, Deserialize)]
struct ModelListResponse {
    data: Vec<ModelEntry>,
}

/// A single model entry.
#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Lists model IDs available at the given API base.
pub async fn list_models(api_base: &str, api_key: &str) -> Result<Vec<String>, AgentError> {
    let client = Client::new();
    let url = format!("{}/models", api_base.trim_end_matches('/'));

    let response = client
        .get(&url)
        .bearer_auth(api_key)
        .timeout(std::time::Duration::from_secs(5))
        .send()
        .await
        .map_err(|e| AgentError::LlmError(format!("Model listing failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(AgentError::LlmError(format!(
            "Model listing failed: HTTP {}",
            response.status()
        )));
    }

    let list: ModelListResponse = response
        .json()
        .await
        .map_err(|e| AgentError::LlmError(format!("Failed to parse model list: {}", e)))?;

    let models: Vec<String> = list.data.into_iter().map(|m| m.id).collect();
    info!("Listed {} models", models.len());
    Ok(models)
}
