use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, RwLock};

use crate::aws::BedrockRuntime;
use crate::config::ModelConfig;
use crate::providers::traits::CompletionProvider;

/// Conversational model client (Anthropic messages API over Bedrock).
#[derive(Clone)]
pub struct ClaudeProvider {
    runtime: BedrockRuntime,
    model_id: String,
    system_message: Arc<RwLock<String>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

impl ClaudeProvider {
    pub fn new(runtime: BedrockRuntime, config: &ModelConfig, system_message: String) -> Self {
        Self {
            runtime,
            model_id: config.chat_model_id.clone(),
            system_message: Arc::new(RwLock::new(system_message)),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

#[async_trait]
impl CompletionProvider for ClaudeProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let system_message = self
            .system_message
            .read()
            .map_err(|e| anyhow!("Failed to read system message: {}", e))?
            .clone();

        let body = json!({
            "anthropic_version": "bedrock-2023-05-31",
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "top_p": self.top_p,
            "system": system_message,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response_json = self.runtime.invoke_model(&self.model_id, &body).await?;

        response_json
            .get("content")
            .and_then(|content| content.get(0))
            .and_then(|block| block.get("text"))
            .and_then(|text| text.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                let debug_json = serde_json::to_string_pretty(&response_json).unwrap_or_default();
                anyhow!("Invalid response format. Response JSON: {}", debug_json)
            })
    }

    async fn generate_embedding(&self, _text: &str) -> Result<Vec<f32>> {
        Err(anyhow!(
            "{} does not expose an embeddings API; use the Titan embedding model",
            self.model_id
        ))
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok(self.model_id.clone())
    }

    fn get_system_message(&self) -> String {
        self.system_message.read().unwrap().clone()
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
        Box::new(self.clone())
    }
}
