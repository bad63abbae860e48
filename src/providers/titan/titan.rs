use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, RwLock};

use crate::aws::BedrockRuntime;
use crate::config::ModelConfig;
use crate::providers::traits::CompletionProvider;

/// Output dimensions of amazon.titan-embed-text-v2:0.
pub const EMBEDDING_DIMS: usize = 1024;

/// Titan text-generation and embedding client.
///
/// Covers the second half of the model factory: plain text generation via
/// the Titan text model and vectors via the Titan embedding model.
#[derive(Clone)]
pub struct TitanProvider {
    runtime: BedrockRuntime,
    text_model_id: String,
    embedding_model_id: String,
    system_message: Arc<RwLock<String>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

impl TitanProvider {
    pub fn new(runtime: BedrockRuntime, config: &ModelConfig, system_message: String) -> Self {
        Self {
            runtime,
            text_model_id: config.text_model_id.clone(),
            embedding_model_id: config.embedding_model_id.clone(),
            system_message: Arc::new(RwLock::new(system_message)),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

#[async_trait]
impl CompletionProvider for TitanProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "inputText": prompt,
            "textGenerationConfig": {
                "maxTokenCount": self.max_tokens,
                "temperature": self.temperature,
                "topP": self.top_p
            }
        });

        let response_json = self.runtime.invoke_model(&self.text_model_id, &body).await?;

        response_json
            .get("results")
            .and_then(|results| results.get(0))
            .and_then(|result| result.get("outputText"))
            .and_then(|text| text.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                let debug_json = serde_json::to_string_pretty(&response_json).unwrap_or_default();
                anyhow!("Invalid response format. Response JSON: {}", debug_json)
            })
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let body = json!({ "inputText": text });

        let response_json = self
            .runtime
            .invoke_model(&self.embedding_model_id, &body)
            .await?;

        let embedding: Vec<f32> = response_json
            .get("embedding")
            .and_then(|e| e.as_array())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_f64())
                    .map(|v| v as f32)
                    .collect()
            })
            .ok_or_else(|| anyhow!("Embedding response missing 'embedding' array"))?;

        if embedding.len() != EMBEDDING_DIMS {
            return Err(anyhow!(
                "Generated embedding has wrong size: {} (expected {})",
                embedding.len(),
                EMBEDDING_DIMS
            ));
        }

        Ok(embedding)
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok(format!("{} + {}", self.text_model_id, self.embedding_model_id))
    }

    fn get_system_message(&self) -> String {
        self.system_message.read().unwrap().clone()
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
        Box::new(self.clone())
    }
}
