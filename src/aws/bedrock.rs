use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::aws::sigv4::SigV4Signer;
use crate::config::AwsConfig;

/// Low-level Bedrock runtime client shared by every model provider.
///
/// One signed POST per model invocation; non-2xx responses are surfaced
/// with status and body so credential and quota problems are readable.
#[derive(Clone)]
pub struct BedrockRuntime {
    client: Client,
    signer: SigV4Signer,
    host: String,
    endpoint: String,
}

impl BedrockRuntime {
    pub fn new(config: &AwsConfig) -> Self {
        let signer = SigV4Signer::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            config.region_name.clone(),
            config.service_name.clone(),
        );
        let host = format!("{}.{}.amazonaws.com", config.service_name, config.region_name);

        Self {
            client: Client::new(),
            signer,
            host,
            endpoint: config.endpoint(),
        }
    }

    pub async fn invoke_model(&self, model_id: &str, body: &Value) -> Result<Value> {
        let payload = serde_json::to_vec(body)?;
        let path = format!("/model/{}/invoke", model_id);
        let url = format!(
            "{}/model/{}/invoke",
            self.endpoint,
            urlencoding::encode(model_id)
        );

        let signature = self.signer.sign(
            "POST",
            &self.host,
            &path,
            "application/json",
            &payload,
            Utc::now(),
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("X-Amz-Date", signature.amz_date)
            .header("Authorization", signature.authorization)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!(
                "Bedrock invocation failed for {}: Status {}, Body: {}",
                model_id,
                status,
                error_text
            ));
        }

        let response_json: Value = response.json().await?;

        // Model-level errors come back 200 with a message field on some models
        if let Some(message) = response_json.get("message").and_then(|m| m.as_str()) {
            if response_json.get("results").is_none() && response_json.get("content").is_none() {
                return Err(anyhow!("Bedrock returned error: {}", message));
            }
        }

        Ok(response_json)
    }
}
