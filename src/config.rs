use std::env;

use anyhow::{anyhow, Result};

/// AWS credentials and endpoint settings for the Bedrock runtime.
#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub service_name: String,
    pub region_name: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl AwsConfig {
    pub fn from_env() -> Result<Self> {
        let service_name =
            env::var("AWS_SERVICE_NAME").unwrap_or_else(|_| "bedrock-runtime".to_string());
        let region_name = env::var("AWS_REGION_NAME").unwrap_or_else(|_| "us-east-1".to_string());
        let access_key_id = env::var("AWS_ACCESS_KEY_ID")
            .map_err(|_| anyhow!("AWS_ACCESS_KEY_ID must be set (via environment or .env)"))?;
        let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| anyhow!("AWS_SECRET_ACCESS_KEY must be set (via environment or .env)"))?;

        Ok(Self {
            service_name,
            region_name,
            access_key_id,
            secret_access_key,
        })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "https://{}.{}.amazonaws.com",
            self.service_name, self.region_name
        )
    }
}

/// Model ids and sampling settings, overridable via environment.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub chat_model_id: String,
    pub text_model_id: String,
    pub embedding_model_id: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl ModelConfig {
    pub fn from_env() -> Self {
        let chat_model_id = env::var("BEDROCK_CHAT_MODEL")
            .unwrap_or_else(|_| "us.anthropic.claude-3-5-sonnet-20241022-v2:0".to_string());
        let text_model_id = env::var("BEDROCK_TEXT_MODEL")
            .unwrap_or_else(|_| "amazon.titan-text-express-v1".to_string());
        let embedding_model_id = env::var("BEDROCK_EMBEDDING_MODEL")
            .unwrap_or_else(|_| "amazon.titan-embed-text-v2:0".to_string());

        let max_tokens = env::var("BEDROCK_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4096);
        let temperature = env::var("BEDROCK_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.7);
        let top_p = env::var("BEDROCK_TOP_P")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.9);

        Self {
            chat_model_id,
            text_model_id,
            embedding_model_id,
            max_tokens,
            temperature,
            top_p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_built_from_service_and_region() {
        let config = AwsConfig {
            service_name: "bedrock-runtime".to_string(),
            region_name: "us-east-1".to_string(),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
        };
        assert_eq!(
            config.endpoint(),
            "https://bedrock-runtime.us-east-1.amazonaws.com"
        );
    }
}
