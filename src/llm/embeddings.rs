use anyhow::Result;

use crate::providers::traits::CompletionProvider;

/// Embedding front-end over the Titan embedding model.
pub struct EmbeddingGenerator {
    provider: Box<dyn CompletionProvider + Send + Sync>,
}

impl EmbeddingGenerator {
    pub fn new(provider: Box<dyn CompletionProvider + Send + Sync>) -> Self {
        Self { provider }
    }

    pub async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        self.provider.generate_embedding(text).await
    }

    pub async fn generate_batch_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.provider.generate_embedding(text).await?);
        }
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::MockProvider;
    use crate::providers::traits::CompletionProvider;

    #[tokio::test]
    async fn batch_preserves_order_and_length() {
        let mock = MockProvider::new(8);
        let generator = EmbeddingGenerator::new(mock.clone_box());

        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let embeddings = generator.generate_batch_embeddings(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), 8);
        assert_eq!(embeddings[0], mock.generate_embedding("alpha").await.unwrap());
        assert_eq!(embeddings[1], mock.generate_embedding("beta").await.unwrap());
    }
}
