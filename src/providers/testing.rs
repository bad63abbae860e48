use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::providers::traits::CompletionProvider;

/// Scripted provider for unit tests: pops canned replies and records the
/// prompts it was given.
#[derive(Clone)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<String>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    dims: usize,
}

impl MockProvider {
    pub fn new(dims: usize) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            dims,
        }
    }

    pub fn with_replies(dims: usize, replies: &[&str]) -> Self {
        let provider = Self::new(dims);
        provider
            .replies
            .lock()
            .unwrap()
            .extend(replies.iter().map(|r| r.to_string()));
        provider
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self.replies.lock().unwrap().pop_front();
        Ok(reply.unwrap_or_else(|| "mock response".to_string()))
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dims];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dims] += byte as f32 / 255.0;
        }
        Ok(vector)
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok("mock-model".to_string())
    }

    fn get_system_message(&self) -> String {
        "You are a helpful assistant.".to_string()
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
        Box::new(self.clone())
    }
}
