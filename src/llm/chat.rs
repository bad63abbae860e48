use anyhow::Result;

use crate::llm::memory::ConversationMemory;
use crate::llm::prompts::{self, SummaryStyle};
use crate::providers::traits::CompletionProvider;

const HISTORY_WINDOW: usize = 20;

/// The Bedrock client wrapper: conversational chat with memory plus the
/// stateless generation features (educational content, code, summaries).
pub struct ChatManager {
    provider: Box<dyn CompletionProvider + Send + Sync>,
    memory: ConversationMemory,
}

impl ChatManager {
    pub fn new(provider: Box<dyn CompletionProvider + Send + Sync>) -> Self {
        Self {
            provider,
            memory: ConversationMemory::new(),
        }
    }

    /// Swap the active model, keeping the conversation buffer.
    pub fn switch_provider(&mut self, provider: Box<dyn CompletionProvider + Send + Sync>) {
        self.provider = provider;
    }

    pub async fn model_info(&self) -> Result<String> {
        self.provider.get_model_info().await
    }

    /// Conversational exchange with history-aware context.
    pub async fn chat(&mut self, user_input: &str) -> Result<String> {
        let history = self.memory.format_history(HISTORY_WINDOW);
        let prompt = prompts::conversational()
            .render(&[("chat_history", history.as_str()), ("user_input", user_input)])?;

        let response = self.provider.complete(&prompt).await?;

        self.memory.add_user(user_input);
        self.memory.add_assistant(&response);

        Ok(response)
    }

    pub async fn generate_content(
        &self,
        topic: &str,
        audience: &str,
        tone: &str,
    ) -> Result<String> {
        let prompt = prompts::educational_content()
            .render(&[("topic", topic), ("audience", audience), ("tone", tone)])?;
        self.provider.complete(&prompt).await
    }

    pub async fn generate_code(&self, description: &str, language: &str) -> Result<String> {
        let prompt = prompts::code_generation()
            .render(&[("description", description), ("language", language)])?;
        self.provider.complete(&prompt).await
    }

    pub async fn summarize(&self, text: &str, style: SummaryStyle) -> Result<String> {
        let prompt = prompts::summarization(style).render(&[("text", text)])?;
        self.provider.complete(&prompt).await
    }

    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::MockProvider;

    #[tokio::test]
    async fn chat_records_turns_and_feeds_history() {
        let mock = MockProvider::with_replies(8, &["first reply", "second reply"]);
        let mut chat = ChatManager::new(mock.clone_box());

        let first = chat.chat("what is bedrock?").await.unwrap();
        assert_eq!(first, "first reply");
        assert_eq!(chat.memory().len(), 2);

        chat.chat("and langchain?").await.unwrap();

        let prompt = mock.last_prompt().unwrap();
        assert!(prompt.contains("Human: what is bedrock?"));
        assert!(prompt.contains("AI: first reply"));
        assert!(prompt.contains("Human: and langchain?"));
    }

    #[tokio::test]
    async fn generation_features_do_not_touch_memory() {
        let mock = MockProvider::new(8);
        let chat = ChatManager::new(mock.clone_box());

        chat.generate_content("recursion", "students", "casual")
            .await
            .unwrap();
        chat.generate_code("http server", "rust").await.unwrap();
        chat.summarize("long text here", SummaryStyle::Brief)
            .await
            .unwrap();

        assert!(chat.memory().is_empty());

        let prompt = mock.last_prompt().unwrap();
        assert!(prompt.contains("brief summary"));
    }

    #[tokio::test]
    async fn clear_memory_resets_history() {
        let mock = MockProvider::new(8);
        let mut chat = ChatManager::new(mock.clone_box());

        chat.chat("hello").await.unwrap();
        chat.clear_memory();
        chat.chat("again").await.unwrap();

        let prompt = mock.last_prompt().unwrap();
        assert!(!prompt.contains("Human: hello"));
    }
}
