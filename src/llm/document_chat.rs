use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::document::{load_document, supported_formats, RecursiveCharacterSplitter};
use crate::llm::embeddings::EmbeddingGenerator;
use crate::llm::memory::ConversationMemory;
use crate::llm::prompts;
use crate::providers::traits::CompletionProvider;
use crate::store::VectorStore;

const COLLECTION: &str = "document_chunks";
const RETRIEVAL_K: usize = 4;
const SUMMARY_K: usize = 3;
const SOURCE_PREVIEW_CHARS: usize = 200;
const HISTORY_WINDOW: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct SourceChunk {
    pub content: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentAnswer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceChunk>,
}

/// Document chat manager: load, chunk, embed and index a file, then answer
/// questions against the retrieved chunks.
///
/// The index lives in a transient in-memory store rebuilt per document.
pub struct DocumentChatManager {
    provider: Box<dyn CompletionProvider + Send + Sync>,
    embeddings: EmbeddingGenerator,
    splitter: RecursiveCharacterSplitter,
    store: VectorStore,
    memory: ConversationMemory,
    current_document: Option<String>,
    embedding_dims: usize,
}

impl DocumentChatManager {
    pub fn new(
        provider: Box<dyn CompletionProvider + Send + Sync>,
        embeddings: EmbeddingGenerator,
        embedding_dims: usize,
    ) -> Self {
        Self {
            provider,
            embeddings,
            splitter: RecursiveCharacterSplitter::default(),
            store: VectorStore::new(),
            memory: ConversationMemory::new(),
            current_document: None,
            embedding_dims,
        }
    }

    /// Load a file, split it, embed the chunks and rebuild the index.
    /// Returns the number of indexed chunks.
    pub async fn load_document(&mut self, path: &Path) -> Result<usize> {
        let documents = load_document(path)?;
        let chunks = self.splitter.split_documents(&documents);
        if chunks.is_empty() {
            return Err(anyhow!("No text chunks produced from {}", path.display()));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.page_content.clone()).collect();
        let vectors = self.embeddings.generate_batch_embeddings(&texts).await?;

        self.store.drop_collection(COLLECTION);
        self.store.create_collection(COLLECTION, self.embedding_dims);

        for (chunk, vector) in chunks.iter().zip(vectors) {
            let mut payload = HashMap::new();
            payload.insert(
                "text".to_string(),
                serde_json::Value::String(chunk.page_content.clone()),
            );
            for (key, value) in &chunk.metadata {
                payload.insert(key.clone(), serde_json::Value::String(value.clone()));
            }
            self.store.store_vector(COLLECTION, vector, payload)?;
        }

        self.current_document = chunks[0].metadata.get("source").cloned();
        self.memory.clear();

        log::info!(
            "Indexed {} chunks from {}",
            chunks.len(),
            path.display()
        );
        Ok(chunks.len())
    }

    /// Answer a question against the loaded document using RAG.
    pub async fn ask(&mut self, question: &str) -> Result<DocumentAnswer> {
        if self.current_document.is_none() {
            return Err(anyhow!(
                "No document has been processed. Please load a document first."
            ));
        }

        let query_vector = self.embeddings.generate_embedding(question).await?;
        let results = self
            .store
            .search_vectors(COLLECTION, &query_vector, RETRIEVAL_K)?;

        let mut context = String::new();
        let mut sources = Vec::new();
        for (_, _, payload) in &results {
            let text = payload
                .get("text")
                .and_then(|t| t.as_str())
                .unwrap_or_default();
            context.push_str(text);
            context.push_str("\n\n");

            let metadata: HashMap<String, String> = payload
                .iter()
                .filter(|(key, _)| key.as_str() != "text")
                .filter_map(|(key, value)| {
                    value.as_str().map(|v| (key.clone(), v.to_string()))
                })
                .collect();
            sources.push(SourceChunk {
                content: truncate_preview(text),
                metadata,
            });
        }

        let history = self.memory.format_history(HISTORY_WINDOW);
        let prompt = prompts::retrieval_qa().render(&[
            ("context", context.trim_end()),
            ("chat_history", history.as_str()),
            ("question", question),
        ])?;

        let answer = self.provider.complete(&prompt).await?;

        self.memory.add_user(question);
        self.memory.add_assistant(&answer);

        Ok(DocumentAnswer {
            question: question.to_string(),
            answer,
            sources,
        })
    }

    /// Summarize the loaded document from a few representative chunks.
    pub async fn summary(&self) -> Result<String> {
        if self.current_document.is_none() {
            return Ok("No document loaded.".to_string());
        }

        let probe = self
            .embeddings
            .generate_embedding("summary overview content")
            .await?;
        let results = self.store.search_vectors(COLLECTION, &probe, SUMMARY_K)?;

        let combined = results
            .iter()
            .filter_map(|(_, _, payload)| payload.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = prompts::document_summary().render(&[("content", combined.as_str())])?;

        match self.provider.complete(&prompt).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                log::warn!("Document summary generation failed: {}", e);
                Ok("Unable to generate summary at this time.".to_string())
            }
        }
    }

    /// Drop the index and reset the chat.
    pub fn clear(&mut self) {
        self.store.drop_collection(COLLECTION);
        self.current_document = None;
        self.memory.clear();
    }

    pub fn current_document(&self) -> Option<&str> {
        self.current_document.as_deref()
    }

    pub fn supported_formats(&self) -> Vec<&'static str> {
        supported_formats()
    }

    pub fn clear_history(&mut self) {
        self.memory.clear();
    }
}

fn truncate_preview(text: &str) -> String {
    if text.chars().count() <= SOURCE_PREVIEW_CHARS {
        return text.to_string();
    }
    let preview: String = text.chars().take(SOURCE_PREVIEW_CHARS).collect();
    format!("{}...", preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::MockProvider;

    const DIMS: usize = 8;

    fn manager_with(mock: &MockProvider) -> DocumentChatManager {
        DocumentChatManager::new(
            mock.clone_box(),
            EmbeddingGenerator::new(mock.clone_box()),
            DIMS,
        )
    }

    #[tokio::test]
    async fn ask_without_document_is_an_error() {
        let mock = MockProvider::new(DIMS);
        let mut manager = manager_with(&mock);

        let err = manager.ask("what is this about?").await.unwrap_err();
        assert!(err.to_string().contains("No document has been processed"));
    }

    #[tokio::test]
    async fn load_then_ask_returns_answer_with_sources() {
        let mock = MockProvider::with_replies(DIMS, &["the answer"]);
        let mut manager = manager_with(&mock);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.txt");
        std::fs::write(
            &path,
            "Bedrock is a managed model service.\n\nTitan produces embeddings.",
        )
        .unwrap();

        let chunks = manager.load_document(&path).await.unwrap();
        assert!(chunks >= 1);
        assert_eq!(manager.current_document(), Some("facts.txt"));

        let answer = manager.ask("what produces embeddings?").await.unwrap();
        assert_eq!(answer.answer, "the answer");
        assert!(!answer.sources.is_empty());
        assert!(answer.sources.len() <= RETRIEVAL_K);
        assert_eq!(answer.sources[0].metadata["source"], "facts.txt");

        let prompt = mock.last_prompt().unwrap();
        assert!(prompt.contains("Document excerpts:"));
        assert!(prompt.contains("what produces embeddings?"));
    }

    #[tokio::test]
    async fn clear_resets_document_state() {
        let mock = MockProvider::new(DIMS);
        let mut manager = manager_with(&mock);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "Some document body text.").unwrap();
        manager.load_document(&path).await.unwrap();

        manager.clear();
        assert!(manager.current_document().is_none());
        assert!(manager.ask("anything?").await.is_err());
    }

    #[tokio::test]
    async fn summary_without_document_reports_missing() {
        let mock = MockProvider::new(DIMS);
        let manager = manager_with(&mock);
        assert_eq!(manager.summary().await.unwrap(), "No document loaded.");
    }

    #[test]
    fn source_previews_are_truncated() {
        let long = "y".repeat(400);
        let preview = truncate_preview(&long);
        assert_eq!(preview.chars().count(), SOURCE_PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));

        assert_eq!(truncate_preview("short"), "short");
    }
}
