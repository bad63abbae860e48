pub mod chat;
pub mod document_chat;
pub mod embeddings;
pub mod memory;
pub mod prompts;

pub use chat::ChatManager;
pub use document_chat::{DocumentAnswer, DocumentChatManager, SourceChunk};
pub use embeddings::EmbeddingGenerator;
pub use memory::ConversationMemory;
pub use prompts::{PromptTemplate, SummaryStyle};
