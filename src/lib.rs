pub mod agent;
pub mod api;
pub mod aws;
pub mod commands;
pub mod config;
pub mod document;
pub mod llm;
pub mod providers;
pub mod store;

pub use agent::ResearchAgent;
pub use aws::BedrockRuntime;
pub use config::{AwsConfig, ModelConfig};
pub use llm::{ChatManager, DocumentChatManager};
pub use store::VectorStore;
