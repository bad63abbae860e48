use crate::agent::ResearchAgent;
use crate::config::ModelConfig;
use crate::aws::BedrockRuntime;
use crate::llm::{ChatManager, DocumentChatManager, EmbeddingGenerator};
use crate::providers::claude::claude::ClaudeProvider;
use crate::providers::titan::titan::{TitanProvider, EMBEDDING_DIMS};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

mod agent_cmd;
mod document;
mod generate;
mod system;

const CHAT_SYSTEM_MESSAGE: &str =
    "You are a helpful AI assistant. Provide clear, accurate and concise answers.";

pub struct CommandHandler {
    chat: ChatManager,
    doc_chat: DocumentChatManager,
    agent: ResearchAgent,
    claude: ClaudeProvider,
    titan: TitanProvider,
    active_model: String,
}

impl CommandHandler {
    pub fn new(runtime: BedrockRuntime, models: &ModelConfig) -> Self {
        let claude = ClaudeProvider::new(runtime.clone(), models, CHAT_SYSTEM_MESSAGE.to_string());
        let titan = TitanProvider::new(runtime, models, CHAT_SYSTEM_MESSAGE.to_string());

        let chat = ChatManager::new(Box::new(claude.clone()));
        let embeddings = EmbeddingGenerator::new(Box::new(titan.clone()));
        let doc_chat = DocumentChatManager::new(Box::new(claude.clone()), embeddings, EMBEDDING_DIMS);
        let agent = ResearchAgent::new(Box::new(claude.clone()));

        Self {
            chat,
            doc_chat,
            agent,
            claude,
            titan,
            active_model: "claude".to_string(),
        }
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<(), String> {
        if input.is_empty() {
            return Ok(());
        }

        let input = input.trim();

        // Single-word commands first
        match input.to_lowercase().as_str() {
            "help" | "exit" | "quit" => return system::handle_command(input),
            "models" => return self.list_models().await,
            "clear" => {
                self.chat.clear_memory();
                self.agent.clear_memory();
                println!("🧹 Conversation history cleared");
                return Ok(());
            }
            _ => {}
        }

        if input.starts_with("use ") {
            return self.switch_model(input.trim_start_matches("use ").trim());
        }

        if input.starts_with("doc ") || input.eq_ignore_ascii_case("doc") {
            return document::handle_command(input, &mut self.doc_chat).await;
        }

        if input.starts_with("agent ") || input.eq_ignore_ascii_case("agent") {
            return agent_cmd::handle_command(input, &mut self.agent).await;
        }

        if input.starts_with("teach ") || input.starts_with("code ") || input.starts_with("summarize ") {
            return generate::handle_command(input, &self.chat).await;
        }

        // Default to chat completion if no command matches
        self.handle_chat(input).await
    }

    async fn handle_chat(&mut self, input: &str) -> Result<(), String> {
        let input_tokens = input.split_whitespace().count();
        println!("📥 Input tokens: {}", input_tokens.to_string().cyan());

        let pb = spinner("Thinking...");
        let result = self.chat.chat(input).await;
        pb.finish_and_clear();

        match result {
            Ok(response) => {
                let response_tokens = response.split_whitespace().count();
                print_response(&response, input_tokens, response_tokens);
                Ok(())
            }
            Err(e) => Err(format!("Failed to get AI response: {}", e)),
        }
    }

    async fn list_models(&self) -> Result<(), String> {
        println!("\n🤖 Available models:");
        println!("  Currently using: {}", self.active_model.cyan());
        if let Ok(info) = self.chat.model_info().await {
            println!("  Model id: {}", info.cyan());
        }
        println!("\n  • claude - Anthropic Claude (chat, generation, documents)");
        println!("  • titan  - Amazon Titan Text (plain text generation)");
        println!("\nTo switch models, use: use <model>");
        println!("Example: use titan");
        Ok(())
    }

    fn switch_model(&mut self, name: &str) -> Result<(), String> {
        let name = name.to_lowercase();
        match name.as_str() {
            "claude" => self.chat.switch_provider(Box::new(self.claude.clone())),
            "titan" => self.chat.switch_provider(Box::new(self.titan.clone())),
            other => {
                return Err(format!(
                    "Unknown model: {}. Available models: claude, titan",
                    other
                ))
            }
        }
        self.active_model = name;
        println!("🔄 Switched to {} model", self.active_model.cyan());
        Ok(())
    }
}

fn print_response(response: &str, input_tokens: usize, response_tokens: usize) {
    println!("{}", response.truecolor(255, 236, 179));

    println!(
        "\n📊 Tokens: 📥 Input: {} | 📤 Response: {} | 📈 Total: {}",
        input_tokens.to_string().cyan(),
        response_tokens.to_string().cyan(),
        (input_tokens + response_tokens).to_string().cyan()
    );
    println!();
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
