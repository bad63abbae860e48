use crate::llm::DocumentChatManager;
use colored::Colorize;
use std::path::Path;

pub async fn handle_command(
    input: &str,
    doc_chat: &mut DocumentChatManager,
) -> Result<(), String> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.len() < 2 {
        print_usage();
        return Ok(());
    }

    match parts[1] {
        "load" => {
            let file_path = parts.get(2).ok_or("Missing file path")?;
            println!("📄 Loading document: {}", file_path.bright_yellow());

            let pb = super::spinner("Splitting and embedding document...");
            let result = doc_chat.load_document(Path::new(file_path)).await;
            pb.finish_and_clear();

            let chunks = result.map_err(|e| format!("Failed to load document: {}", e))?;
            println!(
                "✅ Document indexed: {} chunks ready for questions",
                chunks.to_string().bright_green()
            );
            Ok(())
        }
        "ask" => {
            let question = parts[2..].join(" ");
            if question.is_empty() {
                return Err("Usage: doc ask <question>".to_string());
            }

            let pb = super::spinner("Searching document...");
            let result = doc_chat.ask(&question).await;
            pb.finish_and_clear();

            let answer = result.map_err(|e| format!("Failed to answer question: {}", e))?;
            println!("\n💬 Answer:");
            println!("{}", answer.answer.bright_green());

            if !answer.sources.is_empty() {
                println!("\n📑 Sources:");
                for source in &answer.sources {
                    println!("  • {}", source.content.dimmed());
                }
            }
            Ok(())
        }
        "summary" => {
            let pb = super::spinner("Summarizing document...");
            let summary = doc_chat.summary().await;
            pb.finish_and_clear();

            let summary = summary.map_err(|e| format!("Failed to summarize: {}", e))?;
            println!("\n📋 Summary:");
            println!("{}", summary.bright_green());
            Ok(())
        }
        "info" => {
            match doc_chat.current_document() {
                Some(name) => println!("📄 Loaded document: {}", name.bright_yellow()),
                None => println!("No document loaded. Use: doc load <file>"),
            }
            Ok(())
        }
        "formats" => {
            println!(
                "📂 Supported formats: {}",
                doc_chat.supported_formats().join(", ").bright_cyan()
            );
            Ok(())
        }
        "clear" => {
            doc_chat.clear();
            println!("🧹 Document index and chat history cleared");
            Ok(())
        }
        other => Err(format!("Unknown document command: {}", other)),
    }
}

fn print_usage() {
    println!("📚 Document Commands:");
    println!("  doc load <file_path>  - Load and index a document");
    println!("  doc ask <question>    - Ask about the loaded document");
    println!("  doc summary           - Summarize the loaded document");
    println!("  doc info              - Show the loaded document");
    println!("  doc formats           - List supported file formats");
    println!("  doc clear             - Drop the loaded document");
}
