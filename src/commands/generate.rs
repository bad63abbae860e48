use crate::llm::{ChatManager, SummaryStyle};
use colored::Colorize;

pub async fn handle_command(input: &str, chat: &ChatManager) -> Result<(), String> {
    if let Some(rest) = input.strip_prefix("teach ") {
        return handle_teach(rest, chat).await;
    }
    if let Some(rest) = input.strip_prefix("code ") {
        return handle_code(rest, chat).await;
    }
    if let Some(rest) = input.strip_prefix("summarize ") {
        return handle_summarize(rest, chat).await;
    }
    Err("Unknown generation command".to_string())
}

/// `teach <topic> | <audience> [| <tone>]`
async fn handle_teach(rest: &str, chat: &ChatManager) -> Result<(), String> {
    let parts: Vec<&str> = rest.split('|').map(str::trim).collect();
    if parts.len() < 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err("Usage: teach <topic> | <audience> [| <tone>]".to_string());
    }
    let topic = parts[0];
    let audience = parts[1];
    let tone = parts.get(2).copied().filter(|t| !t.is_empty()).unwrap_or("informative");

    println!(
        "📚 Generating content on {} for {}",
        topic.bright_yellow(),
        audience.bright_yellow()
    );
    let pb = super::spinner("Generating content...");
    let result = chat.generate_content(topic, audience, tone).await;
    pb.finish_and_clear();

    let content = result.map_err(|e| format!("Failed to generate content: {}", e))?;
    println!("\n{}", content.bright_green());
    Ok(())
}

/// `code <language> <description>`
async fn handle_code(rest: &str, chat: &ChatManager) -> Result<(), String> {
    let mut parts = rest.splitn(2, ' ');
    let language = parts.next().unwrap_or_default();
    let description = parts.next().unwrap_or_default().trim();
    if language.is_empty() || description.is_empty() {
        return Err("Usage: code <language> <description>".to_string());
    }

    println!("💻 Generating {} code", language.bright_yellow());
    let pb = super::spinner("Generating code...");
    let result = chat.generate_code(description, language).await;
    pb.finish_and_clear();

    let code = result.map_err(|e| format!("Failed to generate code: {}", e))?;
    println!("\n{}", code.bright_green());
    Ok(())
}

/// `summarize <brief|detailed|standard> <text>`
async fn handle_summarize(rest: &str, chat: &ChatManager) -> Result<(), String> {
    let mut parts = rest.splitn(2, ' ');
    let style_word = parts.next().unwrap_or_default();
    let text = parts.next().unwrap_or_default().trim();

    // The style word is optional; default to standard.
    let (style, text) = match SummaryStyle::parse(style_word) {
        Some(style) => (style, text),
        None => (SummaryStyle::Standard, rest.trim()),
    };
    if text.is_empty() {
        return Err("Usage: summarize <brief|detailed|standard> <text>".to_string());
    }

    let pb = super::spinner("Summarizing...");
    let result = chat.summarize(text, style).await;
    pb.finish_and_clear();

    let summary = result.map_err(|e| format!("Failed to summarize: {}", e))?;
    println!("\n📋 {}", summary.bright_green());
    Ok(())
}
