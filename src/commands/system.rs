use colored::Colorize;

pub fn handle_command(input: &str) -> Result<(), String> {
    match input.to_lowercase().as_str() {
        "help" => {
            println!("\n🤖 {}", "AI Assistant Commands:".bold());
            println!("  Just type your question or request");
            println!("  Examples:");
            println!("    - explain how transformers work");
            println!("    - what is retrieval augmented generation?");
            println!();

            println!("📚 Generation Commands:");
            println!("  teach <topic> | <audience> [| <tone>]  - Generate educational content");
            println!("  code <language> <description>          - Generate code");
            println!("  summarize <brief|detailed|standard> <text> - Summarize text");
            println!("  Example: teach recursion | beginners | friendly");
            println!();

            println!("📄 Document Commands:");
            println!("  doc load <file>      - Load and index a document (pdf, docx, txt)");
            println!("  doc ask <question>   - Ask a question about the loaded document");
            println!("  doc summary          - Summarize the loaded document");
            println!("  doc info             - Show the loaded document");
            println!("  doc formats          - List supported file formats");
            println!("  doc clear            - Drop the loaded document");
            println!();

            println!("🔍 Agent Commands:");
            println!("  agent <query>        - Research a question using tools");
            println!("  agent tools          - List available tools");
            println!();

            println!("🔄 Model Commands:");
            println!("  models      - List available models");
            println!("  use <name>  - Switch chat model (claude, titan)");
            println!();

            println!("⚙️ System Commands:");
            println!("  clear - Clear conversation history");
            println!("  help  - Show this help menu");
            println!("  exit  - Exit the program");
            Ok(())
        }
        "exit" | "quit" => {
            println!("👋 Goodbye!");
            std::process::exit(0);
        }
        _ => Err("Unknown system command. Type 'help' for available commands.".to_string()),
    }
}
