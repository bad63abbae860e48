use crate::agent::ResearchAgent;
use colored::Colorize;

pub async fn handle_command(input: &str, agent: &mut ResearchAgent) -> Result<(), String> {
    let query = input.trim_start_matches("agent").trim();

    if query.is_empty() {
        println!("🔍 Agent Commands:");
        println!("  agent <query>  - Research a question using tools");
        println!("  agent tools    - List available tools");
        return Ok(());
    }

    if query.eq_ignore_ascii_case("tools") {
        println!("\n🧰 Available tools:");
        for tool in agent.available_tools() {
            println!("  • {} - {}", tool.name.bright_cyan(), tool.description);
        }
        return Ok(());
    }

    println!("🔍 Researching: {}", query.bright_yellow());
    let pb = super::spinner("Reasoning with tools...");
    let outcome = agent.research(query).await;
    pb.finish_and_clear();

    if outcome.success {
        println!("\n💡 {}", outcome.response.bright_green());
        if !outcome.tools_used.is_empty() {
            println!("\n🧰 Tools used: {}", outcome.tools_used.join(", ").cyan());
        }
        Ok(())
    } else {
        Err(outcome
            .error
            .unwrap_or_else(|| "Agent research failed".to_string()))
    }
}
