pub mod tools;

use crate::llm::ConversationMemory;
use crate::providers::traits::CompletionProvider;
use anyhow::Result;
use serde::Serialize;
use tools::{CalculatorTool, DateTimeTool, TextAnalyzerTool, Tool};

const MAX_ITERATIONS: usize = 3;
const HISTORY_WINDOW: usize = 10;

/// Result of a research run, including which tools were actually invoked.
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    pub success: bool,
    pub response: String,
    pub tools_used: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// One parsed step of the reasoning loop.
#[derive(Debug, PartialEq)]
enum AgentStep {
    Act { tool: String, input: String },
    Finish(String),
}

/// Tool-using agent that reasons in bounded act/observe rounds.
pub struct ResearchAgent {
    provider: Box<dyn CompletionProvider + Send + Sync>,
    tools: Vec<Box<dyn Tool>>,
    memory: ConversationMemory,
    max_iterations: usize,
}

impl ResearchAgent {
    pub fn new(provider: Box<dyn CompletionProvider + Send + Sync>) -> Self {
        Self {
            provider,
            tools: vec![
                Box::new(CalculatorTool),
                Box::new(TextAnalyzerTool),
                Box::new(DateTimeTool),
            ],
            memory: ConversationMemory::new(),
            max_iterations: MAX_ITERATIONS,
        }
    }

    pub fn available_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|tool| ToolInfo {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
            })
            .collect()
    }

    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    /// Run the reasoning loop for a query. Tool failures and provider
    /// failures are folded into the outcome instead of bubbling up.
    pub async fn research(&mut self, query: &str) -> AgentOutcome {
        let mut tools_used = Vec::new();
        match self.run_loop(query, &mut tools_used).await {
            Ok(response) => {
                self.memory.add_user(query);
                self.memory.add_assistant(&response);
                AgentOutcome {
                    success: true,
                    response,
                    tools_used,
                    error: None,
                }
            }
            Err(e) => AgentOutcome {
                success: false,
                response: format!("I encountered an error while researching: {}", e),
                tools_used,
                error: Some(e.to_string()),
            },
        }
    }

    async fn run_loop(&mut self, query: &str, tools_used: &mut Vec<String>) -> Result<String> {
        let mut scratchpad = String::new();

        for _ in 0..self.max_iterations {
            let prompt = self.build_prompt(query, &scratchpad);
            let reply = self.provider.complete(&prompt).await?;

            match parse_step(&reply) {
                AgentStep::Finish(answer) => return Ok(answer),
                AgentStep::Act { tool, input } => {
                    let observation = match self.find_tool(&tool) {
                        Some(t) => {
                            if !tools_used.contains(&tool) {
                                tools_used.push(tool.clone());
                            }
                            log::info!("agent invoking tool: {}", tool);
                            t.run(&input).await.unwrap_or_else(|e| format!("Tool error: {}", e))
                        }
                        None => format!(
                            "Unknown tool '{}'. Available tools: {}",
                            tool,
                            self.tool_names().join(", ")
                        ),
                    };
                    scratchpad.push_str(&format!(
                        "Action: {}\nAction Input: {}\nObservation: {}\n",
                        tool, input, observation
                    ));
                }
            }
        }

        // Iteration budget exhausted. Ask for a final answer from what
        // has been gathered so far.
        let prompt = format!(
            "{}\nYou have used all available reasoning steps. Based on the observations above, \
             give your final answer now.\nFinal Answer:",
            self.build_prompt(query, &scratchpad)
        );
        let reply = self.provider.complete(&prompt).await?;
        match parse_step(&reply) {
            AgentStep::Finish(answer) => Ok(answer),
            AgentStep::Act { .. } => Ok(reply.trim().to_string()),
        }
    }

    fn build_prompt(&self, query: &str, scratchpad: &str) -> String {
        let tool_list = self
            .tools
            .iter()
            .map(|t| format!("- {}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n");

        let mut prompt = format!(
            "You are a research assistant that can use tools to answer questions.\n\n\
             Available tools:\n{}\n\n\
             To use a tool, respond with exactly:\n\
             Action: <tool name>\n\
             Action Input: <input for the tool>\n\n\
             When you know the final answer, respond with exactly:\n\
             Final Answer: <your answer>\n",
            tool_list
        );

        let history = self.memory.format_history(HISTORY_WINDOW);
        if !history.is_empty() {
            prompt.push_str(&format!("\nPrevious conversation:\n{}\n", history));
        }

        prompt.push_str(&format!("\nQuestion: {}\n", query));
        if !scratchpad.is_empty() {
            prompt.push_str(&format!("\n{}", scratchpad));
        }
        prompt
    }

    fn find_tool(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .map(|t| t.as_ref())
    }

    fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }
}

fn parse_step(reply: &str) -> AgentStep {
    if let Some(idx) = reply.find("Final Answer:") {
        let answer = reply[idx + "Final Answer:".len()..].trim();
        return AgentStep::Finish(answer.to_string());
    }

    let mut tool = None;
    let mut input = None;
    for line in reply.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Action:") {
            tool = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("Action Input:") {
            input = Some(rest.trim().to_string());
        }
    }

    match tool {
        Some(tool) if !tool.is_empty() => AgentStep::Act {
            tool,
            input: input.unwrap_or_default(),
        },
        // Plain prose with no directives is treated as the answer.
        _ => AgentStep::Finish(reply.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::MockProvider;

    #[test]
    fn final_answer_wins_over_action_lines() {
        let step = parse_step("Action: calculator\nFinal Answer: 42");
        assert_eq!(step, AgentStep::Finish("42".to_string()));
    }

    #[test]
    fn action_lines_parse_into_act() {
        let step = parse_step("I should compute this.\nAction: calculator\nAction Input: 2+2");
        assert_eq!(
            step,
            AgentStep::Act {
                tool: "calculator".to_string(),
                input: "2+2".to_string()
            }
        );
    }

    #[test]
    fn plain_prose_is_treated_as_final_answer() {
        let step = parse_step("The answer is four.");
        assert_eq!(step, AgentStep::Finish("The answer is four.".to_string()));
    }

    #[tokio::test]
    async fn research_runs_tool_then_finishes() {
        let provider = MockProvider::with_replies(
            8,
            &[
                "Action: calculator\nAction Input: 2+2",
                "Final Answer: The result is 4.",
            ],
        );
        let mut agent = ResearchAgent::new(Box::new(provider.clone()));

        let outcome = agent.research("what is 2+2?").await;
        assert!(outcome.success);
        assert_eq!(outcome.response, "The result is 4.");
        assert_eq!(outcome.tools_used, vec!["calculator".to_string()]);

        // The observation from the tool must have reached the second prompt.
        let last = provider.last_prompt().unwrap();
        assert!(last.contains("Observation: The result of 2+2 is: 4"));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_as_observation() {
        let provider = MockProvider::with_replies(
            8,
            &[
                "Action: web_search\nAction Input: rust",
                "Final Answer: done",
            ],
        );
        let mut agent = ResearchAgent::new(Box::new(provider.clone()));

        let outcome = agent.research("search something").await;
        assert!(outcome.success);
        assert!(outcome.tools_used.is_empty());
        let last = provider.last_prompt().unwrap();
        assert!(last.contains("Unknown tool 'web_search'"));
    }

    #[tokio::test]
    async fn lists_three_tools() {
        let provider = MockProvider::with_replies(8, &[]);
        let agent = ResearchAgent::new(Box::new(provider));
        let names: Vec<String> = agent.available_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["calculator", "text_analyzer", "datetime_tool"]);
    }
}
