use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct MessageTurn {
    pub role: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered buffer of prior conversation turns.
///
/// Owned per feature (chat, document chat, agent) and discarded at session
/// end; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    turns: Vec<MessageTurn>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, text: &str) {
        self.add("user", text);
    }

    pub fn add_assistant(&mut self, text: &str) {
        self.add("assistant", text);
    }

    pub fn add(&mut self, role: &str, text: &str) {
        self.turns.push(MessageTurn {
            role: role.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn turns(&self) -> &[MessageTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Format the last `limit` turns as Human/AI history lines.
    pub fn format_history(&self, limit: usize) -> String {
        let start = self.turns.len().saturating_sub(limit);
        let mut history = String::new();
        for turn in &self.turns[start..] {
            let label = match turn.role.as_str() {
                "user" => "Human",
                "assistant" => "AI",
                other => other,
            };
            history.push_str(&format!("{}: {}\n", label, turn.text));
        }
        history
    }
}
