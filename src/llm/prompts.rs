use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// A prompt template with named `{placeholder}` variables.
///
/// Rendering is a single pass over the template, so substituted values are
/// never re-scanned for placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(template: &str, input_variables: &[&str]) -> Self {
        Self {
            template: template.to_string(),
            input_variables: input_variables.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn render(&self, values: &[(&str, &str)]) -> Result<String> {
        let values: HashMap<&str, &str> = values.iter().copied().collect();

        for variable in &self.input_variables {
            if !values.contains_key(variable.as_str()) {
                return Err(anyhow!("Missing value for template variable '{}'", variable));
            }
        }

        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let key = &after[..close];
                    match values.get(key) {
                        Some(value) if self.input_variables.iter().any(|v| v == key) => {
                            out.push_str(value);
                        }
                        _ => {
                            return Err(anyhow!(
                                "Template references undeclared variable '{}'",
                                key
                            ));
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);

        Ok(out)
    }
}

/// Summarization flavors; the brief instruction is deliberately shorter
/// than the detailed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStyle {
    Brief,
    Detailed,
    Standard,
}

impl SummaryStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "brief" => Some(Self::Brief),
            "detailed" => Some(Self::Detailed),
            "standard" => Some(Self::Standard),
            _ => None,
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Brief => "Provide a brief summary of the following text in 2-3 sentences:\n\n{text}",
            Self::Detailed => {
                "Provide a detailed summary of the following text including:\n\
                 - Main points\n\
                 - Key findings or conclusions\n\
                 - Important details\n\n\
                 Text: {text}"
            }
            Self::Standard => "Summarize the following text:\n\n{text}",
        }
    }
}

pub fn educational_content() -> PromptTemplate {
    PromptTemplate::new(
        "Create a comprehensive explanation about {topic} for {audience}.\n\
         Use a {tone} tone and include:\n\
         1. A clear introduction\n\
         2. Key concepts explained simply\n\
         3. Practical examples\n\
         4. A conclusion with key takeaways\n\n\
         Topic: {topic}\n\
         Audience: {audience}\n\
         Tone: {tone}",
        &["topic", "audience", "tone"],
    )
}

pub fn code_generation() -> PromptTemplate {
    PromptTemplate::new(
        "Generate clean, well-documented {language} code for the following requirement:\n\
         {description}\n\n\
         Include:\n\
         - Proper comments\n\
         - Error handling where appropriate\n\
         - Best practices\n\
         - Example usage if applicable\n\n\
         Requirement: {description}\n\
         Programming Language: {language}",
        &["description", "language"],
    )
}

pub fn conversational() -> PromptTemplate {
    PromptTemplate::new(
        "You are a knowledgeable AI assistant. Use the conversation history to provide contextual responses.\n\n\
         Chat History:\n{chat_history}\n\
         Human: {user_input}\n\
         AI Assistant:",
        &["chat_history", "user_input"],
    )
}

pub fn summarization(style: SummaryStyle) -> PromptTemplate {
    PromptTemplate::new(style.instruction(), &["text"])
}

pub fn retrieval_qa() -> PromptTemplate {
    PromptTemplate::new(
        "Answer the question using only the document excerpts below. \
         If the excerpts do not contain the answer, say so.\n\n\
         Document excerpts:\n{context}\n\n\
         Conversation so far:\n{chat_history}\n\
         Question: {question}\n\
         Answer:",
        &["context", "chat_history", "question"],
    )
}

pub fn document_summary() -> PromptTemplate {
    PromptTemplate::new(
        "Please provide a concise summary of the following document content:\n\n\
         {content}\n\n\
         Summary:",
        &["content"],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_all_variables() {
        let rendered = educational_content()
            .render(&[
                ("topic", "ownership"),
                ("audience", "new Rust developers"),
                ("tone", "friendly"),
            ])
            .unwrap();

        assert!(rendered.contains("explanation about ownership for new Rust developers"));
        assert!(rendered.contains("Use a friendly tone"));
        assert!(!rendered.contains('{'));
    }

    #[test]
    fn missing_variable_is_an_error() {
        let err = code_generation()
            .render(&[("description", "parse a CSV file")])
            .unwrap_err();
        assert!(err.to_string().contains("language"));
    }

    #[test]
    fn undeclared_placeholder_is_an_error() {
        let template = PromptTemplate::new("Hello {name}, meet {stranger}", &["name"]);
        let err = template.render(&[("name", "Ada")]).unwrap_err();
        assert!(err.to_string().contains("stranger"));
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let template = PromptTemplate::new("say {a} then {b}", &["a", "b"]);
        let rendered = template.render(&[("a", "{b}"), ("b", "done")]).unwrap();
        assert_eq!(rendered, "say {b} then done");
    }

    #[test]
    fn brief_instruction_is_shorter_than_detailed() {
        assert!(
            SummaryStyle::Brief.instruction().len() < SummaryStyle::Detailed.instruction().len()
        );
    }

    #[test]
    fn summary_style_parsing() {
        assert_eq!(SummaryStyle::parse("Brief"), Some(SummaryStyle::Brief));
        assert_eq!(SummaryStyle::parse("detailed"), Some(SummaryStyle::Detailed));
        assert_eq!(SummaryStyle::parse("standard"), Some(SummaryStyle::Standard));
        assert_eq!(SummaryStyle::parse("haiku"), None);
    }
}
