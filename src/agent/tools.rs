use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::collections::HashMap;

/// A callable tool the research agent can dispatch to.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn run(&self, input: &str) -> Result<String>;
}

/// Evaluates arithmetic expressions.
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Useful for performing mathematical calculations. Input should be a mathematical \
         expression like '2+2' or 'sqrt(16)' or '10*5/2'"
    }

    async fn run(&self, input: &str) -> Result<String> {
        let expression = input.trim();
        match evaluate_expression(expression) {
            Ok(value) => Ok(format!(
                "The result of {} is: {}",
                expression,
                format_number(value)
            )),
            Err(e) => Ok(format!(
                "Error in calculation: {}. Please check your mathematical expression.",
                e
            )),
        }
    }
}

/// Basic text statistics: counts, top words, reading time.
pub struct TextAnalyzerTool;

#[async_trait]
impl Tool for TextAnalyzerTool {
    fn name(&self) -> &str {
        "text_analyzer"
    }

    fn description(&self) -> &str {
        "Useful for analyzing text content. Can count words, characters, sentences, find \
         keywords, and provide basic text statistics. Input should be the text to analyze."
    }

    async fn run(&self, input: &str) -> Result<String> {
        let word_count = input.split_whitespace().count();
        let char_count = input.chars().count();
        let char_count_no_spaces = input.chars().filter(|c| *c != ' ').count();
        let sentence_count = Regex::new(r"[.!?]+")?.find_iter(input).count();
        let paragraph_count = input.split("\n\n").filter(|p| !p.trim().is_empty()).count();

        let word_re = Regex::new(r"\b\w+\b")?;
        let mut word_freq: HashMap<String, usize> = HashMap::new();
        for word in word_re.find_iter(&input.to_lowercase()) {
            let word = word.as_str();
            if word.len() > 3 {
                *word_freq.entry(word.to_string()).or_insert(0) += 1;
            }
        }
        let mut top_words: Vec<(String, usize)> = word_freq.into_iter().collect();
        top_words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_words.truncate(5);

        // Average reading speed of 200 words per minute.
        let reading_time = word_count.div_ceil(200);

        let mut analysis = format!(
            "Text Analysis Results:\n\
             - Word count: {}\n\
             - Character count: {}\n\
             - Character count (no spaces): {}\n\
             - Sentence count: {}\n\
             - Paragraph count: {}\n\
             - Estimated reading time: {} minute(s)\n\n\
             Top 5 most frequent words:\n",
            word_count,
            char_count,
            char_count_no_spaces,
            sentence_count,
            paragraph_count,
            reading_time
        );
        for (word, freq) in &top_words {
            analysis.push_str(&format!("- {}: {} times\n", word, freq));
        }

        Ok(analysis)
    }
}

/// Current date/time and day arithmetic.
pub struct DateTimeTool;

#[async_trait]
impl Tool for DateTimeTool {
    fn name(&self) -> &str {
        "datetime_tool"
    }

    fn description(&self) -> &str {
        "Useful for getting current date/time, calculating date differences, or formatting \
         dates. Input can be 'current' for current datetime, or date calculations like \
         'days between 2024-01-01 and 2024-12-31'"
    }

    async fn run(&self, input: &str) -> Result<String> {
        let query = input.trim().to_lowercase();

        if query == "current" || query == "now" {
            let now = Local::now();
            return Ok(format!(
                "Current date and time: {}",
                now.format("%Y-%m-%d %H:%M:%S")
            ));
        }

        if query.contains("days between") {
            let date_re = Regex::new(r"\d{4}-\d{2}-\d{2}")?;
            let dates: Vec<&str> = date_re.find_iter(&query).map(|m| m.as_str()).collect();
            if dates.len() >= 2 {
                let first = NaiveDate::parse_from_str(dates[0], "%Y-%m-%d")?;
                let second = NaiveDate::parse_from_str(dates[1], "%Y-%m-%d")?;
                let diff = (second - first).num_days().abs();
                return Ok(format!(
                    "Days between {} and {}: {} days",
                    dates[0], dates[1], diff
                ));
            }
            return Ok("Please provide dates in YYYY-MM-DD format".to_string());
        }

        Ok(
            "Available operations: 'current' for current datetime, 'days between YYYY-MM-DD \
             and YYYY-MM-DD' for date calculations"
                .to_string(),
        )
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Evaluate an arithmetic expression with `+ - * / ^`, parentheses,
/// `sqrt/sin/cos/tan/log/abs` and the constants `pi` and `e`.
pub fn evaluate_expression(input: &str) -> Result<f64, String> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!("unexpected trailing input near '{}'", parser.peek_text()));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                // ** is an alias for ^
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Caret);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{}'", literal))?;
                tokens.push(Token::Num(value));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_text(&self) -> String {
        match self.peek() {
            Some(Token::Num(n)) => n.to_string(),
            Some(Token::Ident(s)) => s.clone(),
            Some(token) => format!("{:?}", token),
            None => "end of input".to_string(),
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_expr(&mut self) -> Result<f64, String> {
        let mut value = self.parse_term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.advance();
                    value += self.parse_term()?;
                }
                Token::Minus => {
                    self.advance();
                    value -= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_term(&mut self) -> Result<f64, String> {
        let mut value = self.parse_unary()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.advance();
                    value *= self.parse_unary()?;
                }
                Token::Slash => {
                    self.advance();
                    let divisor = self.parse_unary()?;
                    if divisor == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_unary(&mut self) -> Result<f64, String> {
        if self.peek() == Some(&Token::Minus) {
            self.advance();
            return Ok(-self.parse_unary()?);
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<f64, String> {
        let base = self.parse_atom()?;
        if self.peek() == Some(&Token::Caret) {
            self.advance();
            // Right-associative exponent.
            let exponent = self.parse_unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<f64, String> {
        match self.advance() {
            Some(Token::Num(value)) => Ok(value),
            Some(Token::LParen) => {
                let value = self.parse_expr()?;
                if self.advance() != Some(Token::RParen) {
                    return Err("missing closing parenthesis".to_string());
                }
                Ok(value)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "pi" => Ok(std::f64::consts::PI),
                "e" => Ok(std::f64::consts::E),
                "sqrt" | "sin" | "cos" | "tan" | "log" | "abs" => {
                    if self.advance() != Some(Token::LParen) {
                        return Err(format!("expected '(' after {}", name));
                    }
                    let argument = self.parse_expr()?;
                    if self.advance() != Some(Token::RParen) {
                        return Err("missing closing parenthesis".to_string());
                    }
                    let value = match name.as_str() {
                        "sqrt" => argument.sqrt(),
                        "sin" => argument.sin(),
                        "cos" => argument.cos(),
                        "tan" => argument.tan(),
                        "log" => argument.ln(),
                        "abs" => argument.abs(),
                        _ => unreachable!(),
                    };
                    Ok(value)
                }
                other => Err(format!("unknown identifier '{}'", other)),
            },
            Some(token) => Err(format!("unexpected token {:?}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_basic_arithmetic_with_precedence() {
        assert_eq!(evaluate_expression("2+2").unwrap(), 4.0);
        assert_eq!(evaluate_expression("10*5/2").unwrap(), 25.0);
        assert_eq!(evaluate_expression("2+3*4").unwrap(), 14.0);
        assert_eq!(evaluate_expression("(2+3)*4").unwrap(), 20.0);
        assert_eq!(evaluate_expression("-3+5").unwrap(), 2.0);
    }

    #[test]
    fn evaluates_functions_and_constants() {
        assert_eq!(evaluate_expression("sqrt(144)").unwrap(), 12.0);
        assert_eq!(evaluate_expression("abs(-7)").unwrap(), 7.0);
        assert!((evaluate_expression("cos(0)").unwrap() - 1.0).abs() < 1e-9);
        assert!((evaluate_expression("log(e)").unwrap() - 1.0).abs() < 1e-9);
        assert!((evaluate_expression("pi").unwrap() - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn exponent_is_right_associative_and_accepts_both_spellings() {
        assert_eq!(evaluate_expression("2^10").unwrap(), 1024.0);
        assert_eq!(evaluate_expression("2**3").unwrap(), 8.0);
        assert_eq!(evaluate_expression("2^3^2").unwrap(), 512.0);
    }

    #[test]
    fn malformed_expressions_are_errors() {
        assert!(evaluate_expression("").is_err());
        assert!(evaluate_expression("2+").is_err());
        assert!(evaluate_expression("(2+3").is_err());
        assert!(evaluate_expression("frob(3)").is_err());
        assert!(evaluate_expression("1/0").is_err());
        assert!(evaluate_expression("2 2").is_err());
    }

    #[tokio::test]
    async fn calculator_tool_formats_results() {
        let output = CalculatorTool.run("sqrt(16)").await.unwrap();
        assert_eq!(output, "The result of sqrt(16) is: 4");

        let output = CalculatorTool.run("nonsense!").await.unwrap();
        assert!(output.starts_with("Error in calculation:"));
    }

    #[tokio::test]
    async fn text_analyzer_counts_and_ranks_words() {
        let text = "LangChain is a framework. LangChain provides tools!\n\nSecond paragraph here.";
        let output = TextAnalyzerTool.run(text).await.unwrap();

        assert!(output.contains("- Word count: 10"));
        assert!(output.contains("- Sentence count: 3"));
        assert!(output.contains("- Paragraph count: 2"));
        assert!(output.contains("- Estimated reading time: 1 minute(s)"));
        assert!(output.contains("- langchain: 2 times"));
    }

    #[tokio::test]
    async fn datetime_tool_computes_day_differences() {
        let output = DateTimeTool
            .run("days between 2024-01-01 and 2024-12-31")
            .await
            .unwrap();
        assert_eq!(output, "Days between 2024-01-01 and 2024-12-31: 365 days");

        let output = DateTimeTool.run("current").await.unwrap();
        assert!(output.starts_with("Current date and time: "));

        let output = DateTimeTool.run("days between yesterday and today").await.unwrap();
        assert!(output.contains("YYYY-MM-DD"));
    }
}
