//! Prompt templates as runnables.
//!
//! [`PromptTemplate`] renders a `{variable}` string from a JSON object.
//! [`ChatPromptTemplate`] renders a list of role-tagged templates plus named
//! message placeholders (e.g. `chat_history`, `agent_scratchpad`) into a
//! `Vec<Message>` ready for a [`ChatModel`](crate::llm::ChatModel).
//!
//! `{{` and `}}` render as literal braces.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::ChainError;
use crate::message::{value_to_text, Message};
use crate::runnable::{impl_pipe_operator, Runnable};

/// Renders `template` with values from `vars`. Missing variables are an error.
fn render(template: &str, vars: &Map<String, Value>) -> Result<String, ChainError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => {
                            return Err(ChainError::InvalidInput(format!(
                                "unclosed variable in template: {{{}",
                                name
                            )))
                        }
                    }
                }
                let name = name.trim();
                let value = vars.get(name).ok_or_else(|| {
                    ChainError::InvalidInput(format!("missing template variable: {}", name))
                })?;
                out.push_str(&value_to_text(value));
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Variable names referenced by `template`, in order of first appearance.
fn variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '{' {
            if chars.peek() == Some(&'{') {
                chars.next();
                continue;
            }
            let name: String = chars.by_ref().take_while(|ch| *ch != '}').collect();
            let name = name.trim().to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

fn object_vars(input: Value) -> Result<Map<String, Value>, ChainError> {
    match input {
        Value::Object(map) => Ok(map),
        other => Err(ChainError::InvalidInput(format!(
            "prompt input must be a JSON object, got {}",
            other
        ))),
    }
}

/// String template over a JSON object, e.g. `"tell me a short joke about {topic}"`.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Variable names this template needs.
    pub fn input_variables(&self) -> Vec<String> {
        variables(&self.template)
    }

    pub fn format(&self, vars: &Map<String, Value>) -> Result<String, ChainError> {
        render(&self.template, vars)
    }
}

#[async_trait]
impl Runnable for PromptTemplate {
    type Input = Value;
    type Output = String;

    fn name(&self) -> &str {
        "prompt"
    }

    async fn invoke(&self, input: Value) -> Result<String, ChainError> {
        self.format(&object_vars(input)?)
    }
}

impl_pipe_operator!(PromptTemplate);

/// Input of a [`ChatPromptTemplate`]: template variables plus message lists
/// for the placeholders.
#[derive(Debug, Clone, Default)]
pub struct PromptInput {
    pub variables: Map<String, Value>,
    pub messages: HashMap<String, Vec<Message>>,
}

impl PromptInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a template variable (builder).
    pub fn var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Set the messages for a placeholder (builder).
    pub fn messages(mut self, placeholder: impl Into<String>, messages: Vec<Message>) -> Self {
        self.messages.insert(placeholder.into(), messages);
        self
    }
}

impl From<Value> for PromptInput {
    /// Object fields become variables; any other value becomes the `input` variable.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(variables) => Self {
                variables,
                messages: HashMap::new(),
            },
            other => Self::new().var("input", other),
        }
    }
}

#[derive(Debug, Clone)]
enum PromptPart {
    System(String),
    Human(String),
    Ai(String),
    Placeholder { name: String, optional: bool },
}

/// Ordered chat prompt: role templates and message placeholders.
///
/// ```
/// use braid::prompt::ChatPromptTemplate;
///
/// let prompt = ChatPromptTemplate::new()
///     .system("You are a Senior Financial Analyst.")
///     .placeholder("chat_history")
///     .human("{input}")
///     .placeholder("agent_scratchpad");
/// assert_eq!(prompt.input_variables(), vec!["input".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChatPromptTemplate {
    parts: Vec<PromptPart>,
}

impl ChatPromptTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single human message template.
    pub fn from_template(template: impl Into<String>) -> Self {
        Self::new().human(template)
    }

    pub fn system(mut self, template: impl Into<String>) -> Self {
        self.parts.push(PromptPart::System(template.into()));
        self
    }

    pub fn human(mut self, template: impl Into<String>) -> Self {
        self.parts.push(PromptPart::Human(template.into()));
        self
    }

    pub fn ai(mut self, template: impl Into<String>) -> Self {
        self.parts.push(PromptPart::Ai(template.into()));
        self
    }

    /// Optional placeholder: renders nothing when the input has no messages for it.
    pub fn placeholder(mut self, name: impl Into<String>) -> Self {
        self.parts.push(PromptPart::Placeholder {
            name: name.into(),
            optional: true,
        });
        self
    }

    /// Required placeholder: missing messages are an `InvalidInput` error.
    pub fn required_placeholder(mut self, name: impl Into<String>) -> Self {
        self.parts.push(PromptPart::Placeholder {
            name: name.into(),
            optional: false,
        });
        self
    }

    pub fn input_variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for part in &self.parts {
            let template = match part {
                PromptPart::System(t) | PromptPart::Human(t) | PromptPart::Ai(t) => t,
                PromptPart::Placeholder { .. } => continue,
            };
            for name in variables(template) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn format_messages(&self, input: &PromptInput) -> Result<Vec<Message>, ChainError> {
        let mut out = Vec::new();
        for part in &self.parts {
            match part {
                PromptPart::System(t) => out.push(Message::System(render(t, &input.variables)?)),
                PromptPart::Human(t) => out.push(Message::User(render(t, &input.variables)?)),
                PromptPart::Ai(t) => out.push(Message::Assistant(render(t, &input.variables)?)),
                PromptPart::Placeholder { name, optional } => match input.messages.get(name) {
                    Some(messages) => out.extend(messages.iter().cloned()),
                    None if *optional => {}
                    None => {
                        return Err(ChainError::InvalidInput(format!(
                            "missing messages for placeholder: {}",
                            name
                        )))
                    }
                },
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl Runnable for ChatPromptTemplate {
    type Input = PromptInput;
    type Output = Vec<Message>;

    fn name(&self) -> &str {
        "chat_prompt"
    }

    async fn invoke(&self, input: PromptInput) -> Result<Vec<Message>, ChainError> {
        self.format_messages(&input)
    }
}

impl_pipe_operator!(ChatPromptTemplate);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// **Scenario**: variables are substituted; strings render without quotes.
    #[tokio::test]
    async fn prompt_template_renders_variables() {
        let p = PromptTemplate::new("tell me a short joke about {topic} ({n} lines)");
        let out = p.invoke(json!({"topic": "ice cream", "n": 2})).await.unwrap();
        assert_eq!(out, "tell me a short joke about ice cream (2 lines)");
        assert_eq!(p.input_variables(), vec!["topic", "n"]);
    }

    /// **Scenario**: a missing variable is InvalidInput naming the variable.
    #[tokio::test]
    async fn prompt_template_missing_variable_fails() {
        let p = PromptTemplate::new("Who is {name}");
        let err = p.invoke(json!({})).await.unwrap_err();
        assert!(matches!(err, ChainError::InvalidInput(ref m) if m.contains("name")));
    }

    /// **Scenario**: non-object input is rejected.
    #[tokio::test]
    async fn prompt_template_rejects_non_object() {
        let p = PromptTemplate::new("x");
        assert!(matches!(
            p.invoke(json!("str")).await,
            Err(ChainError::InvalidInput(_))
        ));
    }

    /// **Scenario**: doubled braces are literal.
    #[test]
    fn render_escaped_braces() {
        let vars = Map::new();
        assert_eq!(render("{{\"a\": 1}}", &vars).unwrap(), "{\"a\": 1}");
        assert!(variables("{{x}}").is_empty());
    }

    /// **Scenario**: placeholders splice messages in order; missing optional ones render nothing.
    #[tokio::test]
    async fn chat_prompt_splices_placeholders() {
        let prompt = ChatPromptTemplate::new()
            .system("sys")
            .placeholder("chat_history")
            .human("{input}")
            .placeholder("agent_scratchpad");
        let input = PromptInput::new()
            .var("input", "buy GOOGL?")
            .messages("chat_history", vec![Message::user("hi"), Message::assistant("hello")]);
        let out = prompt.invoke(input).await.unwrap();
        assert_eq!(
            out,
            vec![
                Message::system("sys"),
                Message::user("hi"),
                Message::assistant("hello"),
                Message::user("buy GOOGL?"),
            ]
        );
    }

    /// **Scenario**: a required placeholder without messages fails.
    #[test]
    fn chat_prompt_required_placeholder_missing_fails() {
        let prompt = ChatPromptTemplate::new().required_placeholder("history");
        assert!(prompt.format_messages(&PromptInput::new()).is_err());
    }

    /// **Scenario**: a non-object value converts to the `input` variable.
    #[test]
    fn prompt_input_from_scalar_value() {
        let input = PromptInput::from(json!("hello"));
        assert_eq!(input.variables["input"], json!("hello"));
        let input = PromptInput::from(json!({"topic": "x"}));
        assert_eq!(input.variables["topic"], json!("x"));
    }
}
