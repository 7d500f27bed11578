//! Typed settings read from the environment (after [`load_and_apply`](crate::load_and_apply)).

use crate::LoadError;

pub const ENV_MAX_ITERATIONS: &str = "BRAID_MAX_ITERATIONS";
pub const ENV_TERMINAL_TOOL: &str = "BRAID_TERMINAL_TOOL";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_MODEL: &str = "MODEL";
pub const ENV_TOOL_CHOICE: &str = "BRAID_TOOL_CHOICE";
pub const ENV_WAQI_TOKEN: &str = "WAQI_API_TOKEN";

pub const DEFAULT_MAX_ITERATIONS: u32 = 3;
pub const DEFAULT_TERMINAL_TOOL: &str = "final_answer";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TOOL_CHOICE: &str = "required";

/// Non-empty value of `key`.
fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Executor loop limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorSettings {
    pub max_iterations: u32,
    pub terminal_tool: String,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            terminal_tool: DEFAULT_TERMINAL_TOOL.to_string(),
        }
    }
}

impl ExecutorSettings {
    pub fn from_env() -> Result<Self, LoadError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Reads settings through `lookup` (key → value); unset keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoadError> {
        let mut settings = Self::default();
        if let Some(raw) = non_empty(&lookup, ENV_MAX_ITERATIONS) {
            settings.max_iterations = raw.parse().map_err(|_| LoadError::InvalidValue {
                key: ENV_MAX_ITERATIONS.to_string(),
                value: raw.clone(),
            })?;
        }
        if let Some(tool) = non_empty(&lookup, ENV_TERMINAL_TOOL) {
            settings.terminal_tool = tool;
        }
        Ok(settings)
    }
}

/// Chat model endpoint settings.
#[derive(Clone, PartialEq, Eq)]
pub struct LlmSettings {
    /// `OPENAI_API_KEY`, falling back to `GROQ_API_KEY`.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// `auto`, `none` or `required`.
    pub tool_choice: String,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("tool_choice", &self.tool_choice)
            .finish()
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            tool_choice: DEFAULT_TOOL_CHOICE.to_string(),
        }
    }
}

impl LlmSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_key: non_empty(&lookup, ENV_API_KEY)
                .or_else(|| non_empty(&lookup, ENV_GROQ_API_KEY)),
            base_url: non_empty(&lookup, ENV_BASE_URL).unwrap_or(defaults.base_url),
            model: non_empty(&lookup, ENV_MODEL).unwrap_or(defaults.model),
            tool_choice: non_empty(&lookup, ENV_TOOL_CHOICE).unwrap_or(defaults.tool_choice),
        }
    }

    /// The API key, or [`LoadError::Missing`] naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str, LoadError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| LoadError::Missing(ENV_API_KEY.to_string()))
    }
}

/// Token for the WAQI air quality API (`WAQI_API_TOKEN`).
pub fn waqi_token_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    non_empty(&lookup, ENV_WAQI_TOKEN)
}

pub fn waqi_token() -> Option<String> {
    waqi_token_from_lookup(|k| std::env::var(k).ok())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn executor_defaults_when_unset() {
        let s = ExecutorSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s, ExecutorSettings::default());
        assert_eq!(s.max_iterations, 3);
        assert_eq!(s.terminal_tool, "final_answer");
    }

    #[test]
    fn executor_reads_values() {
        let s = ExecutorSettings::from_lookup(lookup(&[
            (ENV_MAX_ITERATIONS, " 7 "),
            (ENV_TERMINAL_TOOL, "finish"),
        ]))
        .unwrap();
        assert_eq!(s.max_iterations, 7);
        assert_eq!(s.terminal_tool, "finish");
    }

    #[test]
    fn executor_rejects_bad_number() {
        let err =
            ExecutorSettings::from_lookup(lookup(&[(ENV_MAX_ITERATIONS, "three")])).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { ref key, .. } if key == ENV_MAX_ITERATIONS));
    }

    #[test]
    fn llm_defaults_point_at_groq() {
        let s = LlmSettings::from_lookup(lookup(&[]));
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.model, DEFAULT_MODEL);
        assert!(s.api_key.is_none());
        assert!(matches!(s.require_api_key(), Err(LoadError::Missing(_))));
    }

    #[test]
    fn llm_api_key_falls_back_to_groq_key() {
        let s = LlmSettings::from_lookup(lookup(&[(ENV_GROQ_API_KEY, "gsk_1"), (ENV_MODEL, "m")]));
        assert_eq!(s.require_api_key().unwrap(), "gsk_1");
        assert_eq!(s.model, "m");
        let s =
            LlmSettings::from_lookup(lookup(&[(ENV_GROQ_API_KEY, "gsk_1"), (ENV_API_KEY, "sk_2")]));
        assert_eq!(s.api_key.as_deref(), Some("sk_2"));
    }

    #[test]
    fn llm_debug_redacts_api_key() {
        let s = LlmSettings::from_lookup(lookup(&[(ENV_API_KEY, "sk-secret")]));
        let dbg = format!("{:?}", s);
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("redacted"));
    }

    #[test]
    fn waqi_token_empty_is_none() {
        assert_eq!(waqi_token_from_lookup(lookup(&[(ENV_WAQI_TOKEN, "  ")])), None);
        assert_eq!(
            waqi_token_from_lookup(lookup(&[(ENV_WAQI_TOKEN, "abc")])).as_deref(),
            Some("abc")
        );
    }
}
