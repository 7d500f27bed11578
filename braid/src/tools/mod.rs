//! Tools: named operations the executor dispatches by name.
//!
//! A [`Tool`] has a unique name, a [`ToolSpec`] (description + JSON schema sent
//! to the model) and an async `call`. Tools are registered in a
//! [`ToolRegistry`]; the executor looks requested names up there.
//!
//! Bundled tools: the financial analyst demo ([`finance`]), live weather and
//! air quality lookups ([`web`]), the advice tools that consume them
//! ([`advice`]) and a PDF word counter ([`pdf`]).

pub mod advice;
pub mod finance;
pub mod pdf;
mod registry;
pub mod web;

pub use registry::ToolRegistry;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Name, description and argument schema of a tool, as sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    /// JSON Schema of the arguments object.
    pub input_schema: Value,
}

/// Error from a tool lookup or call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool with this name is registered.
    #[error("tool not found: {0}")]
    NotFound(String),
    /// Arguments missing or of the wrong type.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The tool ran and failed.
    #[error("execution failed: {0}")]
    Execution(String),
    /// Network or remote API failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// A named operation callable with a JSON arguments value.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name within a registry.
    fn name(&self) -> &str;

    fn spec(&self) -> ToolSpec;

    async fn call(&self, args: Value) -> Result<Value, ToolError>;
}

type ToolFn = Arc<dyn Fn(Value) -> Result<Value, ToolError> + Send + Sync>;

/// Tool backed by a synchronous closure.
///
/// ```
/// use braid::tools::{FnTool, Tool};
/// use serde_json::json;
///
/// let double = FnTool::new("double", "Doubles a number", json!({"type": "number"}), |v| {
///     Ok(json!(v.as_f64().unwrap_or_default() * 2.0))
/// });
/// assert_eq!(double.name(), "double");
/// ```
#[derive(Clone)]
pub struct FnTool {
    spec: ToolSpec,
    func: ToolFn,
}

impl FnTool {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        func: F,
    ) -> Self
    where
        F: Fn(Value) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        Self {
            spec: ToolSpec {
                name: name.into(),
                description: Some(description.into()),
                input_schema,
            },
            func: Arc::new(func),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn spec(&self) -> ToolSpec {
        self.spec.clone()
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        (self.func)(args)
    }
}

/// Required string field of an arguments object.
pub fn arg_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidInput(format!("missing string argument: {}", key)))
}

/// Required numeric field of an arguments object. Numeric strings are accepted.
pub fn arg_f64(args: &Value, key: &str) -> Result<f64, ToolError> {
    match args.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| ToolError::InvalidInput(format!("missing numeric argument: {}", key)))
}

/// JSON schema of an object whose properties are all required.
pub(crate) fn object_schema(properties: Value) -> Value {
    let required: Vec<String> = properties
        .as_object()
        .map(|p| p.keys().cloned().collect())
        .unwrap_or_default();
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// **Scenario**: FnTool exposes its spec and runs its closure.
    #[tokio::test]
    async fn fn_tool_calls_closure() {
        let tool = FnTool::new("double", "x2", json!({}), |v| {
            Ok(json!(v.as_i64().unwrap_or_default() * 2))
        });
        assert_eq!(tool.spec().name, "double");
        assert_eq!(tool.spec().description.as_deref(), Some("x2"));
        assert_eq!(tool.call(json!(5)).await.unwrap(), json!(10));
    }

    #[test]
    fn arg_helpers_validate_fields() {
        let args = json!({"symbol": "AAPL", "t": "31.5", "n": 7});
        assert_eq!(arg_str(&args, "symbol").unwrap(), "AAPL");
        assert_eq!(arg_f64(&args, "t").unwrap(), 31.5);
        assert_eq!(arg_f64(&args, "n").unwrap(), 7.0);
        assert!(matches!(arg_str(&args, "n"), Err(ToolError::InvalidInput(_))));
        assert!(matches!(arg_f64(&args, "missing"), Err(ToolError::InvalidInput(_))));
    }

    #[test]
    fn object_schema_requires_every_property() {
        let schema = object_schema(json!({"a": {"type": "string"}}));
        assert_eq!(schema["required"], json!(["a"]));
        assert_eq!(schema["type"], "object");
    }
}
