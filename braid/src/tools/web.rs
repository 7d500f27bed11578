//! Live lookups: current temperature (wttr.in) and air quality index (WAQI).
//!
//! Response parsing is split from the HTTP call so it can be tested offline.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};

use super::{arg_str, object_schema, Tool, ToolError, ToolSpec};

pub const TOOL_TEMPERATURE: &str = "get_temperature_celsius";
pub const TOOL_AQI: &str = "get_city_aqi";

const WTTR_BASE_URL: &str = "https://wttr.in";
const WAQI_BASE_URL: &str = "https://api.waqi.info";

/// Matches the timeout the weather and air quality lookups are allowed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// `base` with `segments` appended as percent-encoded path segments, so a
/// city name can never add a query, a fragment or extra path levels.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ToolError> {
    let mut url = Url::parse(base)
        .map_err(|e| ToolError::InvalidInput(format!("bad base url '{}': {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| ToolError::InvalidInput(format!("base url cannot take a path: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn get_json(request: reqwest::RequestBuilder) -> Result<Value, ToolError> {
    let res = request
        .send()
        .await
        .map_err(|e| ToolError::Transport(e.to_string()))?;
    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        return Err(ToolError::Transport(format!("HTTP {}: {}", status, body)));
    }
    res.json()
        .await
        .map_err(|e| ToolError::Transport(e.to_string()))
}

/// Current temperature in °C from a wttr.in `format=j1` body
/// (`current_condition[0].temp_C`, sent as a string).
pub fn parse_wttr_temperature(body: &Value) -> Result<f64, ToolError> {
    let raw = body
        .get("current_condition")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("temp_C"))
        .ok_or_else(|| ToolError::Execution("wttr.in response has no temp_C".into()))?;
    match raw {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
    .ok_or_else(|| ToolError::Execution(format!("unparseable temp_C: {}", raw)))
}

/// AQI from a WAQI feed body; `status` must be `"ok"`.
pub fn parse_waqi_aqi(body: &Value) -> Result<i64, ToolError> {
    let status = body.get("status").and_then(|s| s.as_str()).unwrap_or("");
    if status != "ok" {
        let detail = body.get("data").map(|d| d.to_string()).unwrap_or_default();
        return Err(ToolError::Execution(format!(
            "WAQI status '{}': {}",
            status, detail
        )));
    }
    body.get("data")
        .and_then(|d| d.get("aqi"))
        .and_then(|a| a.as_i64())
        .ok_or_else(|| ToolError::Execution("WAQI response has no numeric aqi".into()))
}

/// Current temperature of a city via wttr.in.
pub struct TemperatureTool {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl TemperatureTool {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: WTTR_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Per-request timeout (default [`DEFAULT_TIMEOUT`]).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share one connection pool with other tools.
    pub fn with_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }
}

impl Default for TemperatureTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for TemperatureTool {
    fn name(&self) -> &str {
        TOOL_TEMPERATURE
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_TEMPERATURE.to_string(),
            description: Some("Get the current temperature (°C) of a city.".to_string()),
            input_schema: object_schema(json!({"city": {"type": "string"}})),
        }
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let city = arg_str(&args, "city")?;
        let url = endpoint(&self.base_url, &[city])?;
        let request = self
            .http
            .get(url)
            .query(&[("format", "j1")])
            .timeout(self.timeout);
        let body = get_json(request).await?;
        let temperature = parse_wttr_temperature(&body)?;
        Ok(json!({"city": city, "temperature_celsius": temperature}))
    }
}

/// Air quality index of a city via the WAQI API (needs a token).
pub struct AqiTool {
    http: reqwest::Client,
    token: String,
    base_url: String,
    timeout: Duration,
}

impl AqiTool {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            base_url: WAQI_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }
}

#[async_trait]
impl Tool for AqiTool {
    fn name(&self) -> &str {
        TOOL_AQI
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_AQI.to_string(),
            description: Some("Get the current air quality index (AQI) of a city.".to_string()),
            input_schema: object_schema(json!({"city": {"type": "string"}})),
        }
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let city = arg_str(&args, "city")?;
        // Trailing empty segment keeps WAQI's `/feed/<city>/` form.
        let url = endpoint(&self.base_url, &["feed", city, ""])?;
        let request = self
            .http
            .get(url)
            .query(&[("token", self.token.as_str())])
            .timeout(self.timeout);
        let body = get_json(request).await?;
        let aqi = parse_waqi_aqi(&body)?;
        Ok(json!({"city": city, "aqi": aqi}))
    }
}
