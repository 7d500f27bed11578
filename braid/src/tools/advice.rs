//! Advice tools that turn a measurement into a recommendation.

use serde_json::json;

use super::{arg_f64, object_schema, FnTool};

pub const TOOL_CLOTHING_ADVICE: &str = "clothing_advice";
pub const TOOL_EXERCISE_ADVICE: &str = "outdoor_exercise_advice";

/// Clothing for a temperature in °C.
pub fn clothing_for(temperature_celsius: f64) -> &'static str {
    if temperature_celsius >= 30.0 {
        "Wear light, breathable clothing and stay hydrated."
    } else if temperature_celsius >= 20.0 {
        "Casual clothing is fine."
    } else {
        "Wear warm clothes or a jacket."
    }
}

/// Outdoor exercise recommendation for an AQI value.
pub fn exercise_for(aqi: f64) -> &'static str {
    if aqi <= 50.0 {
        "Air quality is good. Outdoor exercise is safe."
    } else if aqi <= 100.0 {
        "Air quality is moderate. Light outdoor exercise is fine."
    } else if aqi <= 150.0 {
        "Unhealthy for sensitive groups. Limit prolonged outdoor exercise."
    } else {
        "Air quality is unhealthy. Exercise indoors."
    }
}

pub fn clothing_advice_tool() -> FnTool {
    FnTool::new(
        TOOL_CLOTHING_ADVICE,
        "Suggest clothing for a temperature in degrees Celsius.",
        object_schema(json!({"temperature_celsius": {"type": "number"}})),
        |args| {
            let t = arg_f64(&args, "temperature_celsius")?;
            Ok(json!(clothing_for(t)))
        },
    )
}

pub fn exercise_advice_tool() -> FnTool {
    FnTool::new(
        TOOL_EXERCISE_ADVICE,
        "Say whether outdoor exercise is advisable for an air quality index.",
        object_schema(json!({"aqi": {"type": "number"}})),
        |args| {
            let aqi = arg_f64(&args, "aqi")?;
            Ok(json!(exercise_for(aqi)))
        },
    )
}
