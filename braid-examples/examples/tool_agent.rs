//! Two small agents over live lookups: temperature → clothing advice, and
//! air quality → outdoor exercise advice.
//!
//! The decision stage is scripted: look the value up, then hand it to the
//! advice tool, which is the terminal tool. `--offline` swaps the HTTP lookups
//! for fixed readings. The AQI agent needs `WAQI_API_TOKEN` unless offline.
//!
//! Run: `cargo run -p braid-examples --example tool_agent -- [--offline] Delhi`

use braid::tools::advice::{
    clothing_advice_tool, exercise_advice_tool, TOOL_CLOTHING_ADVICE, TOOL_EXERCISE_ADVICE,
};
use braid::tools::web::{AqiTool, TemperatureTool, TOOL_AQI, TOOL_TEMPERATURE};
use braid::{AgentExecutor, Decision, FnDecision, FnTool, ToolRegistry};
use braid_config::APP_NAME;
use serde_json::{json, Value};

/// Look up with `lookup`, then pass the reading under `field` to `advice`.
fn lookup_then_advise(
    lookup: &'static str,
    field: &'static str,
    advice: &'static str,
) -> FnDecision {
    FnDecision::new(move |ctx| {
        Ok(match ctx.transcript.last_observation() {
            None => Decision::call(lookup, json!({"city": ctx.input})),
            Some(reading) => Decision::call(advice, single(field, reading[field].clone())),
        })
    })
}

fn single(key: &str, value: Value) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

fn fixed(name: &'static str, field: &'static str, value: Value) -> FnTool {
    FnTool::new(name, "Fixed reading for offline runs", json!({}), move |args| {
        let mut reading = single(field, value.clone());
        reading["city"] = args["city"].clone();
        Ok(reading)
    })
}

async fn run(
    title: &str,
    city: &str,
    decision: FnDecision,
    tools: ToolRegistry,
    terminal: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let executor = AgentExecutor::new(decision, tools).with_terminal_tool(terminal);
    let outcome = executor.run(city, vec![]).await?;
    println!("--- {} ({}) ---", title, city);
    for name in outcome.transcript.tools_used() {
        println!("  used {}", name);
    }
    println!("  {}", braid::message::value_to_text(&outcome.output));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = braid_config::load_and_apply(APP_NAME, None) {
        eprintln!("config: {}", e);
    }
    let mut offline = false;
    let mut city = "Delhi".to_string();
    for arg in std::env::args().skip(1) {
        if arg == "--offline" {
            offline = true;
        } else {
            city = arg;
        }
    }

    let weather_tools = if offline {
        ToolRegistry::new().with(fixed(TOOL_TEMPERATURE, "temperature_celsius", json!(31.0)))
    } else {
        ToolRegistry::new().with(TemperatureTool::new())
    }
    .with(clothing_advice_tool());
    run(
        "Weather and clothing",
        &city,
        lookup_then_advise(TOOL_TEMPERATURE, "temperature_celsius", TOOL_CLOTHING_ADVICE),
        weather_tools,
        TOOL_CLOTHING_ADVICE,
    )
    .await?;

    let aqi_tools = match (offline, braid_config::waqi_token()) {
        (true, _) => ToolRegistry::new().with(fixed(TOOL_AQI, "aqi", json!(162))),
        (false, Some(token)) => ToolRegistry::new().with(AqiTool::new(token)),
        (false, None) => {
            eprintln!("WAQI_API_TOKEN is not set; skipping the air quality agent");
            return Ok(());
        }
    }
    .with(exercise_advice_tool());
    run(
        "Air quality and exercise",
        &city,
        lookup_then_advise(TOOL_AQI, "aqi", TOOL_EXERCISE_ADVICE),
        aqi_tools,
        TOOL_EXERCISE_ADVICE,
    )
    .await
}
