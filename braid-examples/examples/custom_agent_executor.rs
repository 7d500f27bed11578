//! Financial analyst agent: stock price, news sentiment, then `final_answer`.
//!
//! By default the model is scripted, so the run is offline and deterministic.
//! With `--live` the agent talks to an OpenAI-compatible endpoint configured by
//! `OPENAI_API_KEY` (or `GROQ_API_KEY`), `OPENAI_BASE_URL` and `MODEL`, read
//! from the environment, `.env` or `~/.config/braid/config.toml`.
//!
//! Run: `cargo run -p braid-examples --example custom_agent_executor -- [--live] "Is it a good time to buy Google?"`

use std::sync::Arc;

use braid::tools::finance::{analyst_registry, ANALYST_SYSTEM_PROMPT};
use braid::{
    AgentExecutor, ChatCompletionsClient, ExecutorError, LlmClient, LlmDecision, LlmResponse,
    MockLlm, ToolCall, ToolChoiceMode,
};
use braid_config::{ExecutorSettings, LlmSettings, APP_NAME};
use serde_json::json;

/// Replays the three tool calls a well-behaved model makes for "Google".
fn scripted_model() -> MockLlm {
    MockLlm::new(vec![
        LlmResponse::tool_calls(vec![
            ToolCall::new("get_stock_price", json!({"symbol": "GOOGL"})).with_id("call_price")
        ]),
        LlmResponse::tool_calls(vec![ToolCall::new(
            "get_company_news_sentiment",
            json!({"symbol": "GOOGL"}),
        )
        .with_id("call_sentiment")]),
        LlmResponse::tool_calls(vec![ToolCall::new(
            "final_answer",
            json!({
                "answer": "GOOGL trades at 140.20 with neutral news sentiment: hold for now.",
                "tools_used": ["get_stock_price", "get_company_news_sentiment"]
            }),
        )
        .with_id("call_final")]),
    ])
}

fn live_model() -> Result<ChatCompletionsClient, Box<dyn std::error::Error>> {
    let settings = LlmSettings::from_env();
    let mode: ToolChoiceMode = settings.tool_choice.parse()?;
    Ok(ChatCompletionsClient::new(&settings.base_url, &settings.model)
        .with_api_key(settings.require_api_key()?)
        .with_temperature(0.0)
        .with_tools(analyst_registry().list())
        .with_tool_choice(mode))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = braid_config::load_and_apply(APP_NAME, None) {
        eprintln!("config: {}", e);
    }
    let mut live = false;
    let mut question = "Is it a good time to buy Google?".to_string();
    for arg in std::env::args().skip(1) {
        if arg == "--live" {
            live = true;
        } else {
            question = arg;
        }
    }

    let llm: Arc<dyn LlmClient> = if live {
        Arc::new(live_model()?)
    } else {
        Arc::new(scripted_model())
    };
    let settings = ExecutorSettings::from_env()?;
    let executor = AgentExecutor::new(
        LlmDecision::from_arc(llm, ANALYST_SYSTEM_PROMPT),
        analyst_registry(),
    )
    .with_max_iterations(settings.max_iterations)
    .with_terminal_tool(settings.terminal_tool);

    println!("--- Starting analysis for: {} ---", question);
    match executor.run(question.as_str(), vec![]).await {
        Ok(outcome) => {
            for call in outcome.transcript.requests() {
                println!(
                    "Calling tool '{}' with {} ({})",
                    call.name,
                    call.arguments,
                    call.id.as_deref().unwrap_or("-")
                );
            }
            println!("\n--- FINAL STRUCTURED RESULT ---");
            println!("Answer: {}", outcome.output["answer"]);
            println!("Tools used: {}", outcome.output["tools_used"]);
            Ok(())
        }
        Err(ExecutorError::IterationLimitExceeded { max_iterations, transcript }) => {
            println!(
                "No final answer after {} rounds; tools called: {:?}",
                max_iterations,
                transcript.tools_used()
            );
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
