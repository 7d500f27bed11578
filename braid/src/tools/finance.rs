//! Financial analyst demo tools backed by fixed data.
//!
//! `get_stock_price` and `get_company_news_sentiment` answer for AAPL, GOOGL and
//! TSLA; `final_answer` is the executor's default terminal tool.

use serde_json::{json, Value};

use super::{arg_str, object_schema, FnTool, ToolError, ToolRegistry};

pub const TOOL_STOCK_PRICE: &str = "get_stock_price";
pub const TOOL_NEWS_SENTIMENT: &str = "get_company_news_sentiment";
pub const TOOL_FINAL_ANSWER: &str = "final_answer";

/// Price used for unknown tickers.
pub const DEFAULT_PRICE: f64 = 100.0;

/// Prompt for the financial analyst agent.
pub const ANALYST_SYSTEM_PROMPT: &str = "You are a Senior Financial Analyst. \
Use the tools to look up the stock price and the news sentiment of the company the user asks about. \
When you have enough information, call final_answer with your recommendation and the list of tools you used.";

/// Mock price for `symbol` (case-insensitive).
pub fn stock_price(symbol: &str) -> f64 {
    match symbol.to_uppercase().as_str() {
        "AAPL" => 175.50,
        "GOOGL" => 140.20,
        "TSLA" => 250.10,
        _ => DEFAULT_PRICE,
    }
}

/// Mock news sentiment for `symbol` (case-insensitive).
pub fn news_sentiment(symbol: &str) -> &'static str {
    match symbol.to_uppercase().as_str() {
        "AAPL" => "Positive",
        "GOOGL" => "Neutral",
        "TSLA" => "Negative",
        _ => "Unknown",
    }
}

pub fn stock_price_tool() -> FnTool {
    FnTool::new(
        TOOL_STOCK_PRICE,
        "Get the current stock price for a ticker symbol, e.g. AAPL.",
        object_schema(json!({"symbol": {"type": "string", "description": "Ticker symbol"}})),
        |args| {
            let symbol = arg_str(&args, "symbol")?;
            Ok(json!({"symbol": symbol.to_uppercase(), "price": stock_price(symbol)}))
        },
    )
}

pub fn news_sentiment_tool() -> FnTool {
    FnTool::new(
        TOOL_NEWS_SENTIMENT,
        "Get the recent news sentiment (Positive, Neutral or Negative) for a ticker symbol.",
        object_schema(json!({"symbol": {"type": "string", "description": "Ticker symbol"}})),
        |args| {
            let symbol = arg_str(&args, "symbol")?;
            Ok(json!({"symbol": symbol.to_uppercase(), "sentiment": news_sentiment(symbol)}))
        },
    )
}

/// Terminal tool: echoes `{answer, tools_used}` back as the final result.
pub fn final_answer_tool() -> FnTool {
    FnTool::new(
        TOOL_FINAL_ANSWER,
        "Give the final answer to the user. Call this once you are done.",
        object_schema(json!({
            "answer": {"type": "string", "description": "Answer for the user"},
            "tools_used": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Names of the tools used to reach the answer"
            }
        })),
        |args| {
            let answer = arg_str(&args, "answer")?;
            let tools_used = match args.get("tools_used") {
                Some(Value::Array(items)) => items.clone(),
                None | Some(Value::Null) => Vec::new(),
                Some(other) => {
                    return Err(ToolError::InvalidInput(format!(
                        "tools_used must be a list, got {}",
                        other
                    )))
                }
            };
            Ok(json!({"answer": answer, "tools_used": tools_used}))
        },
    )
}

/// Registry with the three analyst tools.
pub fn analyst_registry() -> ToolRegistry {
    ToolRegistry::new()
        .with(stock_price_tool())
        .with(news_sentiment_tool())
        .with(final_answer_tool())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Tool;

    #[test]
    fn fixed_data_with_defaults() {
        assert_eq!(stock_price("aapl"), 175.50);
        assert_eq!(stock_price("GOOGL"), 140.20);
        assert_eq!(stock_price("TSLA"), 250.10);
        assert_eq!(stock_price("MSFT"), DEFAULT_PRICE);
        assert_eq!(news_sentiment("GOOGL"), "Neutral");
        assert_eq!(news_sentiment("tsla"), "Negative");
        assert_eq!(news_sentiment("MSFT"), "Unknown");
    }

    /// **Scenario**: price tool requires a symbol.
    #[tokio::test]
    async fn stock_price_tool_requires_symbol() {
        let tool = stock_price_tool();
        let out = tool.call(json!({"symbol": "googl"})).await.unwrap();
        assert_eq!(out, json!({"symbol": "GOOGL", "price": 140.20}));
        assert!(matches!(
            tool.call(json!({})).await,
            Err(ToolError::InvalidInput(_))
        ));
    }

    /// **Scenario**: final_answer echoes answer and tools_used.
    #[tokio::test]
    async fn final_answer_echoes_arguments() {
        let out = final_answer_tool()
            .call(json!({"answer": "Hold", "tools_used": ["get_stock_price"]}))
            .await
            .unwrap();
        assert_eq!(out, json!({"answer": "Hold", "tools_used": ["get_stock_price"]}));

        let out = final_answer_tool().call(json!({"answer": "Hold"})).await.unwrap();
        assert_eq!(out["tools_used"], json!([]));
    }

    #[test]
    fn analyst_registry_has_three_tools() {
        assert_eq!(
            analyst_registry().names(),
            vec![TOOL_FINAL_ANSWER, TOOL_NEWS_SENTIMENT, TOOL_STOCK_PRICE]
        );
    }
}
