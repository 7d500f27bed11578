//! Passthrough, lambda, parallel and a full pipeline over support tickets.
//!
//! Run: `cargo run -p braid-examples --example runnable_methods`

use braid::{BranchMap, ChainError, Lambda, Parallel, Passthrough, Runnable, RunnableExt};
use serde_json::{json, Value};

fn extract_sentiment(text: &str) -> &'static str {
    let text = text.to_lowercase();
    if ["bad", "broken", "angry", "slow"].iter().any(|w| text.contains(w)) {
        "HIGH PRIORITY"
    } else {
        "STANDARD"
    }
}

fn content(x: &Value) -> Result<&str, ChainError> {
    x["content"]
        .as_str()
        .ok_or_else(|| ChainError::InvalidInput("ticket has no content".into()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- 1. Passthrough chain ---");
    let simple = Passthrough::<String>::new() | Passthrough::<String>::new();
    println!("Result: {}\n", simple.invoke("Ticket-101".into()).await?);

    println!("--- 2. Lambda transformation ---");
    let lambda_chain = Passthrough::<String>::new()
        | Lambda::map("extract_sentiment", |s: String| extract_sentiment(&s).to_string());
    let sentiment = lambda_chain
        .invoke("The internet connection is very slow and broken".into())
        .await?;
    println!("Sentiment: {}\n", sentiment);

    println!("--- 3. Parallel processing ---");
    let parallel = Parallel::builder()
        .branch("original_input", Passthrough::<Value>::new())
        .branch("id_only", Lambda::map("id_only", |x: Value| x["id"].clone()))
        .branch(
            "priority",
            Lambda::new("priority", |x: Value| Ok(json!(extract_sentiment(content(&x)?)))),
        )
        .build()?;
    let out = parallel
        .invoke(json!({"id": "TKT-404", "content": "My screen is flickering and I am angry"}))
        .await?;
    for (key, value) in &out {
        println!("  {}: {}", key, value);
    }

    println!("\n--- 4. Full pipeline ---");
    let pipeline = Parallel::builder()
        .branch("id", Lambda::map("id", |x: Value| x["id"].clone()))
        .branch(
            "content",
            Lambda::new("content", |x: Value| Ok(json!(content(&x)?.to_uppercase()))),
        )
        .branch(
            "status",
            Lambda::new("status", |x: Value| Ok(json!(extract_sentiment(content(&x)?)))),
        )
        .build()?
        .pipe(Lambda::map("format_log", |m: BranchMap<Value>| {
            format!(
                "Ticket [{}]: {} -> Status: {}",
                m["id"].as_str().unwrap_or_default(),
                m["content"].as_str().unwrap_or_default(),
                m["status"].as_str().unwrap_or_default()
            )
        }));
    let line = pipeline
        .invoke(json!({"id": "TKT-999", "content": "Everything is working perfectly fine!"}))
        .await?;
    println!("{}", line);
    Ok(())
}
