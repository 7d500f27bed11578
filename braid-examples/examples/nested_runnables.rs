//! Parallel branches, `assign` and an extraction chain composed into one pipeline.
//!
//! Run: `cargo run -p braid-examples --example nested_runnables`

use braid::{BranchMap, Lambda, Parallel, Passthrough, Runnable, RunnableExt};
use serde_json::{json, Value};

fn doc_summary(doc: Value) -> Value {
    let content = doc["content"].as_str().unwrap_or("empty");
    json!(format!(
        "SUMMARY: {}...",
        content.chars().take(20).collect::<String>()
    ))
}

fn branch_chain() -> Result<Parallel<Value, Value>, braid::ChainError> {
    Parallel::builder()
        .branch(
            "metadata",
            Passthrough::<Value>::new() | Lambda::map("doc_summary", doc_summary),
        )
        .branch("raw_copy", Lambda::map("raw_copy", |d: Value| d["content"].clone()))
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let priority_score = Lambda::map("priority_score", |m: BranchMap<Value>| {
        json!(serde_json::to_string(&m).map(|s| s.len()).unwrap_or_default() * 10)
    });
    let processing_chain = branch_chain()?.assign("priority_score", priority_score).shared();

    let output_formatting = Lambda::map("metadata_extractor", |m: BranchMap<Value>| {
        m.get("priority_score").cloned().unwrap_or_else(|| json!("0"))
    }) | Lambda::map("format_final_output", |v: Value| {
        format!("FINAL PROCESSED STATUS: {}", v.to_string().to_uppercase())
    });
    let full_pipeline = processing_chain.clone().pipe(output_formatting);

    let doc = json!({
        "content": "Urgent: The server is overheating in the data center.",
        "author": "Admin"
    });

    println!("--- running the complete pipeline ---");
    let initial = branch_chain()?.invoke(doc.clone()).await?;
    println!("Before assign: {}", serde_json::to_string(&initial)?);
    let intermediate = processing_chain.invoke(doc.clone()).await?;
    println!("After assign: {}", serde_json::to_string(&intermediate)?);
    println!("Final: {}", full_pipeline.invoke(doc).await?);
    Ok(())
}
