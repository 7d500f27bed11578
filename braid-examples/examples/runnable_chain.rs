//! Prompt | model | parser: the basic chain.
//!
//! The first chain is built from plain lambdas, the second from the prompt,
//! chat model and parser stages. Both use a scripted model, so nothing goes over
//! the network.
//!
//! Run: `cargo run -p braid-examples --example runnable_chain -- "Virat Kohli"`

use braid::{
    ChatModel, ChatPromptTemplate, Lambda, MockLlm, PromptInput, Runnable, RunnableExt,
    StrOutputParser,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Virat Kohli".to_string());

    let prompt = Lambda::map("prompt", |data: String| format!("Who is {}", data));
    let model = Lambda::map("model", |q: String| {
        println!("  model saw: {}", q);
        "AI Response: He is a cricketer".to_string()
    });
    let parser = Lambda::map("parser", |s: String| {
        s.trim_start_matches("AI Response:").trim().to_string()
    });
    let chain = prompt | model | parser;
    println!("--- lambda chain ({}) ---", chain.name());
    println!("{}", chain.invoke(name.clone()).await?);

    let chain = ChatPromptTemplate::from_template("tell me a short joke about {topic}")
        .pipe(ChatModel::new(MockLlm::with_content(
            "Why did the ice cream truck break down? It had a rocky road.",
        )))
        .pipe(StrOutputParser);
    println!("\n--- prompt | model | parser ({}) ---", chain.name());
    println!(
        "{}",
        chain
            .invoke(PromptInput::new().var("topic", "ice cream"))
            .await?
    );
    Ok(())
}
