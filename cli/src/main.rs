//! `braid` binary: run the demo pipelines and the analyst agent.
//!
//! Subcommands: `chain`, `parallel`, `nested`, `agent`, `tool` (list/show tools).

use std::process::ExitCode;

use braid::ToolChoiceMode;
use braid_cli::{
    all_tools, render_list, render_show, run_agent, run_chain, run_nested, run_ticket,
    AgentOptions, RunError,
};
use braid_config::{ExecutorSettings, LlmSettings, APP_NAME, ENV_MAX_ITERATIONS};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "braid")]
#[command(about = "Braid: composable runnable pipelines and a bounded tool-calling agent")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Log stage and executor events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prompt | simulated model | parser
    Chain {
        /// Who to ask about
        #[arg(default_value = "Virat Kohli")]
        name: String,
    },
    /// Parallel ticket triage and log formatting
    Parallel {
        #[arg(long, default_value = "TKT-404")]
        id: String,
        #[arg(default_value = "My screen is flickering and I am angry")]
        content: String,
    },
    /// Parallel metadata + assign + extraction
    Nested {
        #[arg(default_value = "Urgent: The server is overheating in the data center.")]
        content: String,
        #[arg(long, default_value = "Admin")]
        author: String,
    },
    /// Financial analyst agent
    Agent(AgentArgs),
    /// List tools or show one tool's definition
    Tool {
        #[command(subcommand)]
        sub: ToolSub,
    },
}

#[derive(ClapArgs, Debug)]
struct AgentArgs {
    /// Questions, answered in order within one conversation
    #[arg(default_value = "Is it a good time to buy Google?")]
    questions: Vec<String>,

    /// Use the chat endpoint from OPENAI_API_KEY / OPENAI_BASE_URL / MODEL
    #[arg(long)]
    live: bool,

    /// Maximum tool rounds per question
    #[arg(long, env = ENV_MAX_ITERATIONS, value_name = "N")]
    max_iterations: Option<u32>,

    /// auto, none or required (overrides BRAID_TOOL_CHOICE)
    #[arg(long, value_name = "MODE")]
    tool_choice: Option<ToolChoiceMode>,
}

#[derive(Subcommand, Debug)]
enum ToolSub {
    /// List tool names and descriptions
    List,
    /// Show one tool's full definition
    Show {
        /// Tool name
        name: String,
    },
}

fn print_json(value: &impl Serialize) -> Result<(), RunError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn agent(args: AgentArgs, json: bool) -> Result<(), RunError> {
    let executor = ExecutorSettings::from_env()?;
    let llm = LlmSettings::from_env();
    let tool_choice = match args.tool_choice {
        Some(mode) => mode,
        None => llm
            .tool_choice
            .parse()
            .map_err(|e: String| RunError::Usage(e))?,
    };
    let opts = AgentOptions {
        questions: args.questions,
        live: args.live,
        max_iterations: args.max_iterations.unwrap_or(executor.max_iterations),
        terminal_tool: executor.terminal_tool,
        tool_choice,
        llm,
    };
    let reports = run_agent(&opts).await?;
    if json {
        return print_json(&reports);
    }
    for report in &reports {
        println!("--- {} ---", report.question);
        match report.output.get("answer").and_then(|a| a.as_str()) {
            Some(answer) => println!("Answer: {}", answer),
            None => println!("Answer: {}", braid::message::value_to_text(&report.output)),
        }
        println!("Tools used: {}", report.tools_used.join(", "));
        println!("Rounds: {}", report.rounds);
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), RunError> {
    match args.cmd {
        Command::Chain { name } => {
            let out = run_chain(&name).await?;
            if args.json {
                print_json(&serde_json::json!({ "result": out }))?;
            } else {
                println!("{}", out);
            }
        }
        Command::Parallel { id, content } => {
            let report = run_ticket(&id, &content).await?;
            if args.json {
                print_json(&report)?;
            } else {
                println!("Parallel output:");
                for (key, value) in &report.branches {
                    println!("  {}: {}", key, value);
                }
                println!("{}", report.log_line);
            }
        }
        Command::Nested { content, author } => {
            let report = run_nested(&content, &author).await?;
            if args.json {
                print_json(&report)?;
            } else {
                println!("Initial: {}", serde_json::to_string(&report.initial)?);
                println!("After assign: {}", serde_json::to_string(&report.intermediate)?);
                println!("{}", report.status);
            }
        }
        Command::Agent(agent_args) => agent(agent_args, args.json).await?,
        Command::Tool { sub } => {
            let tools = all_tools();
            let out = match sub {
                ToolSub::List => render_list(&tools, args.json)?,
                ToolSub::Show { name } => render_show(&tools, &name, args.json)?,
            };
            print!("{}", out);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config_err = braid_config::load_and_apply(APP_NAME, None).err();
    let args = Args::parse();
    if let Err(e) = braid_cli::logging::init(args.verbose) {
        eprintln!("braid: logging init failed: {}", e);
    }
    if let Some(e) = config_err {
        tracing::warn!(error = %e, "config load failed; using process environment only");
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("braid: {}", e);
            if e.is_incomplete() {
                eprintln!("braid: no final answer; raise --max-iterations to allow more rounds");
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
