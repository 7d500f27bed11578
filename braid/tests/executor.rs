//! Agent executor: round limits, dispatch, transcript and session history.


use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use braid::tools::finance::{analyst_registry, ANALYST_SYSTEM_PROMPT};
use braid::{
    AgentExecutor, Decision, ExecutorError, FnDecision, FnTool, LlmDecision, LlmResponse,
    Message, MockLlm, ToolCall, ToolError, ToolRegistry, TranscriptEntry,
};
use serde_json::{json, Value};

/// Registry {"double": x → 2x, "finish": x → x}, counting dispatches of "double".
fn double_finish(doubles: Arc<AtomicUsize>) -> ToolRegistry {
    ToolRegistry::new()
        .with(FnTool::new("double", "Doubles a number", json!({}), move |v| {
            doubles.fetch_add(1, Ordering::SeqCst);
            let x = v
                .as_i64()
                .ok_or_else(|| ToolError::InvalidInput(format!("not a number: {}", v)))?;
            Ok(json!(x * 2))
        }))
        .with(FnTool::new("finish", "Returns its argument", json!({}), Ok))
}

fn double_then_finish() -> FnDecision {
    FnDecision::new(|ctx| {
        Ok(match ctx.transcript.last_observation() {
            None => Decision::call("double", ctx.input.clone()),
            Some(v) => Decision::call("finish", v.clone()),
        })
    })
}

fn always_double() -> FnDecision {
    FnDecision::new(|ctx| {
        let x = ctx.transcript.last_observation().unwrap_or(ctx.input).clone();
        Ok(Decision::call("double", x))
    })
}

/// **Scenario**: double then finish on input 5 yields 10 after exactly 2 rounds.
#[tokio::test]
async fn double_then_finish_yields_ten_in_two_rounds() {
    let doubles = Arc::new(AtomicUsize::new(0));
    let exec = AgentExecutor::new(double_then_finish(), double_finish(doubles.clone()))
        .with_terminal_tool("finish");
    let out = exec.run(5, vec![]).await.unwrap();
    assert_eq!(out.output, json!(10));
    assert_eq!(out.rounds, 2);
    assert_eq!(out.transcript.dispatches(), 2);
    assert_eq!(doubles.load(Ordering::SeqCst), 1);
}

/// **Scenario**: always "double" with max rounds 3: exactly 3 dispatches, then the limit error.
#[tokio::test]
async fn always_double_hits_limit_after_three_dispatches() {
    let doubles = Arc::new(AtomicUsize::new(0));
    let exec = AgentExecutor::new(always_double(), double_finish(doubles.clone()))
        .with_terminal_tool("finish")
        .with_max_iterations(3);
    let err = exec.run(1, vec![]).await.unwrap_err();
    assert_eq!(doubles.load(Ordering::SeqCst), 3);
    match err {
        ExecutorError::IterationLimitExceeded {
            max_iterations,
            transcript,
        } => {
            assert_eq!(max_iterations, 3);
            assert_eq!(transcript.dispatches(), 3);
            assert_eq!(transcript.last_observation(), Some(&json!(8)));
        }
        other => panic!("expected IterationLimitExceeded, got {}", other),
    }
}

/// **Scenario**: for several K, a never-terminal decision dispatches exactly K times.
#[tokio::test]
async fn never_terminal_dispatches_exactly_k_times() {
    for k in [1u32, 2, 5] {
        let doubles = Arc::new(AtomicUsize::new(0));
        let exec = AgentExecutor::new(always_double(), double_finish(doubles.clone()))
            .with_terminal_tool("finish")
            .with_max_iterations(k);
        let err = exec.run(1, vec![]).await.unwrap_err();
        assert!(err.is_incomplete());
        assert_eq!(doubles.load(Ordering::SeqCst), k as usize);
    }
}

/// **Scenario**: an unknown tool fails; the transcript keeps only earlier entries.
#[tokio::test]
async fn unknown_operation_keeps_prior_transcript() {
    let decide = FnDecision::new(|ctx| {
        Ok(if ctx.round == 0 {
            Decision::call("double", json!(4))
        } else {
            Decision::call("triple", json!(4))
        })
    });
    let exec = AgentExecutor::new(decide, double_finish(Arc::new(AtomicUsize::new(0))));
    let err = exec.run(4, vec![]).await.unwrap_err();
    match err {
        ExecutorError::UnknownOperation { name, transcript } => {
            assert_eq!(name, "triple");
            assert_eq!(transcript.len(), 2);
            assert!(transcript.requests().all(|c| c.name == "double"));
        }
        other => panic!("expected UnknownOperation, got {}", other),
    }
}

/// **Scenario**: each observation carries the call id of the request that produced it.
#[tokio::test]
async fn observations_carry_request_call_ids() {
    let tools = double_finish(Arc::new(AtomicUsize::new(0)));
    let exec = AgentExecutor::new(double_then_finish(), tools).with_terminal_tool("finish");
    let out = exec.run(3, vec![]).await.unwrap();
    let entries = out.transcript.entries();
    assert_eq!(entries.len(), 4);
    for pair in entries.chunks(2) {
        match (&pair[0], &pair[1]) {
            (
                TranscriptEntry::Request(call),
                TranscriptEntry::Observation { call_id, tool, .. },
            ) => {
                assert_eq!(call.id.as_deref(), Some(call_id.as_str()));
                assert_eq!(&call.name, tool);
            }
            other => panic!("unexpected entry pair: {:?}", other),
        }
    }
}

/// **Scenario**: history passed to run is extended with the input and the result.
#[tokio::test]
async fn run_extends_explicit_history() {
    let tools = double_finish(Arc::new(AtomicUsize::new(0)));
    let exec = AgentExecutor::new(double_then_finish(), tools).with_terminal_tool("finish");
    let prior = vec![Message::user("earlier"), Message::assistant("ok")];
    let out = exec.run(5, prior.clone()).await.unwrap();
    assert_eq!(out.history.len(), 4);
    assert_eq!(&out.history[..2], &prior[..]);
    assert_eq!(out.history[2], Message::user("5"));
    assert_eq!(out.history[3], Message::assistant("10"));
    assert!(exec.histories().is_empty());
}

/// **Scenario**: sessions see only their own history; failures leave history unchanged.
#[tokio::test]
async fn session_histories_are_isolated() {
    let seen: Arc<std::sync::Mutex<Vec<(Value, usize)>>> = Arc::default();
    let record = seen.clone();
    let decide = FnDecision::new(move |ctx| {
        if let Ok(mut seen) = record.lock() {
            seen.push((ctx.input.clone(), ctx.history.len()));
        }
        if ctx.input == &json!("fail") {
            return Ok(Decision::call("missing", json!({})));
        }
        Ok(Decision::Answer(json!(format!("answer to {}", ctx.input))))
    });
    let exec = AgentExecutor::new(decide, ToolRegistry::new());

    exec.invoke("alice", "q1").await.unwrap();
    exec.invoke("bob", "q1").await.unwrap();
    exec.invoke("alice", "q2").await.unwrap();
    assert!(exec.invoke("bob", "fail").await.is_err());

    assert_eq!(exec.histories().get("alice").len(), 4);
    assert_eq!(
        exec.histories().get("bob"),
        vec![Message::user("q1"), Message::assistant("answer to \"q1\"")]
    );
    let seen = seen.lock().unwrap().clone();
    // alice's second question saw alice's first exchange only; bob's fail saw bob's.
    assert_eq!(seen[2], (json!("q2"), 2));
    assert_eq!(seen[3], (json!("fail"), 2));
}

/// **Scenario**: the LLM decision dispatches only the first of several tool calls.
#[tokio::test]
async fn llm_decision_dispatches_first_call_only() {
    let llm = MockLlm::new(vec![
        LlmResponse::tool_calls(vec![
            ToolCall::new("get_stock_price", json!({"symbol": "GOOGL"})).with_id("call_a"),
            ToolCall::new("get_company_news_sentiment", json!({"symbol": "GOOGL"}))
                .with_id("call_b"),
        ]),
        LlmResponse::tool_calls(vec![ToolCall::new(
            "final_answer",
            json!({"answer": "Hold GOOGL", "tools_used": ["get_stock_price"]}),
        )
        .with_id("call_c")]),
    ]);
    let exec = AgentExecutor::new(LlmDecision::new(llm, ANALYST_SYSTEM_PROMPT), analyst_registry());
    let out = exec.run("Is it a good time to buy Google?", vec![]).await.unwrap();
    assert_eq!(out.rounds, 2);
    assert_eq!(
        out.transcript.requests().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["get_stock_price", "final_answer"]
    );
    assert!(out.transcript.observation_for("call_b").is_none());
    assert_eq!(
        out.transcript.observation_for("call_a"),
        Some(&json!({"symbol": "GOOGL", "price": 140.20}))
    );
    assert_eq!(out.output["answer"], "Hold GOOGL");
}

/// **Scenario**: the second session invocation sends the first exchange to the model.
#[tokio::test]
async fn llm_decision_receives_session_history() {
    let llm = Arc::new(MockLlm::with_content("Noted."));
    let exec = AgentExecutor::new(
        LlmDecision::from_arc(llm.clone(), ANALYST_SYSTEM_PROMPT),
        analyst_registry(),
    );
    exec.invoke("s1", "My name is Ada.").await.unwrap();
    exec.invoke("s1", "What is my name?").await.unwrap();

    let calls = llm.seen_messages();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1],
        vec![
            Message::system(ANALYST_SYSTEM_PROMPT),
            Message::user("My name is Ada."),
            Message::assistant("Noted."),
            Message::user("What is my name?"),
        ]
    );
}
