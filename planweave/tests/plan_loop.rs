//! End-to-end runs of the plan → solve → refine loop against a scripted model.

mod init_logging;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use planweave::{
    run_plan_agent, AgentError, CancellationToken, LlmClient, LlmResponse, LoopPhase, Message,
    MockLlm, PlanOptions, PlanRunError, PlanRunner, RunnableConfig, StreamEvent,
};

fn runner(llm: Arc<MockLlm>, max_iterations: u32) -> PlanRunner {
    PlanRunner::new(
        llm,
        PlanOptions {
            max_iterations,
            verbose: false,
        },
    )
    .expect("plan graph compiles")
}

fn texts(subtasks: &[planweave::Subtask]) -> Vec<&str> {
    subtasks.iter().map(|s| s.text.as_str()).collect()
}

/// **Scenario**: two planned subtasks, one refinement adds a third, three
/// refine cycles in total, then finalize.
#[tokio::test]
async fn full_run_with_one_refinement() {
    let llm = Arc::new(MockLlm::scripted([
        "Book flight\nBook hotel",
        "Compare airlines",
        "No changes needed",
        "Pick a ryokan",
        "Book flight\nGet JR pass",
        "Order online",
        "No changes needed.",
    ]));
    let state = runner(llm.clone(), 3).invoke("Trip to Japan").await.unwrap();

    assert_eq!(
        state.final_result.as_deref(),
        Some("Book flight: Compare airlines\nBook hotel: Pick a ryokan\nGet JR pass: Order online")
    );
    assert_eq!(state.iteration_count, 3);
    assert_eq!(state.phase, LoopPhase::Done);
    assert!(state.queue.is_empty());
    assert_eq!(llm.call_count(), 7);

    let records = state.history.records();
    assert_eq!(records.len(), 2);
    assert_eq!(texts(&records[0].generated), vec!["Book flight", "Book hotel"]);
    assert_eq!(texts(&records[0].solved), vec!["Book flight", "Book hotel"]);
    assert_eq!(texts(&records[0].refined), vec!["Get JR pass"]);
    assert_eq!(texts(&records[1].generated), vec!["Get JR pass"]);
    assert_eq!(texts(&records[1].solved), vec!["Get JR pass"]);

    let prompts = llm.prompts();
    assert!(prompts[2].contains("Subtasks: [\"Book flight\"]"));
    assert!(prompts[4].contains("Results: {\"Book flight\": \"Compare airlines\", \"Book hotel\": \"Pick a ryokan\"}"));
}

/// **Scenario**: once the cap is reached, remaining subtasks are abandoned.
#[tokio::test]
async fn cap_reached_abandons_pending_subtasks() {
    let llm = Arc::new(
        MockLlm::scripted(["a\nb\nc\nd\ne"]).with_fallback("No changes needed"),
    );
    let state = runner(llm.clone(), 3).invoke("q").await.unwrap();

    assert_eq!(state.iteration_count, 3);
    assert_eq!(state.results.texts(), vec!["a", "b", "c", "d"]);
    assert_eq!(state.queue.texts(), vec!["e"]);
    // plan + 4 solves + 3 refines
    assert_eq!(llm.call_count(), 8);
}

#[tokio::test]
async fn zero_iterations_solves_once_then_finalizes() {
    let llm = Arc::new(MockLlm::scripted(["x\ny", "done"]));
    let state = runner(llm.clone(), 0).invoke("q").await.unwrap();
    assert_eq!(state.final_result.as_deref(), Some("x: done"));
    assert_eq!(state.iteration_count, 0);
    assert_eq!(llm.call_count(), 2);
}

/// **Scenario**: empty query still reaches the model; empty output ends the run.
#[tokio::test]
async fn empty_query_and_empty_plan() {
    let llm = Arc::new(MockLlm::scripted([""]));
    let outcome = run_plan_agent(llm.clone(), "", false).await.unwrap();
    assert_eq!(outcome.final_result, "No results generated.");
    assert_eq!(llm.call_count(), 1);
    assert!(llm.prompts()[0].contains("subtasks:\n\n"));
}

#[tokio::test]
async fn refine_never_requeues_solved_text() {
    let llm = Arc::new(
        MockLlm::scripted(["a", "ra", "a\nb", "rb", "a\nb"]).with_fallback("No changes needed"),
    );
    let state = runner(llm, 3).invoke("q").await.unwrap();
    assert_eq!(state.results.texts(), vec!["a", "b"]);
    assert!(state
        .history
        .records()
        .iter()
        .flat_map(|r| &r.refined)
        .all(|s| s.text != "a"));
    assert!(state.iteration_count <= state.max_iterations);
}

#[tokio::test]
async fn model_failure_aborts_run() {
    let llm = Arc::new(MockLlm::scripted(["a\nb"]).then_fail("rate limited"));
    let err = runner(llm, 3).invoke("q").await.unwrap_err();
    match err {
        PlanRunError::Execution(AgentError::ModelInvocation(msg)) => assert_eq!(msg, "rate limited"),
        other => panic!("expected model invocation error, got {:?}", other),
    }
}

#[tokio::test]
async fn recursion_limit_stops_long_runs() {
    let llm = Arc::new(MockLlm::scripted(["a\nb\nc"]).with_fallback("No changes needed"));
    let config = RunnableConfig::default().with_recursion_limit(3);
    let err = runner(llm, 3).invoke_with_config("q", config).await.unwrap_err();
    assert!(matches!(
        err,
        PlanRunError::Execution(AgentError::RecursionLimit(3))
    ));
}

/// Model whose every refinement repeats the first solved text and adds one new subtask.
struct GrowingLlm {
    refines: AtomicUsize,
}

#[async_trait]
impl LlmClient for GrowingLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let prompt = messages.last().map(Message::content).unwrap_or_default();
        let content = if prompt.starts_with("Break down") {
            "a\nb".to_string()
        } else if prompt.starts_with("Solve") {
            "done".to_string()
        } else {
            let n = self.refines.fetch_add(1, Ordering::SeqCst);
            format!("a\nextra {}", n)
        };
        Ok(LlmResponse {
            content,
            usage: None,
        })
    }
}

/// **Scenario**: refinement adds work every cycle; each solved subtask was
/// generated in its own record or an earlier one, and no text is solved twice.
#[tokio::test]
async fn history_solved_ids_were_generated_earlier_under_growing_refinement() {
    let llm = Arc::new(GrowingLlm {
        refines: AtomicUsize::new(0),
    });
    let runner = PlanRunner::new(
        llm.clone(),
        PlanOptions {
            max_iterations: 3,
            verbose: false,
        },
    )
    .unwrap();
    let state = runner.invoke("q").await.unwrap();

    assert_eq!(state.iteration_count, 3);
    assert_eq!(llm.refines.load(Ordering::SeqCst), 3);

    let mut generated_so_far = HashSet::new();
    for (i, record) in state.history.records().iter().enumerate() {
        generated_so_far.extend(record.generated.iter().map(|s| s.id));
        for solved in &record.solved {
            assert!(
                generated_so_far.contains(&solved.id),
                "record {} solved {:?} before it was generated",
                i,
                solved
            );
        }
        for refined in &record.refined {
            assert!(refined.text.starts_with("extra"), "re-queued {:?}", refined);
        }
    }

    let texts = state.results.texts();
    let unique: HashSet<&str> = texts.iter().copied().collect();
    assert_eq!(unique.len(), texts.len());
    assert_eq!(texts, vec!["a", "b", "extra 0", "extra 1"]);
}

/// Model that cancels a token once it has answered `cancel_after` calls.
struct CancellingLlm {
    inner: MockLlm,
    token: CancellationToken,
    cancel_after: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl LlmClient for CancellingLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let out = self.inner.invoke(messages).await;
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 >= self.cancel_after {
            self.token.cancel();
        }
        out
    }
}

/// **Scenario**: cancellation is observed at the next step boundary.
#[tokio::test]
async fn cancellation_between_steps() {
    let token = CancellationToken::new();
    let llm = Arc::new(CancellingLlm {
        inner: MockLlm::scripted(["a\nb", "ra"]).with_fallback("No changes needed"),
        token: token.clone(),
        cancel_after: 2,
        calls: AtomicUsize::new(0),
    });
    let runner = PlanRunner::new(llm.clone(), PlanOptions::default()).unwrap();
    let config = RunnableConfig::default().with_cancellation(token);
    let err = runner.invoke_with_config("q", config).await.unwrap_err();
    assert!(err.is_cancelled(), "{:?}", err);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn stream_reports_plan_events_in_order() {
    let llm = Arc::new(MockLlm::scripted([
        "one",
        "r1",
        "No changes needed",
        "No changes needed",
        "No changes needed",
    ]));
    let mut kinds = Vec::new();
    let mut task_nodes = Vec::new();
    let state = runner(llm, 3)
        .stream_with_config("q", RunnableConfig::default(), |ev| {
            if let StreamEvent::TaskStart { node_id } = &ev {
                task_nodes.push(node_id.clone());
            }
            if !matches!(
                ev,
                StreamEvent::Values(_)
                    | StreamEvent::Updates { .. }
                    | StreamEvent::TaskStart { .. }
                    | StreamEvent::TaskEnd { .. }
            ) {
                kinds.push(ev.kind());
            }
        })
        .await
        .unwrap();

    assert_eq!(state.final_result.as_deref(), Some("one: r1"));
    assert_eq!(
        kinds,
        vec!["plan_created", "subtask_solved", "refined", "refined", "refined", "finalized"]
    );
    assert_eq!(
        task_nodes,
        vec!["plan", "solve", "refine", "solve", "refine", "solve", "refine", "solve", "finalize"]
    );
}
