//! Run driver: starts a run and polls it to a terminal state.
//!
//! The driver is a status-driven loop. `completed` and the failure statuses
//! end it; `requires_action` hands the run to the tool dispatch cycle and
//! continues from the resumed run; every other status waits one poll
//! interval and re-fetches. Any number of action rounds is supported.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use parley_client::{CreateRunRequest, Run, RunStatus, Thread};

use crate::dispatch::dispatch_tool_calls;
use crate::error::{AgentError, Result};
use crate::service::AssistantService;
use crate::tool::ToolRegistry;

/// Default delay between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

// ─────────────────────────────────────────────────────────────────────────────
// Sleep abstraction
// ─────────────────────────────────────────────────────────────────────────────

/// Suspends the driver between status checks.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// A sleeper that can be shared across tasks.
pub type SharedSleeper = Arc<dyn Sleeper>;

/// Real-time sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that returns immediately and records every requested delay.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested so far.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of delays requested so far.
    pub fn count(&self) -> usize {
        self.sleeps().len()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Driver
// ─────────────────────────────────────────────────────────────────────────────

/// Per-orchestrator run settings.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Assistant every run executes.
    pub assistant_id: String,
    /// Optional per-run instructions.
    pub instructions: Option<String>,
    /// Delay between status checks.
    pub poll_interval: Duration,
    /// Fetch and log run steps on every poll.
    pub trace_run_steps: bool,
}

impl DriverConfig {
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            instructions: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            trace_run_steps: false,
        }
    }

    fn run_request(&self) -> CreateRunRequest {
        let request = CreateRunRequest::new(&self.assistant_id);
        match &self.instructions {
            Some(instructions) => request.with_instructions(instructions),
            None => request,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Borrowed view of everything one run needs.
pub struct RunDriver<'a> {
    pub service: &'a dyn AssistantService,
    pub tools: &'a ToolRegistry,
    pub sleeper: &'a dyn Sleeper,
    pub config: &'a DriverConfig,
}

impl RunDriver<'_> {
    /// Start a run of the configured assistant on `thread`.
    ///
    /// Exactly one run-creation request is issued. The returned run is
    /// usually `queued`.
    pub async fn start_run(&self, thread: &Thread) -> Result<Run> {
        if self.config.assistant_id.is_empty() {
            return Err(AgentError::config("assistant id is not set"));
        }

        let run = self
            .service
            .create_run(&thread.id, self.config.run_request())
            .await?;
        tracing::info!(
            thread_id = %thread.id,
            run_id = %run.id,
            assistant_id = %self.config.assistant_id,
            status = %run.status,
            "Started run"
        );
        Ok(run)
    }

    /// Advance `run` until it completes or fails.
    ///
    /// Returns the terminal run; a failed run is a normal return, not an
    /// error. Remote and tool dispatch errors propagate immediately.
    pub async fn drive(&self, thread: &Thread, mut run: Run) -> Result<Run> {
        let mut polls: u32 = 0;
        let mut action_rounds: u32 = 0;

        loop {
            match run.status {
                RunStatus::Completed => {
                    tracing::info!(run_id = %run.id, polls, action_rounds, "Run completed");
                    return Ok(run);
                }
                status if status.is_failure() => {
                    tracing::warn!(
                        run_id = %run.id,
                        %status,
                        error = ?run.last_error,
                        polls,
                        action_rounds,
                        "Run ended without completing"
                    );
                    return Ok(run);
                }
                RunStatus::RequiresAction => {
                    action_rounds += 1;
                    tracing::debug!(
                        run_id = %run.id,
                        round = action_rounds,
                        tool_calls = run.tool_calls().len(),
                        "Run requires action"
                    );
                    run = dispatch_tool_calls(self.service, self.tools, thread, &run).await?;
                }
                _ => {
                    self.sleeper.sleep(self.config.poll_interval).await;
                    let previous = run.status;
                    run = self.service.retrieve_run(&thread.id, &run.id).await?;
                    polls += 1;

                    if run.status != previous {
                        tracing::debug!(
                            run_id = %run.id,
                            from = %previous,
                            to = %run.status,
                            "Run status changed"
                        );
                    }
                    if self.config.trace_run_steps {
                        self.trace_steps(thread, &run).await;
                    }
                }
            }
        }
    }

    async fn trace_steps(&self, thread: &Thread, run: &Run) {
        match self.service.list_run_steps(&thread.id, &run.id).await {
            Ok(steps) => {
                for step in steps {
                    tracing::debug!(
                        run_id = %run.id,
                        step_id = %step.id,
                        kind = %step.kind,
                        status = %step.status,
                        "Run step"
                    );
                }
            }
            Err(e) => {
                tracing::debug!(run_id = %run.id, error = %e, "Failed to list run steps");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolDispatchError;
    use crate::service::{run_requiring_tools, run_with_status, MockService, ServiceCall};
    use crate::tool::MockTool;
    use parley_client::RunError;
    use std::collections::HashMap;

    fn thread() -> Thread {
        Thread {
            id: "thread_1".to_string(),
            created_at: 0,
            metadata: HashMap::new(),
        }
    }

    fn status(s: RunStatus) -> Run {
        run_with_status("thread_1", "run_1", s)
    }

    fn config() -> DriverConfig {
        DriverConfig {
            instructions: Some("Be brief.".to_string()),
            poll_interval: Duration::from_millis(250),
            ..DriverConfig::new("asst_1")
        }
    }

    struct Fixture {
        service: MockService,
        tools: ToolRegistry,
        sleeper: RecordingSleeper,
        config: DriverConfig,
    }

    impl Fixture {
        fn new(service: MockService) -> Self {
            Self {
                service,
                tools: ToolRegistry::new(),
                sleeper: RecordingSleeper::new(),
                config: config(),
            }
        }

        fn driver(&self) -> RunDriver<'_> {
            RunDriver {
                service: &self.service,
                tools: &self.tools,
                sleeper: &self.sleeper,
                config: &self.config,
            }
        }

        fn retrieve_count(&self) -> usize {
            self.service
                .calls()
                .iter()
                .filter(|c| matches!(c, ServiceCall::RetrieveRun { .. }))
                .count()
        }
    }

    #[tokio::test]
    async fn test_start_run_issues_one_request() {
        let fx = Fixture::new(MockService::new().with_runs([status(RunStatus::Queued)]));

        let run = fx.driver().start_run(&thread()).await.unwrap();

        assert_eq!(run.status, RunStatus::Queued);
        assert_eq!(
            fx.service.calls(),
            vec![ServiceCall::CreateRun {
                thread_id: "thread_1".to_string(),
                assistant_id: "asst_1".to_string(),
                instructions: Some("Be brief.".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_start_run_requires_assistant_id() {
        let mut fx = Fixture::new(MockService::new());
        fx.config.assistant_id.clear();

        let err = fx.driver().start_run(&thread()).await.unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
        assert!(fx.service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_start_run_propagates_remote_error() {
        let fx = Fixture::new(
            MockService::new().with_run_error(parley_client::Error::Auth("bad key".into())),
        );
        let err = fx.driver().start_run(&thread()).await.unwrap_err();
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn test_polls_until_completed() {
        let fx = Fixture::new(MockService::new().with_runs([
            status(RunStatus::InProgress),
            status(RunStatus::InProgress),
            status(RunStatus::Completed),
        ]));

        let run = fx
            .driver()
            .drive(&thread(), status(RunStatus::Queued))
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(fx.retrieve_count(), 3);
        assert_eq!(fx.sleeper.sleeps(), vec![Duration::from_millis(250); 3]);
    }

    #[tokio::test]
    async fn test_completed_run_returns_without_waiting() {
        let fx = Fixture::new(MockService::new());

        let run = fx
            .driver()
            .drive(&thread(), status(RunStatus::Completed))
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(fx.sleeper.count(), 0);
        assert!(fx.service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_run_is_returned_not_raised() {
        let failed = Run {
            last_error: Some(RunError {
                code: "server_error".to_string(),
                message: "Something broke".to_string(),
            }),
            ..status(RunStatus::Failed)
        };
        let fx = Fixture::new(
            MockService::new().with_runs([status(RunStatus::InProgress), failed]),
        );

        let run = fx
            .driver()
            .drive(&thread(), status(RunStatus::Queued))
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.last_error.unwrap().code, "server_error");
        assert_eq!(fx.sleeper.count(), 2);
        assert!(fx.service.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_other_terminal_failures_end_the_loop() {
        for terminal in [RunStatus::Cancelled, RunStatus::Expired, RunStatus::Incomplete] {
            let fx = Fixture::new(MockService::new().with_runs([status(terminal)]));
            let run = fx
                .driver()
                .drive(&thread(), status(RunStatus::InProgress))
                .await
                .unwrap();
            assert_eq!(run.status, terminal);
            assert_eq!(fx.retrieve_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_cancelling_and_unknown_keep_polling() {
        let fx = Fixture::new(MockService::new().with_runs([
            status(RunStatus::Unknown),
            status(RunStatus::Cancelling),
            status(RunStatus::Cancelled),
        ]));

        let run = fx
            .driver()
            .drive(&thread(), status(RunStatus::Queued))
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Cancelled);
        assert_eq!(fx.sleeper.count(), 3);
    }

    #[tokio::test]
    async fn test_action_round_dispatches_and_resumes() {
        let mut fx = Fixture::new(MockService::new().with_runs([
            run_requiring_tools("thread_1", "run_1", &[("call_1", "lookup", r#"{"q":"x"}"#)]),
            status(RunStatus::Queued),
            status(RunStatus::Completed),
        ]));
        let tool = Arc::new(MockTool::new("lookup").with_output("found"));
        fx.tools.register_arc(tool.clone());

        let run = fx
            .driver()
            .drive(&thread(), status(RunStatus::Queued))
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(tool.call_count(), 1);
        assert_eq!(fx.service.submissions().len(), 1);
        // One wait before the action, none right after submitting, one before completion.
        assert_eq!(fx.sleeper.count(), 2);
    }

    #[tokio::test]
    async fn test_multiple_action_rounds_in_one_run() {
        let mut fx = Fixture::new(MockService::new().with_runs([
            run_requiring_tools("thread_1", "run_1", &[("call_1", "lookup", "{}")]),
            run_requiring_tools(
                "thread_1",
                "run_1",
                &[("call_2", "lookup", "{}"), ("call_3", "lookup", "{}")],
            ),
            status(RunStatus::InProgress),
            status(RunStatus::Completed),
        ]));
        let tool = Arc::new(MockTool::new("lookup"));
        fx.tools.register_arc(tool.clone());

        let run = fx
            .driver()
            .drive(&thread(), status(RunStatus::Queued))
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(tool.call_count(), 3);

        let submissions = fx.service.submissions();
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].len(), 1);
        assert_eq!(submissions[1].len(), 2);
        assert_eq!(submissions[1][1].tool_call_id, "call_3");
    }

    #[tokio::test]
    async fn test_unknown_tool_stops_polling() {
        let fx = Fixture::new(MockService::new().with_runs([
            run_requiring_tools("thread_1", "run_1", &[("call_1", "get_weather", "{}")]),
            status(RunStatus::Completed),
        ]));

        let err = fx
            .driver()
            .drive(&thread(), status(RunStatus::Queued))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AgentError::ToolDispatch(ToolDispatchError::UnknownTool { .. })
        ));
        assert!(fx.service.submissions().is_empty());
        assert_eq!(fx.retrieve_count(), 1);
    }

    #[tokio::test]
    async fn test_remote_error_while_polling_propagates() {
        let fx = Fixture::new(
            MockService::new()
                .with_runs([status(RunStatus::InProgress)])
                .with_run_error(parley_client::Error::Api {
                    status: 502,
                    code: "bad_gateway".to_string(),
                    message: "upstream".to_string(),
                }),
        );

        let err = fx
            .driver()
            .drive(&thread(), status(RunStatus::Queued))
            .await
            .unwrap_err();

        assert!(err.is_remote());
        assert_eq!(fx.retrieve_count(), 2);
    }

    #[tokio::test]
    async fn test_trace_run_steps_polls_steps() {
        let mut fx = Fixture::new(MockService::new().with_runs([status(RunStatus::Completed)]));
        fx.config.trace_run_steps = true;

        fx.driver()
            .drive(&thread(), status(RunStatus::InProgress))
            .await
            .unwrap();

        assert!(fx
            .service
            .calls()
            .iter()
            .any(|c| matches!(c, ServiceCall::ListRunSteps { .. })));
    }
}
