//! Turn orchestration: one user message in, one sanitized transcript out.

use std::sync::Arc;
use std::time::Duration;

use parley_client::{Run, RunError, RunStatus, Thread};

use crate::dispatch::dispatch_tool_calls;
use crate::driver::{DriverConfig, RunDriver, SharedSleeper, Sleeper, TokioSleeper};
use crate::error::{AgentError, Result};
use crate::service::{AssistantService, SharedService};
use crate::thread::{self, Session};
use crate::tool::{Tool, ToolRegistry};
use crate::transcript::{self, Transcript};

/// Result of a turn that reached a terminal run state.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The run completed; the thread's full sanitized transcript.
    Reply(Transcript),
    /// The run ended in a failure status.
    RunFailed {
        run_id: String,
        status: RunStatus,
        error: Option<RunError>,
    },
}

impl TurnOutcome {
    /// Whether the run failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::RunFailed { .. })
    }

    /// The transcript, if the run completed.
    pub fn transcript(&self) -> Option<&Transcript> {
        match self {
            Self::Reply(transcript) => Some(transcript),
            Self::RunFailed { .. } => None,
        }
    }

    /// User-facing text for this turn: the latest reply, or a failure notice.
    pub fn display_text(&self) -> String {
        match self {
            Self::Reply(transcript) => transcript.latest_reply(),
            Self::RunFailed { status, error, .. } => match error {
                Some(error) => format!("The assistant run {}: {}", status, error),
                None => format!("The assistant run {}.", status),
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────────────────────────────────────

/// Drives conversation turns against a remote assistant service.
///
/// Stateless across turns; per-conversation state lives in [`Session`].
pub struct Orchestrator {
    service: SharedService,
    tools: Arc<ToolRegistry>,
    sleeper: SharedSleeper,
    config: DriverConfig,
}

impl Orchestrator {
    /// Create an orchestrator that waits with the tokio timer.
    pub fn new(service: SharedService, tools: ToolRegistry, config: DriverConfig) -> Self {
        Self {
            service,
            tools: Arc::new(tools),
            sleeper: Arc::new(TokioSleeper),
            config,
        }
    }

    /// Create a builder for fluent construction.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Get the run configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Get the tool registry.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get the remote service.
    pub fn service(&self) -> SharedService {
        self.service.clone()
    }

    fn driver(&self) -> RunDriver<'_> {
        RunDriver {
            service: self.service.as_ref(),
            tools: &self.tools,
            sleeper: self.sleeper.as_ref(),
            config: &self.config,
        }
    }

    /// Create the session's thread with `content`, or append `content` to it.
    pub async fn ensure_thread(&self, session: &mut Session, content: &str) -> Result<Thread> {
        thread::ensure_thread(self.service.as_ref(), session, content).await
    }

    /// Start a run of the configured assistant on `thread`.
    pub async fn start_run(&self, thread: &Thread) -> Result<Run> {
        self.driver().start_run(thread).await
    }

    /// Poll `run` to a terminal state, dispatching tool calls along the way.
    pub async fn drive(&self, thread: &Thread, run: Run) -> Result<Run> {
        self.driver().drive(thread, run).await
    }

    /// Satisfy one `requires_action` pause and return the resumed run.
    pub async fn dispatch_tools(&self, thread: &Thread, run: &Run) -> Result<Run> {
        dispatch_tool_calls(self.service.as_ref(), &self.tools, thread, run).await
    }

    /// Every message of `thread` as sanitized text, in thread order.
    pub async fn extract(&self, thread: &Thread) -> Result<Transcript> {
        transcript::extract(self.service.as_ref(), thread).await
    }

    /// Run one conversational turn.
    ///
    /// Sends `user_text` on the session's thread, drives a fresh run to a
    /// terminal state and returns the thread's transcript. A failed run is
    /// reported as [`TurnOutcome::RunFailed`] and no transcript is fetched.
    pub async fn respond(&self, session: &mut Session, user_text: &str) -> Result<TurnOutcome> {
        let thread = self.ensure_thread(session, user_text).await?;
        let run = self.start_run(&thread).await?;
        let run = self.drive(&thread, run).await?;

        if run.status != RunStatus::Completed {
            return Ok(TurnOutcome::RunFailed {
                run_id: run.id,
                status: run.status,
                error: run.last_error,
            });
        }

        let transcript = self.extract(&thread).await?;
        tracing::debug!(thread_id = %thread.id, entries = transcript.len(), "Turn complete");
        Ok(TurnOutcome::Reply(transcript))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for constructing an [`Orchestrator`].
pub struct OrchestratorBuilder {
    service: Option<SharedService>,
    tools: ToolRegistry,
    sleeper: Option<SharedSleeper>,
    config: DriverConfig,
}

impl OrchestratorBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            service: None,
            tools: ToolRegistry::new(),
            sleeper: None,
            config: DriverConfig::default(),
        }
    }

    /// Set the remote service.
    pub fn with_service(mut self, service: impl AssistantService + 'static) -> Self {
        self.service = Some(Arc::new(service));
        self
    }

    /// Set the remote service from a shared reference.
    pub fn with_shared_service(mut self, service: SharedService) -> Self {
        self.service = Some(service);
        self
    }

    /// Set the tool registry.
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Register a single tool.
    pub fn with_tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    /// Set the sleeper used between status checks.
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Some(Arc::new(sleeper));
        self
    }

    /// Set the sleeper from a shared reference.
    pub fn with_shared_sleeper(mut self, sleeper: SharedSleeper) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Replace the whole run configuration.
    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the assistant every run executes.
    pub fn with_assistant_id(mut self, assistant_id: impl Into<String>) -> Self {
        self.config.assistant_id = assistant_id.into();
        self
    }

    /// Set per-run instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.config.instructions = Some(instructions.into());
        self
    }

    /// Set the delay between status checks.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Log run steps on every poll.
    pub fn with_trace_run_steps(mut self, enabled: bool) -> Self {
        self.config.trace_run_steps = enabled;
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<Orchestrator> {
        let service = self
            .service
            .ok_or_else(|| AgentError::config("assistant service is required"))?;
        if self.config.assistant_id.trim().is_empty() {
            return Err(AgentError::config("assistant id is required"));
        }

        let mut orchestrator = Orchestrator::new(service, self.tools, self.config);
        if let Some(sleeper) = self.sleeper {
            orchestrator.sleeper = sleeper;
        }
        Ok(orchestrator)
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
