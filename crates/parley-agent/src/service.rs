//! Remote assistant service abstraction.
//!
//! The orchestrator talks to the service only through [`AssistantService`],
//! which [`ParleyClient`] implements over HTTP. [`MockService`] is an
//! in-memory, scripted implementation for deterministic tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use parley_client::{
    CreateMessageRequest, CreateRunRequest, CreateThreadRequest, FunctionCall, Message,
    MessageContent, MessageRole, ParleyClient, RequiredAction, Run, RunStatus, RunStep,
    SubmitToolOutputsAction, TextContent, Thread, ToolCall, ToolOutput,
};

/// Result type for service calls.
pub type RemoteResult<T> = parley_client::Result<T>;

/// Operations the orchestrator consumes from the remote assistant service.
#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Create a thread seeded with one user message.
    async fn create_thread(&self, initial_content: &str) -> RemoteResult<Thread>;

    /// Append a user message to an existing thread.
    async fn append_message(&self, thread_id: &str, content: &str) -> RemoteResult<Message>;

    /// Start a run against a thread.
    async fn create_run(&self, thread_id: &str, request: CreateRunRequest) -> RemoteResult<Run>;

    /// Fetch the current state of a run.
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> RemoteResult<Run>;

    /// List every message in a thread, oldest first.
    async fn list_messages(&self, thread_id: &str) -> RemoteResult<Vec<Message>>;

    /// Resume a paused run with one output per requested tool call.
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> RemoteResult<Run>;

    /// List the steps of a run (diagnostics only).
    async fn list_run_steps(&self, thread_id: &str, run_id: &str) -> RemoteResult<Vec<RunStep>>;
}

/// A service that can be shared across tasks.
pub type SharedService = Arc<dyn AssistantService>;

// ─────────────────────────────────────────────────────────────────────────────
// HTTP implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl AssistantService for ParleyClient {
    async fn create_thread(&self, initial_content: &str) -> RemoteResult<Thread> {
        self.threads()
            .create(CreateThreadRequest::with_user_message(initial_content))
            .await
    }

    async fn append_message(&self, thread_id: &str, content: &str) -> RemoteResult<Message> {
        self.messages()
            .create(thread_id, CreateMessageRequest::user(content))
            .await
    }

    async fn create_run(&self, thread_id: &str, request: CreateRunRequest) -> RemoteResult<Run> {
        self.runs().create(thread_id, request).await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> RemoteResult<Run> {
        self.runs().get(thread_id, run_id).await
    }

    async fn list_messages(&self, thread_id: &str) -> RemoteResult<Vec<Message>> {
        self.messages().list_all(thread_id).await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> RemoteResult<Run> {
        self.runs()
            .submit_tool_outputs(thread_id, run_id, outputs)
            .await
    }

    async fn list_run_steps(&self, thread_id: &str, run_id: &str) -> RemoteResult<Vec<RunStep>> {
        Ok(self.runs().steps(thread_id, run_id).await?.data)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock Service
// ─────────────────────────────────────────────────────────────────────────────

/// A call received by [`MockService`].
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    CreateThread {
        content: String,
    },
    AppendMessage {
        thread_id: String,
        content: String,
    },
    CreateRun {
        thread_id: String,
        assistant_id: String,
        instructions: Option<String>,
    },
    RetrieveRun {
        thread_id: String,
        run_id: String,
    },
    ListMessages {
        thread_id: String,
    },
    SubmitToolOutputs {
        thread_id: String,
        run_id: String,
        outputs: Vec<ToolOutput>,
    },
    ListRunSteps {
        thread_id: String,
        run_id: String,
    },
}

/// A scripted in-memory assistant service for testing.
///
/// Threads and messages are simulated faithfully. Run states come from a
/// script: `create_run`, `retrieve_run` and `submit_tool_outputs` each pop
/// the next scripted response in order. Each time a `completed` run is
/// handed out, the next queued assistant reply is appended to its thread.
#[derive(Default)]
pub struct MockService {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    next_id: u32,
    threads: HashMap<String, Vec<Message>>,
    run_script: VecDeque<RemoteResult<Run>>,
    replies: VecDeque<String>,
    fail_thread_writes: bool,
    calls: Vec<ServiceCall>,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}_{}", prefix, self.next_id)
    }

    fn push_message(&mut self, thread_id: &str, role: MessageRole, text: &str) -> Message {
        let id = self.next_id("msg");
        let message = text_message(id, thread_id, role, text);
        self.threads
            .entry(thread_id.to_string())
            .or_default()
            .push(message.clone());
        message
    }

    fn next_run(&mut self) -> RemoteResult<Run> {
        let run = self.run_script.pop_front().unwrap_or_else(|| {
            Err(parley_client::Error::Api {
                status: 500,
                code: "mock_exhausted".to_string(),
                message: "MockService: no more scripted run responses".to_string(),
            })
        })?;

        if run.status == RunStatus::Completed {
            if let Some(reply) = self.replies.pop_front() {
                self.push_message(&run.thread_id, MessageRole::Assistant, &reply);
            }
        }
        Ok(run)
    }

    fn write_guard(&self) -> RemoteResult<()> {
        if self.fail_thread_writes {
            return Err(parley_client::Error::Api {
                status: 503,
                code: "service_unavailable".to_string(),
                message: "MockService: thread writes disabled".to_string(),
            });
        }
        Ok(())
    }
}

impl MockService {
    /// Create a mock with no scripted runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the run responses, in the order they will be returned.
    pub fn with_runs(self, runs: impl IntoIterator<Item = Run>) -> Self {
        self.state
            .lock()
            .unwrap()
            .run_script
            .extend(runs.into_iter().map(Ok));
        self
    }

    /// Script a failure as the next run response.
    pub fn with_run_error(self, error: parley_client::Error) -> Self {
        self.state.lock().unwrap().run_script.push_back(Err(error));
        self
    }

    /// Queue an assistant reply, appended by the next completed run.
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.state.lock().unwrap().replies.push_back(text.into());
        self
    }

    /// Make thread creation and message appends fail.
    pub fn with_failing_thread_writes(self) -> Self {
        self.state.lock().unwrap().fail_thread_writes = true;
        self
    }

    /// Insert a message directly into a thread, bypassing call recording.
    pub fn seed_message(&self, thread_id: &str, role: MessageRole, text: &str) -> Message {
        self.state
            .lock()
            .unwrap()
            .push_message(thread_id, role, text)
    }

    /// Every call received, in order.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of threads created.
    pub fn thread_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ServiceCall::CreateThread { .. }))
            .count()
    }

    /// Every tool-output submission received.
    pub fn submissions(&self) -> Vec<Vec<ToolOutput>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ServiceCall::SubmitToolOutputs { outputs, .. } => Some(outputs),
                _ => None,
            })
            .collect()
    }

    /// Messages currently stored for a thread.
    pub fn messages(&self, thread_id: &str) -> Vec<Message> {
        self.state
            .lock()
            .unwrap()
            .threads
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: ServiceCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl AssistantService for MockService {
    async fn create_thread(&self, initial_content: &str) -> RemoteResult<Thread> {
        self.record(ServiceCall::CreateThread {
            content: initial_content.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        state.write_guard()?;
        let id = state.next_id("thread");
        state.push_message(&id, MessageRole::User, initial_content);
        Ok(Thread {
            id,
            created_at: 0,
            metadata: HashMap::new(),
        })
    }

    async fn append_message(&self, thread_id: &str, content: &str) -> RemoteResult<Message> {
        self.record(ServiceCall::AppendMessage {
            thread_id: thread_id.to_string(),
            content: content.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        state.write_guard()?;
        if !state.threads.contains_key(thread_id) {
            return Err(parley_client::Error::NotFound(format!(
                "No thread found with id '{}'",
                thread_id
            )));
        }
        Ok(state.push_message(thread_id, MessageRole::User, content))
    }

    async fn create_run(&self, thread_id: &str, request: CreateRunRequest) -> RemoteResult<Run> {
        self.record(ServiceCall::CreateRun {
            thread_id: thread_id.to_string(),
            assistant_id: request.assistant_id,
            instructions: request.instructions,
        });
        self.state.lock().unwrap().next_run()
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> RemoteResult<Run> {
        self.record(ServiceCall::RetrieveRun {
            thread_id: thread_id.to_string(),
            run_id: run_id.to_string(),
        });
        self.state.lock().unwrap().next_run()
    }

    async fn list_messages(&self, thread_id: &str) -> RemoteResult<Vec<Message>> {
        self.record(ServiceCall::ListMessages {
            thread_id: thread_id.to_string(),
        });
        Ok(self.messages(thread_id))
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> RemoteResult<Run> {
        self.record(ServiceCall::SubmitToolOutputs {
            thread_id: thread_id.to_string(),
            run_id: run_id.to_string(),
            outputs,
        });
        self.state.lock().unwrap().next_run()
    }

    async fn list_run_steps(&self, thread_id: &str, run_id: &str) -> RemoteResult<Vec<RunStep>> {
        self.record(ServiceCall::ListRunSteps {
            thread_id: thread_id.to_string(),
            run_id: run_id.to_string(),
        });
        Ok(Vec::new())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixture builders
// ─────────────────────────────────────────────────────────────────────────────

/// Build a run in `status` with no pending action.
pub fn run_with_status(thread_id: &str, run_id: &str, status: RunStatus) -> Run {
    Run {
        id: run_id.to_string(),
        thread_id: thread_id.to_string(),
        assistant_id: "asst_mock".to_string(),
        status,
        required_action: None,
        last_error: None,
        created_at: 0,
    }
}

/// Build a `requires_action` run asking for `(call_id, tool_name, arguments)`.
pub fn run_requiring_tools(thread_id: &str, run_id: &str, calls: &[(&str, &str, &str)]) -> Run {
    let tool_calls = calls
        .iter()
        .map(|(id, name, arguments)| ToolCall {
            id: id.to_string(),
            kind: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        })
        .collect();

    Run {
        required_action: Some(RequiredAction {
            kind: "submit_tool_outputs".to_string(),
            submit_tool_outputs: SubmitToolOutputsAction { tool_calls },
        }),
        ..run_with_status(thread_id, run_id, RunStatus::RequiresAction)
    }
}

/// Build a message with a single text block.
pub fn text_message(
    id: impl Into<String>,
    thread_id: &str,
    role: MessageRole,
    text: &str,
) -> Message {
    Message {
        id: id.into(),
        thread_id: thread_id.to_string(),
        role,
        content: vec![MessageContent::Text {
            text: TextContent {
                value: text.to_string(),
                annotations: Vec::new(),
            },
        }],
        created_at: 0,
        run_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_threads_keep_insertion_order() {
        let service = MockService::new();
        let thread = service.create_thread("first").await.unwrap();
        service.append_message(&thread.id, "second").await.unwrap();

        let messages = service.list_messages(&thread.id).await.unwrap();
        let texts: Vec<_> = messages.iter().filter_map(|m| m.text()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_mock_append_to_unknown_thread() {
        let service = MockService::new();
        let err = service.append_message("thread_nope", "hi").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_mock_run_script_and_replies() {
        let service = MockService::new()
            .with_runs([
                run_with_status("thread_1", "run_1", RunStatus::Queued),
                run_with_status("thread_1", "run_1", RunStatus::Completed),
            ])
            .with_reply("Hello there");

        let run = service
            .create_run("thread_1", CreateRunRequest::new("asst_1"))
            .await
            .unwrap();
        assert_eq!(run.status, RunStatus::Queued);
        assert!(service.messages("thread_1").is_empty());

        let run = service.retrieve_run("thread_1", "run_1").await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(service.messages("thread_1")[0].text(), Some("Hello there"));

        let err = service.retrieve_run("thread_1", "run_1").await.unwrap_err();
        assert!(err.is_server_error());
    }

    #[test]
    fn test_run_requiring_tools_fixture() {
        let run = run_requiring_tools("t", "r", &[("call_1", "lookup", "{}")]);
        assert_eq!(run.status, RunStatus::RequiresAction);
        assert_eq!(run.tool_calls()[0].id, "call_1");
    }
}
