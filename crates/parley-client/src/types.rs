//! Request and response types for the assistant service API.
//!
//! These types mirror the service's threads/messages/runs wire contract.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Threads
// ─────────────────────────────────────────────────────────────────────────────

/// A durable, append-only conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Thread ID.
    pub id: String,
    /// Creation time (unix seconds).
    #[serde(default)]
    pub created_at: i64,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

/// Request to create a thread, optionally seeded with messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateThreadRequest {
    /// Initial messages, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<CreateMessageRequest>,
}

impl CreateThreadRequest {
    /// Create a thread seeded with a single user message.
    pub fn with_user_message(content: impl Into<String>) -> Self {
        Self {
            messages: vec![CreateMessageRequest::user(content)],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Request to append a message to a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    /// Message author.
    pub role: MessageRole,
    /// Plain-text content.
    pub content: String,
}

impl CreateMessageRequest {
    /// Create a user message request.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// A message stored in a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message ID.
    pub id: String,
    /// Thread the message belongs to.
    #[serde(default)]
    pub thread_id: String,
    /// Message author.
    pub role: MessageRole,
    /// Content blocks.
    #[serde(default)]
    pub content: Vec<MessageContent>,
    /// Creation time (unix seconds).
    #[serde(default)]
    pub created_at: i64,
    /// Run that produced this message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl Message {
    /// The primary text content: the first text block, if any.
    pub fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            MessageContent::Text { text } => Some(text.value.as_str()),
            _ => None,
        })
    }
}

/// A single content block within a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    /// Text with optional annotations.
    Text { text: TextContent },
    /// Reference to an image file.
    ImageFile { image_file: ImageFile },
    /// Any block type this client does not model.
    #[serde(other)]
    Unknown,
}

/// Text content block body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// Raw text, possibly containing citation markers.
    pub value: String,
    /// Citation/file annotations attached by the service.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<serde_json::Value>,
}

/// Image file reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFile {
    /// File ID.
    pub file_id: String,
}

/// Sort order for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Cursor-paginated list envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// ID of the first item on the page.
    #[serde(default)]
    pub first_id: Option<String>,
    /// ID of the last item on the page (cursor for the next page).
    #[serde(default)]
    pub last_id: Option<String>,
    /// Whether more items follow.
    #[serde(default)]
    pub has_more: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Runs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to start a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRunRequest {
    /// Assistant executing the run.
    pub assistant_id: String,
    /// Per-run instructions overriding the assistant's defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl CreateRunRequest {
    /// Create a run request for an assistant.
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            instructions: None,
        }
    }

    /// Set run instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// Run lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    /// A status value this client does not know.
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }

    /// Whether the run can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed
                | RunStatus::Failed
                | RunStatus::Cancelled
                | RunStatus::Incomplete
                | RunStatus::Expired
        )
    }

    /// Terminal, but not a success.
    pub fn is_failure(&self) -> bool {
        self.is_terminal() && *self != RunStatus::Completed
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single execution attempt of the assistant against a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Run ID.
    pub id: String,
    /// Thread the run executes against.
    pub thread_id: String,
    /// Assistant executing the run.
    #[serde(default)]
    pub assistant_id: String,
    /// Current status.
    pub status: RunStatus,
    /// Pending tool work; present only while `requires_action`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_action: Option<RequiredAction>,
    /// Failure detail for failed runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<RunError>,
    /// Creation time (unix seconds).
    #[serde(default)]
    pub created_at: i64,
}

impl Run {
    /// Tool calls the run is waiting on (empty unless `requires_action`).
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.required_action
            .as_ref()
            .map(|action| action.submit_tool_outputs.tool_calls.as_slice())
            .unwrap_or(&[])
    }
}

/// Failure detail attached to a failed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunError {
    /// Error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Work the run needs from the caller before it can resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredAction {
    /// Action type (always `submit_tool_outputs` today).
    #[serde(rename = "type")]
    pub kind: String,
    /// Tool calls awaiting outputs.
    pub submit_tool_outputs: SubmitToolOutputsAction,
}

/// Tool calls awaiting outputs, in the order presented by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitToolOutputsAction {
    pub tool_calls: Vec<ToolCall>,
}

/// A requested tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID; the matching output must carry the same ID.
    pub id: String,
    /// Call type (always `function` today).
    #[serde(rename = "type", default = "default_tool_call_kind")]
    pub kind: String,
    /// Function name and JSON-encoded arguments.
    pub function: FunctionCall,
}

fn default_tool_call_kind() -> String {
    "function".to_string()
}

/// Function name and arguments of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Tool name.
    pub name: String,
    /// Arguments as a JSON-encoded object.
    pub arguments: String,
}

/// Output reported back for one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// ID of the call this output answers.
    pub tool_call_id: String,
    /// Text output.
    pub output: String,
}

/// Request to resume a run with tool outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitToolOutputsRequest {
    /// One output per pending tool call.
    pub tool_outputs: Vec<ToolOutput>,
}

/// One step of a run (message creation or tool calls).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStep {
    /// Step ID.
    pub id: String,
    /// Run the step belongs to.
    #[serde(default)]
    pub run_id: String,
    /// Step type (`message_creation` or `tool_calls`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Step status.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_requires_action_deserialize() {
        let json = r#"{
            "id": "run_1",
            "object": "thread.run",
            "thread_id": "thread_1",
            "assistant_id": "asst_1",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {
                    "tool_calls": [
                        {"id": "call_1", "type": "function",
                         "function": {"name": "lookup", "arguments": "{\"sku\":\"A1\"}"}}
                    ]
                }
            }
        }"#;
        let run: Run = serde_json::from_str(json).unwrap();
        assert_eq!(run.status, RunStatus::RequiresAction);
        assert_eq!(run.tool_calls().len(), 1);
        assert_eq!(run.tool_calls()[0].function.name, "lookup");
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let run: Run = serde_json::from_str(
            r#"{"id": "run_1", "thread_id": "thread_1", "status": "paused_for_reasons"}"#,
        )
        .unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(!run.status.is_terminal());
        assert!(run.tool_calls().is_empty());
    }

    #[test]
    fn test_status_classification() {
        assert!(RunStatus::Completed.is_terminal());
        assert!(!RunStatus::Completed.is_failure());
        assert!(RunStatus::Failed.is_failure());
        assert!(RunStatus::Expired.is_failure());
        assert!(!RunStatus::InProgress.is_terminal());
        assert!(!RunStatus::RequiresAction.is_terminal());
        assert_eq!(RunStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_message_text_skips_non_text_blocks() {
        let json = r#"{
            "id": "msg_1",
            "thread_id": "thread_1",
            "role": "assistant",
            "content": [
                {"type": "image_file", "image_file": {"file_id": "file_1"}},
                {"type": "image_url", "image_url": {"url": "https://example.com/a.png"}},
                {"type": "text", "text": {"value": "See chart【4:0†source】", "annotations": []}}
            ]
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.content.len(), 3);
        assert_eq!(message.content[1], MessageContent::Unknown);
        assert_eq!(message.text(), Some("See chart【4:0†source】"));
    }

    #[test]
    fn test_create_run_request_omits_missing_instructions() {
        let json = serde_json::to_value(CreateRunRequest::new("asst_1")).unwrap();
        assert_eq!(json, serde_json::json!({"assistant_id": "asst_1"}));

        let json =
            serde_json::to_value(CreateRunRequest::new("asst_1").with_instructions("Be brief"))
                .unwrap();
        assert_eq!(json["instructions"], "Be brief");
    }
}
