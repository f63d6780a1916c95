//! Tool dispatch cycle: satisfy a run's `requires_action` pause.
//!
//! Every requested call is resolved against the [`ToolRegistry`] and executed
//! sequentially, in the order the service listed them. The outputs are
//! submitted together in one call; if any call fails nothing is submitted.

use parley_client::{Run, RunStatus, Thread, ToolCall, ToolOutput};

use crate::error::{AgentError, Result, ToolDispatchError};
use crate::service::AssistantService;
use crate::tool::{ToolArgs, ToolRegistry};

/// Parse a tool call's JSON-encoded arguments into a key-value payload.
///
/// Blank arguments are treated as an empty object; anything else must be a
/// JSON object.
pub fn parse_arguments(raw: &str) -> std::result::Result<ToolArgs, String> {
    if raw.trim().is_empty() {
        return Ok(ToolArgs::new());
    }
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Execute one tool call and capture its output.
async fn invoke(tools: &ToolRegistry, call: &ToolCall) -> std::result::Result<ToolOutput, ToolDispatchError> {
    let tool_name = &call.function.name;

    let args = parse_arguments(&call.function.arguments).map_err(|reason| {
        ToolDispatchError::InvalidArguments {
            call_id: call.id.clone(),
            tool_name: tool_name.clone(),
            reason,
        }
    })?;

    let tool = tools
        .get(tool_name)
        .ok_or_else(|| ToolDispatchError::UnknownTool {
            call_id: call.id.clone(),
            tool_name: tool_name.clone(),
        })?;

    tracing::info!(tool = %tool_name, call_id = %call.id, "Invoking tool");
    let output = tool
        .call(args)
        .await
        .map_err(|source| ToolDispatchError::ToolFailed {
            call_id: call.id.clone(),
            tool_name: tool_name.clone(),
            source,
        })?;
    tracing::debug!(tool = %tool_name, call_id = %call.id, output_len = output.len(), "Tool finished");

    Ok(ToolOutput {
        tool_call_id: call.id.clone(),
        output,
    })
}

/// Run every tool call `run` is waiting on and resume it with their outputs.
///
/// Returns the resumed run as reported by the service.
pub async fn dispatch_tool_calls(
    service: &dyn AssistantService,
    tools: &ToolRegistry,
    thread: &Thread,
    run: &Run,
) -> Result<Run> {
    if run.status != RunStatus::RequiresAction {
        return Err(AgentError::InvalidRunState {
            run_id: run.id.clone(),
            status: run.status,
            reason: "tool dispatch needs a run in requires_action".to_string(),
        });
    }

    let calls = run.tool_calls();
    if calls.is_empty() {
        return Err(AgentError::InvalidRunState {
            run_id: run.id.clone(),
            status: run.status,
            reason: "required action lists no tool calls".to_string(),
        });
    }

    let mut outputs = Vec::with_capacity(calls.len());
    for call in calls {
        match invoke(tools, call).await {
            Ok(output) => outputs.push(output),
            Err(e) => {
                tracing::error!(run_id = %run.id, error = %e, "Tool dispatch failed; no outputs submitted");
                return Err(e.into());
            }
        }
    }

    tracing::info!(run_id = %run.id, outputs = outputs.len(), "Submitting tool outputs");
    let resumed = service
        .submit_tool_outputs(&thread.id, &run.id, outputs)
        .await?;
    Ok(resumed)
}
