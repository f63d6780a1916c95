//! Error types for the orchestration core.

use parley_client::RunStatus;
use thiserror::Error;

use crate::tool::ToolError;

/// Result type alias using the agent error type.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error type for orchestration operations.
///
/// A run that ends in `failed` is not an error; it is reported as
/// [`crate::TurnOutcome::RunFailed`].
#[derive(Debug, Error)]
pub enum AgentError {
    /// A call to the remote assistant service failed.
    #[error("Remote service error: {0}")]
    Remote(#[from] parley_client::Error),

    /// A requested tool call could not be satisfied.
    #[error("Tool dispatch error: {0}")]
    ToolDispatch(#[from] ToolDispatchError),

    /// The service reported a run in a state the operation cannot handle.
    #[error("Run {run_id} is {status}: {reason}")]
    InvalidRunState {
        /// Run ID.
        run_id: String,
        /// Status reported by the service.
        status: RunStatus,
        /// What was wrong.
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error came from the remote service.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Failure to produce an output for one tool call.
///
/// Aborts the whole dispatch cycle: no outputs are submitted and the run
/// stays blocked server-side.
#[derive(Debug, Error)]
pub enum ToolDispatchError {
    /// The run asked for a tool that is not registered.
    #[error("unknown tool '{tool_name}' (call {call_id})")]
    UnknownTool { call_id: String, tool_name: String },

    /// The call's arguments are not a JSON object.
    #[error("invalid arguments for '{tool_name}' (call {call_id}): {reason}")]
    InvalidArguments {
        call_id: String,
        tool_name: String,
        reason: String,
    },

    /// The tool itself returned an error.
    #[error("tool '{tool_name}' failed (call {call_id}): {source}")]
    ToolFailed {
        call_id: String,
        tool_name: String,
        #[source]
        source: ToolError,
    },
}

impl ToolDispatchError {
    /// ID of the tool call that failed.
    pub fn call_id(&self) -> &str {
        match self {
            Self::UnknownTool { call_id, .. }
            | Self::InvalidArguments { call_id, .. }
            | Self::ToolFailed { call_id, .. } => call_id,
        }
    }

    /// Name of the tool that was requested.
    pub fn tool_name(&self) -> &str {
        match self {
            Self::UnknownTool { tool_name, .. }
            | Self::InvalidArguments { tool_name, .. }
            | Self::ToolFailed { tool_name, .. } => tool_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::from(ToolDispatchError::UnknownTool {
            call_id: "call_1".to_string(),
            tool_name: "get_weather".to_string(),
        });
        assert!(err.to_string().contains("Tool dispatch error"));
        assert!(err.to_string().contains("get_weather"));
        assert!(!err.is_remote());
    }

    #[test]
    fn test_dispatch_error_accessors() {
        let err = ToolDispatchError::ToolFailed {
            call_id: "call_7".to_string(),
            tool_name: "lookup".to_string(),
            source: ToolError::execution("backend down"),
        };
        assert_eq!(err.call_id(), "call_7");
        assert_eq!(err.tool_name(), "lookup");
        assert!(err.to_string().contains("backend down"));
    }

    #[test]
    fn test_remote_error_wraps_client_error() {
        let err = AgentError::from(parley_client::Error::NotFound("thread_x".to_string()));
        assert!(err.is_remote());
        assert!(err.to_string().contains("thread_x"));
    }
}
