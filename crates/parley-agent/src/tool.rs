//! Tool framework: the local capabilities a run can ask the caller to execute.
//!
//! This module defines the [`Tool`] trait that every locally executed tool
//! implements, and the [`ToolRegistry`] that maps the tool names a run
//! requests to those implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use parley_agent::{Tool, ToolArgs, ToolError, ToolRegistry};
//!
//! struct OrderStatus;
//!
//! #[async_trait]
//! impl Tool for OrderStatus {
//!     fn name(&self) -> &str { "order_status" }
//!
//!     async fn call(&self, args: ToolArgs) -> Result<String, ToolError> {
//!         let id = args.get("order_id").and_then(|v| v.as_str())
//!             .ok_or_else(|| ToolError::invalid_arguments("order_id is required"))?;
//!         Ok(format!("order {id} shipped"))
//!     }
//! }
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(OrderStatus);
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Parsed tool arguments: the JSON object the run supplied.
pub type ToolArgs = serde_json::Map<String, serde_json::Value>;

/// Error returned by a tool implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ToolError {
    /// The arguments parsed, but do not fit the tool's expectations.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran and failed.
    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    /// Create an invalid-arguments error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create an execution error.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }
}

/// A locally executed capability a run can request by name.
///
/// Argument schemas are each tool's own business; the dispatcher only
/// guarantees the arguments are a JSON object.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the assistant uses to request this tool.
    fn name(&self) -> &str;

    /// Execute the tool and return its text output.
    async fn call(&self, args: ToolArgs) -> Result<String, ToolError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Closure adapter
// ─────────────────────────────────────────────────────────────────────────────

/// Adapts an async closure into a [`Tool`].
///
/// ```rust,ignore
/// registry.register(FnTool::new("echo", |args| async move {
///     Ok(serde_json::Value::Object(args).to_string())
/// }));
/// ```
pub struct FnTool<F> {
    name: String,
    func: F,
}

impl<F> FnTool<F> {
    /// Wrap `func` as a tool called `name`.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> fmt::Debug for FnTool<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F, Fut> Tool for FnTool<F>
where
    F: Fn(ToolArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, ToolError>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, args: ToolArgs) -> Result<String, ToolError> {
        (self.func)(args).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry mapping tool names to implementations.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool.
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    /// Register a tool from an Arc.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get all tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock Tool (for testing)
// ─────────────────────────────────────────────────────────────────────────────

/// A mock tool for testing.
///
/// Returns a configurable response and tracks calls for verification.
#[cfg(test)]
#[derive(Debug)]
pub struct MockTool {
    name: String,
    response: Result<String, ToolError>,
    calls: std::sync::Mutex<Vec<ToolArgs>>,
}

#[cfg(test)]
impl MockTool {
    /// Create a new mock tool that answers `"ok"`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            response: Ok("ok".to_string()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Set the output to return.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.response = Ok(output.into());
        self
    }

    /// Make every call fail with `error`.
    pub fn failing(mut self, error: ToolError) -> Self {
        self.response = Err(error);
        self
    }

    /// Get the arguments of every call made to this tool.
    pub fn calls(&self) -> Vec<ToolArgs> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, args: ToolArgs) -> Result<String, ToolError> {
        self.calls.lock().unwrap().push(args);
        self.response.clone()
    }
}
