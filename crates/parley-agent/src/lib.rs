//! Turn orchestration core for parley.
//!
//! This crate drives one conversational turn against a remote assistant
//! service: it binds the conversation to a thread, starts a run, polls it to
//! a terminal state while executing any tool calls the run requests, and
//! turns the thread into a clean transcript.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Orchestrator::respond(session, text)                       │
//! └─────────────────────────────────────────────────────────────┘
//!        │               │                 │               │
//!        ▼               ▼                 ▼               ▼
//!  ┌───────────┐   ┌───────────┐    ┌────────────┐   ┌────────────┐
//!  │  thread   │   │  driver   │───▶│  dispatch  │   │ transcript │
//!  │ (Session) │   │ (polling) │    │(ToolReg)   │   │ (sanitize) │
//!  └───────────┘   └───────────┘    └────────────┘   └────────────┘
//!        │               │                 │               │
//!        └───────────────┴────────┬────────┴───────────────┘
//!                                 ▼
//!                      AssistantService (parley-client)
//! ```
//!
//! # Core Components
//!
//! - [`Orchestrator`]: entry point; `respond` runs a whole turn
//! - [`Session`]: per-conversation context owning the bound thread
//! - [`ToolRegistry`]: name-to-implementation map for tool calls
//! - [`TurnOutcome`]: a transcript, or a failed run
//! - [`AssistantService`]: the remote operations the core consumes

pub mod dispatch;
pub mod driver;
pub mod error;
pub mod orchestrator;
pub mod sanitize;
pub mod service;
pub mod thread;
pub mod tool;
pub mod transcript;

pub use driver::{
    DEFAULT_POLL_INTERVAL, DriverConfig, RecordingSleeper, SharedSleeper, Sleeper, TokioSleeper,
};
pub use error::{AgentError, Result, ToolDispatchError};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, TurnOutcome};
pub use sanitize::sanitize;
pub use service::{AssistantService, MockService, ServiceCall, SharedService};
pub use thread::Session;
pub use tool::{FnTool, Tool, ToolArgs, ToolError, ToolRegistry};
pub use transcript::{Transcript, TranscriptEntry};
