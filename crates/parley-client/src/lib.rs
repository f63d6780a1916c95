//! HTTP client SDK for a remote stateful assistant service.
//!
//! The service keeps conversations as persistent *threads* of messages and
//! executes the assistant asynchronously as *runs*. A run may pause in
//! `requires_action` until the caller submits outputs for the tool calls it
//! requested.
//!
//! # Example
//!
//! ```no_run
//! use parley_client::{CreateRunRequest, CreateThreadRequest, ParleyClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = ParleyClient::builder().api_key("sk-...").build()?;
//!
//! let thread = client
//!     .threads()
//!     .create(CreateThreadRequest::with_user_message("Hello!"))
//!     .await?;
//! let run = client
//!     .runs()
//!     .create(&thread.id, CreateRunRequest::new("asst_123"))
//!     .await?;
//! let run = client.runs().get(&thread.id, &run.id).await?;
//! println!("status: {}", run.status);
//!
//! for message in client.messages().list_all(&thread.id).await? {
//!     println!("{}: {}", message.role, message.text().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Threads**: create (optionally seeded), retrieve
//! - **Messages**: append, list (paged or all)
//! - **Runs**: create, retrieve, submit tool outputs, list steps
//!
//! Both the hosted API and Azure deployments are supported; see
//! [`ClientBuilder::azure`].

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::{
    ClientBuilder, ParleyClient, Provider, DEFAULT_AZURE_API_VERSION, OPENAI_BASE_URL,
};
pub use error::{Error, Result};
pub use types::*;

pub use api::ListMessagesQuery;
