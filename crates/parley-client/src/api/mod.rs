//! API endpoint implementations.

mod messages;
mod runs;
mod threads;

pub use messages::{ListMessagesQuery, MessagesApi};
pub use runs::RunsApi;
pub use threads::ThreadsApi;
