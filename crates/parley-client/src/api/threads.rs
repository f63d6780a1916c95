//! Threads API.

use crate::client::ParleyClient;
use crate::error::Result;
use crate::types::{CreateThreadRequest, Thread};

/// Threads API client.
pub struct ThreadsApi {
    client: ParleyClient,
}

impl ThreadsApi {
    pub(crate) fn new(client: ParleyClient) -> Self {
        Self { client }
    }

    /// Create a thread, optionally seeded with messages.
    pub async fn create(&self, request: CreateThreadRequest) -> Result<Thread> {
        self.client.post("threads", &request).await
    }

    /// Get a thread by ID.
    pub async fn get(&self, thread_id: &str) -> Result<Thread> {
        self.client.get(&format!("threads/{}", thread_id)).await
    }
}
