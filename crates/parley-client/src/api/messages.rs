//! Messages API.

use serde::Serialize;

use crate::client::ParleyClient;
use crate::error::Result;
use crate::types::{CreateMessageRequest, ListResponse, Message, SortOrder};

/// Page size used by [`MessagesApi::list_all`].
const PAGE_LIMIT: u32 = 100;

/// Query parameters for listing messages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListMessagesQuery {
    /// Page size (service caps at 100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Sort order by creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    /// Cursor: return items after this message ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// Messages API client.
pub struct MessagesApi {
    client: ParleyClient,
}

impl MessagesApi {
    pub(crate) fn new(client: ParleyClient) -> Self {
        Self { client }
    }

    /// Append a message to a thread.
    pub async fn create(&self, thread_id: &str, request: CreateMessageRequest) -> Result<Message> {
        self.client
            .post(&format!("threads/{}/messages", thread_id), &request)
            .await
    }

    /// List one page of messages.
    pub async fn list(
        &self,
        thread_id: &str,
        query: &ListMessagesQuery,
    ) -> Result<ListResponse<Message>> {
        self.client
            .get_with_query(&format!("threads/{}/messages", thread_id), query)
            .await
    }

    /// List every message in the thread, oldest first.
    ///
    /// Follows the `last_id` cursor until the service reports no more pages.
    pub async fn list_all(&self, thread_id: &str) -> Result<Vec<Message>> {
        let mut query = ListMessagesQuery {
            limit: Some(PAGE_LIMIT),
            order: Some(SortOrder::Asc),
            after: None,
        };
        let mut messages = Vec::new();

        loop {
            let page = self.list(thread_id, &query).await?;
            messages.extend(page.data);

            match page.last_id {
                Some(last_id) if page.has_more => query.after = Some(last_id),
                _ => break,
            }
        }

        Ok(messages)
    }
}
