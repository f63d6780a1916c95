//! Conversation session and thread binding.

use parley_client::Thread;

use crate::error::Result;
use crate::service::AssistantService;

/// Per-conversation context passed to every orchestrator call.
///
/// Owns the conversation's bound thread. A thread is bound by the first turn
/// and never replaced afterwards.
#[derive(Debug, Clone, Default)]
pub struct Session {
    thread: Option<Thread>,
}

impl Session {
    /// Create a session with no thread yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a conversation on an existing thread.
    pub fn with_thread(thread: Thread) -> Self {
        Self {
            thread: Some(thread),
        }
    }

    /// The bound thread, if the first turn has happened.
    pub fn thread(&self) -> Option<&Thread> {
        self.thread.as_ref()
    }

    /// Whether a thread is bound.
    pub fn is_bound(&self) -> bool {
        self.thread.is_some()
    }
}

/// Make sure the session has a thread holding `content` as its newest user message.
///
/// The first call creates a thread seeded with `content` and binds it to the
/// session; later calls append `content` to the bound thread. Remote failures
/// propagate unchanged and leave the session as it was.
pub async fn ensure_thread(
    service: &dyn AssistantService,
    session: &mut Session,
    content: &str,
) -> Result<Thread> {
    if let Some(thread) = &session.thread {
        let message = service.append_message(&thread.id, content).await?;
        tracing::debug!(thread_id = %thread.id, message_id = %message.id, "Appended user message");
        return Ok(thread.clone());
    }

    let thread = service.create_thread(content).await?;
    tracing::info!(thread_id = %thread.id, "Created thread");
    session.thread = Some(thread.clone());
    Ok(thread)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{MockService, ServiceCall};

    #[tokio::test]
    async fn test_first_call_creates_and_binds() {
        let service = MockService::new();
        let mut session = Session::new();
        assert!(!session.is_bound());

        let thread = ensure_thread(&service, &mut session, "Hello").await.unwrap();

        assert!(session.is_bound());
        assert_eq!(session.thread().unwrap().id, thread.id);
        assert_eq!(
            service.calls(),
            vec![ServiceCall::CreateThread {
                content: "Hello".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_second_call_appends_to_same_thread() {
        let service = MockService::new();
        let mut session = Session::new();

        let first = ensure_thread(&service, &mut session, "Hello").await.unwrap();
        let second = ensure_thread(&service, &mut session, "Follow-up")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(service.thread_count(), 1);
        assert_eq!(
            service.calls()[1],
            ServiceCall::AppendMessage {
                thread_id: first.id.clone(),
                content: "Follow-up".to_string()
            }
        );

        let texts: Vec<_> = service
            .messages(&first.id)
            .iter()
            .filter_map(|m| m.text().map(str::to_string))
            .collect();
        assert_eq!(texts, vec!["Hello", "Follow-up"]);
    }

    #[tokio::test]
    async fn test_remote_failure_leaves_session_unbound() {
        let service = MockService::new().with_failing_thread_writes();
        let mut session = Session::new();

        let err = ensure_thread(&service, &mut session, "Hello")
            .await
            .unwrap_err();

        assert!(err.is_remote());
        assert!(!session.is_bound());
    }

    #[tokio::test]
    async fn test_resumed_session_appends() {
        let service = MockService::new();
        let existing = service.create_thread("earlier").await.unwrap();
        let mut session = Session::with_thread(existing.clone());

        let thread = ensure_thread(&service, &mut session, "again").await.unwrap();
        assert_eq!(thread.id, existing.id);
        assert_eq!(service.thread_count(), 1);
    }
}
