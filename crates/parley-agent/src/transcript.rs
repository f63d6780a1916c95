//! Transcript extraction: a thread's messages as sanitized display text.

use parley_client::{Message, MessageRole, Thread};
use serde::Serialize;

use crate::error::Result;
use crate::sanitize::sanitize;
use crate::service::AssistantService;

/// One sanitized message of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    /// ID of the source message.
    pub message_id: String,
    /// Author of the source message.
    pub role: MessageRole,
    /// Primary text with citation markers removed. Empty if the message has
    /// no text content.
    pub text: String,
}

impl TranscriptEntry {
    fn from_message(message: &Message) -> Self {
        Self {
            message_id: message.id.clone(),
            role: message.role,
            text: message.text().map(sanitize).unwrap_or_default(),
        }
    }
}

/// Ordered display text of a whole thread, one entry per message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Build a transcript from messages already in thread order.
    pub fn from_messages(messages: &[Message]) -> Self {
        Self {
            entries: messages.iter().map(TranscriptEntry::from_message).collect(),
        }
    }

    /// All entries, in thread order.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of entries; always the number of messages in the thread.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the thread had no messages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries' text joined with newlines.
    pub fn text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Assistant text written after the newest user message.
    ///
    /// This is the reply to the latest turn. Multiple assistant messages are
    /// joined with newlines.
    pub fn latest_reply(&self) -> String {
        let start = self
            .entries
            .iter()
            .rposition(|e| e.role == MessageRole::User)
            .map(|i| i + 1)
            .unwrap_or(0);

        self.entries[start..]
            .iter()
            .filter(|e| e.role == MessageRole::Assistant)
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl IntoIterator for Transcript {
    type Item = TranscriptEntry;
    type IntoIter = std::vec::IntoIter<TranscriptEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Fetch every message of `thread` and convert it to a [`Transcript`].
pub async fn extract(service: &dyn AssistantService, thread: &Thread) -> Result<Transcript> {
    let messages = service.list_messages(&thread.id).await?;
    tracing::debug!(thread_id = %thread.id, messages = messages.len(), "Extracted transcript");
    Ok(Transcript::from_messages(&messages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{text_message, MockService};
    use parley_client::{MessageContent, TextContent};
    use std::collections::HashMap;

    fn thread(id: &str) -> Thread {
        Thread {
            id: id.to_string(),
            created_at: 0,
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_extract_returns_every_message_in_order() {
        let service = MockService::new();
        service.seed_message("thread_1", MessageRole::User, "Hi");
        service.seed_message("thread_1", MessageRole::Assistant, "Hello【1†src】!");
        service.seed_message("thread_1", MessageRole::User, "Thanks");

        let transcript = extract(&service, &thread("thread_1")).await.unwrap();

        assert_eq!(transcript.len(), 3);
        let texts: Vec<_> = transcript.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Hi", "Hello!", "Thanks"]);
        assert_eq!(transcript.text(), "Hi\nHello!\nThanks");
    }

    #[tokio::test]
    async fn test_extract_empty_thread() {
        let service = MockService::new();
        let transcript = extract(&service, &thread("thread_9")).await.unwrap();
        assert!(transcript.is_empty());
        assert_eq!(transcript.text(), "");
    }

    #[test]
    fn test_message_without_text_keeps_position() {
        let mut image = text_message("msg_2", "t", MessageRole::Assistant, "");
        image.content = vec![MessageContent::Unknown];
        let messages = vec![
            text_message("msg_1", "t", MessageRole::User, "Show me"),
            image,
            text_message("msg_3", "t", MessageRole::Assistant, "Done"),
        ];

        let transcript = Transcript::from_messages(&messages);
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.entries()[1].text, "");
        assert_eq!(transcript.entries()[1].message_id, "msg_2");
    }

    #[test]
    fn test_primary_text_is_first_text_block() {
        let mut message = text_message("msg_1", "t", MessageRole::Assistant, "first【x】");
        message.content.push(MessageContent::Text {
            text: TextContent {
                value: "second".to_string(),
                annotations: Vec::new(),
            },
        });

        let transcript = Transcript::from_messages(&[message]);
        assert_eq!(transcript.entries()[0].text, "first");
    }

    #[test]
    fn test_latest_reply() {
        let messages = vec![
            text_message("m1", "t", MessageRole::User, "Q1"),
            text_message("m2", "t", MessageRole::Assistant, "A1"),
            text_message("m3", "t", MessageRole::User, "Q2"),
            text_message("m4", "t", MessageRole::Assistant, "A2 part one"),
            text_message("m5", "t", MessageRole::Assistant, "A2 part two【3†doc】"),
        ];
        let transcript = Transcript::from_messages(&messages);
        assert_eq!(transcript.latest_reply(), "A2 part one\nA2 part two");

        let unanswered = Transcript::from_messages(&messages[..3]);
        assert_eq!(unanswered.latest_reply(), "");

        let no_user = Transcript::from_messages(&messages[1..2]);
        assert_eq!(no_user.latest_reply(), "A1");
    }
}
