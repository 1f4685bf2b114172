//! Conversation transcript and input sequencing

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Result;
use crate::api::{PhotoIdentification, QueryResponse};

/// Shown when the backend could not answer a question
pub const QUERY_ERROR_MESSAGE: &str = "Sorry, something went wrong. Please try again.";

/// Shown when photo recognition failed
pub const PHOTO_ERROR_MESSAGE: &str = "Sorry, I had trouble recognizing that photo. Please try again.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// What a chat message carries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatContent {
    /// Typed or dictated text
    Text { text: String },
    /// A photo the user asked about
    Photo { file_name: String },
    Answer { response: QueryResponse },
    Identification { result: PhotoIdentification },
    /// A request failed; `text` is safe to show
    Error { text: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub speaker: Speaker,
    pub content: ChatContent,
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    /// Text to display for this message
    pub fn text(&self) -> &str {
        match &self.content {
            ChatContent::Text { text } | ChatContent::Error { text } => text,
            ChatContent::Photo { file_name } => file_name,
            ChatContent::Answer { response } => &response.answer,
            ChatContent::Identification { result } => result.answer(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.content, ChatContent::Error { .. })
    }
}

/// Ordered transcript of one chat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, speaker: Speaker, content: ChatContent) -> &ChatMessage {
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id: self.next_id,
            speaker,
            content,
            at: Utc::now(),
        });
        &self.messages[self.messages.len() - 1]
    }

    pub fn push_user_text(&mut self, text: impl Into<String>) -> &ChatMessage {
        self.push(Speaker::User, ChatContent::Text { text: text.into() })
    }

    pub fn push_user_photo(&mut self, file_name: impl Into<String>) -> &ChatMessage {
        self.push(
            Speaker::User,
            ChatContent::Photo {
                file_name: file_name.into(),
            },
        )
    }

    /// Plain assistant text, e.g. an offline answer
    pub fn push_assistant_text(&mut self, text: impl Into<String>) -> &ChatMessage {
        self.push(Speaker::Assistant, ChatContent::Text { text: text.into() })
    }

    /// Record the outcome of a backend question
    pub fn push_answer(&mut self, result: Result<QueryResponse>) -> &ChatMessage {
        let content = match result {
            Ok(response) => ChatContent::Answer { response },
            Err(e) => {
                warn!("Query failed: {}", e);
                ChatContent::Error {
                    text: QUERY_ERROR_MESSAGE.to_string(),
                }
            }
        };
        self.push(Speaker::Assistant, content)
    }

    /// Record the outcome of a photo identification
    pub fn push_identification(&mut self, result: Result<PhotoIdentification>) -> &ChatMessage {
        let content = match result {
            Ok(result) => ChatContent::Identification { result },
            Err(e) => {
                warn!("Photo identification failed: {}", e);
                ChatContent::Error {
                    text: PHOTO_ERROR_MESSAGE.to_string(),
                }
            }
        };
        self.push(Speaker::Assistant, content)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Marks one input attempt; see [`InputSequencer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputTicket(u64);

/// Orders competing inputs (typed text, dictation)
///
/// Every input takes a ticket when it starts. A result whose ticket is no
/// longer the latest was superseded and is dropped.
#[derive(Debug, Default)]
pub struct InputSequencer {
    generation: AtomicU64,
}

impl InputSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new input, superseding every earlier one
    pub fn begin(&self) -> InputTicket {
        InputTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: InputTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// `value` if `ticket` is still current, otherwise `None`
    pub fn accept<T>(&self, ticket: InputTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(ticket = ticket.0, "Discarding stale input");
            None
        }
    }
}
