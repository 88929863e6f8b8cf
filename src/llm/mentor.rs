//! Mentor chat session
//!
//! A session relays turns between the user and a [`ChatBackend`] while
//! holding the conversation history and the persona instruction. At most
//! one request is in flight per session; a failed exchange produces a
//! fixed fallback reply instead of an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::ChatError;

/// First message of every session
pub const GREETING: &str = "Hello. I am Ash. What is your objective?";

/// Reply when the service cannot be reached or errors out
pub const FALLBACK_UNAVAILABLE: &str =
    "Ash is temporarily unavailable due to a connection issue. Stay disciplined.";

/// Reply when the service answers with no text
pub const FALLBACK_EMPTY: &str = "I am currently meditating. Please try again later.";

/// Persona instruction attached to every request
pub fn system_instruction(user_name: &str) -> String {
    format!(
        "You are Ash, a mentor for a user named {user_name}.
Your traits are: Encouraging, Rational, Smart, Calm, Structured, and Strategic.

Theme: Self-improvement, leveling up in life (Academics, Intelligence, Strength, Endurance, Discipline).

HOW TO RESPOND (format):
1) **Title / Summary (1 line)**
2) **Main Explanation (2-6 short paragraphs OR clean bullet points)**
3) **Action Steps (3-5 exact next moves)**
4) **Short Motivation** (optional)

When explaining topics:
- 1-line intro
- Clear breakdown
- One example
- One test question

FINAL RULES:
- Always be clear.
- No rambling.
- No filler.
- Always address {user_name} by name.
- Always be Ash."
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A text-completion service the mentor talks to
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Reply to `message` given the earlier turns. No retries.
    async fn send(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ChatError>;
}

#[derive(Debug, Default)]
struct Conversation {
    /// Everything shown to the user, greeting and fallbacks included
    transcript: Vec<ChatMessage>,
    /// Successful exchanges only; this is what the backend sees
    context: Vec<ChatMessage>,
}

pub struct MentorSession<B> {
    backend: B,
    system: String,
    conversation: Mutex<Conversation>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the request finishes or is dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<B: ChatBackend> MentorSession<B> {
    /// Start a session addressing `user_name`, opened with [`GREETING`]
    pub fn new(backend: B, user_name: &str) -> Self {
        Self::with_instruction(backend, system_instruction(user_name))
    }

    pub fn with_instruction(backend: B, system: impl Into<String>) -> Self {
        let conversation = Conversation {
            transcript: vec![ChatMessage::new(ChatRole::Model, GREETING)],
            context: Vec::new(),
        };
        Self {
            backend,
            system: system.into(),
            conversation: Mutex::new(conversation),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn system_instruction(&self) -> &str {
        &self.system
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Everything said so far, oldest first
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.lock().transcript.clone()
    }

    /// Send a message and wait for Ash's reply.
    ///
    /// Returns `ChatError::Busy` if another send is still outstanding and
    /// `ChatError::EmptyMessage` for blank input; neither touches the
    /// history. Service failures are not errors: they come back as a
    /// fallback reply.
    pub async fn send(&self, text: &str) -> Result<ChatMessage, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(ChatError::Busy)?;

        let user = ChatMessage::new(ChatRole::User, text);
        let context = {
            let mut conversation = self.lock();
            conversation.transcript.push(user.clone());
            conversation.context.clone()
        };

        debug!(turns = context.len(), "sending mentor message");
        let outcome = self.backend.send(&self.system, &context, text).await;

        let reply = match outcome {
            Ok(reply) if !reply.trim().is_empty() => {
                let reply = ChatMessage::new(ChatRole::Model, reply);
                let mut conversation = self.lock();
                conversation.context.push(user);
                conversation.context.push(reply.clone());
                conversation.transcript.push(reply.clone());
                return Ok(reply);
            }
            Ok(_) => {
                warn!("mentor returned an empty reply");
                ChatMessage::new(ChatRole::Model, FALLBACK_EMPTY)
            }
            Err(err) => {
                warn!(error = %err, "mentor request failed");
                ChatMessage::new(ChatRole::Model, FALLBACK_UNAVAILABLE)
            }
        };

        self.lock().transcript.push(reply.clone());
        Ok(reply)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Conversation> {
        // A panic while holding the lock cannot leave the vectors half-updated
        self.conversation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl ChatBackend for Echo {
        async fn send(
            &self,
            _system: &str,
            history: &[ChatMessage],
            message: &str,
        ) -> Result<String, ChatError> {
            Ok(format!("{}:{message}", history.len()))
        }
    }

    struct Down;

    #[async_trait]
    impl ChatBackend for Down {
        async fn send(&self, _: &str, _: &[ChatMessage], _: &str) -> Result<String, ChatError> {
            Err(ChatError::ServiceUnavailable("connection refused".into()))
        }
    }

    #[test]
    fn test_instruction_names_user() {
        let text = system_instruction("Mina");
        assert!(text.contains("a user named Mina"));
        assert!(text.contains("Always address Mina by name."));
    }

    #[tokio::test]
    async fn test_session_opens_with_greeting() {
        let session = MentorSession::new(Echo, "Srujan");
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].text, GREETING);
        assert_eq!(transcript[0].role, ChatRole::Model);
    }

    #[tokio::test]
    async fn test_history_grows_with_successful_turns() {
        let session = MentorSession::new(Echo, "Srujan");
        assert_eq!(session.send("one").await.unwrap().text, "0:one");
        assert_eq!(session.send("two").await.unwrap().text, "2:two");
        assert_eq!(session.transcript().len(), 5);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_failure_yields_fallback() {
        let session = MentorSession::new(Down, "Srujan");
        let reply = session.send("hello").await.unwrap();
        assert_eq!(reply.text, FALLBACK_UNAVAILABLE);
        assert_eq!(session.transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let session = MentorSession::new(Echo, "Srujan");
        assert!(matches!(session.send("   ").await, Err(ChatError::EmptyMessage)));
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let guard = InFlightGuard::acquire(&flag).unwrap();
        assert!(InFlightGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_message_json() {
        let message = ChatMessage::new(ChatRole::Model, "hi");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "model");
        assert_eq!(value["text"], "hi");
    }
}
