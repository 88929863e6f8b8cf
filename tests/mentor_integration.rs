//! Integration tests for the mentor chat session

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arise::core::error::ChatError;
use arise::llm::mentor::{
    ChatBackend, ChatMessage, ChatRole, MentorSession, FALLBACK_EMPTY, FALLBACK_UNAVAILABLE,
    GREETING,
};
use async_trait::async_trait;
use tokio::sync::Notify;

enum Step {
    Reply(&'static str),
    Fail,
    Hang,
    Gate {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    },
}

/// Backend that plays back a fixed script and records what it was sent
#[derive(Default)]
struct ScriptedBackend {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<(String, Vec<String>, String)>>,
}

impl ScriptedBackend {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, Vec<String>, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn send(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ChatError> {
        self.calls.lock().unwrap().push((
            system.to_string(),
            history.iter().map(|m| m.text.clone()).collect(),
            message.to_string(),
        ));
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(text)) => Ok(text.to_string()),
            Some(Step::Fail) | None => Err(ChatError::ServiceUnavailable("scripted".into())),
            Some(Step::Hang) => std::future::pending().await,
            Some(Step::Gate { entered, release }) => {
                entered.notify_one();
                release.notified().await;
                Ok("through the gate".to_string())
            }
        }
    }
}

#[tokio::test]
async fn test_system_instruction_and_history_reach_backend() {
    let session = MentorSession::new(
        ScriptedBackend::new(vec![Step::Reply("Plan: 3 sets."), Step::Reply("Rest today.")]),
        "Srujan",
    );

    session.send("How do I get stronger?").await.unwrap();
    session.send("And tomorrow?").await.unwrap();

    let calls = session.backend().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].0.contains("Srujan"));
    assert!(calls[0].1.is_empty());
    assert_eq!(calls[0].2, "How do I get stronger?");
    assert_eq!(
        calls[1].1,
        vec!["How do I get stronger?".to_string(), "Plan: 3 sets.".to_string()]
    );
}

#[tokio::test]
async fn test_failed_exchange_is_shown_but_not_sent_as_context() {
    let session = MentorSession::new(
        ScriptedBackend::new(vec![Step::Fail, Step::Reply(""), Step::Reply("Back online.")]),
        "Srujan",
    );

    let first = session.send("hello?").await.unwrap();
    assert_eq!(first.text, FALLBACK_UNAVAILABLE);
    assert_eq!(first.role, ChatRole::Model);

    let second = session.send("still there?").await.unwrap();
    assert_eq!(second.text, FALLBACK_EMPTY);

    let third = session.send("now?").await.unwrap();
    assert_eq!(third.text, "Back online.");

    let calls = session.backend().calls();
    assert!(calls[2].1.is_empty(), "failed turns must not become context");

    let texts: Vec<String> = session.transcript().into_iter().map(|m| m.text).collect();
    assert_eq!(
        texts,
        vec![
            GREETING,
            "hello?",
            FALLBACK_UNAVAILABLE,
            "still there?",
            FALLBACK_EMPTY,
            "now?",
            "Back online."
        ]
    );
}

#[tokio::test]
async fn test_second_send_while_in_flight_is_rejected() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let session = Arc::new(MentorSession::new(
        ScriptedBackend::new(vec![Step::Gate {
            entered: entered.clone(),
            release: release.clone(),
        }]),
        "Srujan",
    ));

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.send("first").await })
    };
    entered.notified().await;

    assert!(session.is_busy());
    assert!(matches!(session.send("second").await, Err(ChatError::Busy)));

    release.notify_one();
    let reply = first.await.unwrap().unwrap();
    assert_eq!(reply.text, "through the gate");
    assert!(!session.is_busy());

    let texts: Vec<String> = session.transcript().into_iter().map(|m| m.text).collect();
    assert!(!texts.contains(&"second".to_string()));
    assert_eq!(session.backend().calls().len(), 1);
}

#[tokio::test]
async fn test_cancelled_request_frees_the_session() {
    let session = MentorSession::new(
        ScriptedBackend::new(vec![Step::Hang, Step::Reply("Ready.")]),
        "Srujan",
    );

    let timed_out = tokio::time::timeout(Duration::from_millis(20), session.send("hello")).await;
    assert!(timed_out.is_err());
    assert!(!session.is_busy());

    let reply = session.send("hello again").await.unwrap();
    assert_eq!(reply.text, "Ready.");
}
