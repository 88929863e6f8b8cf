pub mod client;
pub mod mentor;

pub use client::{ApiFormat, LlmClient};
pub use mentor::{ChatBackend, ChatMessage, ChatRole, MentorSession};
