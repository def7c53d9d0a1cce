pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// Who sent a message, when the platform tells us.
#[derive(Debug, Clone)]
pub struct Sender {
    pub first_name: String,
    pub username: Option<String>,
}

/// A message received from the platform
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Platform-specific chat ID
    pub chat_id: i64,
    pub sender: Option<Sender>,
    /// The message text, absent for non-text messages
    pub text: Option<String>,
}

impl IncomingMessage {
    /// Username for log lines, `unknown` when the sender is hidden.
    pub fn username(&self) -> &str {
        self.sender
            .as_ref()
            .and_then(|s| s.username.as_deref())
            .unwrap_or("unknown")
    }
}

/// A reply destined for a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingReply {
    pub chat_id: i64,
    pub text: String,
}

/// Outbound side of the messaging platform. Tests substitute a recording impl.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
}
