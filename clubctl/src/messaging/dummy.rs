//! Dummy messaging provider.
//!
//! Records every message in memory instead of calling an external API.
//! Used in development and tests to assert on notification content.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::messaging::{MessageReceipt, MessagingProvider, Result};

/// A message captured by the dummy provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub text: String,
    pub group_id: String,
}

#[derive(Default)]
pub struct DummyProvider {
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl DummyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("dummy messaging mutex poisoned").clone()
    }

    /// A clone sharing the same message log, for handing one side to the
    /// application and keeping the other to assert on.
    pub fn handle(&self) -> Self {
        Self { sent: self.sent.clone() }
    }
}

#[async_trait]
impl MessagingProvider for DummyProvider {
    async fn send_group_message(&self, text: &str, group_override: Option<&str>) -> Result<MessageReceipt> {
        let group_id = group_override.unwrap_or("dummy-group").to_string();

        let mut sent = self.sent.lock().expect("dummy messaging mutex poisoned");
        sent.push(SentMessage {
            text: text.to_string(),
            group_id: group_id.clone(),
        });

        tracing::debug!(group_id = %group_id, "Dummy provider recorded message {}", sent.len());

        Ok(MessageReceipt {
            message_id: Some(format!("dummy-{}", sent.len())),
            group_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_messages_in_order() {
        let provider = DummyProvider::new();
        let handle = provider.handle();

        provider.send_group_message("first", None).await.unwrap();
        provider.send_group_message("second", Some("other@g.us")).await.unwrap();

        let sent = handle.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].text, "first");
        assert_eq!(sent[0].group_id, "dummy-group");
        assert_eq!(sent[1].group_id, "other@g.us");
    }
}
