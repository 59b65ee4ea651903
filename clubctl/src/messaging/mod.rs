//! Outbound group messaging abstraction.
//!
//! This module defines the `MessagingProvider` trait which abstracts the
//! third-party chat API the notifier pushes waitlist offers through
//! (WhatsApp gateway in production, an in-memory dummy in tests).

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::MessagingConfig;

pub mod dummy;
pub mod whatsapp;

/// Create a messaging provider from configuration.
///
/// This is the single point where config turns into provider instances;
/// adding a new provider means adding a match arm here.
pub fn create_provider(config: &MessagingConfig) -> Arc<dyn MessagingProvider> {
    match config {
        MessagingConfig::Whatsapp(whatsapp_config) => Arc::new(whatsapp::WhatsappProvider::new(whatsapp_config.clone())),
        MessagingConfig::Dummy => Arc::new(dummy::DummyProvider::new()),
    }
}

/// Result type for messaging operations
pub type Result<T> = std::result::Result<T, MessagingError>;

/// Errors that can occur while sending a message
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("Messaging API error: {0}")]
    Api(String),

    #[error("Messaging transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Delivery acknowledgement from the provider
#[derive(Debug, Clone)]
pub struct MessageReceipt {
    /// Provider-side message identifier, when one is returned
    pub message_id: Option<String>,
    /// Group the message was delivered to
    pub group_id: String,
}

/// Abstract outbound group messaging interface.
///
/// One call, one message, no retries: a failed send propagates to the
/// caller (the notifier fails loudly by design of the waitlist flow).
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Send a text message to a group chat.
    ///
    /// `group_override` replaces the configured default group when a club
    /// carries its own group id.
    async fn send_group_message(&self, text: &str, group_override: Option<&str>) -> Result<MessageReceipt>;
}
