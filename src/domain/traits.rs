//! # Domain Traits
//!
//! Abstract interfaces for the collaborators the dispatch core talks to (chat transport,
//! role lookup, command announcements). Implementations live in the Infrastructure layer
//! or in the embedding application.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::types::{AdvertisementPlan, Role};

/// Failures reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("request rejected: {0}")]
    Rejected(String),
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Outbound half of the chat transport.
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    /// Reply in a conversation, threaded onto `message_id` when given.
    async fn reply(
        &self,
        conversation_id: &str,
        message_id: Option<&str>,
        text: &str,
    ) -> CollaboratorResult<()>;

    /// React to a message.
    async fn react(
        &self,
        conversation_id: &str,
        message_id: &str,
        reaction: &str,
    ) -> CollaboratorResult<()>;

    /// Send a standalone message (used for mirrored log lines).
    async fn send(&self, conversation_id: &str, text: &str) -> CollaboratorResult<()> {
        self.reply(conversation_id, None, text).await
    }
}

/// Resolves a user's role within a conversation.
#[async_trait]
pub trait RoleLookup: Send + Sync {
    async fn role_of(&self, conversation_id: &str, username: &str) -> CollaboratorResult<Role>;
}

/// Publishes command advertisements to the chat platform.
#[async_trait]
pub trait AnnouncementService: Send + Sync {
    async fn publish(&self, plan: &AdvertisementPlan) -> CollaboratorResult<()>;

    async fn clear(&self) -> CollaboratorResult<()>;
}
