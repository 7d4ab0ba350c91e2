//! # Bot Context
//!
//! Long-lived state handed to every action: the bot's identity, the shared meta store
//! and the external collaborators. Every collaborator call made through the context is
//! bounded by the configured timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::application::meta::MetaStore;
use crate::domain::traits::{
    AnnouncementService, CollaboratorError, CollaboratorResult, MessagingTransport, RoleLookup,
};
use crate::domain::types::{InboundMessage, Role};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct BotContext {
    username: String,
    name: String,
    meta: MetaStore,
    transport: Arc<dyn MessagingTransport>,
    roles: Arc<dyn RoleLookup>,
    announcer: Arc<dyn AnnouncementService>,
    call_timeout: Duration,
}

impl BotContext {
    pub fn new(
        username: impl Into<String>,
        transport: Arc<dyn MessagingTransport>,
        roles: Arc<dyn RoleLookup>,
        announcer: Arc<dyn AnnouncementService>,
    ) -> Self {
        Self {
            username: username.into(),
            name: String::new(),
            meta: MetaStore::new(),
            transport,
            roles,
            announcer,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Display name shown next to the bot's username in advertisements.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Account the bot is logged in as.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &MetaStore {
        &self.meta
    }

    pub fn transport(&self) -> &Arc<dyn MessagingTransport> {
        &self.transport
    }

    pub fn announcer(&self) -> &Arc<dyn AnnouncementService> {
        &self.announcer
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Runs a collaborator call under the context's timeout.
    pub async fn bounded<T, F>(&self, call: F) -> CollaboratorResult<T>
    where
        F: Future<Output = CollaboratorResult<T>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CollaboratorError::Timeout(self.call_timeout)),
        }
    }

    /// Replies to `message` in its conversation.
    pub async fn reply(&self, message: &InboundMessage, text: &str) -> CollaboratorResult<()> {
        self.bounded(
            self.transport
                .reply(&message.conversation_id, Some(&message.id), text),
        )
        .await
    }

    pub async fn react(&self, message: &InboundMessage, reaction: &str) -> CollaboratorResult<()> {
        self.bounded(
            self.transport
                .react(&message.conversation_id, &message.id, reaction),
        )
        .await
    }

    pub async fn send(&self, conversation_id: &str, text: &str) -> CollaboratorResult<()> {
        self.bounded(self.transport.send(conversation_id, text)).await
    }

    pub async fn role_of(&self, conversation_id: &str, username: &str) -> CollaboratorResult<Role> {
        self.bounded(self.roles.role_of(conversation_id, username))
            .await
    }
}
