//! # Message Commands
//!
//! `set`, `get` and `forget`: keep a single message in the meta store and hand it back
//! on request.

use anyhow::anyhow;
use async_trait::async_trait;

use crate::application::action::{Action, Outcome};
use crate::application::context::BotContext;
use crate::domain::types::InboundMessage;
use crate::strings::messages;

/// Meta store key holding the message.
pub const MESSAGE_KEY: &str = "message";

/// Stores everything after the trigger, then reacts with a check mark.
pub struct SetMessage {
    trigger: String,
}

impl SetMessage {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
        }
    }
}

#[async_trait]
impl Action for SetMessage {
    async fn run(&self, message: &InboundMessage, ctx: &BotContext) -> Outcome {
        let body = message.text_body().unwrap_or_default();
        let text = body.strip_prefix(&self.trigger).unwrap_or(body).trim();
        if text.is_empty() {
            return Outcome::reject(anyhow!(messages::MISSING_MESSAGE));
        }

        if let Err(e) = ctx.meta().set(MESSAGE_KEY, text).await {
            return Outcome::fail(e);
        }
        if let Err(e) = ctx.react(message, messages::CHECK_MARK).await {
            tracing::warn!("Unable to acknowledge {}: {}", message.id, e);
        }
        Outcome::handled()
    }
}

/// Replies with the stored message. A successful reply still reports the message as
/// unhandled, so commands registered after `get` see it too.
pub struct GetMessage {
    prefix: String,
}

impl GetMessage {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl Action for GetMessage {
    async fn run(&self, message: &InboundMessage, ctx: &BotContext) -> Outcome {
        let stored = match ctx.meta().get::<String>(MESSAGE_KEY).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return Outcome::reject(anyhow!(messages::nothing_stored(&self.prefix))),
            Err(e) => return Outcome::fail(e),
        };

        match ctx.reply(message, &messages::stored_message(&stored)).await {
            Ok(()) => Outcome::pass(),
            Err(e) => Outcome::fail(anyhow!("unable to send stored message: {e}")),
        }
    }
}

/// Drops the stored message.
pub struct ForgetMessage;

#[async_trait]
impl Action for ForgetMessage {
    async fn run(&self, message: &InboundMessage, ctx: &BotContext) -> Outcome {
        ctx.meta().remove(MESSAGE_KEY).await;
        if let Err(e) = ctx.reply(message, messages::MESSAGE_FORGOTTEN).await {
            tracing::warn!("Unable to confirm forget to {}: {}", message.sender.username, e);
        }
        Outcome::handled()
    }
}
