//! # Dispatcher
//!
//! Routes one inbound message through the registry. Commands are tried in order until
//! one reports the message as handled. Errors are logged with the command name, sender
//! and channel; an error on a handled outcome is also replied to the sender. Nothing
//! escapes a single dispatch: at worst a message is dropped with a log entry.

use std::sync::Arc;

use crate::application::context::BotContext;
use crate::application::registry::Registry;
use crate::domain::config::AppConfig;
use crate::domain::types::InboundMessage;

/// Pre-filter settings applied before the registry is walked.
#[derive(Debug, Clone, Default)]
pub struct DispatchSettings {
    /// Text messages lacking this prefix are discarded.
    pub command_prefix: Option<String>,
    /// Whether messages sent by the bot's own account are dispatched.
    pub allow_self_messages: bool,
}

impl DispatchSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            command_prefix: config.command_prefix().map(str::to_string),
            allow_self_messages: config.bot.allow_self_messages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    SelfMessage,
    MissingPrefix,
}

/// What happened to a dispatched message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Dropped by the pre-filter; no command saw it.
    Ignored(IgnoreReason),
    /// `command` handled it. `replied` is set when an error was sent back to the sender.
    Handled { command: String, replied: bool },
    /// Every command passed.
    Unmatched,
}

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    ctx: Arc<BotContext>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, ctx: Arc<BotContext>, settings: DispatchSettings) -> Self {
        Self {
            registry,
            ctx,
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn context(&self) -> &Arc<BotContext> {
        &self.ctx
    }

    fn prefilter(&self, message: &InboundMessage) -> Option<IgnoreReason> {
        if !self.settings.allow_self_messages && message.sender.username == self.ctx.username() {
            return Some(IgnoreReason::SelfMessage);
        }
        if let Some(prefix) = self.settings.command_prefix.as_deref()
            && let Some(body) = message.text_body()
            && !body.starts_with(prefix)
        {
            return Some(IgnoreReason::MissingPrefix);
        }
        None
    }

    pub async fn dispatch(&self, message: &InboundMessage) -> Dispatch {
        if let Some(reason) = self.prefilter(message) {
            return Dispatch::Ignored(reason);
        }

        let sender = message.sender.username.as_str();
        let channel = message.channel.to_string();
        tracing::debug!("Incoming message from {}", sender);

        for command in self.registry.iter() {
            tracing::debug!("Trying {}", command.name);
            let outcome = command.action.run(message, &self.ctx).await;

            let mut replied = false;
            if let Some(err) = &outcome.error {
                tracing::error!(
                    "[{}][{} in {}] {} returned error: {:#}",
                    message.conversation_id,
                    sender,
                    channel,
                    command.name,
                    err
                );
                if outcome.handled {
                    replied = self.report(message, &command.name, &err.to_string()).await;
                }
            }

            if outcome.handled {
                tracing::debug!(
                    "{} handled the message, skipping subsequent commands",
                    command.name
                );
                return Dispatch::Handled {
                    command: command.name.clone(),
                    replied,
                };
            }
        }

        Dispatch::Unmatched
    }

    /// Sends an error back to the triggering message. Returns whether the reply went out.
    async fn report(&self, message: &InboundMessage, command: &str, text: &str) -> bool {
        match self.ctx.reply(message, text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    "[{}] Unable to report {} error to {}: {}",
                    message.conversation_id,
                    command,
                    message.sender.username,
                    e
                );
                false
            }
        }
    }
}
