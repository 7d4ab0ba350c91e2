//! # Adapters
//!
//! Composable guards that wrap an [`Action`]. A guard either lets the message through to
//! the wrapped action or stops it with an outcome, usually a silent pass meaning "this
//! command does not apply". Only [`MinRole`] stops with a user-visible error.
//!
//! [`adapt`] applies adapters so that the first one listed is the outermost check.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::application::action::{Action, Outcome, SharedAction};
use crate::application::context::BotContext;
use crate::domain::types::{InboundMessage, Role, RoleParseError};

/// Turns an action into a new action.
pub trait Adapter: Send + Sync {
    fn apply(&self, next: SharedAction) -> SharedAction;
}

/// Wraps `base` in `adapters`, last to first, so `adapters[0]` runs first at dispatch.
pub fn adapt<A>(base: A, adapters: &[&dyn Adapter]) -> SharedAction
where
    A: Action + 'static,
{
    adapters
        .iter()
        .rev()
        .fold(Arc::new(base) as SharedAction, |next, adapter| {
            adapter.apply(next)
        })
}

/// Decision made by a [`Guard`] before the wrapped action runs.
#[derive(Debug)]
pub enum Verdict {
    Continue,
    Stop(Outcome),
}

impl Verdict {
    /// Silent non-match.
    pub fn skip() -> Self {
        Verdict::Stop(Outcome::pass())
    }

    fn from_bool(passes: bool) -> Self {
        if passes { Verdict::Continue } else { Verdict::skip() }
    }
}

/// A pre-condition checked ahead of an action. Every `Guard + Clone` is an [`Adapter`].
#[async_trait]
pub trait Guard: Send + Sync + 'static {
    async fn check(&self, message: &InboundMessage, ctx: &BotContext) -> Verdict;
}

struct Guarded<G> {
    guard: G,
    next: SharedAction,
}

#[async_trait]
impl<G: Guard> Action for Guarded<G> {
    async fn run(&self, message: &InboundMessage, ctx: &BotContext) -> Outcome {
        match self.guard.check(message, ctx).await {
            Verdict::Continue => self.next.run(message, ctx).await,
            Verdict::Stop(outcome) => outcome,
        }
    }
}

impl<G: Guard + Clone> Adapter for G {
    fn apply(&self, next: SharedAction) -> SharedAction {
        Arc::new(Guarded {
            guard: self.clone(),
            next,
        })
    }
}

/// Restricts a command to one message kind (`text`, `edit`, `reaction`, ...).
#[derive(Debug, Clone)]
pub struct MessageType {
    kind: String,
}

impl MessageType {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }

    pub fn text() -> Self {
        Self::new("text")
    }
}

#[async_trait]
impl Guard for MessageType {
    async fn check(&self, message: &InboundMessage, _ctx: &BotContext) -> Verdict {
        Verdict::from_bool(message.kind_name() == self.kind)
    }
}

/// Text messages starting with `prefix`. Other kinds never match.
#[derive(Debug, Clone)]
pub struct CommandPrefix {
    prefix: String,
}

impl CommandPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl Guard for CommandPrefix {
    async fn check(&self, message: &InboundMessage, _ctx: &BotContext) -> Verdict {
        Verdict::from_bool(
            message
                .text_body()
                .is_some_and(|body| body.starts_with(&self.prefix)),
        )
    }
}

/// Reactions whose body is exactly `trigger`. Implies the kind check.
#[derive(Debug, Clone)]
pub struct ReactionTrigger {
    trigger: String,
}

impl ReactionTrigger {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
        }
    }
}

#[async_trait]
impl Guard for ReactionTrigger {
    async fn check(&self, message: &InboundMessage, _ctx: &BotContext) -> Verdict {
        Verdict::from_bool(message.reaction_body() == Some(self.trigger.as_str()))
    }
}

/// Returned to the sender when [`MinRole`] denies a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Your role must be at least {required} to do that.")]
pub struct PermissionDenied {
    pub required: Role,
}

/// Requires the sender to hold at least `role` in the conversation.
///
/// The role is looked up on every message, so place this after the cheap guards that
/// identify the command. A failed or timed-out lookup denies access.
#[derive(Debug, Clone)]
pub struct MinRole {
    role: Role,
}

impl MinRole {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    /// Case-insensitive role name.
    pub fn parse(role: &str) -> Result<Self, RoleParseError> {
        Ok(Self::new(role.parse()?))
    }

    fn deny(&self) -> Verdict {
        Verdict::Stop(Outcome::reject(PermissionDenied { required: self.role }))
    }
}

#[async_trait]
impl Guard for MinRole {
    async fn check(&self, message: &InboundMessage, ctx: &BotContext) -> Verdict {
        let username = &message.sender.username;
        match ctx.role_of(&message.conversation_id, username).await {
            Ok(actual) if actual >= self.role => Verdict::Continue,
            Ok(actual) => {
                tracing::debug!(
                    "{} has role {} in {}, needs {}",
                    username,
                    actual,
                    message.conversation_id,
                    self.role
                );
                self.deny()
            }
            Err(e) => {
                tracing::warn!(
                    "Role lookup for {} in {} failed, denying: {}",
                    username,
                    message.conversation_id,
                    e
                );
                self.deny()
            }
        }
    }
}

/// Only messages sent by `username`.
#[derive(Debug, Clone)]
pub struct FromUser {
    username: String,
}

impl FromUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

#[async_trait]
impl Guard for FromUser {
    async fn check(&self, message: &InboundMessage, _ctx: &BotContext) -> Verdict {
        Verdict::from_bool(message.sender.username == self.username)
    }
}

/// Only messages sent by one of `usernames`.
#[derive(Debug, Clone)]
pub struct FromUsers {
    usernames: Arc<HashSet<String>>,
}

impl FromUsers {
    pub fn new<I, S>(usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            usernames: Arc::new(usernames.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl Guard for FromUsers {
    async fn check(&self, message: &InboundMessage, _ctx: &BotContext) -> Verdict {
        Verdict::from_bool(self.usernames.contains(&message.sender.username))
    }
}

/// Text or edit messages containing `needle`, optionally ignoring case and whitespace.
#[derive(Debug, Clone)]
pub struct Contains {
    needle: String,
    ignore_case: bool,
    ignore_whitespace: bool,
}

impl Contains {
    pub fn new(needle: impl Into<String>, ignore_case: bool, ignore_whitespace: bool) -> Self {
        let mut contains = Self {
            needle: String::new(),
            ignore_case,
            ignore_whitespace,
        };
        contains.needle = contains.normalize(&needle.into());
        contains
    }

    fn normalize(&self, text: &str) -> String {
        let text = if self.ignore_case {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        if self.ignore_whitespace {
            text.split_whitespace().collect()
        } else {
            text
        }
    }
}

#[async_trait]
impl Guard for Contains {
    async fn check(&self, message: &InboundMessage, _ctx: &BotContext) -> Verdict {
        Verdict::from_bool(
            message
                .written_body()
                .is_some_and(|body| self.normalize(body).contains(&self.needle)),
        )
    }
}
