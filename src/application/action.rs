//! # Actions
//!
//! An [`Action`] is the executable part of a command. It inspects one inbound message
//! together with the shared [`BotContext`] and reports an [`Outcome`].

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::application::context::BotContext;
use crate::domain::types::InboundMessage;

/// Result of running an action against a message.
///
/// `handled` stops the dispatcher from trying later commands. An `error` is always
/// logged; when `handled` is also set its text is replied to the sender.
pub struct Outcome {
    pub handled: bool,
    pub error: Option<anyhow::Error>,
}

impl Outcome {
    /// Not for this command; try the next one.
    pub fn pass() -> Self {
        Self {
            handled: false,
            error: None,
        }
    }

    /// Done; no further commands see the message.
    pub fn handled() -> Self {
        Self {
            handled: true,
            error: None,
        }
    }

    /// Logged-only failure; dispatch continues with the next command.
    pub fn fail(error: impl Into<anyhow::Error>) -> Self {
        Self {
            handled: false,
            error: Some(error.into()),
        }
    }

    /// User-visible failure; dispatch stops and the error text is sent back.
    pub fn reject(error: impl Into<anyhow::Error>) -> Self {
        Self {
            handled: true,
            error: Some(error.into()),
        }
    }

    pub fn is_silent_pass(&self) -> bool {
        !self.handled && self.error.is_none()
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("handled", &self.handled)
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .finish()
    }
}

/// Converts a fallible handler body into an outcome: `Ok(handled)` maps to
/// pass/handled, `Err` to a user-visible rejection.
impl From<anyhow::Result<bool>> for Outcome {
    fn from(result: anyhow::Result<bool>) -> Self {
        match result {
            Ok(true) => Outcome::handled(),
            Ok(false) => Outcome::pass(),
            Err(e) => Outcome::reject(e),
        }
    }
}

#[async_trait]
pub trait Action: Send + Sync {
    async fn run(&self, message: &InboundMessage, ctx: &BotContext) -> Outcome;
}

/// Shared, type-erased action as stored in the registry.
pub type SharedAction = Arc<dyn Action>;

#[async_trait]
impl<A: Action + ?Sized> Action for Arc<A> {
    async fn run(&self, message: &InboundMessage, ctx: &BotContext) -> Outcome {
        (**self).run(message, ctx).await
    }
}
