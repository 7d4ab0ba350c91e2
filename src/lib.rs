//! # switchboard
//!
//! Middleware-and-dispatch core for a chat bot:
//! - Domain: message model, roles, advertisement scopes, collaborator traits, config
//! - Application: actions, adapters, registry, dispatcher, advertisement planner, runner
//! - Infrastructure: console transport and static role table
//! - Interface: built-in commands

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod strings;

pub use application::action::{Action, Outcome, SharedAction};
pub use application::adapters::{
    Adapter, CommandPrefix, Contains, FromUser, FromUsers, Guard, MessageType, MinRole,
    PermissionDenied, ReactionTrigger, Verdict, adapt,
};
pub use application::bot::{Bot, RunSummary};
pub use application::context::BotContext;
pub use application::dispatcher::{Dispatch, DispatchSettings, Dispatcher, IgnoreReason};
pub use application::registry::{Command, Registry};
pub use domain::types::{AdScope, Advertisement, InboundMessage, MessageContent, Role};
