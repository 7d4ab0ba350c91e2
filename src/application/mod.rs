//! # Application Layer
//!
//! The dispatch core: actions and the adapters that guard them, the command registry,
//! the per-message dispatcher, the advertisement planner and the bot runner.

pub mod action;
pub mod adapters;
pub mod advertise;
pub mod bot;
pub mod context;
pub mod dispatcher;
pub mod logging;
pub mod meta;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;
