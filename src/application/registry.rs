//! # Command Registry
//!
//! Ordered list of commands. Order is part of the contract: the dispatcher tries
//! commands in registration order and the first one to handle a message wins, so more
//! specific commands belong before more general ones.

use std::fmt;

use crate::application::action::SharedAction;
use crate::domain::types::{AdScope, Advertisement};

pub struct Command {
    /// Used in logs and error reports.
    pub name: String,
    pub advertisement: Option<Advertisement>,
    pub scope: AdScope,
    pub action: SharedAction,
}

impl Command {
    /// An unadvertised command.
    pub fn new(name: impl Into<String>, action: SharedAction) -> Self {
        Self {
            name: name.into(),
            advertisement: None,
            scope: AdScope::Public,
            action,
        }
    }

    /// Advertise publicly.
    pub fn advertise(mut self, advertisement: Advertisement) -> Self {
        self.advertisement = Some(advertisement);
        self
    }

    /// Advertise only within `scope`.
    pub fn advertise_in(mut self, advertisement: Advertisement, scope: AdScope) -> Self {
        self.advertisement = Some(advertisement);
        self.scope = scope;
        self
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("advertisement", &self.advertisement)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Built once at startup; read-only while the bot runs.
#[derive(Debug, Default)]
pub struct Registry {
    commands: Vec<Command>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    pub fn with(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

impl FromIterator<Command> for Registry {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}
