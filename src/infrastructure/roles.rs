//! # Static Role Table
//!
//! `RoleLookup` backed by the `roles:` section of the config. The same role applies in
//! every conversation; usernames match case-insensitively.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::traits::{CollaboratorError, CollaboratorResult, RoleLookup};
use crate::domain::types::Role;

#[derive(Debug, Clone, Default)]
pub struct StaticRoles {
    roles: HashMap<String, Role>,
}

impl StaticRoles {
    pub fn new(roles: &HashMap<String, Role>) -> Self {
        Self {
            roles: roles
                .iter()
                .map(|(user, role)| (user.to_lowercase(), *role))
                .collect(),
        }
    }
}

#[async_trait]
impl RoleLookup for StaticRoles {
    async fn role_of(&self, conversation_id: &str, username: &str) -> CollaboratorResult<Role> {
        self.roles
            .get(&username.to_lowercase())
            .copied()
            .ok_or_else(|| {
                CollaboratorError::NotFound(format!("{username} is not a member of {conversation_id}"))
            })
    }
}
