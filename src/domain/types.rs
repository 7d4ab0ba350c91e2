//! # Domain Types
//!
//! Inbound message model, conversation roles and advertisement scopes shared across the
//! dispatch core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Who sent a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub username: String,
    #[serde(default)]
    pub device: Option<String>,
}

impl Sender {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            device: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembersType {
    /// Direct or group conversation between users.
    #[default]
    User,
    /// A channel inside a team.
    Team,
}

/// The channel a message arrived on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub members_type: MembersType,
}

impl Channel {
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            topic: None,
            members_type: MembersType::User,
        }
    }

    pub fn team(name: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            topic: Some(topic.into()),
            members_type: MembersType::Team,
        }
    }
}

/// Renders `name` for user conversations and `team#topic` for team channels.
impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.members_type {
            MembersType::User => write!(f, "{}", self.name),
            MembersType::Team => write!(
                f,
                "{}#{}",
                self.name,
                self.topic.as_deref().unwrap_or_default()
            ),
        }
    }
}

/// Kind-dependent message payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text { body: String },
    Edit { body: String, target: String },
    Reaction { body: String, target: String },
    Other { type_name: String },
}

/// A message delivered by the transport. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender: Sender,
    pub channel: Channel,
    pub content: MessageContent,
}

impl InboundMessage {
    /// Convenience constructor for a text message in a user channel.
    pub fn text(
        id: impl Into<String>,
        conversation_id: impl Into<String>,
        sender: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let sender = Sender::new(sender);
        Self {
            id: id.into(),
            conversation_id: conversation_id.into(),
            channel: Channel::user(sender.username.clone()),
            sender,
            content: MessageContent::Text { body: body.into() },
        }
    }

    /// Convenience constructor for a reaction to another message.
    pub fn reaction(
        id: impl Into<String>,
        conversation_id: impl Into<String>,
        sender: impl Into<String>,
        target: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let sender = Sender::new(sender);
        Self {
            id: id.into(),
            conversation_id: conversation_id.into(),
            channel: Channel::user(sender.username.clone()),
            sender,
            content: MessageContent::Reaction {
                body: body.into(),
                target: target.into(),
            },
        }
    }

    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content = content;
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// The message kind as the chat platform names it.
    pub fn kind_name(&self) -> &str {
        match &self.content {
            MessageContent::Text { .. } => "text",
            MessageContent::Edit { .. } => "edit",
            MessageContent::Reaction { .. } => "reaction",
            MessageContent::Other { type_name } => type_name,
        }
    }

    /// Body of a text message, `None` for every other kind.
    pub fn text_body(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text { body } => Some(body),
            _ => None,
        }
    }

    /// Body of a text or edit message.
    pub fn written_body(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text { body } | MessageContent::Edit { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn reaction_body(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Reaction { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Conversation membership role. Ordered `Reader < Writer < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Role {
    Reader,
    Writer,
    Admin,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Writer => "writer",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}' (expected owner, admin, writer or reader)")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "writer" => Ok(Role::Writer),
            "reader" => Ok(Role::Reader),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = RoleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("advertisement scope '{0}' requires a team name")]
    MissingTeam(&'static str),
    #[error("advertisement scope 'conv' requires a conversation id")]
    MissingConversation,
}

/// Where a command advertisement is shown. The target travels with the variant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AdScope {
    #[default]
    Public,
    /// Every conversation of the team.
    TeamConversations(String),
    /// Members of the team, wherever they talk to the bot.
    TeamMembers(String),
    /// A single conversation.
    Conversation(String),
}

impl AdScope {
    pub fn team_conversations(team: impl Into<String>) -> Result<Self, ScopeError> {
        let team = team.into();
        if team.trim().is_empty() {
            return Err(ScopeError::MissingTeam("teamconvs"));
        }
        Ok(AdScope::TeamConversations(team))
    }

    pub fn team_members(team: impl Into<String>) -> Result<Self, ScopeError> {
        let team = team.into();
        if team.trim().is_empty() {
            return Err(ScopeError::MissingTeam("teammembers"));
        }
        Ok(AdScope::TeamMembers(team))
    }

    pub fn conversation(conversation_id: impl Into<String>) -> Result<Self, ScopeError> {
        let conversation_id = conversation_id.into();
        if conversation_id.trim().is_empty() {
            return Err(ScopeError::MissingConversation);
        }
        Ok(AdScope::Conversation(conversation_id))
    }

    /// Builds a scope from its string form (`public`, `teamconvs`, `teammembers`, `conv`).
    /// Unknown or empty kinds fall back to `Public`.
    pub fn parse(kind: &str, target: &str) -> Result<Self, ScopeError> {
        match kind.trim().to_lowercase().as_str() {
            "teamconvs" => Self::team_conversations(target),
            "teammembers" => Self::team_members(target),
            "conv" => Self::conversation(target),
            _ => Ok(AdScope::Public),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        match self {
            AdScope::Public => ScopeKind::Public,
            AdScope::TeamConversations(_) => ScopeKind::TeamConversations,
            AdScope::TeamMembers(_) => ScopeKind::TeamMembers,
            AdScope::Conversation(_) => ScopeKind::Conversation,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            AdScope::Public => None,
            AdScope::TeamConversations(t) | AdScope::TeamMembers(t) | AdScope::Conversation(t) => {
                Some(t)
            }
        }
    }
}

/// Scope discriminant as published to the announcement service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    #[serde(rename = "public")]
    Public,
    #[serde(rename = "teamconvs")]
    TeamConversations,
    #[serde(rename = "teammembers")]
    TeamMembers,
    #[serde(rename = "conv")]
    Conversation,
}

/// Public-facing usage text for a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advertisement {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_description: Option<String>,
}

impl Advertisement {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            usage: None,
            extended_description: None,
        }
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn extended(mut self, text: impl Into<String>) -> Self {
        self.extended_description = Some(text.into());
        self
    }
}

/// One publish-plan entry: every advertisement sharing a scope and target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanGroup {
    #[serde(rename = "type")]
    pub kind: ScopeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub commands: Vec<Advertisement>,
}

/// Everything handed to the announcement service in a single call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AdvertisementPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub groups: Vec<PlanGroup>,
}

impl AdvertisementPlan {
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.commands.is_empty())
    }

    pub fn command_count(&self) -> usize {
        self.groups.iter().map(|g| g.commands.len()).sum()
    }
}
