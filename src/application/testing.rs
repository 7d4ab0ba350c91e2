//! Recording fakes for the collaborator traits, shared by the unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::application::action::{Action, Outcome};
use crate::application::context::BotContext;
use crate::domain::traits::{
    AnnouncementService, CollaboratorError, CollaboratorResult, MessagingTransport, RoleLookup,
};
use crate::domain::types::{AdvertisementPlan, InboundMessage, Role};

pub const BOT_USERNAME: &str = "testbot";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReply {
    pub conversation_id: String,
    pub message_id: Option<String>,
    pub text: String,
}

#[derive(Default)]
pub struct RecordingTransport {
    pub replies: Mutex<Vec<SentReply>>,
    pub reactions: Mutex<Vec<(String, String, String)>>,
}

impl RecordingTransport {
    pub fn replies(&self) -> Vec<SentReply> {
        self.replies.lock().unwrap().clone()
    }

    pub fn reactions(&self) -> Vec<(String, String, String)> {
        self.reactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingTransport for RecordingTransport {
    async fn reply(
        &self,
        conversation_id: &str,
        message_id: Option<&str>,
        text: &str,
    ) -> CollaboratorResult<()> {
        self.replies.lock().unwrap().push(SentReply {
            conversation_id: conversation_id.to_string(),
            message_id: message_id.map(str::to_string),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn react(
        &self,
        conversation_id: &str,
        message_id: &str,
        reaction: &str,
    ) -> CollaboratorResult<()> {
        self.reactions.lock().unwrap().push((
            conversation_id.to_string(),
            message_id.to_string(),
            reaction.to_string(),
        ));
        Ok(())
    }
}

/// Role table with switchable failure modes.
#[derive(Default)]
pub struct FakeRoles {
    pub roles: HashMap<String, Role>,
    pub unreachable: AtomicBool,
    pub delay: Option<Duration>,
    pub lookups: AtomicUsize,
}

impl FakeRoles {
    pub fn with(entries: &[(&str, Role)]) -> Self {
        Self {
            roles: entries
                .iter()
                .map(|(user, role)| (user.to_string(), *role))
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl RoleLookup for FakeRoles {
    async fn role_of(&self, _conversation_id: &str, username: &str) -> CollaboratorResult<Role> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Unavailable("role service down".into()));
        }
        self.roles
            .get(username)
            .copied()
            .ok_or_else(|| CollaboratorError::NotFound(username.to_string()))
    }
}

#[derive(Default)]
pub struct RecordingAnnouncer {
    pub published: Mutex<Vec<AdvertisementPlan>>,
    pub clears: AtomicUsize,
    pub failing: AtomicBool,
}

impl RecordingAnnouncer {
    pub fn published(&self) -> Vec<AdvertisementPlan> {
        self.published.lock().unwrap().clone()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnnouncementService for RecordingAnnouncer {
    async fn publish(&self, plan: &AdvertisementPlan) -> CollaboratorResult<()> {
        self.published.lock().unwrap().push(plan.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Rejected("advertisements refused".into()));
        }
        Ok(())
    }

    async fn clear(&self) -> CollaboratorResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Unavailable("announcer down".into()));
        }
        Ok(())
    }
}

/// A context wired to fresh fakes, with handles to inspect them.
pub struct Harness {
    pub ctx: Arc<BotContext>,
    pub transport: Arc<RecordingTransport>,
    pub roles: Arc<FakeRoles>,
    pub announcer: Arc<RecordingAnnouncer>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_roles(FakeRoles::default())
    }

    pub fn with_roles(roles: FakeRoles) -> Self {
        Self::build(roles, Duration::from_secs(5))
    }

    pub fn build(roles: FakeRoles, timeout: Duration) -> Self {
        let transport = Arc::new(RecordingTransport::default());
        let roles = Arc::new(roles);
        let announcer = Arc::new(RecordingAnnouncer::default());
        let ctx = BotContext::new(
            BOT_USERNAME,
            transport.clone(),
            roles.clone(),
            announcer.clone(),
        )
        .with_timeout(timeout);
        Self {
            ctx: Arc::new(ctx),
            transport,
            roles,
            announcer,
        }
    }
}

/// Shared log of which actions and guards ran, in order.
pub type Trail = Arc<Mutex<Vec<String>>>;

pub fn trail() -> Trail {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(trail: &Trail) -> Vec<String> {
    trail.lock().unwrap().clone()
}

/// Action that records its invocation and returns a preset outcome.
pub struct Scripted {
    pub label: &'static str,
    pub trail: Trail,
    pub outcome: fn() -> Outcome,
}

impl Scripted {
    pub fn new(label: &'static str, trail: &Trail, outcome: fn() -> Outcome) -> Self {
        Self {
            label,
            trail: trail.clone(),
            outcome,
        }
    }
}

#[async_trait]
impl Action for Scripted {
    async fn run(&self, _message: &InboundMessage, _ctx: &BotContext) -> Outcome {
        self.trail.lock().unwrap().push(self.label.to_string());
        (self.outcome)()
    }
}

/// Action that must never be reached.
pub struct Unreachable;

#[async_trait]
impl Action for Unreachable {
    async fn run(&self, message: &InboundMessage, _ctx: &BotContext) -> Outcome {
        panic!("action reached for message {}", message.id);
    }
}
