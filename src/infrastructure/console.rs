//! # Console Transport
//!
//! Stdin/stdout stand-in for a chat service. Each stdin line becomes a text message from
//! a fixed user in a fixed conversation; replies and reactions are written to stdout.
//! Advertisements are printed as JSON.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tokio_stream::wrappers::LinesStream;

use crate::domain::traits::{
    AnnouncementService, CollaboratorError, CollaboratorResult, MessagingTransport,
};
use crate::domain::types::{AdvertisementPlan, InboundMessage};

pub const CONSOLE_CONVERSATION: &str = "console";

/// Writes outbound messages to stdout.
#[derive(Clone, Default)]
pub struct ConsoleTransport {
    out: Arc<Mutex<()>>,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self::default()
    }

    async fn write_line(&self, line: String) -> CollaboratorResult<()> {
        let _guard = self.out.lock().await;
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(|e| CollaboratorError::Unavailable(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| CollaboratorError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl MessagingTransport for ConsoleTransport {
    async fn reply(
        &self,
        conversation_id: &str,
        message_id: Option<&str>,
        text: &str,
    ) -> CollaboratorResult<()> {
        let line = match message_id {
            Some(id) => format!("[{conversation_id}] (re {id}) {text}"),
            None => format!("[{conversation_id}] {text}"),
        };
        self.write_line(line).await
    }

    async fn react(
        &self,
        conversation_id: &str,
        message_id: &str,
        reaction: &str,
    ) -> CollaboratorResult<()> {
        self.write_line(format!("[{conversation_id}] {reaction} on {message_id}"))
            .await
    }
}

#[async_trait]
impl AnnouncementService for ConsoleTransport {
    async fn publish(&self, plan: &AdvertisementPlan) -> CollaboratorResult<()> {
        let json = serde_json::to_string_pretty(plan)
            .map_err(|e| CollaboratorError::Rejected(e.to_string()))?;
        self.write_line(format!("advertising commands:\n{json}")).await
    }

    async fn clear(&self) -> CollaboratorResult<()> {
        self.write_line("advertisements cleared".to_string()).await
    }
}

/// Turns lines into numbered text messages from `username`.
pub fn lines_to_messages<S>(lines: S, username: String) -> impl Stream<Item = InboundMessage>
where
    S: Stream<Item = String>,
{
    let mut next_id = 0u64;
    lines
        .filter(|line| futures::future::ready(!line.trim().is_empty()))
        .map(move |line| {
            next_id += 1;
            InboundMessage::text(
                next_id.to_string(),
                CONSOLE_CONVERSATION,
                username.clone(),
                line,
            )
        })
}

/// Inbound messages read from stdin until EOF.
pub fn stdin_messages(username: impl Into<String>) -> impl Stream<Item = InboundMessage> {
    let lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines()).filter_map(
        |line| async move {
            match line {
                Ok(line) => Some(line),
                Err(e) => {
                    tracing::warn!("Unable to read stdin: {}", e);
                    None
                }
            }
        },
    );
    lines_to_messages(lines, username.into())
}
