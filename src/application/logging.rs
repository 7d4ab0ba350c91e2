//! # Conversation Log Mirror
//!
//! A `tracing` layer that copies every log line into a chat conversation, next to the
//! regular console/file output. Events are queued on a bounded channel and a
//! [`LogForwarder`] task sends them through the transport, so logging never waits on
//! the network. When the queue is full, new lines are dropped.

use chrono::Utc;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::domain::traits::MessagingTransport;

pub const LOG_QUEUE_CAPACITY: usize = 1024;

const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates a layer/forwarder pair for `conversation_id`.
pub fn mirror_to_conversation(
    conversation_id: impl Into<String>,
) -> (ConversationLogLayer, LogForwarder) {
    mirror_with_capacity(conversation_id, LOG_QUEUE_CAPACITY)
}

/// Same as [`mirror_to_conversation`] with at most `capacity` lines waiting.
pub fn mirror_with_capacity(
    conversation_id: impl Into<String>,
    capacity: usize,
) -> (ConversationLogLayer, LogForwarder) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        ConversationLogLayer { tx },
        LogForwarder {
            conversation_id: conversation_id.into(),
            rx,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        },
    )
}

pub struct ConversationLogLayer {
    tx: mpsc::Sender<String>,
}

impl<S> Layer<S> for ConversationLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Our own delivery failures would loop back into the conversation.
        if metadata.target().starts_with(module_path!()) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let timestamp = Utc::now().format("%d%b%Y %H:%M:%S").to_string().to_uppercase();
        let line = format!(
            "[{}][{}] {}: {}{}",
            timestamp,
            metadata.target(),
            metadata.level(),
            visitor.message,
            visitor.fields
        );
        // Full or closed queue: the line only reaches the other layers.
        let _ = self.tx.try_send(line);
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }
}

/// Drains queued log lines into the conversation.
pub struct LogForwarder {
    conversation_id: String,
    rx: mpsc::Receiver<String>,
    send_timeout: Duration,
}

impl LogForwarder {
    /// Upper bound for delivering a single line.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Runs until every [`ConversationLogLayer`] is dropped. Returns the number of lines
    /// delivered.
    pub async fn run(mut self, transport: Arc<dyn MessagingTransport>) -> usize {
        let mut delivered = 0;
        while let Some(line) = self.rx.recv().await {
            let send = transport.send(&self.conversation_id, &line);
            let sent = tokio::time::timeout(self.send_timeout, send).await;
            match sent {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => tracing::warn!(
                    "Unable to mirror log line to {}: {}",
                    self.conversation_id,
                    e
                ),
                Err(_) => tracing::warn!(
                    "Mirroring a log line to {} timed out after {:?}",
                    self.conversation_id,
                    self.send_timeout
                ),
            }
        }
        delivered
    }
}
