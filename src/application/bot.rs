//! # Bot Runner
//!
//! Owns the bot lifecycle: advertise commands, feed every inbound message through the
//! dispatcher, and clear the advertisements again on the way out. Each dispatch runs in
//! its own task so a panicking command only loses its own message. On shutdown no new
//! messages are taken, and the ones already running get a grace period to finish.

use futures::{Stream, StreamExt};
use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};

use crate::application::advertise;
use crate::application::context::BotContext;
use crate::application::dispatcher::{Dispatch, DispatchSettings, Dispatcher};
use crate::application::registry::Registry;
use crate::domain::config::AppConfig;
use crate::domain::types::InboundMessage;

const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Message counts for one run. Every received message ends up in exactly one of the
/// other counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub received: usize,
    pub handled: usize,
    pub unmatched: usize,
    pub ignored: usize,
    pub crashed: usize,
    /// Still running when the shutdown grace period ran out.
    pub abandoned: usize,
}

impl RunSummary {
    fn record(&mut self, joined: Result<Dispatch, JoinError>) {
        match joined {
            Ok(Dispatch::Handled { .. }) => self.handled += 1,
            Ok(Dispatch::Unmatched) => self.unmatched += 1,
            Ok(Dispatch::Ignored(_)) => self.ignored += 1,
            Err(e) if e.is_cancelled() => self.abandoned += 1,
            Err(e) => {
                tracing::error!("Dispatch task aborted: {}", e);
                self.crashed += 1;
            }
        }
    }
}

pub struct Bot {
    dispatcher: Dispatcher,
    concurrency: usize,
    grace: Duration,
    running: Arc<AtomicBool>,
}

impl Bot {
    pub fn new(ctx: Arc<BotContext>, registry: Registry, settings: DispatchSettings) -> Self {
        Self {
            dispatcher: Dispatcher::new(Arc::new(registry), ctx, settings),
            concurrency: 1,
            grace: DEFAULT_SHUTDOWN_GRACE,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn from_config(config: &AppConfig, ctx: Arc<BotContext>, registry: Registry) -> Self {
        Self::new(ctx, registry, DispatchSettings::from_config(config))
            .with_concurrency(config.dispatch.concurrency)
            .with_grace(Duration::from_secs(config.dispatch.shutdown_grace))
    }

    /// Number of messages dispatched at the same time. `1` keeps strict arrival order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// How long in-flight messages may keep running after shutdown is requested.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Shared flag for callers that need to observe the bot from another task.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Runs until the message stream ends.
    pub async fn run<S>(&self, messages: S) -> RunSummary
    where
        S: Stream<Item = InboundMessage>,
    {
        self.run_until(messages, futures::future::pending::<()>())
            .await
    }

    /// Runs until the message stream ends or `shutdown` resolves, whichever is first.
    /// Messages already being dispatched are waited for before advertisements are cleared.
    pub async fn run_until<S, F>(&self, messages: S, shutdown: F) -> RunSummary
    where
        S: Stream<Item = InboundMessage>,
        F: Future<Output = ()>,
    {
        let ctx = self.dispatcher.context();
        advertise::publish(ctx, self.dispatcher.registry()).await;

        tracing::info!("Running as user {}", ctx.username());
        self.running.store(true, Ordering::SeqCst);

        let mut summary = RunSummary::default();
        let mut in_flight: JoinSet<Dispatch> = JoinSet::new();
        let mut messages = pin!(messages);
        let mut shutdown = pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    summary.record(joined);
                }
                next = messages.next(), if in_flight.len() < self.concurrency => match next {
                    Some(message) => {
                        summary.received += 1;
                        self.spawn(&mut in_flight, message);
                    }
                    None => {
                        tracing::info!("Message stream closed");
                        break;
                    }
                },
            }
        }

        self.drain(&mut in_flight, &mut summary).await;

        self.running.store(false, Ordering::SeqCst);
        advertise::clear(ctx).await;

        tracing::info!(
            "Stopped after {} messages ({} handled, {} unmatched, {} ignored, {} crashed, {} abandoned)",
            summary.received,
            summary.handled,
            summary.unmatched,
            summary.ignored,
            summary.crashed,
            summary.abandoned
        );
        summary
    }

    fn spawn(&self, in_flight: &mut JoinSet<Dispatch>, message: InboundMessage) {
        let dispatcher = self.dispatcher.clone();
        in_flight.spawn(async move {
            let dispatch = dispatcher.dispatch(&message).await;
            tracing::debug!("Message {} dispatched: {:?}", message.id, dispatch);
            dispatch
        });
    }

    /// Waits for in-flight dispatches, aborting whatever is left once the grace period ends.
    async fn drain(&self, in_flight: &mut JoinSet<Dispatch>, summary: &mut RunSummary) {
        if in_flight.is_empty() {
            return;
        }
        tracing::info!(
            "Waiting up to {:?} for {} in-flight messages",
            self.grace,
            in_flight.len()
        );

        let drained = tokio::time::timeout(self.grace, async {
            while let Some(joined) = in_flight.join_next().await {
                summary.record(joined);
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!("Abandoning {} messages still in flight", in_flight.len());
            in_flight.abort_all();
            while let Some(joined) = in_flight.join_next().await {
                summary.record(joined);
            }
        }
    }
}
