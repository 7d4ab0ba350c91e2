//! # Main Entry Point
//!
//! Runs the built-in commands against the console transport:
//! - Config: `data/config.yaml` plus command-line overrides
//! - Logging: console, optional file, optional mirror into a conversation
//! - Bot: stdin lines in, replies out, until EOF or Ctrl-C

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use switchboard::application::bot::Bot;
use switchboard::application::context::BotContext;
use switchboard::application::logging;
use switchboard::domain::config::{AppConfig, DEFAULT_CONFIG_PATH};
use switchboard::infrastructure::console::{self, ConsoleTransport};
use switchboard::infrastructure::roles::StaticRoles;
use switchboard::interface::commands;

#[derive(Debug, Parser)]
#[command(name = "switchboard", about = "Chat command dispatcher (console mode)")]
struct Args {
    /// Path to the configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    /// Conversation to mirror log lines into
    #[arg(long)]
    log_conv: Option<String>,

    /// Global command prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Username console messages are sent as
    #[arg(long, default_value = "console-user")]
    user: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Configuration
    let mut config = AppConfig::load(&args.config)?;
    config.logging.debug |= args.debug;
    config.logging.json |= args.json;
    if args.log_conv.is_some() {
        config.logging.conversation = args.log_conv.clone();
    }
    if args.prefix.is_some() {
        config.bot.command_prefix = args.prefix.clone();
    }

    // 2. Logging
    let transport = Arc::new(ConsoleTransport::new());

    let default_level = if config.logging.debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Stdout carries the conversation, so logs go to stderr.
    let console_layer = if config.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    let mut _file_guard = None;
    let file_layer = config.logging.file.as_deref().map(|path| {
        let path = std::path::Path::new(path);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let name = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("session.log"));
        let file_appender = tracing_appender::rolling::never(dir, name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        _file_guard = Some(guard);
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
    });

    let (mirror_layer, forwarder) = match config.logging.conversation.as_deref() {
        Some(conversation) => {
            let (layer, forwarder) = logging::mirror_to_conversation(conversation);
            let forwarder =
                forwarder.with_timeout(Duration::from_secs(config.timeouts.collaborator));
            (Some(layer), Some(forwarder))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .with(mirror_layer)
        .init();

    if let Some(forwarder) = forwarder {
        tokio::spawn(forwarder.run(transport.clone()));
    }

    tracing::info!("Starting switchboard...");

    // 3. Context and commands
    let ctx = BotContext::new(
        config.bot.username.clone(),
        transport.clone(),
        Arc::new(StaticRoles::new(&config.roles)),
        transport.clone(),
    )
    .with_name(config.bot.name.clone())
    .with_timeout(Duration::from_secs(config.timeouts.collaborator));

    let prefix = config
        .command_prefix()
        .unwrap_or(commands::DEFAULT_PREFIX)
        .to_string();
    let bot = Bot::from_config(&config, Arc::new(ctx), commands::registry(&prefix));

    // 4. Run until EOF or Ctrl-C
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Unable to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };
    bot.run_until(console::stdin_messages(args.user), shutdown)
        .await;

    tracing::info!("Shutting down...");
    Ok(())
}
