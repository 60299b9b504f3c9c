//! Chatter - chat announcements out loud
//!
//! Command-line front-end over the announcement core. Each subcommand maps
//! to one operation a chat router would invoke.

use anyhow::{Context, Result};
use chatter::config::Config;
use chatter::core::{SpeechOutcome, SpeechTask};
use chatter::AppContext;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Speak raw text and wait until it is finished
    Say {
        text: String,
        /// Language tag or alias
        #[arg(short, long, default_value = "en-US")]
        lang: String,
    },
    /// Announce a chat message
    Announce {
        #[arg(short, long)]
        author: String,
        /// Force a language (tag or alias) instead of the author's preference
        #[arg(short, long)]
        lang: Option<String>,
        content: String,
    },
    /// Set a user's announcement language
    SetLang { user: String, lang: String },
    /// Record a request in the queue
    Enqueue { user: String, item: String },
    /// List queued requests
    Queue,
    /// Announce `author: message` lines read from stdin
    Listen,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // stdout carries command replies; logs go to stderr.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🔊 Chatter v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;
    let ctx = AppContext::open(config).await.context("starting up")?;

    let result = run(&ctx, args.command).await;
    // Stores are released on every exit path, including a failed command.
    if let Err(e) = ctx.shutdown() {
        error!("❌ Shutdown: {}", e);
    }
    result
}

async fn run(ctx: &AppContext, command: Cmd) -> Result<()> {
    match command {
        Cmd::Say { text, lang } => {
            let lang = ctx.phrasebook().resolve(&lang).to_string();
            ctx.dispatcher().speak_now(&text, &lang).await?;
        }
        Cmd::Announce {
            author,
            lang,
            content,
        } => {
            let task = ctx.announce(&author, &content, lang.as_deref()).await?;
            match task.outcome().await {
                SpeechOutcome::Completed { .. } => {}
                other => warn!("⚠️ Announcement ended as {:?}", other),
            }
        }
        Cmd::SetLang { user, lang } => {
            let reply = ctx.set_language(&user, &lang)?;
            println!("{}", reply);
        }
        Cmd::Enqueue { user, item } => {
            ctx.enqueue_request(&item, &user)?;
            println!("{}, your request has been recorded.", user);
        }
        Cmd::Queue => {
            for (i, item) in ctx.list_requests().iter().enumerate() {
                println!("{}. {}", i + 1, item);
            }
        }
        Cmd::Listen => listen(ctx).await?,
    }
    Ok(())
}

async fn listen(ctx: &AppContext) -> Result<()> {
    info!("✅ Listening for `author: message` lines on stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Vec<SpeechTask> = Vec::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some((author, message)) = line.split_once(':') else {
                    if !line.trim().is_empty() {
                        warn!("⚠️ Ignoring line without author: {}", line);
                    }
                    continue;
                };
                // Failures are logged by the dispatcher.
                if let Ok(task) = ctx.announce(author.trim(), message.trim(), None).await {
                    in_flight.retain(|t| !t.is_finished());
                    in_flight.push(task);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("🛑 Interrupted, dropping {} announcements", in_flight.len());
                return Ok(());
            }
        }
    }

    // Each supervisor is bounded by the poll policy.
    let pending = in_flight.len();
    let drain = async {
        for task in in_flight {
            match task.outcome().await {
                SpeechOutcome::Completed { .. } => {}
                other => warn!("⚠️ Announcement ended as {:?}", other),
            }
        }
    };
    if pending > 0 {
        info!("⏳ Waiting for {} announcements to finish", pending);
    }
    tokio::select! {
        _ = drain => {}
        _ = tokio::signal::ctrl_c() => info!("🛑 Interrupted while finishing announcements"),
    }
    Ok(())
}
