use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use manbo_voice::bot::{ChatEvent, Dispatcher, Reply};
use manbo_voice::config::ManboConfig;
use manbo_voice::ratelimit::RateLimiter;
use manbo_voice::voice::{HttpSpeechBackend, VoiceService};

/// Answer `/曼波` commands read as JSON lines on stdin with replies on stdout.
#[derive(Debug, Parser)]
#[command(name = "manbo", version, about)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    info!("Starting Manbo voice plugin");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = ManboConfig::load(args.config.as_deref())?;
    info!(
        command = %config.plugin.command,
        rate_limit = config.plugin.rate_limit,
        "Configuration loaded"
    );

    let limiter = Arc::new(RateLimiter::new());
    let backend = Arc::new(HttpSpeechBackend::new(&config.api)?);
    info!(api = %backend.url(), "Speech backend ready");
    let voice = Arc::new(VoiceService::new(limiter, backend, config.plugin));
    let dispatcher = Arc::new(Dispatcher::new(voice));
    info!("Voice service initialized");

    let (tx, rx) = mpsc::channel::<Reply>(64);
    let writer = tokio::spawn(write_replies(rx));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                let Some(event) = parse_event(&line) else {
                    continue;
                };

                let dispatcher = dispatcher.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Some(reply) = dispatcher.handle(&event).await {
                        if tx.send(reply).await.is_err() {
                            warn!("Reply writer closed, dropping reply");
                        }
                    }
                });
            }
        }
    }

    // In-flight handlers hold their own senders; the writer drains them.
    drop(tx);
    writer.await??;

    info!("Manbo voice plugin stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn parse_event(line: &str) -> Option<ChatEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, "Skipping malformed event");
            None
        }
    }
}

async fn write_replies(mut rx: mpsc::Receiver<Reply>) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(reply) = rx.recv().await {
        let mut line = match serde_json::to_vec(&reply) {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "Failed to encode reply");
                continue;
            }
        };
        line.push(b'\n');
        stdout.write_all(&line).await?;
        stdout.flush().await?;
    }
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
