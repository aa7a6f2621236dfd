//! Headless game runner (default binary).
//!
//! Runs one game and bridges it to stdio:
//! - every event on the game's topic is written to stdout as one JSON line
//! - stdin is read line by line, each non-blank line is a command token
//!
//! The process exits on end of input, Ctrl-C, or game over. Configuration comes
//! from `BLOCCS_*` environment variables, logging is controlled by `RUST_LOG`
//! and goes to stderr.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bloccs::core::GameEvent;
use bloccs::event::{Bus, Envelope};
use bloccs::game::{Game, GameConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = GameConfig::from_env();
    config.validate().context("invalid BLOCCS_* configuration")?;
    info!(?config, "configuration loaded");

    let bus = Arc::new(Bus::new(config.bus_capacity));
    let game_id = format!("local-{}", config.seed);
    let game = Game::new(Arc::clone(&bus), game_id, &config);
    let events = game
        .subscribe()
        .context("game topic missing right after creation")?;

    let printer = tokio::spawn(print_events(events));

    game.start();
    let result = run(&game).await;
    game.stop().await;

    // The topic is gone now, so the printer drains what is left and exits.
    printer.await.context("event printer panicked")??;
    result
}

/// Read stdin on a plain thread so a pending read never holds up shutdown
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(64);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn run(game: &Game) -> Result<()> {
    let mut lines = spawn_stdin_reader();
    let mut over_check = tokio::time::interval(std::time::Duration::from_millis(100));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    info!("end of input");
                    return Ok(());
                };
                let line = line.context("failed to read stdin")?;
                let token = line.trim();
                if token.is_empty() {
                    continue;
                }
                if !game.command(token) {
                    warn!(token, "command not understood");
                }
            }
            _ = &mut ctrl_c => {
                info!("interrupted");
                return Ok(());
            }
            _ = over_check.tick() => {
                if game.is_over() {
                    let snapshot = game.snapshot();
                    info!(
                        lines = snapshot.lines_cleared,
                        pieces = snapshot.pieces_locked,
                        "game finished"
                    );
                    return Ok(());
                }
            }
        }
    }
}

async fn print_events(
    mut events: tokio::sync::broadcast::Receiver<Envelope<GameEvent>>,
) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    loop {
        match events.recv().await {
            Ok(envelope) => {
                let mut line =
                    serde_json::to_string(&envelope).context("failed to encode event")?;
                line.push('\n');
                stdout.write_all(line.as_bytes()).await?;
                stdout.flush().await?;
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "output fell behind, events dropped"),
            Err(RecvError::Closed) => return Ok(()),
        }
    }
}
