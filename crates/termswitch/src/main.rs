//! # termswitch
//!
//! Share one terminal between several interactive sessions.
//!
//! ## Overview
//!
//! Every session runs in its own PTY. Exactly one session is focused at a
//! time: it alone receives keystrokes and its output alone reaches the
//! screen. Tab moves focus to the next session.
//!
//! ## Architecture
//!
//! This is the top layer - the binary that ties together:
//! - termswitch-core: Core types and configuration
//! - termswitch-router: Focus-gated input and output routing
//! - termswitch-session: Multiplexer, hotkey and event loop
//! - termswitch-pty: PTY-backed session engines

use clap::Parser;
use termswitch::{terminal, Cli, RawModeGuard};
use termswitch_router::PhysicalOutput;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();
    let config = cli.resolve()?;

    // Initialize logging
    termswitch::logging::init(&config.logging)?;

    tracing::info!(
        "termswitch v{} starting with {} sessions",
        env!("CARGO_PKG_VERSION"),
        config.sessions.len()
    );

    let dimensions = terminal::dimensions_or(config.terminal.dimensions());
    let guard = RawModeGuard::enter_if_tty()?;

    let result = termswitch::run(
        &config,
        std::io::stdin(),
        PhysicalOutput::new(std::io::stdout()),
        dimensions,
    )
    .await;

    drop(guard);

    let mux = result.map_err(|e| {
        tracing::error!("termswitch failed: {:#}", e);
        e
    })?;
    drop(mux);

    tracing::info!("termswitch shutting down");

    Ok(())
}
