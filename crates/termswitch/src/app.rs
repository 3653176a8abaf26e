//! Wiring of the physical terminal, the sessions and the event loop.

use std::io::Read;

use anyhow::Context;
use tracing::info;

use termswitch_core::{Dimensions, MuxConfig};
use termswitch_pty::{PtyEngine, PtySpec};
use termswitch_router::{PhysicalInput, PhysicalOutput};
use termswitch_session::{EventLoop, EventSender, SessionMultiplexer};

use crate::input::{spawn_reader, StdinControl};

/// Build a multiplexer over `output`, wrap it in an event loop and start
/// every configured session.
///
/// The first session gets focus. Sessions report their exit through the
/// returned loop. Fails on the first session that cannot be started.
pub fn build_event_loop(
    config: &MuxConfig,
    input: PhysicalInput,
    output: PhysicalOutput,
    dimensions: Dimensions,
) -> anyhow::Result<(EventLoop, EventSender)> {
    let mux = SessionMultiplexer::with_settings(input, output, config.multiplexer.clone());
    let (mut event_loop, events) = EventLoop::new(mux);

    for session in &config.sessions {
        let spec = PtySpec::from_settings(session, dimensions);
        event_loop
            .multiplexer_mut()
            .register(session.name.clone(), PtyEngine::factory(spec, events.clone()))
            .with_context(|| format!("failed to start session '{}'", session.name))?;
    }

    Ok((event_loop, events))
}

/// Run the sessions against `source` and `output` until `source` ends or
/// every session has exited.
///
/// The reader thread over `source` is detached; it stops at its next read
/// once the loop is gone.
pub async fn run<R>(
    config: &MuxConfig,
    source: R,
    output: PhysicalOutput,
    dimensions: Dimensions,
) -> anyhow::Result<SessionMultiplexer>
where
    R: Read + Send + 'static,
{
    let (control, paused) = StdinControl::new();
    let (event_loop, events) =
        build_event_loop(config, PhysicalInput::new(control), output, dimensions)?;
    info!(
        "Starting {} sessions at {}x{}",
        event_loop.multiplexer().len(),
        dimensions.rows,
        dimensions.cols
    );

    #[cfg(unix)]
    let resizes = crate::terminal::watch_resize(events.clone(), dimensions)?;
    spawn_reader(source, events, paused).context("failed to start input reader")?;

    let mux = event_loop.run().await;
    #[cfg(unix)]
    resizes.abort();

    info!(
        "Shutting down {} sessions ({} still running)",
        mux.len(),
        mux.live_count()
    );
    Ok(mux)
}
