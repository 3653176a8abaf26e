//! Test doubles for exercising the multiplexer without real engines.
//!
//! [`RecordingEngine`] records everything routed to it. The engine itself is
//! moved into the multiplexer at registration, so tests keep an
//! [`EngineSpy`] to inspect what it saw and to write output on its behalf.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use termswitch_core::Dimensions;
use termswitch_router::InputSink;

use crate::engine::{SessionEngine, SessionIo};

#[derive(Debug, Default)]
struct EngineLog {
    chunks: Vec<Vec<u8>>,
    ended: bool,
    redraws: usize,
    resizes: Vec<Dimensions>,
    io: Option<SessionIo>,
}

/// Shared view of a [`RecordingEngine`].
#[derive(Debug, Clone, Default)]
pub struct EngineSpy {
    log: Arc<Mutex<EngineLog>>,
}

impl EngineSpy {
    /// Create a spy with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, EngineLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Chunks received, in arrival order.
    pub fn chunks(&self) -> Vec<Vec<u8>> {
        self.log().chunks.clone()
    }

    /// All received bytes concatenated, lossily decoded.
    pub fn received(&self) -> String {
        let bytes: Vec<u8> = self.log().chunks.concat();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Whether end-of-stream was delivered.
    pub fn ended(&self) -> bool {
        self.log().ended
    }

    /// Number of prompt redraw requests.
    pub fn redraws(&self) -> usize {
        self.log().redraws
    }

    /// Terminal sizes passed to the engine, in order.
    pub fn resizes(&self) -> Vec<Dimensions> {
        self.log().resizes.clone()
    }

    /// Write output as the engine would. No-op before registration.
    pub fn write_output(&self, data: &[u8]) -> std::io::Result<()> {
        let io = self.log().io.clone();
        match io {
            Some(mut io) => io.output.write_all(data),
            None => Ok(()),
        }
    }

    /// Ask for the physical input to pause. `None` before registration.
    pub fn pause(&self) -> Option<bool> {
        self.log().io.as_ref().map(|io| io.input.pause())
    }

    /// Ask for the physical input to resume. `None` before registration.
    pub fn resume(&self) -> Option<bool> {
        self.log().io.as_ref().map(|io| io.input.resume())
    }
}

/// Engine that records routed input and redraw requests.
#[derive(Debug)]
pub struct RecordingEngine {
    spy: EngineSpy,
}

impl RecordingEngine {
    /// Factory for [`crate::SessionMultiplexer::register`] reporting to `spy`.
    pub fn factory(spy: &EngineSpy) -> impl FnOnce(SessionIo) -> anyhow::Result<Self> {
        let spy = spy.clone();
        move |io| {
            spy.log().io = Some(io);
            Ok(Self { spy })
        }
    }
}

impl InputSink for RecordingEngine {
    fn on_data(&mut self, chunk: &[u8]) {
        self.spy.log().chunks.push(chunk.to_vec());
    }

    fn on_end(&mut self) {
        self.spy.log().ended = true;
    }
}

impl SessionEngine for RecordingEngine {
    fn redraw_prompt(&mut self) {
        self.spy.log().redraws += 1;
    }

    fn resize(&mut self, dimensions: Dimensions) {
        self.spy.log().resizes.push(dimensions);
    }
}
