//! Contract between the multiplexer and the interactive engines it hosts.

use termswitch_core::{Dimensions, SessionId};
use termswitch_router::{InputHandle, InputSink, OutputHandle};

/// An interactive session hosted by the multiplexer.
///
/// Input arrives through the [`InputSink`] callbacks, and only while the
/// session is focused. Output goes through the [`OutputHandle`] the engine
/// was built with.
pub trait SessionEngine: InputSink + Send {
    /// The session just gained focus; re-render the prompt even though no
    /// new input has arrived.
    fn redraw_prompt(&mut self);

    /// The physical terminal changed size. Every session is told, focused
    /// or not.
    fn resize(&mut self, _dimensions: Dimensions) {}
}

/// I/O handed to an engine factory at registration.
///
/// The handles belong to the session's own router pair. Engines keep them for
/// their whole lifetime; there is no later rewiring.
#[derive(Debug, Clone)]
pub struct SessionIo {
    /// Identifier the session will be registered under
    pub id: SessionId,
    /// Name the session is registered under
    pub name: String,
    /// Flow control over the physical input, gated by focus
    pub input: InputHandle,
    /// Writer to the physical output, gated by focus
    pub output: OutputHandle,
}
