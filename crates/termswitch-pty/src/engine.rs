//! Session engine backed by a child process on a PTY.

use std::io::{Read, Write};
use std::thread;

use anyhow::Context;
use tracing::{debug, info, warn};

use termswitch_core::{Dimensions, SessionId, SessionSettings};
use termswitch_router::{InputSink, OutputHandle};
use termswitch_session::{EventSender, SessionEngine, SessionIo};

/// Ctrl+L: most shells and REPLs repaint the screen and prompt on it.
pub const REDRAW_BYTE: u8 = 0x0C;

/// Ctrl+D: end of input for a line-disciplined child.
pub const EOF_BYTE: u8 = 0x04;

const READ_BUFFER_SIZE: usize = 4096;

/// What to run in a PTY session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtySpec {
    /// Program to execute
    pub command: String,
    /// Program arguments
    pub args: Vec<String>,
    /// PTY size
    pub dimensions: Dimensions,
    /// Working directory
    pub cwd: Option<String>,
}

impl PtySpec {
    /// Run `command` with no arguments at the default size.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            dimensions: Dimensions::default(),
            cwd: None,
        }
    }

    /// Add arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Build from a configured session entry.
    pub fn from_settings(settings: &SessionSettings, dimensions: Dimensions) -> Self {
        Self {
            command: settings.command.clone(),
            args: settings.args.clone(),
            dimensions,
            cwd: settings.cwd.clone(),
        }
    }
}

/// A child process on its own PTY, hosted as a multiplexer session.
///
/// A reader thread copies everything the child prints into the session's
/// [`OutputHandle`]; the output router decides whether it reaches the screen.
/// When the PTY closes the thread reports
/// [`TerminalEvent::SessionExited`](termswitch_session::TerminalEvent::SessionExited).
pub struct PtyEngine {
    name: String,
    pty: crate::PtyHandle,
}

impl std::fmt::Debug for PtyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyEngine")
            .field("name", &self.name)
            .field("pty", &self.pty)
            .finish_non_exhaustive()
    }
}

impl PtyEngine {
    /// Spawn the child and start pumping its output.
    pub fn spawn(io: SessionIo, spec: PtySpec, events: EventSender) -> anyhow::Result<Self> {
        let pty = crate::PtyHandle::spawn(
            &spec.command,
            &spec.args,
            spec.dimensions,
            spec.cwd.as_deref(),
        )
        .with_context(|| format!("failed to start '{}' for session '{}'", spec.command, io.name))?;

        let reader = pty
            .take_reader()
            .with_context(|| format!("failed to read PTY of session '{}'", io.name))?;

        // Detached: the thread exits once the PTY closes.
        thread::Builder::new()
            .name(format!("pty-{}", io.name))
            .spawn({
                let id = io.id;
                let name = io.name.clone();
                let output = io.output.clone();
                move || {
                    pump_output(&name, reader, output);
                    report_exit(&name, id, &events);
                }
            })
            .context("failed to start PTY reader thread")?;

        info!(
            "PTY session started: name='{}', command='{}'",
            io.name, spec.command
        );

        Ok(Self {
            name: io.name,
            pty,
        })
    }

    /// Factory for [`SessionMultiplexer::register`](termswitch_session::SessionMultiplexer::register).
    ///
    /// `events` receives the session's exit.
    pub fn factory(
        spec: PtySpec,
        events: EventSender,
    ) -> impl FnOnce(SessionIo) -> anyhow::Result<Self> {
        move |io| Self::spawn(io, spec, events)
    }

    fn send(&self, data: &[u8]) {
        if let Err(e) = self.pty.write(data) {
            warn!("Write to session '{}' failed: {}", self.name, e);
        }
    }
}

impl InputSink for PtyEngine {
    fn on_data(&mut self, chunk: &[u8]) {
        self.send(chunk);
    }

    fn on_end(&mut self) {
        debug!("Forwarding end of input to session '{}'", self.name);
        self.send(&[EOF_BYTE]);
    }
}

impl SessionEngine for PtyEngine {
    fn redraw_prompt(&mut self) {
        self.send(&[REDRAW_BYTE]);
    }

    fn resize(&mut self, dimensions: Dimensions) {
        if let Err(e) = self.pty.resize(dimensions) {
            warn!("Resize of session '{}' failed: {}", self.name, e);
        }
    }
}

impl Drop for PtyEngine {
    fn drop(&mut self) {
        if self.pty.is_alive() {
            if let Err(e) = self.pty.kill() {
                warn!("Failed to stop session '{}': {}", self.name, e);
            }
        }
    }
}

fn pump_output(name: &str, mut reader: Box<dyn Read + Send>, mut output: OutputHandle) {
    let mut buf = [0u8; READ_BUFFER_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if let Err(e) = output.write_all(&buf[..n]) {
                    warn!("Output of session '{}' failed: {}", name, e);
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("PTY of session '{}' closed: {}", name, e);
                break;
            }
        }
    }
    debug!("PTY reader for session '{}' finished", name);
}

fn report_exit(name: &str, id: SessionId, events: &EventSender) {
    info!("Session '{}' closed its PTY", name);
    if events.exited(id).is_err() {
        debug!("Event loop gone before exit of session '{}'", name);
    }
}
