//! Single-threaded event dispatch.
//!
//! All physical input reaches the multiplexer through one queue and one
//! consumer. Each event, including any rotation it triggers, is handled to
//! completion before the next one is taken, so no input is ever routed while
//! focus is half-switched.

use tokio::sync::mpsc;
use tracing::{debug, info};

use termswitch_core::{Dimensions, Error, Key, Result, SessionId};

use crate::hotkey::{HotkeyListener, Segment};
use crate::multiplexer::{Rotation, SessionMultiplexer};

/// Event produced by the physical terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// Raw bytes read from the terminal
    Input(Vec<u8>),
    /// The terminal input ended
    InputEnd,
    /// A decoded key press, for sources that report keys rather than bytes
    Key(Key),
    /// The physical terminal changed size
    Resize(Dimensions),
    /// A session's engine has stopped, e.g. its child process exited
    SessionExited(SessionId),
}

/// Producer side of the event queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<TerminalEvent>,
}

impl EventSender {
    /// Queue an event.
    pub fn send(&self, event: TerminalEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| Error::Other("event loop has stopped".to_string()))
    }

    /// Queue raw input bytes.
    pub fn input(&self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.send(TerminalEvent::Input(bytes.into()))
    }

    /// Queue end of input.
    pub fn end(&self) -> Result<()> {
        self.send(TerminalEvent::InputEnd)
    }

    /// Queue a terminal size change.
    pub fn resize(&self, dimensions: Dimensions) -> Result<()> {
        self.send(TerminalEvent::Resize(dimensions))
    }

    /// Report that a session has exited.
    pub fn exited(&self, id: SessionId) -> Result<()> {
        self.send(TerminalEvent::SessionExited(id))
    }
}

/// Owns the multiplexer and its hotkey listener and feeds them events.
#[derive(Debug)]
pub struct EventLoop {
    mux: SessionMultiplexer,
    hotkey: HotkeyListener,
    events: mpsc::UnboundedReceiver<TerminalEvent>,
}

impl EventLoop {
    /// Wrap a multiplexer. The listener is installed here, once.
    ///
    /// Engines that report their own exit need a sender at construction, so
    /// sessions may also be registered afterwards through
    /// [`EventLoop::multiplexer_mut`].
    pub fn new(mux: SessionMultiplexer) -> (Self, EventSender) {
        let (tx, events) = mpsc::unbounded_channel();
        let event_loop = Self {
            mux,
            hotkey: HotkeyListener::new(),
            events,
        };
        (event_loop, EventSender { tx })
    }

    /// The multiplexer being driven.
    pub fn multiplexer(&self) -> &SessionMultiplexer {
        &self.mux
    }

    /// Mutable access, e.g. to register sessions before running.
    pub fn multiplexer_mut(&mut self) -> &mut SessionMultiplexer {
        &mut self.mux
    }

    /// Handle one event to completion. Returns the rotations it caused.
    pub fn dispatch(&mut self, event: TerminalEvent) -> Vec<Rotation> {
        let mut rotations = Vec::new();

        match event {
            TerminalEvent::Input(bytes) => {
                for segment in self.hotkey.split(&bytes) {
                    match segment {
                        Segment::Data(data) => {
                            self.mux.handle_data(data);
                        }
                        Segment::Hotkey => rotations.push(self.mux.rotate_focus()),
                    }
                }
            }
            TerminalEvent::InputEnd => {
                self.mux.handle_end();
            }
            TerminalEvent::Key(key) if self.hotkey.is_hotkey(key) => {
                rotations.push(self.mux.rotate_focus());
            }
            TerminalEvent::Key(key) => {
                debug!(%key, "key event forwarded");
                self.mux.handle_data(&key.to_escape_sequence());
            }
            TerminalEvent::Resize(dimensions) => {
                self.mux.resize(dimensions);
            }
            TerminalEvent::SessionExited(id) => {
                self.mux.mark_exited(&id);
            }
        }

        rotations
    }

    /// Handle every queued event without waiting. Returns how many ran.
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.dispatch(event);
            handled += 1;
        }
        handled
    }

    /// Dispatch events until the input ends, every session has exited or
    /// every [`EventSender`] is dropped, then hand the multiplexer back.
    ///
    /// Events still queued when the loop stops are not dispatched.
    pub async fn run(mut self) -> SessionMultiplexer {
        info!("Event loop started with {} sessions", self.mux.len());
        loop {
            let Some(event) = self.events.recv().await else {
                info!("Event loop finished: all event senders dropped");
                break;
            };
            let input_ended = event == TerminalEvent::InputEnd;
            self.dispatch(event);

            if input_ended {
                info!("Event loop finished: input ended");
                break;
            }
            if self.mux.all_exited() {
                info!("Event loop finished: all {} sessions exited", self.mux.len());
                break;
            }
        }
        self.mux
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EngineSpy, RecordingEngine};
    use termswitch_core::FocusState;
    use termswitch_router::{MemorySink, PhysicalInput, PhysicalOutput};

    fn event_loop(names: &[&str]) -> (EventLoop, EventSender, Vec<EngineSpy>) {
        let mut mux = SessionMultiplexer::new(
            PhysicalInput::detached(),
            PhysicalOutput::new(MemorySink::new()),
        );
        let spies: Vec<EngineSpy> = names
            .iter()
            .map(|name| {
                let spy = EngineSpy::new();
                mux.register(*name, RecordingEngine::factory(&spy)).unwrap();
                spy
            })
            .collect();
        let (event_loop, sender) = EventLoop::new(mux);
        (event_loop, sender, spies)
    }

    #[test]
    fn test_hotkey_never_forwarded() {
        let (mut event_loop, _sender, spies) = event_loop(&["alpha", "beta"]);

        let rotations = event_loop.dispatch(TerminalEvent::Input(b"ab\tcd".to_vec()));
        assert_eq!(rotations.len(), 1);
        assert!(rotations[0].is_rotated());

        assert_eq!(spies[0].received(), "ab");
        assert_eq!(spies[1].received(), "cd");
        assert!(!spies[0].received().contains('\t'));
        assert!(!spies[1].received().contains('\t'));
    }

    #[test]
    fn test_hotkey_suppressed_with_single_session() {
        let (mut event_loop, _sender, spies) = event_loop(&["alpha"]);

        let rotations = event_loop.dispatch(TerminalEvent::Input(b"\t".to_vec()));
        assert_eq!(rotations, vec![Rotation::Unchanged]);
        assert!(spies[0].chunks().is_empty());
        assert_eq!(spies[0].redraws(), 0);
    }

    #[test]
    fn test_key_events() {
        let (mut event_loop, _sender, spies) = event_loop(&["alpha", "beta"]);

        event_loop.dispatch(TerminalEvent::Key(Key::Up));
        event_loop.dispatch(TerminalEvent::Key(Key::Tab));
        event_loop.dispatch(TerminalEvent::Key(Key::Char('x')));

        assert_eq!(spies[0].chunks(), vec![b"\x1b[A".to_vec()]);
        assert_eq!(spies[1].chunks(), vec![b"x".to_vec()]);
        assert_eq!(spies[1].redraws(), 1);
    }

    #[test]
    fn test_input_end_goes_to_focused() {
        let (mut event_loop, _sender, spies) = event_loop(&["alpha", "beta"]);
        event_loop.dispatch(TerminalEvent::Input(b"\t".to_vec()));
        event_loop.dispatch(TerminalEvent::InputEnd);

        assert!(!spies[0].ended());
        assert!(spies[1].ended());
    }

    #[test]
    fn test_drain_processes_queue_in_order() {
        let (mut event_loop, sender, spies) = event_loop(&["alpha", "beta"]);

        sender.input("one").unwrap();
        sender.input("\t").unwrap();
        sender.input("two").unwrap();

        assert_eq!(event_loop.drain(), 3);
        assert_eq!(spies[0].received(), "one");
        assert_eq!(spies[1].received(), "two");
    }

    #[tokio::test]
    async fn test_run_until_senders_dropped() {
        let (event_loop, sender, spies) = event_loop(&["alpha", "beta", "gamma"]);

        let producer = sender.clone();
        let handle = tokio::spawn(async move {
            producer.input("a").unwrap();
            producer.input("\t\t").unwrap();
            producer.input("c").unwrap();
            producer.end().unwrap();
        });
        handle.await.unwrap();
        drop(sender);

        let mux = event_loop.run().await;

        assert_eq!(spies[0].received(), "a");
        assert!(spies[1].chunks().is_empty());
        assert_eq!(spies[2].received(), "c");
        assert!(spies[2].ended());
        assert_eq!(mux.sessions()[2].focus, FocusState::Active);
    }

    #[test]
    fn test_broken_csi_does_not_hide_hotkey() {
        let (mut event_loop, _sender, spies) = event_loop(&["alpha", "beta"]);

        event_loop.dispatch(TerminalEvent::Input(b"\x1b[\tls".to_vec()));

        assert_eq!(spies[0].chunks(), vec![b"\x1b[".to_vec()]);
        assert_eq!(spies[1].received(), "ls");
        assert_eq!(spies[1].redraws(), 1);
    }

    #[test]
    fn test_resize_event_reaches_every_session() {
        let (mut event_loop, sender, spies) = event_loop(&["alpha", "beta"]);

        sender.resize(Dimensions::new(30, 100)).unwrap();
        assert_eq!(event_loop.drain(), 1);

        for spy in &spies {
            assert_eq!(spy.resizes(), vec![Dimensions::new(30, 100)]);
            assert!(spy.chunks().is_empty());
        }
    }

    #[tokio::test]
    async fn test_run_stops_when_all_sessions_exit() {
        let (event_loop, sender, spies) = event_loop(&["alpha", "beta"]);
        let ids: Vec<_> = event_loop
            .multiplexer()
            .sessions()
            .into_iter()
            .map(|s| s.id)
            .collect();

        sender.input("x").unwrap();
        sender.exited(ids[0]).unwrap();
        sender.exited(ids[1]).unwrap();

        // `sender` is still alive, so only the exits can stop the loop
        let mux = tokio::time::timeout(std::time::Duration::from_secs(5), event_loop.run())
            .await
            .unwrap();

        assert!(mux.all_exited());
        assert_eq!(spies[0].received(), "x");
        assert!(!spies[0].ended());
        drop(sender);
    }

    #[tokio::test]
    async fn test_run_stops_at_input_end() {
        let (event_loop, sender, spies) = event_loop(&["alpha"]);

        sender.input("a").unwrap();
        sender.end().unwrap();
        sender.input("late").unwrap();

        let mux = tokio::time::timeout(std::time::Duration::from_secs(5), event_loop.run())
            .await
            .unwrap();

        assert_eq!(spies[0].received(), "a");
        assert!(spies[0].ended());
        assert!(!mux.all_exited());
        drop(sender);
    }

    #[test]
    fn test_send_after_loop_dropped() {
        let (event_loop, sender, _spies) = event_loop(&["alpha"]);
        drop(event_loop);
        assert!(sender.input("late").is_err());
    }
}
