//! Property-based tests for focus invariants.
//!
//! Uses proptest to drive the event loop with random event sequences and
//! check the multiplexer against a simple model after every step.

use proptest::prelude::*;

use termswitch_router::{MemorySink, PhysicalInput, PhysicalOutput};
use termswitch_session::testing::{EngineSpy, RecordingEngine};
use termswitch_session::{EventLoop, SessionMultiplexer, TerminalEvent};

#[derive(Debug, Clone)]
enum Step {
    Register,
    Rotate,
    Type(Vec<u8>),
}

/// Printable input without the rotation key.
fn plain_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0x20u8..0x7F, 1..8)
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        1 => Just(Step::Register),
        2 => Just(Step::Rotate),
        3 => plain_bytes().prop_map(Step::Type),
    ]
}

fn empty_loop() -> EventLoop {
    let mux = SessionMultiplexer::new(
        PhysicalInput::detached(),
        PhysicalOutput::new(MemorySink::new()),
    );
    EventLoop::new(mux).0
}

proptest! {
    /// Exactly min(1, n) sessions are active, and the active one matches a
    /// round-robin model of the cursor.
    #[test]
    fn active_count_and_cursor_follow_model(steps in prop::collection::vec(step(), 0..40)) {
        let mut event_loop = empty_loop();
        let mut spies: Vec<EngineSpy> = Vec::new();
        let mut model_cursor = 0usize;

        for step in steps {
            match step {
                Step::Register => {
                    let spy = EngineSpy::new();
                    let name = format!("s{}", spies.len());
                    event_loop
                        .multiplexer_mut()
                        .register(name, RecordingEngine::factory(&spy))
                        .unwrap();
                    spies.push(spy);
                }
                Step::Rotate => {
                    event_loop.dispatch(TerminalEvent::Input(b"\t".to_vec()));
                    if spies.len() >= 2 {
                        model_cursor = (model_cursor + 1) % spies.len();
                    }
                }
                Step::Type(bytes) => {
                    event_loop.dispatch(TerminalEvent::Input(bytes));
                }
            }

            let mux = event_loop.multiplexer();
            prop_assert_eq!(mux.active_count(), spies.len().min(1));
            if let Some(focused) = mux.focused() {
                prop_assert_eq!(focused.index, model_cursor);
                prop_assert!(focused.focus.is_active());
            }
        }
    }

    /// Every typed byte reaches exactly the session focused at the time, and
    /// the rotation key reaches nobody.
    #[test]
    fn input_reaches_only_the_focused_session(
        sessions in 1usize..5,
        steps in prop::collection::vec(step(), 0..40),
    ) {
        let mut event_loop = empty_loop();
        let spies: Vec<EngineSpy> = (0..sessions)
            .map(|i| {
                let spy = EngineSpy::new();
                event_loop
                    .multiplexer_mut()
                    .register(format!("s{i}"), RecordingEngine::factory(&spy))
                    .unwrap();
                spy
            })
            .collect();

        let mut expected: Vec<Vec<u8>> = vec![Vec::new(); sessions];
        let mut cursor = 0usize;

        for step in steps {
            match step {
                Step::Register => {}
                Step::Rotate => {
                    event_loop.dispatch(TerminalEvent::Input(b"\t".to_vec()));
                    if sessions >= 2 {
                        cursor = (cursor + 1) % sessions;
                    }
                }
                Step::Type(bytes) => {
                    expected[cursor].extend_from_slice(&bytes);
                    event_loop.dispatch(TerminalEvent::Input(bytes));
                }
            }
        }

        for (spy, expected) in spies.iter().zip(&expected) {
            let received: Vec<u8> = spy.chunks().concat();
            prop_assert_eq!(&received, expected);
            prop_assert!(!received.contains(&b'\t'));
        }
    }

    /// A chunk with embedded hotkeys splits its bytes between consecutive
    /// sessions in order.
    #[test]
    fn embedded_hotkeys_split_chunk(parts in prop::collection::vec(plain_bytes(), 1..6)) {
        let mut event_loop = empty_loop();
        let spies: Vec<EngineSpy> = (0..parts.len())
            .map(|i| {
                let spy = EngineSpy::new();
                event_loop
                    .multiplexer_mut()
                    .register(format!("s{i}"), RecordingEngine::factory(&spy))
                    .unwrap();
                spy
            })
            .collect();

        let chunk = parts.join(&b'\t');
        event_loop.dispatch(TerminalEvent::Input(chunk));

        for (spy, part) in spies.iter().zip(&parts) {
            prop_assert_eq!(&spy.chunks().concat(), part);
        }
    }
}
