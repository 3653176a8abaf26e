//! # termswitch-session
//!
//! Focus management for sessions sharing one terminal.
//!
//! This crate provides:
//! - The engine contract ([`SessionEngine`], [`SessionIo`])
//! - Session registration and focus rotation ([`SessionMultiplexer`])
//! - The rotation hotkey ([`HotkeyListener`])
//! - The single-threaded event loop feeding physical input in ([`EventLoop`])
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on termswitch-core and
//! termswitch-router and owns one router pair per registered session.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod event_loop;
pub mod hotkey;
pub mod multiplexer;
pub mod testing;

// Re-export commonly used types
pub use engine::{SessionEngine, SessionIo};
pub use event_loop::{EventLoop, EventSender, TerminalEvent};
pub use hotkey::{HotkeyListener, Segment};
pub use multiplexer::{Rotation, SessionMultiplexer};
