//! # termswitch-pty
//!
//! PTY-backed session engines for termswitch.
//!
//! This crate provides:
//! - PTY (pseudo-terminal) lifecycle management ([`PtyHandle`])
//! - A [`SessionEngine`](termswitch_session::SessionEngine) that runs a
//!   child process on a PTY ([`PtyEngine`])
//!
//! ## Architecture
//!
//! This is Layer 3 in the architecture - it depends on termswitch-core,
//! termswitch-router and termswitch-session, and is the only crate that
//! talks to the operating system's PTY layer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod pty;

// Re-export commonly used types
pub use engine::{PtyEngine, PtySpec, EOF_BYTE, REDRAW_BYTE};
pub use pty::PtyHandle;
