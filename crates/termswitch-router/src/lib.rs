//! # termswitch-router
//!
//! Gates between the single physical terminal and one logical session.
//!
//! This crate provides:
//! - Handles to the physical input control surface and the physical sink
//! - [`InputRouter`]: forwards physical input to its session only while active
//! - [`OutputRouter`]: forwards session output to the screen only while active
//! - Engine-facing [`InputHandle`] and [`OutputHandle`] that cannot toggle gates
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it has no internal dependencies and
//! is used by termswitch-session, which owns one router pair per session.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod input;
pub mod output;
pub mod physical;

// Re-export commonly used types
pub use input::{InputHandle, InputRouter, InputSink};
pub use output::{OutputHandle, OutputRouter};
pub use physical::{InputControl, MemorySink, NoFlowControl, PhysicalInput, PhysicalOutput};

/// Whether a routed chunk reached its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The gate was open and the chunk was passed on
    Forwarded,
    /// The gate was closed and the chunk was discarded
    Dropped,
}

/// Traffic counters of one router.
///
/// Input routers count chunks and end-of-stream events; output routers count
/// bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    /// Units passed through the open gate
    pub forwarded: u64,
    /// Units discarded by the closed gate
    pub dropped: u64,
}
