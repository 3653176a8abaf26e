//! # termswitch-core
//!
//! Core types for termswitch.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other termswitch crates. It provides:
//!
//! - Key types and a decoder from raw terminal bytes to key presses
//! - Session types (SessionId, FocusState, SessionInfo)
//! - Terminal dimensions
//! - YAML configuration
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other termswitch crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod geometry;
pub mod key;
pub mod session;

// Re-export commonly used types
pub use config::{
    DuplicateNames, LoggingSettings, MultiplexerSettings, MuxConfig, SessionSettings,
    TerminalSettings,
};
pub use error::{Error, Result};
pub use geometry::Dimensions;
pub use key::{Key, KeyStroke, ROTATION_KEY};
pub use session::{FocusState, SessionId, SessionInfo};
