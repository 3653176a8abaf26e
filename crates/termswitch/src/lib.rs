//! termswitch binary library.
//!
//! Command line handling, logging setup and the wiring of the real terminal
//! to the session multiplexer. The binary entry point is in main.rs.

pub mod app;
pub mod cli;
pub mod input;
pub mod logging;
pub mod terminal;

// Re-export commonly used types
pub use app::{build_event_loop, run};
pub use cli::Cli;
pub use terminal::RawModeGuard;
