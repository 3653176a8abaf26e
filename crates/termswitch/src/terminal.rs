//! Raw mode and size of the controlling terminal.

use anyhow::{Context, Result};
use crossterm::terminal;
use crossterm::tty::IsTty;

use termswitch_core::Dimensions;
#[cfg(unix)]
use termswitch_session::EventSender;

/// RAII guard that restores cooked mode on drop.
///
/// Raw mode is needed so the rotation key arrives as a byte instead of being
/// consumed by the line discipline.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    /// Enter raw mode.
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw terminal mode")?;
        Ok(Self { _private: () })
    }

    /// Enter raw mode if stdin is a terminal; `None` when it is piped.
    pub fn enter_if_tty() -> Result<Option<Self>> {
        if std::io::stdin().is_tty() {
            Self::enter().map(Some)
        } else {
            Ok(None)
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Current terminal size, or `fallback` when it cannot be determined.
pub fn dimensions_or(fallback: Dimensions) -> Dimensions {
    match terminal::size() {
        Ok((cols, rows)) if cols > 0 && rows > 0 => Dimensions::new(rows, cols),
        _ => fallback,
    }
}

/// Queue a resize event with the new terminal size on every SIGWINCH.
///
/// The task ends when the event loop stops; callers abort it otherwise.
#[cfg(unix)]
pub fn watch_resize(
    events: EventSender,
    fallback: Dimensions,
) -> Result<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut winch =
        signal(SignalKind::window_change()).context("failed to watch terminal resizes")?;
    Ok(tokio::spawn(async move {
        while winch.recv().await.is_some() {
            let dimensions = dimensions_or(fallback);
            tracing::debug!(
                "Terminal resized to {}x{}",
                dimensions.rows,
                dimensions.cols
            );
            if events.resize(dimensions).is_err() {
                break;
            }
        }
    }))
}
