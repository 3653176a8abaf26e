//! Standard input as the physical input source.

use std::io::Read;
use std::thread;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

use termswitch_router::InputControl;
use termswitch_session::EventSender;

const READ_BUFFER_SIZE: usize = 1024;

/// Flow control for the stdin reader.
///
/// Pausing stops the reader from pulling more bytes; the kernel buffers them
/// until resume.
#[derive(Debug)]
pub struct StdinControl {
    paused: watch::Sender<bool>,
}

impl StdinControl {
    /// Control plus the receiver the reader task watches.
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (paused, rx) = watch::channel(false);
        (Self { paused }, rx)
    }
}

impl InputControl for StdinControl {
    fn pause(&mut self) {
        debug!("stdin paused");
        self.paused.send_replace(true);
    }

    fn resume(&mut self) {
        debug!("stdin resumed");
        self.paused.send_replace(false);
    }
}

/// Read `source` into the event queue on a dedicated thread until it ends
/// or the loop stops.
///
/// Sends `InputEnd` after the last chunk. The thread is plain `std` so that a
/// read blocked on the terminal never holds up runtime shutdown; callers may
/// detach it. Must be called from within a tokio runtime, whose handle waits
/// out pauses.
pub fn spawn_reader<R>(
    mut source: R,
    events: EventSender,
    mut paused: watch::Receiver<bool>,
) -> std::io::Result<thread::JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    let runtime = Handle::try_current().map_err(std::io::Error::other)?;
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let mut buf = vec![0u8; READ_BUFFER_SIZE];
            loop {
                if runtime.block_on(paused.wait_for(|paused| !*paused)).is_err() {
                    debug!("flow control dropped; stopping input");
                    break;
                }

                match source.read(&mut buf) {
                    Ok(0) => {
                        debug!("input reached end of file");
                        let _ = events.end();
                        break;
                    }
                    Ok(n) => {
                        if events.input(&buf[..n]).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        warn!("failed to read input: {}", e);
                        let _ = events.end();
                        break;
                    }
                }
            }
        })
}
