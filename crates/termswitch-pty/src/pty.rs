//! PTY (Pseudo-Terminal) handling with portable-pty.

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use termswitch_core::{Dimensions, Error, Result};

/// Handle to a spawned PTY process.
pub struct PtyHandle {
    /// The master PTY end
    master: Arc<Mutex<Box<dyn MasterPty + Send>>>,
    /// The child process
    child: Arc<Mutex<Box<dyn Child + Send + Sync>>>,
    /// PTY writer
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    /// Command that was spawned
    command: String,
}

impl std::fmt::Debug for PtyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyHandle")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl PtyHandle {
    /// Spawn a new PTY with the given command and dimensions.
    ///
    /// # Arguments
    /// * `command` - Command to execute (e.g., "/bin/bash", "python3")
    /// * `args` - Command arguments
    /// * `dimensions` - Initial terminal dimensions
    /// * `cwd` - Working directory for the child
    ///
    /// # Example
    /// ```no_run
    /// use termswitch_pty::PtyHandle;
    /// use termswitch_core::Dimensions;
    ///
    /// # fn example() -> termswitch_core::Result<()> {
    /// let pty = PtyHandle::spawn("/bin/bash", &[], Dimensions::new(24, 80), None)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn(
        command: &str,
        args: &[String],
        dimensions: Dimensions,
        cwd: Option<&str>,
    ) -> Result<Self> {
        info!(
            "Spawning PTY: command='{}' args={:?}, dimensions={}x{}, cwd={:?}",
            command, args, dimensions.rows, dimensions.cols, cwd
        );

        let pair = native_pty_system()
            .openpty(pty_size(dimensions))
            .map_err(|e| {
                error!("Failed to open PTY: {}", e);
                Error::PtyError(format!("Failed to open PTY: {e}"))
            })?;

        let mut cmd = CommandBuilder::new(command);
        cmd.args(args);
        if let Some(dir) = cwd {
            debug!("Setting working directory to: {}", dir);
            cmd.cwd(dir);
        }

        let child = pair.slave.spawn_command(cmd).map_err(|e| {
            error!("Failed to spawn command '{}': {}", command, e);
            Error::PtyError(format!("Failed to spawn command: {e}"))
        })?;

        let writer = pair.master.take_writer().map_err(|e| {
            error!("Failed to take PTY writer: {}", e);
            Error::PtyError(format!("Failed to take writer: {e}"))
        })?;

        info!("PTY spawned successfully: command='{}'", command);

        Ok(Self {
            master: Arc::new(Mutex::new(pair.master)),
            child: Arc::new(Mutex::new(child)),
            writer: Arc::new(Mutex::new(writer)),
            command: command.to_string(),
        })
    }

    /// Clone a blocking reader of the child's output.
    ///
    /// Reads return 0 or an error once the child has exited; run them on a
    /// dedicated thread.
    pub fn take_reader(&self) -> Result<Box<dyn Read + Send>> {
        let master = self
            .master
            .lock()
            .map_err(|e| Error::PtyError(format!("Lock error: {e}")))?;
        master
            .try_clone_reader()
            .map_err(|e| Error::PtyError(format!("Failed to clone reader: {e}")))
    }

    /// Write data to the PTY.
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        debug!("Writing {} bytes to PTY", data.len());
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| Error::PtyError(format!("Lock error: {e}")))?;

        writer.write_all(data)?;
        writer.flush()?;

        Ok(data.len())
    }

    /// Resize the PTY to new dimensions.
    pub fn resize(&self, new_dimensions: Dimensions) -> Result<()> {
        info!(
            "Resizing PTY to {}x{}",
            new_dimensions.rows, new_dimensions.cols
        );

        self.master
            .lock()
            .map_err(|e| Error::PtyError(format!("Lock error: {e}")))?
            .resize(pty_size(new_dimensions))
            .map_err(|e| Error::PtyError(format!("Resize failed: {e}")))
    }

    /// Check if the child process is still running.
    pub fn is_alive(&self) -> bool {
        match self.child.lock() {
            Ok(mut child) => child.try_wait().ok().flatten().is_none(),
            Err(_) => false,
        }
    }

    /// Kill the child process.
    pub fn kill(&self) -> Result<()> {
        info!("Killing PTY process: command='{}'", self.command);
        self.child
            .lock()
            .map_err(|e| Error::PtyError(format!("Lock error: {e}")))?
            .kill()
            .map_err(|e| Error::PtyError(format!("Kill failed: {e}")))
    }
}

fn pty_size(dimensions: Dimensions) -> PtySize {
    PtySize {
        rows: dimensions.rows,
        cols: dimensions.cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}
