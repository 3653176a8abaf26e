//! Configuration types for termswitch.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Dimensions, Error, Result};

/// Top-level configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MuxConfig {
    /// Multiplexer behaviour
    pub multiplexer: MultiplexerSettings,
    /// Logging settings
    pub logging: LoggingSettings,
    /// Terminal settings
    pub terminal: TerminalSettings,
    /// Sessions started at launch, in focus order
    pub sessions: Vec<SessionSettings>,
}

impl MuxConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: MuxConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.terminal.dimensions().is_empty() {
            return Err(Error::Config("terminal dimensions must be > 0".to_string()));
        }

        for session in &self.sessions {
            session.validate()?;
        }

        if self.multiplexer.duplicate_names == DuplicateNames::Reject {
            for (i, session) in self.sessions.iter().enumerate() {
                if self.sessions[..i].iter().any(|s| s.name == session.name) {
                    return Err(Error::Config(format!(
                        "session name '{}' is listed twice",
                        session.name
                    )));
                }
            }
        }

        Ok(())
    }
}

/// What registration does with a name that is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateNames {
    /// Register anyway; both sessions coexist
    #[default]
    Allow,
    /// Fail with `Error::DuplicateSessionName`
    Reject,
}

/// Multiplexer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplexerSettings {
    /// Duplicate session name policy
    pub duplicate_names: DuplicateNames,
    /// Print `[name]` on the screen when a session gains focus
    pub focus_banner: bool,
}

impl Default for MultiplexerSettings {
    fn default() -> Self {
        Self {
            duplicate_names: DuplicateNames::Allow,
            focus_banner: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log file; stderr when unset
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

/// Terminal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSettings {
    /// Rows used when the real terminal size is unknown
    pub default_rows: u16,
    /// Columns used when the real terminal size is unknown
    pub default_cols: u16,
}

impl TerminalSettings {
    /// Default dimensions as a [`Dimensions`].
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.default_rows, self.default_cols)
    }
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            default_rows: 24,
            default_cols: 80,
        }
    }
}

/// A session to start at launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Display name
    pub name: String,
    /// Command to run in a PTY
    pub command: String,
    /// Command arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory
    #[serde(default)]
    pub cwd: Option<String>,
}

impl SessionSettings {
    /// Parse a `NAME=COMMAND [ARGS...]` launch spec.
    pub fn parse(spec: &str) -> Result<Self> {
        let (name, command_line) = spec
            .split_once('=')
            .ok_or_else(|| Error::Config(format!("expected NAME=COMMAND, got '{spec}'")))?;

        let mut words = command_line.split_whitespace().map(str::to_string);
        let command = words
            .next()
            .ok_or_else(|| Error::Config(format!("session '{name}' has no command")))?;

        let settings = Self {
            name: name.trim().to_string(),
            command,
            args: words.collect(),
            cwd: None,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the session entry.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("session name cannot be empty".to_string()));
        }
        if self.command.trim().is_empty() {
            return Err(Error::Config(format!(
                "session '{}' command cannot be empty",
                self.name
            )));
        }
        Ok(())
    }
}
