//! Command line interface.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use termswitch_core::{MuxConfig, SessionSettings};

/// Names of the sessions started when none are configured.
pub const DEFAULT_SESSION_NAMES: [&str; 2] = ["shell-1", "shell-2"];

/// Share one terminal between several interactive sessions.
///
/// Press Tab to move focus to the next session.
#[derive(Debug, Parser)]
#[command(name = "termswitch", version, about)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Sessions to start, as NAME=COMMAND [ARGS...]
    #[arg(value_name = "NAME=COMMAND")]
    pub sessions: Vec<String>,
}

impl Cli {
    /// Merge the configuration file, command line overrides and defaults.
    ///
    /// Sessions given on the command line replace those from the file. With
    /// none at all, two default shells are started.
    pub fn resolve(&self) -> anyhow::Result<MuxConfig> {
        let mut config = match &self.config {
            Some(path) => MuxConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => MuxConfig::default(),
        };

        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }

        if !self.sessions.is_empty() {
            config.sessions = self
                .sessions
                .iter()
                .map(|spec| SessionSettings::parse(spec))
                .collect::<termswitch_core::Result<_>>()
                .context("invalid session on the command line")?;
        }

        if config.sessions.is_empty() {
            let shell = default_shell();
            config.sessions = DEFAULT_SESSION_NAMES
                .iter()
                .map(|name| SessionSettings {
                    name: (*name).to_string(),
                    command: shell.clone(),
                    args: Vec::new(),
                    cwd: None,
                })
                .collect();
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

/// `$SHELL`, falling back to `/bin/sh`.
pub fn default_shell() -> String {
    std::env::var("SHELL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "/bin/sh".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use termswitch_core::DuplicateNames;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("termswitch").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_start_two_shells() {
        let config = parse(&[]).resolve().unwrap();
        let names: Vec<_> = config.sessions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, DEFAULT_SESSION_NAMES);
        assert!(config.sessions.iter().all(|s| s.command == default_shell()));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_positional_sessions() {
        let config = parse(&["py=python3 -q", "sh=/bin/sh"]).resolve().unwrap();
        assert_eq!(config.sessions.len(), 2);
        assert_eq!(config.sessions[0].name, "py");
        assert_eq!(config.sessions[0].command, "python3");
        assert_eq!(config.sessions[0].args, vec!["-q".to_string()]);
        assert_eq!(config.sessions[1].command, "/bin/sh");
    }

    #[test]
    fn test_malformed_session_rejected() {
        assert!(parse(&["no-equals-sign"]).resolve().is_err());
        assert!(parse(&["=python3"]).resolve().is_err());
    }

    #[test]
    fn test_logging_overrides() {
        let config = parse(&["--log-level", "debug", "--log-file", "/tmp/ts.log"])
            .resolve()
            .unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/ts.log")));
    }

    #[test]
    fn test_config_file_merged_with_command_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "multiplexer:\n  duplicate_names: reject\nlogging:\n  level: info\nsessions:\n  - name: a\n    command: /bin/sh\n  - name: b\n    command: /bin/sh"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = parse(&["--config", &path]).resolve().unwrap();
        assert_eq!(config.multiplexer.duplicate_names, DuplicateNames::Reject);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.sessions.len(), 2);

        let config = parse(&["--config", &path, "--log-level", "trace", "c=/bin/sh"])
            .resolve()
            .unwrap();
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.sessions.len(), 1);
        assert_eq!(config.sessions[0].name, "c");
    }

    #[test]
    fn test_duplicate_command_line_sessions_follow_policy() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "multiplexer:\n  duplicate_names: reject").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        assert!(parse(&["a=/bin/sh", "a=/bin/sh"]).resolve().is_ok());
        assert!(parse(&["--config", &path, "a=/bin/sh", "a=/bin/sh"])
            .resolve()
            .is_err());
    }

    #[test]
    fn test_missing_config_file() {
        assert!(parse(&["--config", "/nonexistent/termswitch.yaml"])
            .resolve()
            .is_err());
    }
}
