//! Command-line arguments
//!
//! Every logging option here overrides the matching key in the
//! configuration file; anything left unset falls back to the file, then to
//! the built-in default.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "osprey")]
#[command(about = "Watch log files for errors and file an issue for each one")]
#[command(version, long_version = crate::core::version::long_version())]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force colored log output
    #[arg(short = 'g', long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Run a single scan cycle and exit
    #[arg(long = "once")]
    pub once: bool,

    /// Log findings instead of filing issues; anchors are not persisted
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl Args {
    /// Colored output: forced by `--color`, off with `--no-color`,
    /// otherwise on when stdout is a terminal
    pub fn use_color(&self) -> bool {
        (self.color || std::io::IsTerminal::is_terminal(&std::io::stdout())) && !self.no_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["osprey"]).unwrap();

        assert!(args.config_file.is_none());
        assert!(args.log_level.is_none());
        assert!(!args.once);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "osprey",
            "-c",
            "/etc/osprey.toml",
            "--log-level",
            "debug",
            "-o",
            "json",
            "--log-file=none",
            "--no-color",
            "--once",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(args.config_file, Some(PathBuf::from("/etc/osprey.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.log_format.as_deref(), Some("json"));
        assert_eq!(args.log_file, Some(PathBuf::from("none")));
        assert!(args.once);
        assert!(args.dry_run);
        assert!(!args.use_color());
    }

    #[test]
    fn test_forced_color() {
        let args = Args::try_parse_from(["osprey", "-g"]).unwrap();
        assert!(args.use_color());
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(Args::try_parse_from(["osprey", "--log-level", "loud"]).is_err());
        assert!(Args::try_parse_from(["osprey", "--log-format", "xml"]).is_err());
        assert!(Args::try_parse_from(["osprey", "--color", "--no-color"]).is_err());
    }

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }
}
