//! TOML configuration loading and validation
//!
//! The file is deserialised into a permissive raw form first, then validated
//! in one pass so that every problem is reported together instead of
//! failing on the first bad key.

use crate::anchor::StorageError;
use crate::core::logging::LogFormat;
use crate::emitter::DEFAULT_API_URL;
use crate::registry::{ReadMode, Source};
use crate::scanner::DEFAULT_ERROR_KEYWORD;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the GitHub token
pub const GITHUB_AUTH_ENV: &str = "GITHUB_AUTH_TOKEN";

const CONFIG_FILE_NAME: &str = "osprey.toml";
const SYSTEM_CONFIG_DIR: &str = "/usr/local/etc";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no configuration file found (searched: {})", display_paths(searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("cannot read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse configuration file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {}", problems.join("; "))]
    Invalid { problems: Vec<String> },

    #[error("no services are configured; nothing to scan")]
    NoSources,

    #[error("{variable} is not set or empty; it must hold a GitHub token")]
    MissingCredential { variable: String },

    #[error("issue tracker authentication failed: {message}")]
    Authentication { message: String },

    #[error("anchor storage unavailable: {0}")]
    Storage(#[from] StorageError),
}

impl crate::core::error_handling::ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    interval: Option<i64>,
    max_workers: Option<i64>,
    igu_file_path: Option<PathBuf>,
    error_keyword: Option<String>,
    github_api_url: Option<String>,
    log_level: Option<String>,
    log_format: Option<String>,
    log_file: Option<PathBuf>,
    #[serde(default)]
    services: BTreeMap<String, RawService>,
}

#[derive(Debug, Default, Deserialize)]
struct RawService {
    mode: Option<String>,
    location: Option<String>,
    repo_owner: Option<String>,
    repo_name: Option<String>,
}

/// Optional logging preferences from the file; CLI flags override them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file: Option<PathBuf>,
}

/// Validated configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub interval: Duration,
    pub max_workers: usize,
    pub anchor_root: PathBuf,
    pub error_keyword: String,
    pub github_api_url: String,
    pub log: LogSettings,
    sources: Vec<Source>,
}

impl Settings {
    /// Configured sources, ordered by name
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Locate, read and validate the configuration file
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = resolve_config_path(explicit)?;
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;

        let settings = Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.clone(),
                message,
            },
            other => other,
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        raw.validate()
    }
}

impl RawSettings {
    fn validate(self) -> Result<Settings, ConfigError> {
        let mut problems = Vec::new();

        let interval = match self.interval {
            Some(secs) if secs > 0 => Duration::from_secs(secs as u64),
            Some(secs) => {
                problems.push(format!("interval must be a positive number of seconds, got {}", secs));
                Duration::ZERO
            }
            None => {
                problems.push("interval is required".to_string());
                Duration::ZERO
            }
        };

        let max_workers = match self.max_workers {
            Some(n) if n > 0 => n as usize,
            Some(n) => {
                problems.push(format!("max_workers must be at least 1, got {}", n));
                0
            }
            None => {
                problems.push("max_workers is required".to_string());
                0
            }
        };

        let anchor_root = match self.igu_file_path {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => {
                problems.push("igu_file_path is required".to_string());
                PathBuf::new()
            }
        };

        let error_keyword = self
            .error_keyword
            .unwrap_or_else(|| DEFAULT_ERROR_KEYWORD.to_string());
        if error_keyword.is_empty() {
            problems.push("error_keyword must not be empty".to_string());
        }

        let github_api_url = self
            .github_api_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !github_api_url.starts_with("http://") && !github_api_url.starts_with("https://") {
            problems.push(format!(
                "github_api_url must be an http:// or https:// URL, got '{}'",
                github_api_url
            ));
        }

        if let Some(Err(problem)) = self.log_format.as_deref().map(str::parse::<LogFormat>) {
            problems.push(problem);
        }

        if self.services.is_empty() {
            problems.push("no services are configured; nothing to scan".to_string());
        }

        let mut sources = Vec::with_capacity(self.services.len());
        for (name, service) in self.services {
            if let Some(source) = service.validate(&name, &mut problems) {
                sources.push(source);
            }
        }

        if !problems.is_empty() {
            return Err(ConfigError::Invalid { problems });
        }

        Ok(Settings {
            interval,
            max_workers,
            anchor_root,
            error_keyword,
            github_api_url,
            log: LogSettings {
                level: self.log_level,
                format: self.log_format,
                file: self.log_file,
            },
            sources,
        })
    }
}

impl RawService {
    fn validate(self, name: &str, problems: &mut Vec<String>) -> Option<Source> {
        let before = problems.len();

        // The name becomes a file name under igu_file_path.
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            problems.push(format!(
                "service name '{}' must be non-empty, must not start with '.', and must not contain path separators",
                name
            ));
        }

        let mode = match self.mode.as_deref().map(str::parse::<ReadMode>) {
            Some(Ok(mode)) => Some(mode),
            Some(Err(reason)) => {
                problems.push(format!("services.{}: {}", name, reason));
                None
            }
            None => {
                problems.push(format!("services.{}: mode is required", name));
                None
            }
        };

        let mut required = |field: &str, value: Option<String>| -> String {
            match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                Some(v) => v,
                None => {
                    problems.push(format!("services.{}: {} is required", name, field));
                    String::new()
                }
            }
        };
        let location = required("location", self.location);
        let repo_owner = required("repo_owner", self.repo_owner);
        let repo_name = required("repo_name", self.repo_name);

        match mode {
            Some(mode) if problems.len() == before => {
                Some(Source::new(name, location, repo_owner, repo_name, mode))
            }
            _ => None,
        }
    }
}

/// Pick the configuration file: explicit path, user config dir, then system dir
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(ConfigError::NotFound {
            searched: vec![path.to_path_buf()],
        });
    }

    let candidates: Vec<PathBuf> = dirs::config_dir()
        .map(|d| d.join("Osprey").join(CONFIG_FILE_NAME))
        .into_iter()
        .chain(std::iter::once(Path::new(SYSTEM_CONFIG_DIR).join(CONFIG_FILE_NAME)))
        .collect();

    match candidates.iter().find(|p| p.exists()) {
        Some(path) => Ok(path.clone()),
        None => Err(ConfigError::NotFound {
            searched: candidates,
        }),
    }
}

/// Read the issue-tracker token once from the environment
pub fn read_credential() -> Result<String, ConfigError> {
    std::env::var(GITHUB_AUTH_ENV)
        .ok()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ConfigError::MissingCredential {
            variable: GITHUB_AUTH_ENV.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const VALID: &str = r#"
interval = 60
max_workers = 2
igu_file_path = "/var/lib/osprey"

[services.banana]
mode = "local"
location = "/var/log/banana.log"
repo_owner = "acme"
repo_name = "banana-svc"

[services.apple]
mode = "local"
location = "/var/log/apple.log"
repo_owner = "acme"
repo_name = "apple-svc"
"#;

    fn problems(contents: &str) -> Vec<String> {
        match Settings::from_toml_str(contents) {
            Err(ConfigError::Invalid { problems }) => problems,
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_configuration() {
        let settings = Settings::from_toml_str(VALID).unwrap();

        assert_eq!(settings.interval, Duration::from_secs(60));
        assert_eq!(settings.max_workers, 2);
        assert_eq!(settings.anchor_root, PathBuf::from("/var/lib/osprey"));
        assert_eq!(settings.error_keyword, "error");
        assert_eq!(settings.github_api_url, DEFAULT_API_URL);
        assert_eq!(settings.log, LogSettings::default());

        let names: Vec<&str> = settings.sources().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["apple", "banana"]);
        assert_eq!(settings.sources()[0].repo_slug(), "acme/apple-svc");
    }

    #[test]
    fn test_optional_keys() {
        let contents = format!(
            "error_keyword = \"FATAL\"\ngithub_api_url = \"https://ghe.example.com/api/v3\"\nlog_level = \"debug\"\nlog_format = \"json\"\nlog_file = \"/tmp/osprey.log\"\n{}",
            VALID
        );
        let settings = Settings::from_toml_str(&contents).unwrap();

        assert_eq!(settings.error_keyword, "FATAL");
        assert_eq!(settings.github_api_url, "https://ghe.example.com/api/v3");
        assert_eq!(settings.log.level.as_deref(), Some("debug"));
        assert_eq!(settings.log.format.as_deref(), Some("json"));
        assert_eq!(settings.log.file, Some(PathBuf::from("/tmp/osprey.log")));
    }

    #[test]
    fn test_all_problems_reported_together() {
        let found = problems(
            r#"
interval = 0
max_workers = -1

[services.apple]
mode = "remote"
location = ""
repo_owner = "acme"
"#,
        );

        assert_eq!(found.len(), 6, "{:?}", found);
        assert!(found.iter().any(|p| p.contains("interval")));
        assert!(found.iter().any(|p| p.contains("max_workers")));
        assert!(found.iter().any(|p| p.contains("igu_file_path")));
        assert!(found.iter().any(|p| p.contains("not supported")));
        assert!(found.iter().any(|p| p.contains("location is required")));
        assert!(found.iter().any(|p| p.contains("repo_name is required")));
    }

    #[test]
    fn test_no_services_is_invalid() {
        let found = problems("interval = 5\nmax_workers = 1\nigu_file_path = \"/tmp\"\n");

        assert_eq!(found, vec!["no services are configured; nothing to scan".to_string()]);
    }

    #[test]
    fn test_missing_mode_and_bad_name() {
        let found = problems(
            r#"
interval = 5
max_workers = 1
igu_file_path = "/tmp"

[services."../escape"]
mode = "local"
location = "/var/log/x.log"
repo_owner = "acme"
repo_name = "x"

[services.plain]
location = "/var/log/plain.log"
repo_owner = "acme"
repo_name = "plain"
"#,
        );

        assert_eq!(found.len(), 2, "{:?}", found);
        assert!(found.iter().any(|p| p.contains("'../escape'")));
        assert!(found.iter().any(|p| p.contains("services.plain: mode is required")));
    }

    #[test]
    fn test_bad_log_format_and_url() {
        let contents = format!(
            "log_format = \"xml\"\ngithub_api_url = \"ftp://example.com\"\n{}",
            VALID
        );
        let found = problems(&contents);

        assert_eq!(found.len(), 2, "{:?}", found);
        let format_problem = "xml".parse::<LogFormat>().unwrap_err();
        assert!(found.contains(&format_problem), "{:?}", found);
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let err = Settings::from_toml_str("interval = = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_load_from_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("osprey.toml");
        std::fs::write(&path, VALID).unwrap();

        let settings = Settings::load(Some(&path)).await.unwrap();
        assert_eq!(settings.sources().len(), 2);
    }

    #[tokio::test]
    async fn test_load_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("osprey.toml");
        std::fs::write(&path, "services = 3").unwrap();

        let err = Settings::load(Some(&path)).await.unwrap_err();
        assert!(err.to_string().contains("osprey.toml"), "{}", err);
    }

    #[test]
    fn test_explicit_missing_path_is_not_found() {
        let err = resolve_config_path(Some(Path::new("/nonexistent/osprey.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
        assert!(err.to_string().contains("/nonexistent/osprey.toml"));
    }

    #[test]
    #[serial]
    fn test_read_credential() {
        std::env::set_var(GITHUB_AUTH_ENV, "  ghp_secret\n");
        assert_eq!(read_credential().unwrap(), "ghp_secret");

        std::env::set_var(GITHUB_AUTH_ENV, "   ");
        assert!(matches!(
            read_credential(),
            Err(ConfigError::MissingCredential { .. })
        ));

        std::env::remove_var(GITHUB_AUTH_ENV);
        assert!(read_credential().is_err());
    }
}
