//! Source registry data types

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How a source's log content is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Log file on the local filesystem
    Local,
}

impl FromStr for ReadMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(ReadMode::Local),
            "remote" => Err("mode 'remote' is not supported; only 'local' is".to_string()),
            other => Err(format!("unknown mode '{}'; expected 'local'", other)),
        }
    }
}

impl fmt::Display for ReadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadMode::Local => write!(f, "local"),
        }
    }
}

/// One monitored log file and where its findings are filed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    name: String,
    location: PathBuf,
    repo_owner: String,
    repo_name: String,
    mode: ReadMode,
}

impl Source {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<PathBuf>,
        repo_owner: impl Into<String>,
        repo_name: impl Into<String>,
        mode: ReadMode,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            repo_owner: repo_owner.into(),
            repo_name: repo_name.into(),
            mode,
        }
    }

    /// Local source shorthand
    pub fn local(
        name: impl Into<String>,
        location: impl Into<PathBuf>,
        repo_owner: impl Into<String>,
        repo_name: impl Into<String>,
    ) -> Self {
        Self::new(name, location, repo_owner, repo_name, ReadMode::Local)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn repo_owner(&self) -> &str {
        &self.repo_owner
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    pub fn mode(&self) -> ReadMode {
        self.mode
    }

    /// `owner/name` of the destination repository
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.repo_owner, self.repo_name)
    }
}
