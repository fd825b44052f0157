//! Source Registry
//!
//! The fixed set of monitored sources, built once from validated settings
//! and shared read-only for the life of the process.

pub mod types;

pub use types::{ReadMode, Source};

use crate::app::config::{ConfigError, Settings};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<Arc<Source>>,
}

impl SourceRegistry {
    /// Build a registry; an empty set of sources is a configuration error
    pub fn new(sources: Vec<Source>) -> Result<Self, ConfigError> {
        if sources.is_empty() {
            return Err(ConfigError::NoSources);
        }

        let mut sources: Vec<Arc<Source>> = sources.into_iter().map(Arc::new).collect();
        sources.sort_by(|a, b| a.name().cmp(b.name()));

        if let Some(pair) = sources.windows(2).find(|w| w[0].name() == w[1].name()) {
            return Err(ConfigError::Invalid {
                problems: vec![format!("source '{}' is defined twice", pair[0].name())],
            });
        }

        Ok(Self { sources })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Self::new(settings.sources().to_vec())
    }

    /// Every source, ordered by name
    pub fn all(&self) -> &[Arc<Source>] {
        &self.sources
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Source>> {
        self.sources.iter().find(|s| s.name() == name)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
