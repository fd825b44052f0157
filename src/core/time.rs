//! Time provider abstraction for testable timestamps

use chrono::{DateTime, Local};
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// Source of wall-clock time for finding timestamps
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Production time provider
#[derive(Default, Clone)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Time provider pinned to a settable instant
#[derive(Clone)]
#[cfg(test)]
pub struct MockTimeProvider {
    current: Arc<Mutex<DateTime<Local>>>,
}

#[cfg(test)]
impl MockTimeProvider {
    pub fn at(time: DateTime<Local>) -> Self {
        Self {
            current: Arc::new(Mutex::new(time)),
        }
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut current = self.current.lock().unwrap();
        *current += duration;
    }
}

#[cfg(test)]
impl TimeProvider for MockTimeProvider {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap()
    }
}
