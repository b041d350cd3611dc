//! Run configuration.
//!
//! Every field has a default so a partial TOML file (or none at all) is
//! enough to start a ring.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of philosophers requested; must match the number launched.
    pub philosophers: usize,
    /// Upper bound of a random thinking pause.
    pub think_max_ms: u64,
    /// Upper bound of a random eating pause.
    pub eat_max_ms: u64,
    /// The driving loop never stops before this many cycles.
    pub min_cycles: u64,
    /// Pause between two polls for a resolution message.
    pub resolution_poll_ms: u64,
    /// Give up waiting for a resolution message after this long. Unset means
    /// poll forever.
    pub resolution_timeout_ms: Option<u64>,
    /// Base seed; rank `r` uses `seed + r`.
    pub seed: u64,
    pub connect_attempts: u32,
    pub connect_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            philosophers: 5,
            think_max_ms: 10,
            eat_max_ms: 10,
            min_cycles: 1,
            resolution_poll_ms: 1,
            resolution_timeout_ms: None,
            seed: 0,
            connect_attempts: 50,
            connect_backoff_ms: 50,
        }
    }
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn with_philosophers(mut self, philosophers: usize) -> Self {
        self.philosophers = philosophers;
        self
    }

    pub fn with_delays(mut self, think_max: Duration, eat_max: Duration) -> Self {
        self.think_max_ms = millis(think_max);
        self.eat_max_ms = millis(eat_max);
        self
    }

    pub fn with_min_cycles(mut self, min_cycles: u64) -> Self {
        self.min_cycles = min_cycles;
        self
    }

    pub fn with_resolution_timeout(mut self, timeout: Duration) -> Self {
        self.resolution_timeout_ms = Some(millis(timeout));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn think_max(&self) -> Duration {
        Duration::from_millis(self.think_max_ms)
    }

    pub fn eat_max(&self) -> Duration {
        Duration::from_millis(self.eat_max_ms)
    }

    pub fn resolution_poll(&self) -> Duration {
        Duration::from_millis(self.resolution_poll_ms)
    }

    pub fn resolution_timeout(&self) -> Option<Duration> {
        self.resolution_timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_backoff(&self) -> Duration {
        Duration::from_millis(self.connect_backoff_ms)
    }

    /// Seed used by rank `rank`.
    pub fn seed_for(&self, rank: usize) -> u64 {
        self.seed.wrapping_add(rank as u64)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
