//! Lifecycle of one dinner: validate, prepare, run, and report.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::log;
use crate::philosopher::{Outcome, Philosopher};
use crate::topology;
use crate::transport::local;
use tokio::task::JoinSet;

/// An in-process ring, one tokio task per philosopher. A table can be
/// prepared and run any number of times; each run starts from fresh state.
pub struct Table {
    config: Config,
    launched: usize,
    validated: bool,
    prepared: bool,
    outcomes: Vec<Outcome>,
}

impl Table {
    pub fn new(config: Config) -> Self {
        let launched = config.philosophers;
        Self::with_launched(config, launched)
    }

    /// A table that will launch `launched` philosophers whatever the config
    /// asks for.
    pub fn with_launched(config: Config, launched: usize) -> Self {
        Self {
            config,
            launched,
            validated: false,
            prepared: false,
            outcomes: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn validate(&mut self) -> Result<()> {
        self.validated = false;
        topology::validate(self.config.philosophers, self.launched)?;
        self.validated = true;
        Ok(())
    }

    pub fn pre_process(&mut self) -> Result<()> {
        if !self.validated {
            return Err(Error::NotPrepared);
        }
        self.outcomes.clear();
        self.prepared = true;
        Ok(())
    }

    pub async fn run(&mut self) -> Result<()> {
        if !self.prepared {
            return Err(Error::NotPrepared);
        }
        self.prepared = false;

        let mut tasks = JoinSet::new();
        for endpoint in local::world(self.launched) {
            let mut philosopher = Philosopher::new(endpoint, &self.config)?;
            tasks.spawn(async move { philosopher.run().await });
        }

        let mut outcomes = Vec::with_capacity(self.launched);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(outcome)) => outcomes.push(outcome),
                Ok(Err(e)) => {
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    tasks.abort_all();
                    return Err(e.into());
                }
            }
        }

        outcomes.sort_by_key(|outcome| outcome.rank);
        self.outcomes = outcomes;
        Ok(())
    }

    /// The coordinator's deadlock verdict for the last run.
    pub fn post_process(&self) -> Result<bool> {
        let coordinator = self.outcomes.first().ok_or(Error::NotPrepared)?;
        log::info(&format!(
            "Dinner over: deadlock detected = {}.",
            coordinator.deadlock_detected
        ));
        Ok(coordinator.deadlock_detected)
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Runs the whole lifecycle once.
    pub async fn dine(config: Config) -> Result<bool> {
        let mut table = Self::new(config);
        table.validate()?;
        table.pre_process()?;
        table.run().await?;
        table.post_process()
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
