//! A single philosopher: its state machine, the fork protocol with its two
//! neighbours, and the loop that drives both.

use crate::config::Config;
use crate::deadlock;
use crate::delay::Delay;
use crate::error::{Error, Result};
use crate::log;
use crate::message::{ControlMessage, Tag};
use crate::state::State;
use crate::termination;
use crate::topology::Ring;
use crate::transport::Endpoint;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::Serialize;

/// What one philosopher reports once its loop has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub rank: usize,
    pub cycles: u64,
    /// Whether any detection round of the run reported a deadlock.
    pub deadlock_detected: bool,
    /// How many times this philosopher was forced back to thinking.
    pub resolutions: u64,
}

pub struct Philosopher {
    ring: Ring,
    state: State,
    endpoint: Endpoint,
    config: Config,
    think: Delay<SmallRng>,
    eat: Delay<SmallRng>,
    rng: SmallRng,
    cycles: u64,
    deadlock_detected: bool,
    resolutions: u64,
}

impl Philosopher {
    pub fn new(endpoint: Endpoint, config: &Config) -> Result<Self> {
        let ring = Ring::new(endpoint.rank(), endpoint.size())?;
        let seed = config.seed_for(ring.rank());

        Ok(Self {
            ring,
            state: State::Thinking,
            endpoint,
            config: config.clone(),
            think: Delay::new(config.think_max(), seed),
            eat: Delay::new(config.eat_max(), seed.rotate_left(32)),
            rng: SmallRng::seed_from_u64(seed),
            cycles: 0,
            deadlock_detected: false,
            resolutions: 0,
        })
    }

    pub fn rank(&self) -> usize {
        self.ring.rank()
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn outcome(&self) -> Outcome {
        Outcome {
            rank: self.rank(),
            cycles: self.cycles,
            deadlock_detected: self.deadlock_detected,
            resolutions: self.resolutions,
        }
    }

    /// Hands the endpoint back, e.g. to shut its links down after a run.
    pub fn into_endpoint(self) -> Endpoint {
        self.endpoint
    }

    pub(crate) fn endpoint_mut(&mut self) -> &mut Endpoint {
        &mut self.endpoint
    }

    fn enter(&mut self, to: State) -> Result<()> {
        self.state = self.state.transition(to)?;
        Ok(())
    }

    /// Moves to thinking regardless of the current state. Only the resolver
    /// does this from outside the normal cycle.
    pub(crate) fn force_thinking(&mut self) {
        log::info(&format!(
            "Philosopher {} forced from {:?} to thinking.",
            self.rank(),
            self.state
        ));
        self.state = State::Thinking;
        self.resolutions += 1;
    }

    /// Uniform pick in `[0, N)` for the resolver.
    pub(crate) fn pick_rank(&mut self) -> usize {
        self.rng.random_range(0..self.ring.size())
    }

    pub async fn think(&mut self) {
        self.state = State::Thinking;
        self.think.pause().await;
    }

    pub async fn eat(&mut self) -> Result<()> {
        self.enter(State::Eating)?;
        log::debug(&format!("philosopher {} eating", self.rank()));
        self.eat.pause().await;
        Ok(())
    }

    /// Becomes hungry and asks both neighbours for their fork.
    pub fn announce_hunger(&mut self) -> Result<()> {
        self.enter(State::Hungry)?;
        let request = ControlMessage::fork(State::Hungry);
        self.endpoint.send_control(self.ring.left(), request)?;
        self.endpoint.send_control(self.ring.right(), request)?;
        Ok(())
    }

    /// Blocks until one fork-protocol message has arrived from each
    /// neighbour. Any payload counts. There is no timeout.
    pub async fn await_forks(&mut self) -> Result<()> {
        let (left, right) = (self.ring.left(), self.ring.right());
        self.endpoint.recv(left, Tag::ForkProtocol).await?;
        self.endpoint.recv(right, Tag::ForkProtocol).await?;
        log::debug(&format!("philosopher {} holds both forks", self.rank()));
        Ok(())
    }

    pub async fn request_forks(&mut self) -> Result<()> {
        self.announce_hunger()?;
        self.await_forks().await
    }

    /// Returns both forks and throws away any acknowledgement still queued
    /// from either neighbour. Returns how many were thrown away.
    pub fn release_forks(&mut self) -> Result<usize> {
        self.enter(State::Thinking)?;
        let (left, right) = (self.ring.left(), self.ring.right());
        let release = ControlMessage::fork(State::Thinking);
        for neighbour in [left, right] {
            // a neighbour that already left the table needs no fork back
            match self.endpoint.send_control(neighbour, release) {
                Ok(()) => {}
                Err(Error::Disconnected { peer }) => {
                    log::debug(&format!("rank {peer} is gone, fork not returned"));
                }
                Err(e) => return Err(e),
            }
        }

        let drained = self.endpoint.drain(left, Tag::ForkProtocol)
            + self.endpoint.drain(right, Tag::ForkProtocol);
        if drained > 0 {
            log::debug(&format!(
                "philosopher {} drained {drained} stray fork messages",
                self.rank()
            ));
        }
        Ok(drained)
    }

    pub async fn check_deadlock(&mut self) -> Result<bool> {
        let deadlock = deadlock::check_deadlock(self).await?;
        self.deadlock_detected |= deadlock;
        Ok(deadlock)
    }

    pub async fn resolve_deadlock(&mut self) -> Result<Option<usize>> {
        deadlock::resolve_deadlock(self).await
    }

    pub async fn all_thinking(&mut self) -> Result<bool> {
        termination::all_thinking(self).await
    }

    /// Runs think, request, eat, release until the whole ring is found
    /// thinking (and at least `min_cycles` cycles have passed).
    pub async fn run(&mut self) -> Result<Outcome> {
        log::info(&format!(
            "Philosopher {} sits down between {} and {}.",
            self.rank(),
            self.ring.left(),
            self.ring.right()
        ));

        loop {
            self.think().await;
            self.request_forks().await?;
            self.eat().await?;
            self.release_forks()?;
            self.cycles += 1;

            if self.check_deadlock().await? {
                self.resolve_deadlock().await?;
            }

            // every rank must take part in the snapshot, so evaluate it first
            if self.all_thinking().await? && self.cycles >= self.config.min_cycles {
                break;
            }
        }

        log::info(&format!(
            "Philosopher {} leaves after {} cycles.",
            self.rank(),
            self.cycles
        ));
        Ok(self.outcome())
    }
}

#[cfg(test)]
#[path = "philosopher_tests.rs"]
mod tests;
