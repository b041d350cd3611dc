//! Centralised deadlock detection and resolution, both coordinated by rank 0.
//!
//! The snapshot behind [`check_deadlock`] is not synchronised with the
//! philosophers' own transitions: a philosopher finishing a meal while the
//! gather is in flight may be seen either way. Detection can therefore give
//! false positives (slow eaters look stuck) and false negatives.

use crate::collective::{self, COORDINATOR};
use crate::error::{Error, Result};
use crate::log;
use crate::message::{ControlMessage, Payload, Tag};
use crate::philosopher::Philosopher;
use crate::state::State;
use std::time::Instant;

/// Gathers every state on the coordinator, which declares a deadlock when
/// nobody is thinking, and broadcasts the verdict to the whole ring.
pub async fn check_deadlock(philosopher: &mut Philosopher) -> Result<bool> {
    let state = philosopher.state();
    let rank = philosopher.rank();
    if state.is_hungry() {
        log::debug(&format!("philosopher {rank} is hungry at detection"));
    }

    let endpoint = philosopher.endpoint_mut();
    let verdict = match collective::gather(endpoint, Payload::State(state)).await? {
        Some(states) => {
            let mut anyone_thinking = false;
            for (source, value) in states.into_iter().enumerate() {
                anyone_thinking |= value.into_state(source, Tag::Collective)?.is_thinking();
            }
            if !anyone_thinking {
                log::warn("Deadlock detected: nobody is thinking.");
            }
            Some(Payload::Flag(!anyone_thinking))
        }
        None => None,
    };

    collective::broadcast(endpoint, verdict)
        .await?
        .into_flag(COORDINATOR, Tag::Collective)
}

/// Forces one randomly chosen philosopher back to thinking.
///
/// The coordinator picks the target, sends it a resolution message and tells
/// the whole ring who was picked. The target then polls for that message.
/// Returns the target's rank on the target and `None` everywhere else.
pub async fn resolve_deadlock(philosopher: &mut Philosopher) -> Result<Option<usize>> {
    let chosen = if philosopher.ring().is_coordinator() {
        let target = philosopher.pick_rank();
        philosopher
            .endpoint_mut()
            .send_control(target, ControlMessage::resolution(State::Thinking))?;
        log::info(&format!("Sending resolution to philosopher {target}."));
        Some(Payload::Rank(target))
    } else {
        None
    };

    let target = collective::broadcast(philosopher.endpoint_mut(), chosen)
        .await?
        .into_rank(COORDINATOR, Tag::Collective)?;
    if target != philosopher.rank() {
        return Ok(None);
    }

    await_resolution(philosopher).await?;
    Ok(Some(target))
}

async fn await_resolution(philosopher: &mut Philosopher) -> Result<()> {
    let poll = philosopher.config().resolution_poll();
    let limit = philosopher.config().resolution_timeout();
    let started = Instant::now();

    loop {
        match philosopher
            .endpoint_mut()
            .try_recv(COORDINATOR, Tag::Resolution)
        {
            Some(Payload::State(State::Thinking)) => {
                philosopher.force_thinking();
                return Ok(());
            }
            Some(other) => log::debug(&format!("ignoring resolution payload {other:?}")),
            None => {}
        }

        if let Some(limit) = limit {
            if started.elapsed() >= limit {
                return Err(Error::ResolutionTimeout(limit));
            }
        }
        tokio::time::sleep(poll).await;
    }
}

#[cfg(test)]
#[path = "deadlock_tests.rs"]
mod tests;
