//! Collective rounds rooted at the coordinator (rank 0).
//!
//! All traffic here uses [`Tag::Collective`], which keeps it apart from fork
//! acknowledgements and resolution messages. Every rank must enter the same
//! sequence of collective calls.

use crate::error::{Error, Result};
use crate::message::{Payload, StartFlag, Tag};
use crate::state::State;
use crate::transport::Endpoint;

pub const COORDINATOR: usize = 0;

/// Sends `value` to the coordinator. The coordinator gets every value back in
/// rank order, other ranks get `None`.
pub async fn gather(endpoint: &mut Endpoint, value: Payload) -> Result<Option<Vec<Payload>>> {
    if endpoint.rank() != COORDINATOR {
        endpoint.send(COORDINATOR, Tag::Collective, value)?;
        return Ok(None);
    }

    let mut values = Vec::with_capacity(endpoint.size());
    values.push(value);
    for source in 1..endpoint.size() {
        values.push(endpoint.recv(source, Tag::Collective).await?);
    }
    Ok(Some(values))
}

/// Fans the coordinator's `value` out to every rank. Only the coordinator's
/// argument is used.
pub async fn broadcast(endpoint: &mut Endpoint, value: Option<Payload>) -> Result<Payload> {
    if endpoint.rank() != COORDINATOR {
        return endpoint.recv(COORDINATOR, Tag::Collective).await;
    }

    let value = value.ok_or_else(|| Error::UnexpectedPayload {
        peer: COORDINATOR,
        tag: Tag::Collective,
        found: "nothing to broadcast".to_string(),
    })?;
    for dest in 1..endpoint.size() {
        endpoint.send(dest, Tag::Collective, value.clone())?;
    }
    Ok(value)
}

/// Every rank ends up with the state of every rank, indexed by rank.
pub async fn all_gather_states(endpoint: &mut Endpoint, state: State) -> Result<Vec<State>> {
    let snapshot = match gather(endpoint, Payload::State(state)).await? {
        Some(values) => Some(Payload::Snapshot(
            values
                .into_iter()
                .enumerate()
                .map(|(rank, value)| value.into_state(rank, Tag::Collective))
                .collect::<Result<Vec<_>>>()?,
        )),
        None => None,
    };

    broadcast(endpoint, snapshot)
        .await?
        .into_snapshot(COORDINATOR, Tag::Collective)
}

/// Waits until every rank has reported ready, then releases all of them with
/// the coordinator's start flag.
pub async fn start_barrier(endpoint: &mut Endpoint) -> Result<StartFlag> {
    let ready = gather(endpoint, Payload::Flag(true)).await?;
    let flag = ready.map(|_| Payload::Flag(true));
    let start = broadcast(endpoint, flag)
        .await?
        .into_flag(COORDINATOR, Tag::Collective)?;
    Ok(StartFlag(start))
}

#[cfg(test)]
#[path = "collective_tests.rs"]
mod tests;
