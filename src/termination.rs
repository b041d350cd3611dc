//! Global quiescence check.

use crate::collective;
use crate::error::Result;
use crate::philosopher::Philosopher;
use crate::state::State;

/// True when every philosopher in the ring is thinking. Every rank
/// contributes its state and receives the same snapshot, so every rank
/// reaches the same answer.
pub async fn all_thinking(philosopher: &mut Philosopher) -> Result<bool> {
    let state = philosopher.state();
    let snapshot = collective::all_gather_states(philosopher.endpoint_mut(), state).await?;
    Ok(snapshot.iter().copied().all(State::is_thinking))
}
