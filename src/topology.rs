//! Ring layout: which two philosophers sit next to a given rank.

use crate::error::{Error, Result};

/// Position of one philosopher in a fixed-size ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ring {
    rank: usize,
    size: usize,
}

impl Ring {
    pub fn new(rank: usize, size: usize) -> Result<Self> {
        if size < 2 {
            return Err(Error::InvalidPhilosopherCount(size));
        }
        if rank >= size {
            return Err(Error::RankOutOfRange { rank, size });
        }
        Ok(Self { rank, size })
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn left(&self) -> usize {
        (self.rank + self.size - 1) % self.size
    }

    pub fn right(&self) -> usize {
        (self.rank + 1) % self.size
    }

    /// Rank 0 roots every collective round.
    pub fn is_coordinator(&self) -> bool {
        self.rank == 0
    }
}

/// Checks the requested philosopher count against the number of processes
/// actually launched. Runs once, before any message is sent.
pub fn validate(requested: usize, launched: usize) -> Result<()> {
    if requested < 2 {
        return Err(Error::InvalidPhilosopherCount(requested));
    }
    if requested != launched {
        return Err(Error::CountMismatch {
            requested,
            launched,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "topology_tests.rs"]
mod tests;
