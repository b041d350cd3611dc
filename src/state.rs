//! Philosopher states and the rules for moving between them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// State of a single philosopher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum State {
    #[default]
    Thinking,
    Hungry,
    Eating,
}

impl State {
    /// The state that follows `self` in the Thinking, Hungry, Eating cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Thinking => Self::Hungry,
            Self::Hungry => Self::Eating,
            Self::Eating => Self::Thinking,
        }
    }

    /// Checks a protocol transition.
    ///
    /// Re-entering the current state is always allowed, as is any move back
    /// to `Thinking` (releasing forks, or a forced resolution). Eating can only
    /// be reached from Hungry.
    pub fn transition(self, to: Self) -> Result<Self> {
        if to == self || to == Self::Thinking || self.next() == to {
            Ok(to)
        } else {
            Err(Error::IllegalTransition { from: self, to })
        }
    }

    pub fn is_thinking(self) -> bool {
        self == Self::Thinking
    }

    pub fn is_hungry(self) -> bool {
        self == Self::Hungry
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
