//! Error types shared by every part of the ring.

use crate::message::Tag;
use crate::state::State;
use thiserror::Error;

/// Errors that can occur while setting up or running the ring
#[derive(Debug, Error)]
pub enum Error {
    #[error("a ring needs at least 2 philosophers, got {0}")]
    InvalidPhilosopherCount(usize),
    #[error("requested {requested} philosophers but {launched} were launched")]
    CountMismatch { requested: usize, launched: usize },
    #[error("rank {rank} is outside a ring of {size}")]
    RankOutOfRange { rank: usize, size: usize },
    #[error("illegal transition from {from:?} to {to:?}")]
    IllegalTransition { from: State, to: State },
    #[error("rank {peer} is no longer reachable")]
    Disconnected { peer: usize },
    #[error("unexpected payload from rank {peer} on {tag:?}: {found}")]
    UnexpectedPayload { peer: usize, tag: Tag, found: String },
    #[error("no resolution message arrived within {0:?}")]
    ResolutionTimeout(std::time::Duration),
    #[error("table must be validated and prepared before it can run")]
    NotPrepared,
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("line codec error: {0}")]
    Lines(#[from] tokio_util::codec::LinesCodecError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("philosopher task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Configuration errors are fatal and reported before any messaging.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidPhilosopherCount(_)
                | Self::CountMismatch { .. }
                | Self::RankOutOfRange { .. }
                | Self::Config(_)
        )
    }
}
