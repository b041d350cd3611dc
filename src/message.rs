//! Module that contains every message exchanged between philosophers.

use crate::error::{Error, Result};
use crate::state::State;
use serde::{Deserialize, Serialize};

/// Namespace a message travels in. Receivers always name the tag they wait
/// on, so traffic in one namespace can never be consumed by another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// Fork requests and acknowledgements between ring neighbours.
    ForkProtocol,
    /// Forced release sent by the coordinator.
    Resolution,
    /// Gather and broadcast rounds rooted at the coordinator.
    Collective,
}

impl Tag {
    pub const ALL: [Tag; 3] = [Tag::ForkProtocol, Tag::Resolution, Tag::Collective];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::ForkProtocol => 0,
            Self::Resolution => 1,
            Self::Collective => 2,
        }
    }
}

/// A state-carrying message between two specific ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMessage {
    pub kind: State,
    pub tag: Tag,
}

/// Body of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    State(State),
    Snapshot(Vec<State>),
    Flag(bool),
    Rank(usize),
}

/// Unit sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub source: usize,
    pub tag: Tag,
    pub payload: Payload,
}

/// First line a rank writes on every outgoing connection, so the receiving
/// side knows which rank the stream belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    pub rank: usize,
}

/// Flag the coordinator broadcasts once every rank has reported ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartFlag(pub bool);

impl ControlMessage {
    pub fn fork(kind: State) -> Self {
        Self {
            kind,
            tag: Tag::ForkProtocol,
        }
    }

    pub fn resolution(kind: State) -> Self {
        Self {
            kind,
            tag: Tag::Resolution,
        }
    }

    /// Function that wraps the message into an envelope from `source`.
    pub fn into_envelope(self, source: usize) -> Envelope {
        Envelope {
            source,
            tag: self.tag,
            payload: Payload::State(self.kind),
        }
    }
}

impl Payload {
    pub fn describe(&self) -> String {
        format!("{self:?}")
    }

    pub fn into_state(self, peer: usize, tag: Tag) -> Result<State> {
        match self {
            Self::State(state) => Ok(state),
            other => Err(unexpected(peer, tag, &other)),
        }
    }

    pub fn into_snapshot(self, peer: usize, tag: Tag) -> Result<Vec<State>> {
        match self {
            Self::Snapshot(states) => Ok(states),
            other => Err(unexpected(peer, tag, &other)),
        }
    }

    pub fn into_flag(self, peer: usize, tag: Tag) -> Result<bool> {
        match self {
            Self::Flag(flag) => Ok(flag),
            other => Err(unexpected(peer, tag, &other)),
        }
    }

    pub fn into_rank(self, peer: usize, tag: Tag) -> Result<usize> {
        match self {
            Self::Rank(rank) => Ok(rank),
            other => Err(unexpected(peer, tag, &other)),
        }
    }
}

fn unexpected(peer: usize, tag: Tag, payload: &Payload) -> Error {
    Error::UnexpectedPayload {
        peer,
        tag,
        found: payload.describe(),
    }
}

impl Envelope {
    /// Function that returns the envelope as a JSON formatted `String`.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Function that parses an envelope from a JSON formatted `String`.
    pub fn from_json_string(line: &str) -> Result<Self> {
        Ok(serde_json::from_str::<Self>(line)?)
    }
}

impl Hello {
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_string(line: &str) -> Result<Self> {
        Ok(serde_json::from_str::<Self>(line)?)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
