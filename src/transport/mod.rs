//! Point-to-point message fabric between philosophers.
//!
//! Every rank owns one inbox queue per `(source, tag)` pair, so delivery is
//! FIFO between two ranks on the same tag while different tags never block
//! each other. The in-process ring wires those queues directly; the TCP ring
//! feeds them from per-peer reader tasks.

pub mod local;
pub mod tcp;

use crate::error::{Error, Result};
use crate::message::{ControlMessage, Envelope, Payload, Tag};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

fn slot(source: usize, tag: Tag) -> usize {
    source * Tag::ALL.len() + tag.index()
}

/// Sending half of a rank's inbox queues.
#[derive(Clone)]
pub(crate) struct Mailbox {
    rank: usize,
    senders: Arc<Vec<UnboundedSender<Payload>>>,
}

impl Mailbox {
    /// Function that creates the queues of `rank` in a ring of `size`.
    pub(crate) fn new(rank: usize, size: usize) -> (Self, Vec<UnboundedReceiver<Payload>>) {
        let (senders, receivers) = (0..size * Tag::ALL.len())
            .map(|_| mpsc::unbounded_channel())
            .unzip::<_, _, Vec<_>, Vec<_>>();

        (
            Self {
                rank,
                senders: Arc::new(senders),
            },
            receivers,
        )
    }

    pub(crate) fn deliver(&self, source: usize, tag: Tag, payload: Payload) -> Result<()> {
        let size = self.senders.len() / Tag::ALL.len();
        let sender = self
            .senders
            .get(slot(source, tag))
            .ok_or(Error::RankOutOfRange { rank: source, size })?;

        sender
            .send(payload)
            .map_err(|_| Error::Disconnected { peer: self.rank })
    }
}

/// How a rank reaches one destination.
pub(crate) enum Route {
    Local(Mailbox),
    Remote(UnboundedSender<Envelope>),
}

/// A philosopher's handle on the fabric.
pub struct Endpoint {
    rank: usize,
    size: usize,
    routes: Vec<Route>,
    inbox: Vec<UnboundedReceiver<Payload>>,
    writers: Vec<JoinHandle<()>>,
}

impl Endpoint {
    pub(crate) fn new(
        rank: usize,
        routes: Vec<Route>,
        inbox: Vec<UnboundedReceiver<Payload>>,
    ) -> Self {
        Self {
            rank,
            size: routes.len(),
            routes,
            inbox,
            writers: Vec::new(),
        }
    }

    pub(crate) fn with_writers(mut self, writers: Vec<JoinHandle<()>>) -> Self {
        self.writers = writers;
        self
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Queues `payload` for `dest` without waiting for it to be received.
    pub fn send(&self, dest: usize, tag: Tag, payload: Payload) -> Result<()> {
        let route = self.routes.get(dest).ok_or(Error::RankOutOfRange {
            rank: dest,
            size: self.size,
        })?;

        match route {
            Route::Local(mailbox) => mailbox.deliver(self.rank, tag, payload),
            Route::Remote(writer) => writer
                .send(Envelope {
                    source: self.rank,
                    tag,
                    payload,
                })
                .map_err(|_| Error::Disconnected { peer: dest }),
        }
    }

    pub fn send_control(&self, dest: usize, message: ControlMessage) -> Result<()> {
        let envelope = message.into_envelope(self.rank);
        self.send(dest, envelope.tag, envelope.payload)
    }

    /// Waits for the next message from `source` on `tag`. There is no
    /// timeout: if nothing is ever sent, this never returns.
    pub async fn recv(&mut self, source: usize, tag: Tag) -> Result<Payload> {
        let size = self.size;
        let queue = self
            .inbox
            .get_mut(slot(source, tag))
            .ok_or(Error::RankOutOfRange { rank: source, size })?;

        queue
            .recv()
            .await
            .ok_or(Error::Disconnected { peer: source })
    }

    /// Takes an already buffered message from `source` on `tag`, if any.
    pub fn try_recv(&mut self, source: usize, tag: Tag) -> Option<Payload> {
        self.inbox
            .get_mut(slot(source, tag))
            .and_then(|queue| queue.try_recv().ok())
    }

    /// Discards every buffered message from `source` on `tag`.
    pub fn drain(&mut self, source: usize, tag: Tag) -> usize {
        let mut drained = 0;
        while self.try_recv(source, tag).is_some() {
            drained += 1;
        }
        drained
    }

    /// Closes every outgoing link once what is already queued has been
    /// written out.
    pub async fn shutdown(self) {
        let Self { routes, writers, .. } = self;
        drop(routes);
        for writer in writers {
            let _ = writer.await;
        }
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
