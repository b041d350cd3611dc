//! In-process ring: every rank is a task and every link is a channel.

use super::{Endpoint, Mailbox, Route};

/// Creates the endpoints of a fully connected ring of `size` ranks, ordered
/// by rank.
pub fn world(size: usize) -> Vec<Endpoint> {
    let (mailboxes, inboxes): (Vec<_>, Vec<_>) =
        (0..size).map(|rank| Mailbox::new(rank, size)).unzip();

    inboxes
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| {
            let routes = mailboxes.iter().cloned().map(Route::Local).collect();
            Endpoint::new(rank, routes, inbox)
        })
        .collect()
}
