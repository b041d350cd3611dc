//! Ring of separate processes talking JSON lines over TCP.
//!
//! Each rank listens on its own address and dials every other rank. An
//! outgoing stream carries only that rank's envelopes, so per-stream ordering
//! gives the same FIFO guarantee as the in-process ring.

use super::{Endpoint, Mailbox, Route};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::log;
use crate::message::{Envelope, Hello};
use futures::{SinkExt, StreamExt};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc,
    time::sleep,
};
use tokio_util::codec::{Framed, LinesCodec};

/// Connects rank `rank` to every address in `addresses` (indexed by rank).
pub async fn connect(rank: usize, addresses: &[String], config: &Config) -> Result<Endpoint> {
    let size = addresses.len();
    let own_address = addresses
        .get(rank)
        .ok_or(Error::RankOutOfRange { rank, size })?;

    let (mailbox, inbox) = Mailbox::new(rank, size);

    // open a listener for every other rank to dial into
    let listener = TcpListener::bind(own_address).await?;
    log::info(&format!("Rank {rank} listening on {own_address}."));

    {
        let mailbox = mailbox.clone();
        tokio::spawn(async move {
            for _ in 1..size {
                match listener.accept().await {
                    Ok((stream, _address)) => {
                        let mailbox = mailbox.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_peer(stream, mailbox).await {
                                log::error(&format!("{e}"));
                            }
                        });
                    }
                    Err(e) => {
                        log::error(&format!("Couldn't accept a peer connection: {e}"));
                        break;
                    }
                }
            }
        });
    }

    let mut routes = Vec::with_capacity(size);
    let mut writers = Vec::with_capacity(size);
    for (peer, address) in addresses.iter().enumerate() {
        if peer == rank {
            routes.push(Route::Local(mailbox.clone()));
            continue;
        }

        let stream = dial(address, config).await?;
        let mut lines = Framed::new(stream, LinesCodec::new());
        lines.send(Hello { rank }.to_json_string()?).await?;

        let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();
        writers.push(tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let line = match envelope.to_json_string() {
                    Ok(line) => line,
                    Err(e) => {
                        log::error(&format!("{e}"));
                        continue;
                    }
                };
                if lines.send(line).await.is_err() {
                    log::error(&format!("Couldn't send to rank {peer}."));
                    break;
                }
            }
        }));

        routes.push(Route::Remote(tx));
    }

    Ok(Endpoint::new(rank, routes, inbox).with_writers(writers))
}

async fn dial(address: &str, config: &Config) -> Result<TcpStream> {
    let mut attempt = 1;
    loop {
        match TcpStream::connect(address).await {
            Ok(stream) => return Ok(stream),
            Err(e) if attempt >= config.connect_attempts => return Err(e.into()),
            Err(_) => {
                log::debug(&format!("{address} not up yet (attempt {attempt})"));
                attempt += 1;
                sleep(config.connect_backoff()).await;
            }
        }
    }
}

/// Reads envelopes from one peer and files them into this rank's inbox.
async fn handle_peer(stream: TcpStream, mailbox: Mailbox) -> Result<()> {
    let mut lines = Framed::new(stream, LinesCodec::new());

    let peer = match lines.next().await {
        Some(line) => Hello::from_json_string(&line?)?.rank,
        None => return Ok(()),
    };
    log::debug(&format!("rank {peer} connected"));

    while let Some(line) = lines.next().await {
        let envelope = Envelope::from_json_string(&line?)?;
        if envelope.source != peer {
            log::warn(&format!(
                "dropping envelope claiming rank {} on the stream of rank {peer}",
                envelope.source
            ));
            continue;
        }
        // the local endpoint is gone once its philosopher has left the table
        if mailbox
            .deliver(envelope.source, envelope.tag, envelope.payload)
            .is_err()
        {
            log::debug(&format!("discarding late message from rank {peer}"));
            break;
        }
    }

    Ok(())
}
