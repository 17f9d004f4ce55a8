use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::warn;

use crate::queue::MetadataTicket;

use super::tags::{NowPlaying, read_now_playing};

/// A finished metadata read, tagged with the request it answers.
#[derive(Debug, Clone)]
pub struct MetadataReply {
    pub ticket: MetadataTicket,
    pub now_playing: NowPlaying,
}

/// Reads tags on a worker thread so file IO never stalls the event loop.
///
/// Requests are served in order. Replies may arrive after the controller
/// has moved on; callers check `ticket.epoch` before applying them.
pub struct MetadataLoader {
    tx: Option<Sender<MetadataTicket>>,
    rx: Receiver<MetadataReply>,
    join: Option<JoinHandle<()>>,
}

impl MetadataLoader {
    pub fn spawn() -> Self {
        let (tx, jobs) = mpsc::channel::<MetadataTicket>();
        let (reply_tx, rx) = mpsc::channel::<MetadataReply>();

        let join = thread::spawn(move || {
            for ticket in jobs {
                let now_playing = match ticket.path.as_deref() {
                    Some(path) => read_now_playing(path),
                    None => NowPlaying::empty(),
                };
                if reply_tx.send(MetadataReply { ticket, now_playing }).is_err() {
                    break;
                }
            }
        });

        Self {
            tx: Some(tx),
            rx,
            join: Some(join),
        }
    }

    pub fn request(&self, ticket: MetadataTicket) {
        let Some(tx) = self.tx.as_ref() else {
            return;
        };
        if tx.send(ticket).is_err() {
            warn!("metadata worker is gone; now-playing view will go stale");
        }
    }

    /// Next finished reply, if any, without blocking.
    pub fn try_recv(&self) -> Option<MetadataReply> {
        self.rx.try_recv().ok()
    }

    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<MetadataReply> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Drop for MetadataLoader {
    fn drop(&mut self) {
        // Closing the job channel ends the worker's loop.
        self.tx.take();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
