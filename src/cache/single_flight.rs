use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;

use crate::errors::{Result, SnaplinkError};

/// Result shared by every caller that joined one origin read.
pub type FlightOutcome = Result<Option<Arc<str>>>;

type Slot = watch::Receiver<Option<FlightOutcome>>;

/// How a caller takes part in a keyed origin read.
pub enum Join {
    /// The key became readable while joining; no flight needed.
    Ready(Arc<str>),
    /// This caller must perform the read and publish through the sender.
    Leader(watch::Sender<Option<FlightOutcome>>, Slot),
    /// Another caller is reading; wait on its outcome.
    Follower(Slot),
}

/// In-flight origin reads keyed by short code.
#[derive(Default)]
pub struct SingleFlight {
    inflight: DashMap<String, Slot>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the flight for `key`, or start one.
    ///
    /// `recheck` runs under the map guard when no flight exists, so a leader
    /// that filled the cache and left just before this call is observed.
    pub fn join(&self, key: &str, recheck: impl FnOnce() -> Option<Arc<str>>) -> Join {
        match self.inflight.entry(key.to_string()) {
            // A closed channel still in the map means the leader died without
            // finishing; take the flight over.
            Entry::Occupied(flight) if flight.get().has_changed().is_ok() => {
                Join::Follower(flight.get().clone())
            }
            Entry::Occupied(mut flight) => {
                if let Some(value) = recheck() {
                    flight.remove();
                    return Join::Ready(value);
                }
                let (tx, rx) = watch::channel(None);
                flight.insert(rx.clone());
                Join::Leader(tx, rx)
            }
            Entry::Vacant(slot) => {
                if let Some(value) = recheck() {
                    return Join::Ready(value);
                }
                let (tx, rx) = watch::channel(None);
                slot.insert(rx.clone());
                Join::Leader(tx, rx)
            }
        }
    }

    /// Leader only: retire the flight so later callers start fresh.
    pub fn finish(&self, key: &str) {
        self.inflight.remove(key);
    }

    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }

    /// Wait for the leader's outcome.
    pub async fn wait(mut rx: Slot) -> FlightOutcome {
        match rx.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone().unwrap_or_else(|| {
                Err(SnaplinkError::origin_unavailable("origin read produced no outcome"))
            }),
            Err(_) => Err(SnaplinkError::origin_unavailable(
                "origin read was abandoned",
            )),
        }
    }
}
