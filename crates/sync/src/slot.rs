//! Single-owner state slots with issue-order fencing.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// Value tagged with the ticket of the refresh that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<T> {
    pub seq: u64,
    pub value: T,
}

/// Issue order of a refresh. Obtained before the request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Holds one piece of server-confirmed state and publishes replacements.
///
/// Values are replaced wholesale. A value is applied only when its ticket is
/// newer than the one already applied, so a slow response can never overwrite
/// the result of a refresh issued after it.
#[derive(Debug)]
pub struct StateSlot<T> {
    tx: watch::Sender<Stamped<T>>,
    issued: AtomicU64,
}

impl<T> StateSlot<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(Stamped {
            seq: 0,
            value: initial,
        });
        Self {
            tx,
            issued: AtomicU64::new(0),
        }
    }

    pub fn ticket(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Applies `value` if `ticket` is the newest seen so far.
    pub fn apply(&self, ticket: Ticket, value: T) -> bool {
        let mut value = Some(value);
        self.tx.send_if_modified(|current| {
            if ticket.0 <= current.seq {
                return false;
            }
            if let Some(value) = value.take() {
                *current = Stamped {
                    seq: ticket.0,
                    value,
                };
            }
            true
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Stamped<T>> {
        self.tx.subscribe()
    }
}

impl<T: Clone> StateSlot<T> {
    pub fn current(&self) -> T {
        self.tx.borrow().value.clone()
    }
}

impl<T: Default> Default for StateSlot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
