//! Per-chunk handoff slots.
//!
//! A slot is a single-capacity channel used exactly once: one producer, one
//! consumer, buffer ownership transfers on the send. Senders and receivers
//! sit in `Option` cells so each endpoint can be claimed by exactly one
//! worker; a dropped endpoint is how downstream workers learn that the
//! other side of a handoff died.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

/// One slot array: chunk `i`'s producer endpoint at `senders[i]` and its
/// consumer endpoint at `receivers[i]`.
pub(crate) struct Slots<T> {
    pub senders: Vec<Option<SyncSender<T>>>,
    pub receivers: Vec<Option<Receiver<T>>>,
}

/// Allocates `count` single-capacity slots.
pub(crate) fn slots<T>(count: usize) -> Slots<T> {
    let mut senders = Vec::with_capacity(count);
    let mut receivers = Vec::with_capacity(count);
    for _ in 0..count {
        let (tx, rx) = sync_channel(1);
        senders.push(Some(tx));
        receivers.push(Some(rx));
    }
    Slots { senders, receivers }
}
