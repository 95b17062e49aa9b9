//! Cooperative scheduling primitives.
//!
//! Nothing here spawns threads. [`Scheduler`] collects one-shot work to run
//! on the next turn of the host's event loop, and [`ChannelExecutor`] holds a
//! short queue of interactive requests.

use std::collections::VecDeque;

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};
use tracing::trace;

/// One-shot tasks deferred to the next tick.
///
/// Tasks registered while a tick is draining wait for the following tick, so
/// geometry applied during one turn settles before it is read back.
#[derive(Debug)]
pub struct Scheduler<T> {
    pending: VecDeque<T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self { Scheduler { pending: VecDeque::new() } }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self { Self::default() }

    pub fn register(&mut self, task: T) { self.pending.push_back(task) }

    /// Takes every task queued so far.
    pub fn take(&mut self) -> Vec<T> { self.pending.drain(..).collect() }

    pub fn len(&self) -> usize { self.pending.len() }

    pub fn is_empty(&self) -> bool { self.pending.is_empty() }

    pub fn clear(&mut self) { self.pending.clear() }
}

/// Bounded request queue holding at most `CAPACITY` requests.
///
/// When full, the oldest queued request is evicted so the newest intent is
/// always kept.
pub struct ChannelExecutor<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> ChannelExecutor<T> {
    pub const CAPACITY: usize = 2;

    pub fn new() -> Self {
        let (tx, rx) = bounded(Self::CAPACITY);
        ChannelExecutor { tx, rx }
    }

    pub fn send(&self, request: T) {
        let mut request = request;
        loop {
            match self.tx.try_send(request) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    trace!("request queue full, evicting oldest request");
                    let _ = self.rx.try_recv();
                    request = rejected;
                }
                // We own both ends, so the channel cannot disconnect.
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    pub fn next(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(request) => Some(request),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize { self.rx.len() }

    pub fn is_empty(&self) -> bool { self.rx.is_empty() }

    pub fn clear(&self) { while self.rx.try_recv().is_ok() {} }
}

impl<T> Default for ChannelExecutor<T> {
    fn default() -> Self { Self::new() }
}
