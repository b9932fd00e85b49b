//! FIFO hand-off between the worker task and the response stream.

use crate::core::Envelope;
use crate::events::MessageSink;
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Debug, Default)]
struct State {
    items: VecDeque<Envelope>,
    detached: bool,
}

/// An unbounded, ordered queue of envelopes.
///
/// The producer never blocks: the queue grows instead. Once the consumer
/// detaches, pending envelopes are discarded and further pushes are dropped.
#[derive(Debug, Default)]
pub struct BridgeQueue {
    state: Mutex<State>,
}

impl BridgeQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an envelope.
    ///
    /// Returns `false` if the consumer has detached.
    pub fn push(&self, envelope: Envelope) -> bool {
        let mut state = self.state.lock();
        if state.detached {
            return false;
        }
        state.items.push_back(envelope);
        true
    }

    /// Removes the oldest envelope without waiting.
    pub fn try_pop(&self) -> Option<Envelope> {
        self.state.lock().items.pop_front()
    }

    /// Releases the queue: drops pending envelopes and refuses new ones.
    pub fn detach(&self) {
        let mut state = self.state.lock();
        state.detached = true;
        state.items.clear();
    }

    /// Returns true once the consumer has detached.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.state.lock().detached
    }

    /// Returns the number of pending envelopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }
}

impl MessageSink for BridgeQueue {
    fn deliver(&self, envelope: Envelope) -> bool {
        self.push(envelope)
    }
}
