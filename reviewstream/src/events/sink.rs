//! Message sink trait and implementations.

use crate::core::{Envelope, Message};
use parking_lot::RwLock;

/// Receives the messages a run produces.
///
/// Delivery never blocks and never fails loudly. A sink that can no longer
/// accept messages returns `false` and drops the envelope.
pub trait MessageSink: Send + Sync {
    /// Delivers one envelope.
    ///
    /// Returns `false` if the envelope was dropped.
    fn deliver(&self, envelope: Envelope) -> bool;
}

/// A sink that keeps every envelope in memory.
///
/// Backs the blocking review endpoint and the test suite.
#[derive(Debug, Default)]
pub struct CollectingMessageSink {
    envelopes: RwLock<Vec<Envelope>>,
}

impl CollectingMessageSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected envelopes, in delivery order.
    #[must_use]
    pub fn envelopes(&self) -> Vec<Envelope> {
        self.envelopes.read().clone()
    }

    /// Returns the collected messages without their envelopes.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.envelopes
            .read()
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    /// Returns the terminal message, if one was delivered.
    #[must_use]
    pub fn terminal(&self) -> Option<Message> {
        self.envelopes
            .read()
            .iter()
            .rev()
            .find(|e| e.message.is_terminal())
            .map(|e| e.message.clone())
    }

    /// Returns the number of collected envelopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.envelopes.read().len()
    }

    /// Returns true if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.envelopes.read().is_empty()
    }
}

impl MessageSink for CollectingMessageSink {
    fn deliver(&self, envelope: Envelope) -> bool {
        self.envelopes.write().push(envelope);
        true
    }
}
