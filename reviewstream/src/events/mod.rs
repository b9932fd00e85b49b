//! Lifecycle events and their translation into the message protocol.
//!
//! The runner reports raw [`LifecycleEvent`]s. The [`EventTranslator`] turns
//! them into [`Message`](crate::core::Message)s, which are handed to a
//! [`MessageSink`].

mod lifecycle;
mod sink;
mod translator;

pub use lifecycle::LifecycleEvent;
pub use sink::{CollectingMessageSink, MessageSink};
pub use translator::{EventTranslator, Interpretation};
