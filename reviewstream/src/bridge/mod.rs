//! Concurrency bridge between the worker task and the HTTP response.
//!
//! The runner pushes envelopes into a [`BridgeQueue`]; a [`StreamEmitter`]
//! polls it from the request task and yields one ndjson line per message.

mod emitter;
mod queue;

pub use emitter::{ReviewStream, StreamEmitter, CLIENT_DISCONNECTED};
pub use queue::BridgeQueue;
