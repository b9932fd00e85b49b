//! Stream emitter: drains the bridge queue into ndjson lines.

use super::BridgeQueue;
use crate::cancellation::CancellationToken;
use crate::core::Message;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Reason recorded on the token when the client goes away.
pub const CLIENT_DISCONNECTED: &str = "client disconnected";

/// Polls a [`BridgeQueue`] and turns envelopes into ndjson lines.
#[derive(Debug, Clone)]
pub struct StreamEmitter {
    queue: Arc<BridgeQueue>,
    flush_interval: Duration,
    idle_interval: Duration,
}

impl StreamEmitter {
    /// Creates an emitter over `queue`.
    ///
    /// `flush_interval` is the pause after writing a line, `idle_interval`
    /// the pause after finding the queue empty.
    #[must_use]
    pub fn new(queue: Arc<BridgeQueue>, flush_interval: Duration, idle_interval: Duration) -> Self {
        Self {
            queue,
            flush_interval,
            idle_interval,
        }
    }

    /// Starts streaming.
    ///
    /// Dropping the returned stream before a terminal message has been
    /// written detaches the queue and cancels `token`.
    #[must_use]
    pub fn into_stream(self, token: Arc<CancellationToken>) -> ReviewStream {
        let finished = Arc::new(AtomicBool::new(false));
        let guard = DetachOnDrop {
            queue: Arc::clone(&self.queue),
            token,
            finished: Arc::clone(&finished),
        };

        let state = EmitState {
            emitter: self,
            finished,
            just_wrote: false,
            last_sequence: None,
        };

        let lines = stream::unfold(state, |mut state| async move {
            if state.finished.load(Ordering::SeqCst) {
                return None;
            }
            if state.just_wrote {
                // let the transport flush the previous chunk
                tokio::time::sleep(state.emitter.flush_interval).await;
                state.just_wrote = false;
            }

            loop {
                if let Some(envelope) = state.emitter.queue.try_pop() {
                    state.observe(envelope.sequence);
                    let terminal = envelope.message.is_terminal();
                    let line = encode(&envelope.message);
                    if terminal {
                        debug!(sequence = envelope.sequence, "Terminal message written");
                        state.finished.store(true, Ordering::SeqCst);
                    }
                    state.just_wrote = true;
                    return Some((line, state));
                }
                tokio::time::sleep(state.emitter.idle_interval).await;
            }
        });

        ReviewStream {
            lines: lines.boxed(),
            guard,
        }
    }
}

struct EmitState {
    emitter: StreamEmitter,
    finished: Arc<AtomicBool>,
    just_wrote: bool,
    last_sequence: Option<u64>,
}

impl EmitState {
    fn observe(&mut self, sequence: u64) {
        if let Some(last) = self.last_sequence {
            if sequence != last + 1 {
                warn!(last, sequence, "Non-contiguous message sequence");
            }
        }
        self.last_sequence = Some(sequence);
    }
}

fn encode(message: &Message) -> String {
    message.to_ndjson().unwrap_or_else(|e| {
        error!(error = %e, "Failed to serialize message");
        let fallback = Message::error(format!("Error occurred during review: {e}"));
        fallback
            .to_ndjson()
            .unwrap_or_else(|_| "{\"message_type\":\"error\",\"status\":\"error\"}\n".to_string())
    })
}

struct DetachOnDrop {
    queue: Arc<BridgeQueue>,
    token: Arc<CancellationToken>,
    finished: Arc<AtomicBool>,
}

impl Drop for DetachOnDrop {
    fn drop(&mut self) {
        self.queue.detach();
        if !self.finished.load(Ordering::SeqCst) {
            info!("Client disconnected before the review finished");
            self.token.cancel(CLIENT_DISCONNECTED);
        }
    }
}

/// The ndjson body of one review response.
///
/// Ends right after the first terminal message.
pub struct ReviewStream {
    lines: BoxStream<'static, String>,
    guard: DetachOnDrop,
}

impl ReviewStream {
    /// Returns true once the terminal message has been written.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.guard.finished.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ReviewStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewStream")
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

impl Stream for ReviewStream {
    type Item = String;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().lines.poll_next_unpin(cx)
    }
}
