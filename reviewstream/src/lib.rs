//! # Reviewstream
//!
//! A streaming multi-stage design review service.
//!
//! A submitted design document goes through four analysis stages
//! (document understanding, performance review, security review and
//! synthesis). Progress is streamed back to the caller as newline-delimited
//! JSON messages while the pipeline runs:
//!
//! - **Validation gate**: a pre-flight length check and a data-dependent
//!   abort after document understanding
//! - **Pipeline runner**: sequential, dependency-ordered stage execution on a
//!   worker task, with per-stage deadlines and cooperative cancellation
//! - **Event translator**: lifecycle events to outward messages, recovering
//!   fenced JSON from free-text stage output
//! - **Bridge**: a FIFO hand-off queue drained by a polling ndjson stream
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reviewstream::prelude::*;
//!
//! let config = ReviewConfig::load(None)?;
//! let service = ReviewService::from_stages(stages, &config)?;
//!
//! let mut stream = service.review_design_document(document);
//! while let Some(line) = stream.next().await {
//!     print!("{line}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod bridge;
pub mod cancellation;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod schemas;
pub mod server;
pub mod service;
pub mod stages;
pub mod testing;
pub mod validation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bridge::{BridgeQueue, ReviewStream, StreamEmitter};
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{LogFormat, ReviewConfig};
    pub use crate::core::{Capability, Envelope, Message, MessageStatus, MessageType, RunStatus};
    pub use crate::errors::{
        PipelineValidationError, ReviewError, StageExecutionFailure, TranslationDegradation,
        ValidationFailure,
    };
    pub use crate::events::{CollectingMessageSink, EventTranslator, MessageSink};
    pub use crate::pipeline::{Pipeline, PipelineBuilder, PipelineRun, PipelineRunner, StageSpec};
    pub use crate::service::ReviewService;
    #[cfg(feature = "llm")]
    pub use crate::stages::{LlmClient, LlmStage};
    pub use crate::stages::{AgentProfile, Stage, StageContext, StageOutput, StageResult};
    pub use crate::validation::{ValidatedInput, ValidationGate};
}
