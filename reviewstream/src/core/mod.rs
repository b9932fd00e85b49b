//! Core domain model types for reviewstream.
//!
//! This module contains the fundamental types used throughout the service:
//! - Stage capabilities and their declared dependencies
//! - Run and message status enums
//! - The outward message protocol

mod capability;
mod message;
mod status;

pub use capability::Capability;
pub use message::{Envelope, Message};
pub use status::{MessageStatus, MessageType, RunStatus};
