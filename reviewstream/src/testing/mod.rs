//! Testing utilities for review pipelines.
//!
//! This module provides:
//! - Scripted stages with fixed outcomes
//! - Sample documents and stage payloads
//! - Message stream collection and assertions

mod assertions;
pub mod fixtures;
mod mocks;

pub use assertions::{
    assert_results_announced, assert_single_terminal_last, collect_messages, message_kinds,
};
pub use mocks::{Script, ScriptedStage};
