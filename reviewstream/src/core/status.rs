//! Run and message status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle status of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Created, no stage started yet.
    #[default]
    Pending,
    /// At least one stage has started.
    Running,
    /// Every stage finished and the completed message was emitted.
    Completed,
    /// The run ended with an error message.
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl RunStatus {
    /// Returns true if the run can no longer change state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// The kind of an outward message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// A stage has started working.
    Thinking,
    /// A stage produced its result.
    Result,
    /// The run failed.
    Error,
    /// The run finished.
    Completed,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thinking => write!(f, "thinking"),
            Self::Result => write!(f, "result"),
            Self::Error => write!(f, "error"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// The status carried by an outward message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// The announced stage is running.
    Executing,
    /// The announced stage has finished.
    Executed,
    /// The whole run finished.
    Completed,
    /// The whole run failed.
    Error,
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executing => write!(f, "executing"),
            Self::Executed => write!(f, "executed"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl MessageStatus {
    /// Returns true if a message with this status ends the stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_display() {
        assert_eq!(RunStatus::Pending.to_string(), "pending");
        assert_eq!(RunStatus::Running.to_string(), "running");
        assert_eq!(RunStatus::Completed.to_string(), "completed");
        assert_eq!(RunStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_run_status_is_terminal() {
        assert!(!RunStatus::Pending.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
    }

    #[test]
    fn test_message_status_is_terminal() {
        assert!(!MessageStatus::Executing.is_terminal());
        assert!(!MessageStatus::Executed.is_terminal());
        assert!(MessageStatus::Completed.is_terminal());
        assert!(MessageStatus::Error.is_terminal());
    }

    #[test]
    fn test_message_type_serialize() {
        let json = serde_json::to_string(&MessageType::Thinking).unwrap();
        assert_eq!(json, r#""thinking""#);

        let deserialized: MessageType = serde_json::from_str(r#""completed""#).unwrap();
        assert_eq!(deserialized, MessageType::Completed);
    }
}
