//! The outward message protocol.

use super::{MessageStatus, MessageType};
use serde::{Deserialize, Serialize};

/// One normalized progress or outcome message streamed to the client.
///
/// Messages are immutable once built; absent optional fields are omitted
/// from the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Display name of the agent that produced the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,

    /// The message kind.
    pub message_type: MessageType,

    /// The message status.
    pub status: MessageStatus,

    /// Structured stage result (only on `result` and `completed`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<serde_json::Value>,

    /// Human-readable text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Message {
    /// Announces that an agent started working.
    #[must_use]
    pub fn thinking(agent: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            agent: Some(agent.into()),
            message_type: MessageType::Thinking,
            status: MessageStatus::Executing,
            report: None,
            message: Some(text.into()),
        }
    }

    /// Carries an agent's structured result.
    #[must_use]
    pub fn result(agent: impl Into<String>, report: Option<serde_json::Value>) -> Self {
        Self {
            agent: Some(agent.into()),
            message_type: MessageType::Result,
            status: MessageStatus::Executed,
            report,
            message: None,
        }
    }

    /// Ends the stream successfully.
    #[must_use]
    pub fn completed(report: Option<serde_json::Value>, text: impl Into<String>) -> Self {
        Self {
            agent: None,
            message_type: MessageType::Completed,
            status: MessageStatus::Completed,
            report,
            message: Some(text.into()),
        }
    }

    /// Ends the stream with a failure.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            agent: None,
            message_type: MessageType::Error,
            status: MessageStatus::Error,
            report: None,
            message: Some(text.into()),
        }
    }

    /// Returns true if this message ends the stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Serializes the message as one ndjson line, trailing newline included.
    ///
    /// # Errors
    ///
    /// Returns an error if the report payload cannot be serialized.
    pub fn to_ndjson(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// A message stamped with its position in the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Monotonically increasing per run, starting at 0.
    pub sequence: u64,
    /// The wrapped message.
    pub message: Message,
}

impl Envelope {
    /// Wraps a message.
    #[must_use]
    pub fn new(sequence: u64, message: Message) -> Self {
        Self { sequence, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_thinking_message() {
        let msg = Message::thinking("Librarian", "Reading...");
        assert_eq!(msg.message_type, MessageType::Thinking);
        assert_eq!(msg.status, MessageStatus::Executing);
        assert!(!msg.is_terminal());
    }

    #[test]
    fn test_terminal_messages() {
        assert!(Message::completed(None, "done").is_terminal());
        assert!(Message::error("boom").is_terminal());
        assert!(!Message::result("Librarian", None).is_terminal());
    }

    #[test]
    fn test_absent_fields_omitted() {
        let line = Message::error("too short").to_ndjson().unwrap();
        assert_eq!(
            line,
            "{\"message_type\":\"error\",\"status\":\"error\",\"message\":\"too short\"}\n"
        );
    }

    #[test]
    fn test_result_with_report() {
        let msg = Message::result("Security Architect", Some(json!({"summary": "ok"})));
        let value: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["agent"], "Security Architect");
        assert_eq!(value["status"], "executed");
        assert_eq!(value["report"]["summary"], "ok");
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_round_trip_from_line() {
        let msg = Message::completed(Some(json!({"data_available": true})), "finished");
        let line = msg.to_ndjson().unwrap();
        let parsed: Message = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed, msg);
    }
}
