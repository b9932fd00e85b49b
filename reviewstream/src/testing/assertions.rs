//! Helpers for checking message streams.

use crate::core::{Message, MessageType};
use futures::{Stream, StreamExt};

/// Drains an ndjson line stream into parsed messages.
///
/// # Panics
///
/// Panics if a line is not a valid message.
pub async fn collect_messages<S>(stream: S) -> Vec<Message>
where
    S: Stream<Item = String>,
{
    stream
        .map(|line| {
            assert!(line.ends_with('\n'), "line not newline-terminated: {line:?}");
            serde_json::from_str::<Message>(line.trim_end())
                .unwrap_or_else(|e| panic!("invalid message line {line:?}: {e}"))
        })
        .collect()
        .await
}

/// Returns `(agent, message_type)` for each message.
#[must_use]
pub fn message_kinds(messages: &[Message]) -> Vec<(Option<&str>, MessageType)> {
    messages
        .iter()
        .map(|m| (m.agent.as_deref(), m.message_type))
        .collect()
}

/// Asserts that exactly one terminal message exists and that it is last.
///
/// # Panics
///
/// Panics when the invariant does not hold.
pub fn assert_single_terminal_last(messages: &[Message]) {
    let terminals: Vec<usize> = messages
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_terminal())
        .map(|(i, _)| i)
        .collect();

    assert_eq!(terminals.len(), 1, "expected exactly one terminal message: {messages:#?}");
    assert_eq!(terminals[0], messages.len() - 1, "terminal message is not last: {messages:#?}");
}

/// Asserts that every `result` follows a `thinking` from the same agent.
///
/// # Panics
///
/// Panics when a result has no preceding announcement.
pub fn assert_results_announced(messages: &[Message]) {
    for (i, message) in messages.iter().enumerate() {
        if message.message_type != MessageType::Result {
            continue;
        }
        let announced = messages[..i]
            .iter()
            .any(|m| m.message_type == MessageType::Thinking && m.agent == message.agent);
        assert!(announced, "result at {i} was never announced: {messages:#?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[tokio::test]
    async fn test_collect_messages() {
        let lines = vec![
            Message::thinking("Librarian", "Reading...").to_ndjson().unwrap(),
            Message::completed(None, "done").to_ndjson().unwrap(),
        ];
        let messages = collect_messages(stream::iter(lines)).await;

        assert_eq!(
            message_kinds(&messages),
            vec![(Some("Librarian"), MessageType::Thinking), (None, MessageType::Completed)]
        );
        assert_single_terminal_last(&messages);
    }

    #[test]
    #[should_panic(expected = "never announced")]
    fn test_unannounced_result() {
        assert_results_announced(&[Message::result("Librarian", None)]);
    }

    #[test]
    #[should_panic(expected = "exactly one terminal")]
    fn test_two_terminals() {
        assert_single_terminal_last(&[Message::error("a"), Message::error("b")]);
    }
}
