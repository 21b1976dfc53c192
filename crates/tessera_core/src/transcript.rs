//! Transcript assembly and chunking.
//!
//! A transcript is the ordered text capture of a ticket channel's history,
//! delivered to the creator by direct message before the channel is deleted.
//! It is transient and derived; nothing here persists.

use derive_getters::Getters;

/// Maximum number of history messages pulled into a transcript.
pub const TRANSCRIPT_MESSAGE_LIMIT: usize = 200;

/// Maximum characters per delivered transcript chunk.
pub const TRANSCRIPT_CHUNK_LEN: usize = 1900;

/// One line of transcript, pulled from channel history.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct TranscriptMessage {
    /// Display name of the message author.
    author: String,
    /// Message content.
    content: String,
}

impl TranscriptMessage {
    /// Create a new transcript message.
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
        }
    }
}

/// Render messages into transcript text, one `"<author>: <content>"` line per
/// message, oldest first, joined by newlines.
pub fn render(messages: &[TranscriptMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.author(), m.content()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split transcript text into consecutive chunks of at most
/// [`TRANSCRIPT_CHUNK_LEN`] characters.
///
/// Splitting is purely by character count; lines may be cut mid-way. An empty
/// transcript yields a single empty chunk so delivery still sends the fixed
/// wrapper once.
pub fn chunk(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(TRANSCRIPT_CHUNK_LEN)
        .map(|c| c.iter().collect())
        .collect()
}

/// Wrap one chunk in the fixed delivery template.
pub fn wrap(chunk: &str) -> String {
    format!("**Ticket Transcript**\n```{chunk}```")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_joins_lines_oldest_first() {
        let messages = vec![
            TranscriptMessage::new("alice", "hello"),
            TranscriptMessage::new("bob", "hi there"),
        ];
        assert_eq!(render(&messages), "alice: hello\nbob: hi there");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_chunk_exactly_at_limit_is_single() {
        let text = "a".repeat(1900);
        let chunks = chunk(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chars().count(), 1900);
    }

    #[test]
    fn test_chunk_one_past_limit_splits() {
        let text = "a".repeat(1901);
        let chunks = chunk(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 1900);
        assert_eq!(chunks[1].chars().count(), 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 1900));
    }

    #[test]
    fn test_chunk_empty_yields_one_empty_chunk() {
        let chunks = chunk("");
        assert_eq!(chunks, vec![String::new()]);
    }

    #[test]
    fn test_chunk_never_splits_a_code_point() {
        // Multi-byte characters count as one character each.
        let text = "é".repeat(1901);
        let chunks = chunk(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 1900);
    }

    #[test]
    fn test_wrap_template() {
        assert_eq!(wrap("body"), "**Ticket Transcript**\n```body```");
        assert_eq!(wrap(""), "**Ticket Transcript**\n``````");
    }
}
