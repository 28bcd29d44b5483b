//! Unread message digest.

use serde::{Deserialize, Serialize};

/// Maximum number of unread messages expanded per cycle.
///
/// The reported count undercounts the real unread total once this is hit.
pub const MAX_UNREAD_MESSAGES: usize = 10;

/// Text used when a message has no body.
pub const EMPTY_TEXT: &str = "intet indhold...";
/// Sender used when upstream omits one.
pub const UNKNOWN_SENDER: &str = "Ukendt afsender";
/// Text shown in place of a thread that requires MitID.
pub const SENSITIVE_TEXT: &str = "Log ind på Aula med MitID for at læse denne besked.";
/// Subject shown in place of a thread that requires MitID.
pub const SENSITIVE_SUBJECT: &str = "Følsom besked";

// ============================================================================
// Message Summary
// ============================================================================

/// One unread message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    /// HTML or plain text body.
    pub text: String,
    /// Sender display name.
    pub sender: String,
    /// Thread subject.
    pub subject: String,
}

impl MessageSummary {
    /// Placeholder for a thread the session may not read.
    pub fn sensitive() -> Self {
        Self {
            text: SENSITIVE_TEXT.to_string(),
            sender: UNKNOWN_SENDER.to_string(),
            subject: SENSITIVE_SUBJECT.to_string(),
        }
    }

    /// Returns true if this is the sensitive placeholder.
    pub fn is_sensitive(&self) -> bool {
        self.text == SENSITIVE_TEXT && self.subject == SENSITIVE_SUBJECT
    }
}

// ============================================================================
// Message Digest
// ============================================================================

/// Unread messages collected in one cycle, never more than
/// [`MAX_UNREAD_MESSAGES`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDigest {
    messages: Vec<MessageSummary>,
}

impl MessageDigest {
    /// Creates an empty digest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message unless the cap is reached. Returns whether it was added.
    pub fn push(&mut self, message: MessageSummary) -> bool {
        if self.is_full() {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Reported unread count. Always equals the list length.
    pub fn count(&self) -> usize {
        self.messages.len()
    }

    /// Returns true once the cap is reached.
    pub fn is_full(&self) -> bool {
        self.messages.len() >= MAX_UNREAD_MESSAGES
    }

    /// Messages in upstream order (newest thread first).
    pub fn messages(&self) -> &[MessageSummary] {
        &self.messages
    }

    /// Returns true when there are no unread messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(n: usize) -> MessageSummary {
        MessageSummary {
            text: format!("text {n}"),
            sender: "Lærer".to_string(),
            subject: "Emne".to_string(),
        }
    }

    #[test]
    fn test_cap_is_enforced() {
        let mut digest = MessageDigest::new();
        for n in 0..15 {
            digest.push(msg(n));
        }
        assert_eq!(digest.count(), MAX_UNREAD_MESSAGES);
        assert_eq!(digest.messages().len(), digest.count());
        assert!(!digest.push(msg(99)));
    }

    #[test]
    fn test_sensitive_placeholder() {
        let m = MessageSummary::sensitive();
        assert_eq!(m.sender, "Ukendt afsender");
        assert_eq!(m.subject, "Følsom besked");
        assert!(m.is_sensitive());
        assert!(!msg(1).is_sensitive());
    }

    #[test]
    fn test_deserialize_empty() {
        let digest: MessageDigest = serde_json::from_str(r#"{"messages":[]}"#).unwrap();
        assert!(digest.is_empty());
    }
}
