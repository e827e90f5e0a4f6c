use serde::{Deserialize, Serialize};

/// A delivered chat line: who said it and what they said.
///
/// Used for both table chat and whispers; the tag on the wire frame
/// distinguishes the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub body: String,
}

impl ChatMessage {
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        ChatMessage {
            sender: sender.into(),
            body: body.into(),
        }
    }
}
