//! Chat transcript and participant definitions.

use serde::{Deserialize, Serialize};

/// A single message of the chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChatMessage {
    /// Display name of the sender.
    pub name: String,
    pub is_user: bool,
    /// Narrator/system messages are not scanned for keys.
    pub is_system: bool,
    /// Message text.
    pub mes: String,
}

impl ChatMessage {
    /// A message sent by the user.
    pub fn user(name: impl Into<String>, mes: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_user: true,
            is_system: false,
            mes: mes.into(),
        }
    }

    /// A message sent by a character.
    pub fn character(name: impl Into<String>, mes: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_user: false,
            is_system: false,
            mes: mes.into(),
        }
    }

    /// A narrator/system message.
    pub fn system(mes: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            is_user: false,
            is_system: true,
            mes: mes.into(),
        }
    }
}

/// An active participant in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Character {
    pub name: String,
    pub tags: Vec<String>,
}

impl Character {
    /// Create a new character with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
        }
    }

    /// Add a tag to this character.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Check if the character carries a tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The user's own participant record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Persona {
    pub name: String,
    pub description: String,
}

impl Persona {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let user = ChatMessage::user("Sam", "Hello there");
        assert!(user.is_user);
        assert!(!user.is_system);

        let reply = ChatMessage::character("Alice", "Hi!");
        assert!(!reply.is_user);
        assert_eq!(reply.name, "Alice");

        assert!(ChatMessage::system("The scene changes.").is_system);
    }

    #[test]
    fn test_character_tags() {
        let alice = Character::new("Alice").with_tag("helpful").with_tag("scholar");
        assert!(alice.has_tag("helpful"));
        assert!(!alice.has_tag("villain"));
    }

    #[test]
    fn test_message_deserializes_with_defaults() {
        let msg: ChatMessage = serde_json::from_str(r#"{"name": "Bob", "mes": "hey"}"#).unwrap();
        assert!(!msg.is_user);
        assert_eq!(msg.mes, "hey");
    }
}
