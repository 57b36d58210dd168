//! Chat payload types and parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::error::ChatError;

/// Speaker of a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One conversation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Inbound chat payload, in conversation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Parse a raw request body.
    ///
    /// A missing or `null` `messages` field is an empty conversation. Any other
    /// non-array value, or an entry that is not a well-formed message, is
    /// rejected.
    pub fn from_slice(body: &[u8]) -> Result<Self, ChatError> {
        let value: Value = serde_json::from_slice(body)?;
        let Value::Object(mut fields) = value else {
            return Err(ChatError::NotAnObject);
        };

        let entries = match fields.remove("messages") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(ChatError::MessagesNotArray),
        };

        let messages = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                serde_json::from_value(entry)
                    .map_err(|source| ChatError::InvalidMessage { index, source })
            })
            .collect::<Result<Vec<ChatMessage>, _>>()?;

        Ok(Self { messages })
    }

    /// Whether any entry carries behavioral instructions.
    pub fn has_system_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::System)
    }

    /// Prepend `system_prompt` when the conversation has no system message.
    ///
    /// Caller messages are never reordered or dropped. Fails when the result
    /// would be empty.
    pub fn normalize(mut self, system_prompt: Option<&str>) -> Result<Vec<ChatMessage>, ChatError> {
        if !self.has_system_message() {
            if let Some(prompt) = system_prompt {
                self.messages.insert(0, ChatMessage::system(prompt));
            }
        }

        if self.messages.is_empty() {
            return Err(ChatError::NoMessages);
        }

        Ok(self.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "be brief";

    #[test]
    fn parses_messages_in_order() {
        let body = br#"{"messages":[
            {"role":"user","content":"hi"},
            {"role":"assistant","content":"hello"},
            {"role":"user","content":"hi"}
        ]}"#;

        let request = ChatRequest::from_slice(body).unwrap();
        assert_eq!(
            request.messages,
            vec![
                ChatMessage::user("hi"),
                ChatMessage::assistant("hello"),
                ChatMessage::user("hi"),
            ]
        );
    }

    #[test]
    fn missing_or_null_messages_are_empty() {
        assert!(ChatRequest::from_slice(b"{}").unwrap().messages.is_empty());
        assert!(ChatRequest::from_slice(br#"{"messages":null}"#).unwrap().messages.is_empty());
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(
            ChatRequest::from_slice(b"{not json"),
            Err(ChatError::InvalidJson(_))
        ));
        assert!(matches!(
            ChatRequest::from_slice(b"[1,2]"),
            Err(ChatError::NotAnObject)
        ));
        assert!(matches!(
            ChatRequest::from_slice(br#"{"messages":"hello"}"#),
            Err(ChatError::MessagesNotArray)
        ));
        assert!(matches!(
            ChatRequest::from_slice(br#"{"messages":[{"role":"user","content":"a"},{"role":"tool","content":"b"}]}"#),
            Err(ChatError::InvalidMessage { index: 1, .. })
        ));
        assert!(matches!(
            ChatRequest::from_slice(br#"{"messages":[{"role":"user"}]}"#),
            Err(ChatError::InvalidMessage { index: 0, .. })
        ));
    }

    #[test]
    fn existing_system_message_is_left_alone() {
        let messages = vec![
            ChatMessage::user("first"),
            ChatMessage::system("custom"),
            ChatMessage::user("second"),
        ];
        let request = ChatRequest { messages: messages.clone() };

        assert_eq!(request.normalize(Some(PROMPT)).unwrap(), messages);
    }

    #[test]
    fn injects_prompt_at_front() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("a"), ChatMessage::assistant("b")],
        };

        let normalized = request.normalize(Some(PROMPT)).unwrap();
        assert_eq!(normalized.len(), 3);
        assert_eq!(normalized[0], ChatMessage::system(PROMPT));
        assert_eq!(normalized[1], ChatMessage::user("a"));
        assert_eq!(normalized[2], ChatMessage::assistant("b"));
    }

    #[test]
    fn empty_conversation_gets_prompt_only() {
        let normalized = ChatRequest::default().normalize(Some(PROMPT)).unwrap();
        assert_eq!(normalized, vec![ChatMessage::system(PROMPT)]);
    }

    #[test]
    fn empty_conversation_without_prompt_fails() {
        assert!(matches!(
            ChatRequest::default().normalize(None),
            Err(ChatError::NoMessages)
        ));
    }

    #[test]
    fn no_prompt_leaves_messages_untouched() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("a")],
        };
        assert_eq!(request.normalize(None).unwrap(), vec![ChatMessage::user("a")]);
    }
}
