//! Chat message types.
//!
//! Messages are immutable and append-only. The server-assigned `id` is the sole
//! identity and ordering key; `timestamp` is display metadata only because
//! client clocks are untrusted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lead::LeadUid;

/// Server-assigned message id, monotonically increasing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the conversation wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    Client,
    Operator,
}

impl fmt::Display for SenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenderType::Client => write!(f, "client"),
            SenderType::Operator => write!(f, "operator"),
        }
    }
}

impl FromStr for SenderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "client" => Ok(SenderType::Client),
            "operator" => Ok(SenderType::Operator),
            other => Err(format!("invalid sender type: '{other}'")),
        }
    }
}

/// A persisted chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// The owning lead's uid.
    pub session_id: LeadUid,
    pub sender_id: String,
    pub sender_type: SenderType,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn is_from_client(&self) -> bool {
        self.sender_type == SenderType::Client
    }
}

/// A message row before the store assigns its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub session_id: LeadUid,
    pub sender_id: String,
    pub sender_type: SenderType,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl NewMessage {
    pub fn new(
        session_id: LeadUid,
        sender_id: impl Into<String>,
        sender_type: SenderType,
        text: impl Into<String>,
    ) -> Self {
        Self {
            session_id,
            sender_id: sender_id.into(),
            sender_type,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Attach the store-assigned id.
    pub fn with_id(self, id: MessageId) -> Message {
        Message {
            id,
            session_id: self.session_id,
            sender_id: self.sender_id,
            sender_type: self.sender_type,
            text: self.text,
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_type_serializes_lowercase() {
        let json = serde_json::to_string(&SenderType::Operator).unwrap();
        assert_eq!(json, "\"operator\"");
        assert_eq!("Client".parse::<SenderType>().unwrap(), SenderType::Client);
        assert!("bot".parse::<SenderType>().is_err());
    }

    #[test]
    fn message_id_is_transparent_in_json() {
        let msg = NewMessage::new(LeadUid::from("lead_a"), "lead_a", SenderType::Client, "hi")
            .with_id(MessageId(7));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["session_id"], "lead_a");
        assert_eq!(json["sender_type"], "client");
        assert!(msg.is_from_client());
    }

    #[test]
    fn message_ids_order_numerically() {
        assert!(MessageId(2) < MessageId(10));
    }
}
