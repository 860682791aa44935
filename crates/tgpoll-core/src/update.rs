//! Bot API update payloads.
//!
//! The polling loop only relies on `update_id`; everything else is carried
//! verbatim so handlers can decode whatever they care about.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One event returned by `getUpdates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    /// Remaining fields (`message`, `callback_query`, ...).
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Update {
    /// Name of the update's payload field, e.g. `"message"`.
    pub fn kind(&self) -> Option<&str> {
        self.payload.keys().next().map(String::as_str)
    }

    /// Raw payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Decode the `message` field, if present and well-formed.
    pub fn message(&self) -> Option<Message> {
        self.payload
            .get("message")
            .and_then(|m| serde_json::from_value(m.clone()).ok())
    }

    /// Chat the update's message belongs to.
    pub fn chat_id(&self) -> Option<i64> {
        self.payload
            .get("message")
            .and_then(|m| m.get("chat"))
            .and_then(|c| c.get("id"))
            .and_then(Value::as_i64)
    }

    /// Text of the update's message.
    pub fn text(&self) -> Option<&str> {
        self.payload
            .get("message")
            .and_then(|m| m.get("text"))
            .and_then(Value::as_str)
    }
}

/// Typed view of a `message` payload. Only the commonly used fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl User {
    /// `@username` when set, otherwise the full name.
    pub fn display_name(&self) -> String {
        if let Some(ref un) = self.username {
            format!("@{un}")
        } else if let Some(ref ln) = self.last_name {
            format!("{} {ln}", self.first_name)
        } else {
            self.first_name.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    /// Chat type: "private", "group", "supergroup", or "channel".
    #[serde(default, rename = "type")]
    pub chat_type: String,
}

impl Chat {
    pub fn is_group(&self) -> bool {
        matches!(self.chat_type.as_str(), "group" | "supergroup")
    }
}
