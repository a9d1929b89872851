//! Webhook payloads received from LINE and messages sent back.
//!
//! Only the fields the bot reads are modelled; unknown fields and event or
//! message kinds deserialize without error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    Message(MessageEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent for events delivered during redelivery or from inactive chats.
    #[serde(default)]
    pub reply_token: Option<String>,
    pub message: IncomingMessage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IncomingMessage {
    Text {
        text: String,
    },
    Location {
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        address: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// A message in a reply request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutgoingMessage {
    Text {
        text: String,
    },
    Flex {
        #[serde(rename = "altText")]
        alt_text: String,
        contents: Value,
    },
}

impl OutgoingMessage {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReplyRequest<'a> {
    pub reply_token: &'a str,
    pub messages: &'a [OutgoingMessage],
}
