//! LINE Messaging API glue: webhook signature check, event types, reply
//! messages and the reply client.

pub mod client;
pub mod error;
pub mod flex;
pub mod replies;
pub mod signature;
pub mod types;

pub use client::LineClient;
pub use error::LineError;
pub use flex::build_nearby_message;
pub use replies::text_reply;
pub use signature::{sign_body, verify_signature, SIGNATURE_HEADER};
pub use types::{Event, IncomingMessage, MessageEvent, OutgoingMessage, WebhookBody};
