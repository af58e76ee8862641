//! Serde support for messages.
//!
//! `Message` goes through a plain mirror struct so that deserialized values pass the same
//! range validation as constructed ones.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::message::{Message, MessageKind};

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct RawMessage {
    kind: MessageKind,
    #[serde(default)]
    time: f64,
}

impl TryFrom<RawMessage> for Message {
    type Error = Error;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        Ok(Message::new(raw.kind)?.with_time(raw.time))
    }
}

impl From<Message> for RawMessage {
    fn from(message: Message) -> Self {
        let time = message.time();
        RawMessage {
            kind: message.into_kind(),
            time,
        }
    }
}
