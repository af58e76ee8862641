//! Byte-at-a-time MIDI stream parser.
//!
//! Rebuilds complete messages from a raw wire stream:
//! - running status for channel voice messages
//! - realtime bytes (0xF8..=0xFF) emitted immediately, even inside another message
//! - sysex runs of any length, bracketed by 0xF0 / 0xF7
//!
//! Malformed input never fails. A partial message interrupted by a new status byte is
//! dropped and stray data bytes are discarded, so one bad byte costs at most one message.

use smallvec::SmallVec;
use tracing::trace;

use crate::message::{Message, MessageKind};
use crate::table::MessageType;

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Accumulating {
        status: u8,
        expected: usize,
        data: SmallVec<[u8; 2]>,
    },
    Sysex(Vec<u8>),
}

/// Streaming parser. One instance per byte stream.
///
/// ```
/// use cadenza_midi::Parser;
///
/// let mut parser = Parser::new();
/// let messages: Vec<_> = parser.feed_bytes([0x90, 60, 64, 61, 100]).collect();
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[1].note(), Some(61));
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    state: State,
    running_status: Option<u8>,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte; returns the message it completed, if any.
    pub fn feed(&mut self, byte: u8) -> Option<Message> {
        match byte {
            0xF8..=0xFF => Self::realtime(byte),
            0xF0 => {
                self.abandon(byte);
                self.running_status = None;
                self.state = State::Sysex(Vec::new());
                None
            }
            0xF7 => self.end_sysex(),
            0x80..=0xF6 => self.status(byte),
            _ => self.data(byte),
        }
    }

    /// Lazily feeds `bytes`, yielding messages as they complete.
    ///
    /// Parser state carries over, so a message split across two calls still completes.
    pub fn feed_bytes<I>(&mut self, bytes: I) -> FeedBytes<'_, I::IntoIter>
    where
        I: IntoIterator<Item = u8>,
    {
        FeedBytes {
            parser: self,
            bytes: bytes.into_iter(),
        }
    }

    /// Bytes held for the incomplete message: its status byte (explicit or implied by
    /// running status) plus collected data. Zero when idle.
    pub fn pending(&self) -> usize {
        match &self.state {
            State::Idle => 0,
            State::Accumulating { data, .. } => data.len() + 1,
            State::Sysex(data) => data.len() + 1,
        }
    }

    /// Drops any partial message and forgets running status.
    pub fn reset(&mut self) {
        self.abandon(0xFF);
        self.running_status = None;
    }

    #[inline]
    pub fn running_status(&self) -> Option<u8> {
        self.running_status
    }

    #[inline]
    pub fn in_sysex(&self) -> bool {
        matches!(self.state, State::Sysex(_))
    }

    fn realtime(byte: u8) -> Option<Message> {
        match MessageType::from_status(byte) {
            Some(ty) => Some(Message::default_for(ty)),
            None => {
                trace!("Discarding undefined realtime byte 0x{:02X}", byte);
                None
            }
        }
    }

    fn end_sysex(&mut self) -> Option<Message> {
        match std::mem::take(&mut self.state) {
            State::Sysex(data) => Some(Message::from_kind(MessageKind::Sysex { data })),
            other => {
                self.state = other;
                self.abandon(0xF7);
                self.running_status = None;
                None
            }
        }
    }

    fn status(&mut self, status: u8) -> Option<Message> {
        self.abandon(status);
        let Some(ty) = MessageType::from_status(status) else {
            trace!("Discarding undefined status byte 0x{:02X}", status);
            self.running_status = None;
            return None;
        };

        self.running_status = ty.is_channel_voice().then_some(status);
        let expected = ty.spec().data_len().unwrap_or(0);
        if expected == 0 {
            return Some(Message::from_kind(MessageKind::from_wire(status, &[])));
        }
        self.state = State::Accumulating {
            status,
            expected,
            data: SmallVec::new(),
        };
        None
    }

    fn data(&mut self, byte: u8) -> Option<Message> {
        if let State::Idle = self.state {
            let Some(status) = self.running_status else {
                trace!("Discarding data byte 0x{:02X} without status", byte);
                return None;
            };
            self.state = State::Accumulating {
                status,
                expected: data_len(status),
                data: SmallVec::new(),
            };
        }

        match &mut self.state {
            State::Sysex(data) => {
                data.push(byte);
                None
            }
            State::Accumulating {
                status,
                expected,
                data,
            } => {
                data.push(byte);
                if data.len() < *expected {
                    return None;
                }
                let kind = MessageKind::from_wire(*status, data);
                self.state = State::Idle;
                Some(Message::from_kind(kind))
            }
            State::Idle => None,
        }
    }

    /// Drops whatever was being assembled; `cause` is the byte that interrupted it.
    fn abandon(&mut self, cause: u8) {
        match std::mem::take(&mut self.state) {
            State::Idle => {}
            State::Accumulating { status, data, .. } => trace!(
                "Dropping partial message 0x{:02X} ({} data bytes), interrupted by 0x{:02X}",
                status,
                data.len(),
                cause
            ),
            State::Sysex(data) => trace!(
                "Dropping unterminated sysex ({} data bytes), interrupted by 0x{:02X}",
                data.len(),
                cause
            ),
        }
    }
}

fn data_len(status: u8) -> usize {
    MessageType::from_status(status)
        .and_then(|ty| ty.spec().data_len())
        .unwrap_or(0)
}

/// Iterator returned by [`Parser::feed_bytes`].
#[derive(Debug)]
pub struct FeedBytes<'a, I> {
    parser: &'a mut Parser,
    bytes: I,
}

impl<I: Iterator<Item = u8>> Iterator for FeedBytes<'_, I> {
    type Item = Message;

    fn next(&mut self) -> Option<Message> {
        for byte in self.bytes.by_ref() {
            if let Some(message) = self.parser.feed(byte) {
                return Some(message);
            }
        }
        None
    }
}

/// First complete message in `bytes`, if any.
pub fn parse(bytes: impl IntoIterator<Item = u8>) -> Option<Message> {
    Parser::new().feed_bytes(bytes).next()
}

/// Every complete message in `bytes`, in order.
pub fn parse_all(bytes: impl IntoIterator<Item = u8>) -> Vec<Message> {
    Parser::new().feed_bytes(bytes).collect()
}
