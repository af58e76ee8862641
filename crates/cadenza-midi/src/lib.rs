//! MIDI message model and streaming wire parser for Cadenza.
//!
//! - **Messages**: validated value type with typed variants, byte encode/decode
//! - **Message table**: status bytes, parameter ranges and wire lengths per type
//! - **Parser**: byte-at-a-time stream parser with running status, realtime interleaving
//!   and resynchronization after garbage
//! - **Text form**: `note_on channel=0 note=60 velocity=64 time=0`
//!
//! # Example
//!
//! ```
//! use cadenza_midi::{Message, Parser};
//!
//! let msg = Message::note_on(0, 60, 64)?;
//! assert_eq!(msg.to_bytes(), vec![0x90, 60, 64]);
//!
//! let mut parser = Parser::new();
//! let parsed: Vec<_> = parser.feed_bytes(msg.to_bytes()).collect();
//! assert_eq!(parsed, vec![msg]);
//! # Ok::<(), cadenza_midi::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

pub(crate) mod message;
pub use message::{Message, MessageKind, Value};

pub mod table;
pub use table::{MessageType, ParamSpec};

pub(crate) mod parser;
pub use parser::{parse, parse_all, FeedBytes, Parser};

pub mod text;
pub use text::{parse_string, parse_string_stream};

pub(crate) mod serde_support;
