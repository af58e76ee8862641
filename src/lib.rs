//! # Cadenza - MIDI messages, parsing and ports
//!
//! ## Architecture
//!
//! Cadenza is an umbrella crate that coordinates:
//! - **cadenza-midi** - Message model, message table, streaming parser, text form
//! - **cadenza-midi-io** - Input/output ports, virtual and hardware backends
//!
//! ## Quick Start
//!
//! ```
//! use cadenza::prelude::*;
//!
//! let backend = VirtualBackend::new().with_device("Loop");
//! let port = open_ioport(&backend, Some("Loop"))?;
//!
//! port.send(&"control_change channel=1 control=7 value=100".parse::<Message>()?)?;
//! let msg = port.receive(true)?.unwrap();
//! assert_eq!(msg.hex(), "B1 07 64");
//! # Ok::<(), cadenza::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Everything below
//! - `midi-io` - Hardware MIDI devices through midir

/// Re-export of cadenza-midi for direct access
pub use cadenza_midi as midi;

/// Re-export of cadenza-midi-io for direct access
pub use cadenza_midi_io as io;

pub use cadenza_midi::{
    parse, parse_all, parse_string, parse_string_stream, Message, MessageKind, MessageType,
    Parser, Value,
};

pub use cadenza_midi_io::{
    input_names, ioport_names, multi_iter_pending, multi_receive, multi_send, open_input,
    open_ioport, open_output, output_names, Backend, ByteSink, ByteSource, Input, InputPort,
    IoPort, Output, OutputPort, Port, PortBuilder, VirtualBackend,
};

#[cfg(feature = "midi-io")]
pub use cadenza_midi_io::MidirBackend;

mod error;
pub use error::{Error, Result};

pub mod prelude {
    pub use crate::{Error, Result};
    pub use cadenza_midi::{Message, MessageKind, MessageType, Parser};
    pub use cadenza_midi_io::{
        open_input, open_ioport, open_output, Backend, InputPort, OutputPort, Port,
        PortBuilder, VirtualBackend,
    };

    #[cfg(feature = "midi-io")]
    pub use cadenza_midi_io::MidirBackend;
}
