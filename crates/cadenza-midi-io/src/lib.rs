//! MIDI ports for Cadenza.
//!
//! Provides input, output and bidirectional ports on top of the `cadenza-midi` message model
//! and stream parser, plus the byte-level backends they run on.
//!
//! Feature gates: `midi-io` (hardware devices through midir).
//!
//! ```
//! use cadenza_midi::Message;
//! use cadenza_midi_io::{open_input, open_output, InputPort, OutputPort, VirtualBackend};
//!
//! let backend = VirtualBackend::new().with_device("Loop");
//! let output = open_output(&backend, Some("Loop")).unwrap();
//! let input = open_input(&backend, Some("Loop")).unwrap();
//!
//! output.send(&Message::note_on(0, 60, 64).unwrap()).unwrap();
//! assert_eq!(input.receive(true).unwrap(), Some(Message::note_on(0, 60, 64).unwrap()));
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod backend;
#[cfg(feature = "midi-io")]
pub use backend::MidirBackend;
pub use backend::{Backend, ByteSink, ByteSource, Next, VirtualBackend, WireSink};

pub mod port;
pub use port::{Input, InputPort, IoPort, Output, OutputPort, Port};

pub mod ports;
pub use ports::{multi_iter_pending, multi_receive, multi_send};

mod builder;
pub use builder::{
    input_names, ioport_names, open_input, open_ioport, open_output, output_names, PortBuilder,
};
