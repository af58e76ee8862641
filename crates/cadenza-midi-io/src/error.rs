//! Error types for MIDI ports.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI port is closed")]
    PortClosed,

    /// I/O failure on an open port. The port is closed afterwards.
    #[error("MIDI port error: {0}")]
    Port(#[from] std::io::Error),

    #[error("No MIDI port matching '{0}'")]
    NoSuchPort(String),

    #[error("MIDI device error: {0}")]
    Device(String),

    #[error(transparent)]
    Message(#[from] cadenza_midi::Error),
}

#[cfg(feature = "midi-io")]
impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::Device(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::ConnectError<midir::MidiOutput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiOutput>) -> Self {
        Error::Device(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::ConnectError<midir::MidiInput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        Error::Device(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::SendError> for Error {
    fn from(e: midir::SendError) -> Self {
        Error::Device(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
