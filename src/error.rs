//! Centralized error type for the cadenza umbrella crate.
//!
//! Wraps both crate errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI message: {0}")]
    Message(#[from] cadenza_midi::Error),

    #[error("MIDI port: {0}")]
    Port(#[from] cadenza_midi_io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
