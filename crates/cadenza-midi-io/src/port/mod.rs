//! Input, output and bidirectional MIDI ports.
//!
//! A port wraps one backend endpoint. Inputs own a [`Parser`](cadenza_midi::Parser) fed from
//! a [`ByteSource`](crate::backend::ByteSource); outputs encode into a
//! [`ByteSink`](crate::backend::ByteSink). All ports are `Send + Sync` and can be closed from
//! any thread.

mod input;
mod io;
mod output;

pub use input::Input;
pub use io::IoPort;
pub use output::Output;

use cadenza_midi::Message;
use tracing::warn;

use crate::error::{Error, Result};

const ALL_SOUND_OFF: u8 = 120;
const RESET_ALL_CONTROLLERS: u8 = 121;
const ALL_NOTES_OFF: u8 = 123;

pub trait Port {
    fn name(&self) -> &str;

    /// Closes the port. Idempotent; the backend endpoint is released exactly once.
    fn close(&self);

    fn is_closed(&self) -> bool;
}

pub trait InputPort: Port {
    /// Returns the next complete message.
    ///
    /// With `block`, waits until one arrives. Without, returns `Ok(None)` when nothing is
    /// ready. Either way fails with [`Error::PortClosed`] once the port is closed, including
    /// when the source reached end-of-stream.
    fn receive(&self, block: bool) -> Result<Option<Message>>;

    /// Non-blocking [`receive`](Self::receive).
    fn poll(&self) -> Result<Option<Message>> {
        self.receive(false)
    }

    /// Blocking iterator that ends when the port closes.
    ///
    /// A backend I/O failure also ends the iteration. It is logged and leaves the port closed;
    /// call [`receive`](Self::receive) directly to observe the error itself.
    fn iter(&self) -> Messages<'_, Self>
    where
        Self: Sized,
    {
        Messages { port: self }
    }

    /// Drains what is already available without blocking. Ends like [`iter`](Self::iter) on
    /// close or failure.
    fn iter_pending(&self) -> Pending<'_, Self>
    where
        Self: Sized,
    {
        Pending { port: self }
    }
}

pub trait OutputPort: Port {
    fn send(&self, message: &Message) -> Result<()>;

    /// All notes off and reset all controllers on every channel.
    fn reset(&self) -> Result<()> {
        for channel in 0..16 {
            for control in [ALL_NOTES_OFF, RESET_ALL_CONTROLLERS] {
                self.send(&Message::control_change(channel, control, 0)?)?;
            }
        }
        Ok(())
    }

    /// All sound off on every channel.
    fn panic(&self) -> Result<()> {
        for channel in 0..16 {
            self.send(&Message::control_change(channel, ALL_SOUND_OFF, 0)?)?;
        }
        Ok(())
    }
}

fn stopped<P: Port>(port: &P, error: Error) -> Option<Message> {
    if !matches!(error, Error::PortClosed) {
        warn!("MIDI input '{}' stopped: {}", port.name(), error);
    }
    None
}

/// Iterator returned by [`InputPort::iter`].
pub struct Messages<'a, P> {
    port: &'a P,
}

impl<P: InputPort> Iterator for Messages<'_, P> {
    type Item = Message;

    fn next(&mut self) -> Option<Message> {
        match self.port.receive(true) {
            Ok(message) => message,
            Err(e) => stopped(self.port, e),
        }
    }
}

/// Iterator returned by [`InputPort::iter_pending`].
pub struct Pending<'a, P> {
    port: &'a P,
}

impl<P: InputPort> Iterator for Pending<'_, P> {
    type Item = Message;

    fn next(&mut self) -> Option<Message> {
        match self.port.receive(false) {
            Ok(message) => message,
            Err(e) => stopped(self.port, e),
        }
    }
}
