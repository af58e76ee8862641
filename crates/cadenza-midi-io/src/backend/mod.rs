//! Byte-level device backends.
//!
//! Ports never talk to devices directly. A [`Backend`] resolves device names and opens a
//! [`ByteSource`] (input) or [`ByteSink`] (output); the port owns what it gets back.

mod channel;
#[cfg(feature = "midi-io")]
mod hardware;
mod loopback;

pub use channel::{ChannelSink, ChannelSource};
#[cfg(feature = "midi-io")]
pub use hardware::MidirBackend;
pub use loopback::{VirtualBackend, WireSink};

use std::io;
use std::time::Duration;

use crate::error::{Error, Result};

/// Outcome of waiting for one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Byte(u8),
    /// Nothing arrived within the timeout.
    Empty,
    /// The device is gone; no more bytes will arrive.
    End,
}

/// Raw byte supply for an input port.
pub trait ByteSource: Send {
    /// Waits at most `timeout` for the next byte. A zero timeout only polls.
    fn next_byte(&mut self, timeout: Duration) -> io::Result<Next>;

    /// Releases the device. Called at most once, when the owning port closes.
    fn close(&mut self) {}
}

/// Raw byte consumer for an output port.
pub trait ByteSink: Send {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Releases the device. Called at most once, when the owning port closes.
    fn close(&mut self) {}
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn next_byte(&mut self, timeout: Duration) -> io::Result<Next> {
        (**self).next_byte(timeout)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

impl<S: ByteSink + ?Sized> ByteSink for Box<S> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write(bytes)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Device enumeration and opening, injected into the port constructors.
pub trait Backend {
    fn input_names(&self) -> Result<Vec<String>>;

    fn output_names(&self) -> Result<Vec<String>>;

    /// Devices usable in both directions, sorted.
    fn ioport_names(&self) -> Result<Vec<String>> {
        let outputs = self.output_names()?;
        let mut names: Vec<String> = self
            .input_names()?
            .into_iter()
            .filter(|name| outputs.contains(name))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Opens an input device; `None` picks the first one. Returns the resolved name.
    fn open_source(&self, name: Option<&str>) -> Result<(String, Box<dyn ByteSource>)>;

    /// Opens an output device; `None` picks the first one. Returns the resolved name.
    fn open_sink(&self, name: Option<&str>) -> Result<(String, Box<dyn ByteSink>)>;
}

/// Picks a device from `names`: exact match first, then a case-insensitive substring.
pub(crate) fn resolve_name(names: &[String], wanted: Option<&str>) -> Result<String> {
    let Some(wanted) = wanted else {
        return names
            .first()
            .cloned()
            .ok_or_else(|| Error::NoSuchPort("<default>".to_string()));
    };
    if let Some(name) = names.iter().find(|name| name.as_str() == wanted) {
        return Ok(name.clone());
    }
    let needle = wanted.to_lowercase();
    names
        .iter()
        .find(|name| name.to_lowercase().contains(&needle))
        .cloned()
        .ok_or_else(|| Error::NoSuchPort(wanted.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["MPK mini MIDI 1".into(), "SH-201".into(), "SH-201 Ext".into()]
    }

    #[test]
    fn test_resolve_default() {
        assert_eq!(resolve_name(&names(), None).unwrap(), "MPK mini MIDI 1");
        assert!(matches!(resolve_name(&[], None), Err(Error::NoSuchPort(_))));
    }

    #[test]
    fn test_resolve_exact_before_substring() {
        assert_eq!(resolve_name(&names(), Some("SH-201")).unwrap(), "SH-201");
        assert_eq!(resolve_name(&names(), Some("ext")).unwrap(), "SH-201 Ext");
        assert_eq!(resolve_name(&names(), Some("mpk")).unwrap(), "MPK mini MIDI 1");
    }

    #[test]
    fn test_resolve_missing() {
        match resolve_name(&names(), Some("Nord")) {
            Err(Error::NoSuchPort(name)) => assert_eq!(name, "Nord"),
            other => panic!("expected NoSuchPort, got {:?}", other),
        }
    }
}
