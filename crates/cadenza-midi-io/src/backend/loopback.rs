//! In-process virtual devices.
//!
//! Each device is a wire: bytes written by any output opened on it are copied to every input
//! currently open on it. Bytes written while no input is open are dropped. Useful for routing
//! between threads and for tests.

use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Sender};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use super::{resolve_name, Backend, ByteSink, ByteSource, ChannelSource};
use crate::error::{Error, Result};

/// One sender per input opened on the device.
#[derive(Clone, Default)]
struct Wire {
    subscribers: Arc<Mutex<Vec<Sender<Vec<u8>>>>>,
}

impl Wire {
    fn subscribe(&self) -> ChannelSource {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        ChannelSource::new(rx)
    }
}

/// Byte sink writing onto a virtual device.
///
/// Returned by [`VirtualBackend::sender`] for injecting raw bytes, and used by every output
/// opened on the device.
#[derive(Clone)]
pub struct WireSink {
    device: String,
    wire: Wire,
}

impl ByteSink for WireSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut subscribers = self.wire.subscribers.lock();
        subscribers.retain(|tx| tx.send(bytes.to_vec()).is_ok());
        trace!(
            "{} bytes on virtual device '{}' to {} inputs",
            bytes.len(),
            self.device,
            subscribers.len()
        );
        Ok(())
    }
}

impl std::fmt::Debug for WireSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireSink")
            .field("device", &self.device)
            .field("inputs", &self.wire.subscribers.lock().len())
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct VirtualBackend {
    devices: Arc<RwLock<BTreeMap<String, Wire>>>,
}

impl VirtualBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`add_device`](Self::add_device).
    pub fn with_device(self, name: impl Into<String>) -> Self {
        self.add_device(name);
        self
    }

    /// Registers a device. Re-adding an existing name keeps the current wire.
    pub fn add_device(&self, name: impl Into<String>) {
        let name = name.into();
        let mut devices = self.devices.write();
        if !devices.contains_key(&name) {
            debug!("Added virtual MIDI device: {}", name);
            devices.insert(name, Wire::default());
        }
    }

    /// Unregisters a device. Inputs opened on it see end-of-stream once every output
    /// writing to it is closed.
    pub fn remove_device(&self, name: &str) -> bool {
        let removed = self.devices.write().remove(name).is_some();
        if removed {
            debug!("Removed virtual MIDI device: {}", name);
        }
        removed
    }

    /// Raw sink for a device, for injecting bytes that did not come from a port.
    pub fn sender(&self, name: &str) -> Option<WireSink> {
        let wire = self.devices.read().get(name).cloned()?;
        Some(WireSink {
            device: name.to_string(),
            wire,
        })
    }

    fn names(&self) -> Vec<String> {
        self.devices.read().keys().cloned().collect()
    }

    fn wire(&self, name: Option<&str>) -> Result<(String, Wire)> {
        let resolved = resolve_name(&self.names(), name)?;
        let wire = self
            .devices
            .read()
            .get(&resolved)
            .cloned()
            .ok_or_else(|| Error::NoSuchPort(resolved.clone()))?;
        Ok((resolved, wire))
    }
}

impl Backend for VirtualBackend {
    fn input_names(&self) -> Result<Vec<String>> {
        Ok(self.names())
    }

    fn output_names(&self) -> Result<Vec<String>> {
        Ok(self.names())
    }

    fn open_source(&self, name: Option<&str>) -> Result<(String, Box<dyn ByteSource>)> {
        let (name, wire) = self.wire(name)?;
        Ok((name, Box::new(wire.subscribe())))
    }

    fn open_sink(&self, name: Option<&str>) -> Result<(String, Box<dyn ByteSink>)> {
        let (device, wire) = self.wire(name)?;
        let sink = WireSink {
            device: device.clone(),
            wire,
        };
        Ok((device, Box::new(sink)))
    }
}

impl std::fmt::Debug for VirtualBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualBackend")
            .field("devices", &self.names())
            .finish()
    }
}
