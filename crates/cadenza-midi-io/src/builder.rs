//! Port builder and the top-level opening helpers.

use std::time::Duration;

use crate::backend::Backend;
use crate::error::Result;
use crate::port::{Input, IoPort, Output};

pub(crate) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Configures and opens ports on a [`Backend`].
///
/// ```
/// use cadenza_midi_io::{PortBuilder, VirtualBackend};
///
/// let backend = VirtualBackend::new().with_device("Synth");
/// let port = PortBuilder::default()
///     .name("synth")
///     .poll_interval(std::time::Duration::from_millis(1))
///     .open_ioport(&backend)
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct PortBuilder {
    pub(crate) name: Option<String>,
    pub(crate) poll_interval: Duration,
}

impl Default for PortBuilder {
    fn default() -> Self {
        Self {
            name: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PortBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device to open. Exact names win over case-insensitive substring matches; without a
    /// name the backend's first device is used.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Slice length for blocking receives (default 10 ms).
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn open_input<B: Backend + ?Sized>(&self, backend: &B) -> Result<Input> {
        let (name, source) = backend.open_source(self.name.as_deref())?;
        Ok(Input::with_poll_interval(name, source, self.poll_interval))
    }

    pub fn open_output<B: Backend + ?Sized>(&self, backend: &B) -> Result<Output> {
        let (name, sink) = backend.open_sink(self.name.as_deref())?;
        Ok(Output::new(name, sink))
    }

    /// Opens both directions of one device; the name is resolved against devices that have
    /// both.
    pub fn open_ioport<B: Backend + ?Sized>(&self, backend: &B) -> Result<IoPort> {
        let name = crate::backend::resolve_name(&backend.ioport_names()?, self.name.as_deref())?;
        let builder = self.clone().name(name);
        let input = builder.open_input(backend)?;
        let output = builder.open_output(backend)?;
        Ok(IoPort::new(input, output))
    }
}

pub fn open_input<B: Backend + ?Sized>(backend: &B, name: Option<&str>) -> Result<Input> {
    builder_for(name).open_input(backend)
}

pub fn open_output<B: Backend + ?Sized>(backend: &B, name: Option<&str>) -> Result<Output> {
    builder_for(name).open_output(backend)
}

pub fn open_ioport<B: Backend + ?Sized>(backend: &B, name: Option<&str>) -> Result<IoPort> {
    builder_for(name).open_ioport(backend)
}

pub fn input_names<B: Backend + ?Sized>(backend: &B) -> Result<Vec<String>> {
    backend.input_names()
}

pub fn output_names<B: Backend + ?Sized>(backend: &B) -> Result<Vec<String>> {
    backend.output_names()
}

pub fn ioport_names<B: Backend + ?Sized>(backend: &B) -> Result<Vec<String>> {
    backend.ioport_names()
}

fn builder_for(name: Option<&str>) -> PortBuilder {
    match name {
        Some(name) => PortBuilder::new().name(name),
        None => PortBuilder::new(),
    }
}
