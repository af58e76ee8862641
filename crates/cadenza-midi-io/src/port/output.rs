//! Output port: message encoder over a byte sink.

use std::sync::atomic::{AtomicBool, Ordering};

use cadenza_midi::Message;
use parking_lot::Mutex;
use tracing::debug;

use super::{OutputPort, Port};
use crate::backend::ByteSink;
use crate::error::{Error, Result};

struct OutputState {
    sink: Option<Box<dyn ByteSink>>,
    buffer: Vec<u8>,
}

pub struct Output {
    name: String,
    closed: AtomicBool,
    state: Mutex<OutputState>,
}

impl Output {
    pub fn new(name: impl Into<String>, sink: Box<dyn ByteSink>) -> Self {
        let name = name.into();
        debug!("Opened MIDI output port: {}", name);
        Self {
            name,
            closed: AtomicBool::new(false),
            state: Mutex::new(OutputState {
                sink: Some(sink),
                buffer: Vec::with_capacity(3),
            }),
        }
    }
}

impl Port for Output {
    fn name(&self) -> &str {
        &self.name
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(mut sink) = self.state.lock().sink.take() {
            sink.close();
        }
        debug!("Closed MIDI output port: {}", self.name);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl OutputPort for Output {
    fn send(&self, message: &Message) -> Result<()> {
        if self.is_closed() {
            return Err(Error::PortClosed);
        }

        let mut state = self.state.lock();
        let OutputState { sink, buffer } = &mut *state;
        let Some(sink) = sink.as_mut() else {
            return Err(Error::PortClosed);
        };

        buffer.clear();
        message.write_to(buffer);
        if let Err(e) = sink.write(buffer) {
            drop(state);
            debug!("MIDI output '{}' failed: {}", self.name, e);
            self.close();
            return Err(Error::Port(e));
        }
        Ok(())
    }
}

impl Drop for Output {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}
