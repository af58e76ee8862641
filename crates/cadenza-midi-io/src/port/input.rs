//! Input port: byte source plus stream parser.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use cadenza_midi::{Message, Parser};
use parking_lot::Mutex;
use tracing::debug;

use super::{InputPort, Port};
use crate::backend::{ByteSource, Next};
use crate::builder::DEFAULT_POLL_INTERVAL;
use crate::error::{Error, Result};

struct InputState {
    parser: Parser,
    source: Option<Box<dyn ByteSource>>,
}

pub struct Input {
    name: String,
    closed: AtomicBool,
    poll_interval: Duration,
    state: Mutex<InputState>,
}

impl Input {
    pub fn new(name: impl Into<String>, source: Box<dyn ByteSource>) -> Self {
        Self::with_poll_interval(name, source, DEFAULT_POLL_INTERVAL)
    }

    /// `poll_interval` bounds how long a blocked [`receive`](InputPort::receive) can take to
    /// notice a [`close`](Port::close) from another thread. Zero is bumped to 1 ms.
    pub fn with_poll_interval(
        name: impl Into<String>,
        source: Box<dyn ByteSource>,
        poll_interval: Duration,
    ) -> Self {
        let name = name.into();
        debug!("Opened MIDI input port: {}", name);
        Self {
            name,
            closed: AtomicBool::new(false),
            poll_interval: poll_interval.max(Duration::from_millis(1)),
            state: Mutex::new(InputState {
                parser: Parser::new(),
                source: Some(source),
            }),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Port for Input {
    fn name(&self) -> &str {
        &self.name
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        // A blocked receiver holds the lock for at most one poll interval.
        let mut state = self.state.lock();
        if let Some(mut source) = state.source.take() {
            source.close();
        }
        state.parser.reset();
        debug!("Closed MIDI input port: {}", self.name);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl InputPort for Input {
    fn receive(&self, block: bool) -> Result<Option<Message>> {
        let timeout = if block {
            self.poll_interval
        } else {
            Duration::ZERO
        };

        loop {
            if self.is_closed() {
                return Err(Error::PortClosed);
            }

            let mut state = self.state.lock();
            let InputState { parser, source } = &mut *state;
            let Some(source) = source.as_mut() else {
                return Err(Error::PortClosed);
            };

            match source.next_byte(timeout) {
                Ok(Next::Byte(byte)) => {
                    if let Some(message) = parser.feed(byte) {
                        return Ok(Some(message));
                    }
                }
                Ok(Next::Empty) => {
                    if !block {
                        return Ok(None);
                    }
                }
                Ok(Next::End) => {
                    drop(state);
                    debug!("MIDI input '{}' reached end of stream", self.name);
                    self.close();
                    return Err(Error::PortClosed);
                }
                Err(e) => {
                    drop(state);
                    debug!("MIDI input '{}' failed: {}", self.name, e);
                    self.close();
                    return Err(Error::Port(e));
                }
            }
        }
    }
}

impl Drop for Input {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Input")
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}
