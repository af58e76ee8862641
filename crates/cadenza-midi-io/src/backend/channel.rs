//! Channel-backed byte source and sink.
//!
//! Packets (whatever chunking the producer uses) travel over a crossbeam channel and are
//! handed to the port one byte at a time.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use super::{ByteSink, ByteSource, Next};

#[derive(Debug)]
pub struct ChannelSource {
    packets: Receiver<Vec<u8>>,
    buffered: VecDeque<u8>,
}

impl ChannelSource {
    pub fn new(packets: Receiver<Vec<u8>>) -> Self {
        Self {
            packets,
            buffered: VecDeque::new(),
        }
    }

    /// Waits for one packet. `None` means the sending side is gone.
    fn recv(&self, timeout: Duration) -> Option<Option<Vec<u8>>> {
        if timeout.is_zero() {
            match self.packets.try_recv() {
                Ok(packet) => Some(Some(packet)),
                Err(TryRecvError::Empty) => Some(None),
                Err(TryRecvError::Disconnected) => None,
            }
        } else {
            match self.packets.recv_timeout(timeout) {
                Ok(packet) => Some(Some(packet)),
                Err(RecvTimeoutError::Timeout) => Some(None),
                Err(RecvTimeoutError::Disconnected) => None,
            }
        }
    }
}

impl ByteSource for ChannelSource {
    fn next_byte(&mut self, timeout: Duration) -> io::Result<Next> {
        if let Some(byte) = self.buffered.pop_front() {
            return Ok(Next::Byte(byte));
        }
        match self.recv(timeout) {
            None => Ok(Next::End),
            Some(None) => Ok(Next::Empty),
            Some(Some(packet)) => {
                self.buffered.extend(packet);
                Ok(self.buffered.pop_front().map_or(Next::Empty, Next::Byte))
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChannelSink {
    packets: Sender<Vec<u8>>,
}

impl ChannelSink {
    pub fn new(packets: Sender<Vec<u8>>) -> Self {
        Self { packets }
    }
}

impl ByteSink for ChannelSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.packets
            .send(bytes.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "MIDI receiver disconnected"))
    }
}
