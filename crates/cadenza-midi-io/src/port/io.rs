//! Bidirectional port built from one input and one output.

use cadenza_midi::Message;

use super::{Input, InputPort, Output, OutputPort, Port};
use crate::error::Result;

/// Each half keeps its own closed state; the port reports closed once both halves are.
#[derive(Debug)]
pub struct IoPort {
    input: Input,
    output: Output,
}

impl IoPort {
    pub fn new(input: Input, output: Output) -> Self {
        Self { input, output }
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn into_parts(self) -> (Input, Output) {
        (self.input, self.output)
    }
}

impl Port for IoPort {
    /// The input half's name.
    fn name(&self) -> &str {
        self.input.name()
    }

    fn close(&self) {
        self.input.close();
        self.output.close();
    }

    fn is_closed(&self) -> bool {
        self.input.is_closed() && self.output.is_closed()
    }
}

impl InputPort for IoPort {
    fn receive(&self, block: bool) -> Result<Option<Message>> {
        self.input.receive(block)
    }
}

impl OutputPort for IoPort {
    fn send(&self, message: &Message) -> Result<()> {
        self.output.send(message)
    }
}
