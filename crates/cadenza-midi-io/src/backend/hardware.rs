//! Hardware devices through midir.
//!
//! midir connections are not `Send` on every platform, so each open endpoint gets a
//! dedicated thread that creates and owns its client and connection. The port side only
//! holds channels.

use std::io;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use midir::{Ignore, MidiInput, MidiOutput};
use tracing::{debug, warn};

use super::{resolve_name, Backend, ByteSink, ByteSource, ChannelSource, Next};
use crate::error::{Error, Result};

/// Backend over the system MIDI API (ALSA, CoreMIDI, WinMM).
#[derive(Debug, Clone)]
pub struct MidirBackend {
    client_name: String,
}

impl MidirBackend {
    pub fn new() -> Self {
        Self::with_client_name("cadenza")
    }

    /// The client name shows up in the system's MIDI patchbay.
    pub fn with_client_name(name: impl Into<String>) -> Self {
        Self {
            client_name: name.into(),
        }
    }

    fn input(&self) -> Result<MidiInput> {
        let mut input = MidiInput::new(&format!("{}-input", self.client_name))?;
        input.ignore(Ignore::None);
        Ok(input)
    }

    fn output(&self) -> Result<MidiOutput> {
        Ok(MidiOutput::new(&format!("{}-output", self.client_name))?)
    }
}

impl Default for MidirBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn input_port_names(input: &MidiInput) -> Vec<String> {
    input
        .ports()
        .iter()
        .enumerate()
        .map(|(index, port)| {
            input
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown Device {}", index))
        })
        .collect()
}

fn output_port_names(output: &MidiOutput) -> Vec<String> {
    output
        .ports()
        .iter()
        .enumerate()
        .map(|(index, port)| {
            output
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown Device {}", index))
        })
        .collect()
}

impl Backend for MidirBackend {
    fn input_names(&self) -> Result<Vec<String>> {
        Ok(input_port_names(&self.input()?))
    }

    fn output_names(&self) -> Result<Vec<String>> {
        Ok(output_port_names(&self.output()?))
    }

    fn open_source(&self, name: Option<&str>) -> Result<(String, Box<dyn ByteSource>)> {
        let resolved = resolve_name(&self.input_names()?, name)?;
        let backend = self.clone();
        let (ready_tx, ready_rx) = bounded(1);
        let (packet_tx, packet_rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);

        let port_name = resolved.clone();
        let client_port = format!("{}-in", self.client_name);
        thread::Builder::new()
            .name(format!("midi-input-{}", resolved))
            .spawn(move || {
                input_thread(&backend, port_name, client_port, packet_tx, ready_tx, shutdown_rx)
            })?;

        wait_ready(&ready_rx)?;
        debug!("Opened MIDI input: {}", resolved);
        let source = MidirSource {
            packets: ChannelSource::new(packet_rx),
            shutdown: Some(shutdown_tx),
        };
        Ok((resolved, Box::new(source)))
    }

    fn open_sink(&self, name: Option<&str>) -> Result<(String, Box<dyn ByteSink>)> {
        let resolved = resolve_name(&self.output_names()?, name)?;
        let backend = self.clone();
        let (ready_tx, ready_rx) = bounded(1);
        let (command_tx, command_rx) = bounded(1024);

        let port_name = resolved.clone();
        let client_port = format!("{}-out", self.client_name);
        thread::Builder::new()
            .name(format!("midi-output-{}", resolved))
            .spawn(move || output_thread(&backend, port_name, client_port, command_rx, ready_tx))?;

        wait_ready(&ready_rx)?;
        debug!("Opened MIDI output: {}", resolved);
        Ok((resolved, Box::new(MidirSink { commands: Some(command_tx) })))
    }
}

fn wait_ready(ready: &Receiver<std::result::Result<(), String>>) -> Result<()> {
    match ready.recv() {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Error::Device(e)),
        Err(_) => Err(Error::Device("MIDI thread exited during connect".to_string())),
    }
}

fn input_thread(
    backend: &MidirBackend,
    name: String,
    client_port: String,
    packets: Sender<Vec<u8>>,
    ready: Sender<std::result::Result<(), String>>,
    shutdown: Receiver<()>,
) {
    let input = match backend.input() {
        Ok(input) => input,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    let Some(port) = input
        .ports()
        .into_iter()
        .find(|port| input.port_name(port).ok().as_deref() == Some(name.as_str()))
    else {
        let _ = ready.send(Err(format!("MIDI input '{}' disappeared", name)));
        return;
    };

    let connection = input.connect(
        &port,
        &client_port,
        move |_timestamp, bytes, _| {
            if packets.send(bytes.to_vec()).is_err() {
                debug!("MIDI input closed, dropping {} bytes", bytes.len());
            }
        },
        (),
    );
    let connection = match connection {
        Ok(connection) => connection,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    // Blocks until the source drops its end.
    let _ = shutdown.recv();
    connection.close();
    debug!("MIDI input thread for '{}' exiting", name);
}

enum OutputCommand {
    Send(Vec<u8>, Sender<std::result::Result<(), String>>),
}

fn output_thread(
    backend: &MidirBackend,
    name: String,
    client_port: String,
    commands: Receiver<OutputCommand>,
    ready: Sender<std::result::Result<(), String>>,
) {
    let output = match backend.output() {
        Ok(output) => output,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    let Some(port) = output
        .ports()
        .into_iter()
        .find(|port| output.port_name(port).ok().as_deref() == Some(name.as_str()))
    else {
        let _ = ready.send(Err(format!("MIDI output '{}' disappeared", name)));
        return;
    };

    let mut connection = match output.connect(&port, &client_port) {
        Ok(connection) => connection,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    while let Ok(OutputCommand::Send(bytes, reply)) = commands.recv() {
        let result = connection
            .send(&bytes)
            .map_err(|e| Error::from(e).to_string());
        if let Err(e) = &result {
            warn!("MIDI send to '{}' failed: {}", name, e);
        }
        let _ = reply.send(result);
    }
    connection.close();
    debug!("MIDI output thread for '{}' exiting", name);
}

struct MidirSource {
    packets: ChannelSource,
    shutdown: Option<Sender<()>>,
}

impl ByteSource for MidirSource {
    fn next_byte(&mut self, timeout: Duration) -> io::Result<Next> {
        self.packets.next_byte(timeout)
    }

    fn close(&mut self) {
        self.shutdown.take();
    }
}

struct MidirSink {
    commands: Option<Sender<OutputCommand>>,
}

impl ByteSink for MidirSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let Some(commands) = &self.commands else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "MIDI output closed"));
        };
        let (reply_tx, reply_rx) = bounded(1);
        commands
            .send(OutputCommand::Send(bytes.to_vec(), reply_tx))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "MIDI output thread gone"))?;
        match reply_rx.recv() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(io::Error::new(io::ErrorKind::Other, e)),
            Err(_) => Err(io::Error::new(io::ErrorKind::BrokenPipe, "MIDI output thread gone")),
        }
    }

    fn close(&mut self) {
        self.commands.take();
    }
}
