//! Routes a short phrase through a virtual device and prints what arrives.

use std::thread;
use std::time::Duration;

use cadenza_midi::Message;
use cadenza_midi_io::{InputPort, OutputPort, Port, PortBuilder, VirtualBackend};

fn main() -> cadenza_midi_io::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let backend = VirtualBackend::new().with_device("Loopback");
    let builder = PortBuilder::new()
        .name("loopback")
        .poll_interval(Duration::from_millis(2));
    let input = builder.open_input(&backend)?;
    let output = builder.open_output(&backend)?;

    let player = thread::spawn(move || -> cadenza_midi_io::Result<()> {
        for note in [60, 64, 67, 72] {
            output.send(&Message::note_on(0, note, 90)?)?;
            thread::sleep(Duration::from_millis(50));
            output.send(&Message::note_off(0, note, 0)?)?;
        }
        output.close();
        Ok(())
    });

    for message in input.iter().take(8) {
        println!("{:<48} {}", message.to_string(), message.hex());
    }

    player
        .join()
        .unwrap_or_else(|_| Err(cadenza_midi_io::Error::Device("player panicked".into())))?;
    input.close();
    Ok(())
}
