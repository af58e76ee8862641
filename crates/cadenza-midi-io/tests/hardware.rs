//! Hardware integration tests using a loopback MIDI device (macOS IAC Driver, or an ALSA
//! `snd-virmidi` pair connected to itself).
//!
//! All tests are `#[ignore]` so CI doesn't fail without hardware.
//!
//! Run with:
//!   CADENZA_LOOPBACK="IAC Driver Bus 1" cargo test -p cadenza-midi-io --test hardware -- --ignored --test-threads=1

#![cfg(feature = "midi-io")]

use std::thread;
use std::time::Duration;

use cadenza_midi::Message;
use cadenza_midi_io::{InputPort, MidirBackend, OutputPort, Port, PortBuilder};

const SETTLE: Duration = Duration::from_millis(200);
const SEND_READ_DELAY: Duration = Duration::from_millis(100);

fn loopback_name() -> String {
    std::env::var("CADENZA_LOOPBACK").unwrap_or_else(|_| "IAC".to_string())
}

#[test]
#[ignore]
fn test_loopback_note_round_trip() {
    let backend = MidirBackend::with_client_name("cadenza-test");
    let port = PortBuilder::new()
        .name(loopback_name())
        .open_ioport(&backend)
        .expect("loopback device should be available");
    thread::sleep(SETTLE);

    let msg = Message::note_on(0, 60, 100).unwrap();
    port.send(&msg).unwrap();
    thread::sleep(SEND_READ_DELAY);

    let received: Vec<Message> = port.iter_pending().collect();
    assert!(received.contains(&msg), "got {:?}", received);
    port.close();
}

#[test]
#[ignore]
fn test_loopback_sysex() {
    let backend = MidirBackend::with_client_name("cadenza-test");
    let port = PortBuilder::new()
        .name(loopback_name())
        .open_ioport(&backend)
        .expect("loopback device should be available");
    thread::sleep(SETTLE);

    let msg = Message::sysex(vec![0x7D, 0x01, 0x02, 0x03]).unwrap();
    port.send(&msg).unwrap();
    thread::sleep(SEND_READ_DELAY);

    let received: Vec<Message> = port.iter_pending().collect();
    assert!(received.contains(&msg), "got {:?}", received);
}
