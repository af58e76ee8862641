//! End-to-end routing tests through the umbrella crate.
//!
//! Text in, bytes over a virtual device, messages out.
//!
//! Run with:
//! ```bash
//! cargo test -p cadenza --test routing
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cadenza::prelude::*;
use cadenza::{multi_iter_pending, parse_string_stream, Input};

const SCRIPT: &str = "
# intro
program_change channel=0 program=5
note_on channel=0 note=60 velocity=100 time=0
clock
note_off channel=0 note=60 velocity=0 time=0.5

sysex data=(125,1,2)
";

fn script() -> Vec<Message> {
    parse_string_stream(SCRIPT.lines())
        .collect::<std::result::Result<_, _>>()
        .expect("script parses")
}

#[test]
fn test_script_replays_through_device() -> Result<()> {
    let backend = VirtualBackend::new().with_device("Replay");
    let port = open_ioport(&backend, Some("Replay"))?;

    for msg in script() {
        port.send(&msg)?;
    }
    let received: Vec<Message> = port.iter_pending().collect();
    assert_eq!(received, script());
    assert_eq!(received[4].hex(), "F0 7D 01 02 F7");
    Ok(())
}

/// A merger thread forwards two keyboards into one synth.
#[test]
fn test_merge_two_inputs_into_one_output() -> Result<()> {
    let backend = VirtualBackend::new()
        .with_device("Left")
        .with_device("Right")
        .with_device("Synth");

    let inputs = vec![
        open_input(&backend, Some("Left"))?,
        open_input(&backend, Some("Right"))?,
    ];
    let synth_out = open_output(&backend, Some("Synth"))?;
    let synth_in = Arc::new(
        PortBuilder::new()
            .name("Synth")
            .poll_interval(Duration::from_millis(1))
            .open_input(&backend)?,
    );

    let left = open_output(&backend, Some("Left"))?;
    let right = open_output(&backend, Some("Right"))?;
    left.send(&Message::note_on(0, 48, 90)?)?;
    right.send(&Message::note_on(1, 72, 90)?)?;
    left.send(&Message::note_off(0, 48, 0)?)?;

    let forwarded = {
        let inputs: Vec<&Input> = inputs.iter().collect();
        let mut count = 0;
        for (_, msg) in multi_iter_pending(&inputs) {
            synth_out.send(&msg)?;
            count += 1;
        }
        count
    };
    assert_eq!(forwarded, 3);

    let reader = {
        let synth_in = Arc::clone(&synth_in);
        thread::spawn(move || synth_in.iter().take(3).collect::<Vec<_>>())
    };
    let received = reader.join().expect("reader thread");
    let channels: Vec<Option<u8>> = received.iter().map(Message::channel).collect();
    assert_eq!(channels, vec![Some(0), Some(1), Some(0)]);
    Ok(())
}

#[test]
fn test_errors_convert_into_umbrella_error() {
    fn bad_value() -> Result<Message> {
        Ok("control_change value=128".parse::<Message>()?)
    }
    fn missing_port() -> Result<Input> {
        Ok(open_input(&VirtualBackend::new(), Some("nowhere"))?)
    }

    assert!(matches!(bad_value(), Err(Error::Message(_))));
    assert!(matches!(missing_port(), Err(Error::Port(_))));
}
