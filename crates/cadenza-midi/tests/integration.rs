//! Integration tests for cadenza-midi.
//!
//! Exercise the message model and the stream parser together, and cross-check the wire
//! encoding against an independent MIDI implementation.

use cadenza_midi::{parse_all, Message, MessageKind, MessageType, Parser};
use midly::live::LiveEvent;
use midly::MidiMessage;

fn sample_messages() -> Vec<Message> {
    let mut out = Vec::new();
    for channel in [0, 9, 15] {
        out.push(Message::note_on(channel, 60, 64).unwrap());
        out.push(Message::note_off(channel, 127, 0).unwrap());
        out.push(Message::control_change(channel, 7, 127).unwrap());
        out.push(Message::program_change(channel, 42).unwrap());
        out.push(Message::pitchwheel(channel, -8192).unwrap());
        out.push(Message::pitchwheel(channel, 8191).unwrap());
        out.push(Message::pitchwheel(channel, 0).unwrap());
        out.push(
            Message::with_params("polytouch", [("channel", channel), ("note", 3), ("value", 99)])
                .unwrap(),
        );
        out.push(Message::with_params("aftertouch", [("channel", channel), ("value", 1)]).unwrap());
    }
    out.push(Message::sysex(Vec::new()).unwrap());
    out.push(Message::sysex((0..=127).collect::<Vec<u8>>()).unwrap());
    out.push(
        Message::with_params("quarter_frame", [("frame_type", 5), ("frame_value", 9)]).unwrap(),
    );
    out.push(Message::with_params("songpos", [("pos", 12345)]).unwrap());
    out.push(Message::with_params("song_select", [("song", 127)]).unwrap());
    for ty in MessageType::ALL {
        out.push(Message::default_for(ty));
    }
    out
}

// ---------------------------------------------------------------------------
// 1. Round-trip through the stream parser
// ---------------------------------------------------------------------------

#[test]
fn test_every_message_round_trips_through_parser() {
    for msg in sample_messages() {
        let parsed = parse_all(msg.to_bytes());
        assert_eq!(parsed, vec![msg.clone()], "{}", msg);
        assert_eq!(Message::from_bytes(&msg.to_bytes()).unwrap(), msg);
    }
}

#[test]
fn test_concatenated_stream_round_trips() {
    let messages = sample_messages();
    let stream: Vec<u8> = messages.iter().flat_map(|m| m.to_bytes()).collect();
    assert_eq!(parse_all(stream), messages);
}

/// Same stream, one byte per call: the parser must not care how input is chunked.
#[test]
fn test_byte_per_call_matches_bulk() {
    let messages = sample_messages();
    let stream: Vec<u8> = messages.iter().flat_map(|m| m.to_bytes()).collect();
    let mut parser = Parser::new();
    let mut parsed = Vec::new();
    for byte in stream {
        parsed.extend(parser.feed(byte));
    }
    assert_eq!(parsed, messages);
    assert_eq!(parser.pending(), 0);
}

/// A clock byte after every byte of a stream leaves the other messages intact.
#[test]
fn test_clock_interleaved_everywhere() {
    let messages = sample_messages();
    let stream: Vec<u8> = messages
        .iter()
        .flat_map(|m| m.to_bytes())
        .flat_map(|b| [b, 0xF8])
        .collect();
    let parsed: Vec<Message> = parse_all(stream)
        .into_iter()
        .filter(|m| m.message_type() != MessageType::Clock)
        .collect();
    let expected: Vec<Message> = messages
        .into_iter()
        .filter(|m| m.message_type() != MessageType::Clock)
        .collect();
    assert_eq!(parsed, expected);
}

// ---------------------------------------------------------------------------
// 2. Resynchronization after garbage
// ---------------------------------------------------------------------------

/// Deterministic byte noise (xorshift), no external RNG needed.
fn noise(seed: u32, len: usize) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

#[test]
fn test_recovers_after_noise() {
    let expected = Message::control_change(3, 74, 100).unwrap();
    for seed in 1..50 {
        let mut parser = Parser::new();
        let _ = parser.feed_bytes(noise(seed, 64)).count();
        // Close any sysex the noise may have opened, then send a complete message.
        let _ = parser.feed(0xF7);
        let parsed: Vec<Message> = parser
            .feed_bytes(expected.to_bytes())
            .filter(|m| !m.is_realtime())
            .collect();
        assert_eq!(parsed, vec![expected.clone()], "seed {}", seed);
    }
}

#[test]
fn test_noise_never_yields_invalid_messages() {
    for seed in 100..120 {
        for msg in parse_all(noise(seed, 512)) {
            let rebuilt = Message::new(msg.kind().clone()).unwrap();
            assert_eq!(rebuilt, msg);
            assert_eq!(parse_all(msg.to_bytes()), vec![msg]);
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Cross-check against midly's live event parser
// ---------------------------------------------------------------------------

#[test]
fn test_channel_encoding_matches_midly() {
    for msg in sample_messages().into_iter().filter(Message::is_channel_voice) {
        let bytes = msg.to_bytes();
        let event = LiveEvent::parse(&bytes).unwrap();
        let LiveEvent::Midi { channel, message } = event else {
            panic!("expected channel message for {}", msg);
        };
        assert_eq!(Some(channel.as_int()), msg.channel());

        match (msg.kind(), message) {
            (MessageKind::NoteOn { note, velocity, .. }, MidiMessage::NoteOn { key, vel })
            | (MessageKind::NoteOff { note, velocity, .. }, MidiMessage::NoteOff { key, vel })
            | (MessageKind::Polytouch { note, value: velocity, .. }, MidiMessage::Aftertouch { key, vel }) => {
                assert_eq!(key.as_int(), *note);
                assert_eq!(vel.as_int(), *velocity);
            }
            (
                MessageKind::ControlChange { control, value, .. },
                MidiMessage::Controller { controller, value: v },
            ) => {
                assert_eq!(controller.as_int(), *control);
                assert_eq!(v.as_int(), *value);
            }
            (MessageKind::ProgramChange { program, .. }, MidiMessage::ProgramChange { program: p }) => {
                assert_eq!(p.as_int(), *program);
            }
            (MessageKind::Aftertouch { value, .. }, MidiMessage::ChannelAftertouch { vel }) => {
                assert_eq!(vel.as_int(), *value);
            }
            (MessageKind::Pitchwheel { pitch, .. }, MidiMessage::PitchBend { bend }) => {
                assert_eq!(bend.as_int(), *pitch);
            }
            (ours, theirs) => panic!("mismatch: {:?} vs {:?}", ours, theirs),
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Text form
// ---------------------------------------------------------------------------

#[test]
fn test_text_round_trip_all_samples() {
    for msg in sample_messages() {
        let text = msg.to_string();
        let back: Message = text.parse().unwrap();
        assert_eq!(back, msg, "{}", text);
    }
}
