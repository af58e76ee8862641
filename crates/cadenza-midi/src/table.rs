//! Static message table: status byte, named parameters and wire length per message type.
//!
//! Everything that knows "which bytes make a note_on" reads this table, so encoding,
//! decoding, validation and the streaming parser can never disagree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::message::Value;

/// Closed set of MIDI message types.
///
/// Discriminants index into the static table, in the same order as [`MessageType::ALL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    NoteOff,
    NoteOn,
    Polytouch,
    ControlChange,
    ProgramChange,
    Aftertouch,
    Pitchwheel,
    Sysex,
    QuarterFrame,
    Songpos,
    SongSelect,
    TuneRequest,
    Clock,
    Start,
    Continue,
    Stop,
    ActiveSensing,
    Reset,
}

impl MessageType {
    pub const ALL: [MessageType; 18] = [
        MessageType::NoteOff,
        MessageType::NoteOn,
        MessageType::Polytouch,
        MessageType::ControlChange,
        MessageType::ProgramChange,
        MessageType::Aftertouch,
        MessageType::Pitchwheel,
        MessageType::Sysex,
        MessageType::QuarterFrame,
        MessageType::Songpos,
        MessageType::SongSelect,
        MessageType::TuneRequest,
        MessageType::Clock,
        MessageType::Start,
        MessageType::Continue,
        MessageType::Stop,
        MessageType::ActiveSensing,
        MessageType::Reset,
    ];

    #[inline]
    pub fn spec(self) -> &'static MessageSpec {
        &SPECS[self as usize]
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Resolves a status byte. Channel voice statuses match on their high nibble;
    /// data bytes and undefined statuses (0xF4, 0xF5, 0xF7, 0xF9, 0xFD) give `None`.
    pub fn from_status(status: u8) -> Option<MessageType> {
        let ty = match status {
            0x80..=0x8F => MessageType::NoteOff,
            0x90..=0x9F => MessageType::NoteOn,
            0xA0..=0xAF => MessageType::Polytouch,
            0xB0..=0xBF => MessageType::ControlChange,
            0xC0..=0xCF => MessageType::ProgramChange,
            0xD0..=0xDF => MessageType::Aftertouch,
            0xE0..=0xEF => MessageType::Pitchwheel,
            0xF0 => MessageType::Sysex,
            0xF1 => MessageType::QuarterFrame,
            0xF2 => MessageType::Songpos,
            0xF3 => MessageType::SongSelect,
            0xF6 => MessageType::TuneRequest,
            0xF8 => MessageType::Clock,
            0xFA => MessageType::Start,
            0xFB => MessageType::Continue,
            0xFC => MessageType::Stop,
            0xFE => MessageType::ActiveSensing,
            0xFF => MessageType::Reset,
            _ => return None,
        };
        Some(ty)
    }

    /// Carries a channel in the low nibble of its status byte.
    #[inline]
    pub fn is_channel_voice(self) -> bool {
        self.spec().status < 0xF0
    }

    /// Single-byte message that may appear anywhere in the stream.
    #[inline]
    pub fn is_realtime(self) -> bool {
        self.spec().status >= 0xF8
    }

    /// System common, including sysex.
    #[inline]
    pub fn is_system_common(self) -> bool {
        (0xF0..0xF8).contains(&self.spec().status)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MessageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SPECS
            .iter()
            .find(|spec| spec.name == s)
            .map(|spec| spec.kind)
            .ok_or_else(|| Error::UnknownType(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// Single integer within `min..=max`.
    Int,
    /// Byte sequence; every element must lie within `min..=max`.
    Bytes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub min: i32,
    pub max: i32,
}

impl ParamSpec {
    const fn int(name: &'static str, min: i32, max: i32) -> Self {
        Self {
            name,
            kind: ParamKind::Int,
            min,
            max,
        }
    }

    /// Value used when a constructor omits the parameter.
    pub fn default_value(&self) -> Value {
        match self.kind {
            ParamKind::Int => Value::Int(0),
            ParamKind::Bytes => Value::Bytes(Vec::new()),
        }
    }

    pub fn check(&self, value: &Value) -> Result<(), Error> {
        let (min, max) = (i64::from(self.min), i64::from(self.max));
        match (self.kind, value) {
            (ParamKind::Int, Value::Int(v)) if (min..=max).contains(v) => Ok(()),
            (ParamKind::Int, Value::Int(v)) => Err(self.invalid(format!(
                "{} is outside {}..={}",
                v, self.min, self.max
            ))),
            (ParamKind::Bytes, Value::Bytes(bytes)) => {
                match bytes.iter().find(|&&b| !(min..=max).contains(&i64::from(b))) {
                    Some(b) => Err(self.invalid(format!(
                        "byte {} is outside {}..={}",
                        b, self.min, self.max
                    ))),
                    None => Ok(()),
                }
            }
            (ParamKind::Int, Value::Bytes(_)) => Err(self.invalid("expected an integer".into())),
            (ParamKind::Bytes, Value::Int(_)) => {
                Err(self.invalid("expected a byte sequence".into()))
            }
        }
    }

    fn invalid(&self, reason: String) -> Error {
        Error::InvalidParameter {
            name: self.name,
            reason,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Length {
    /// Total encoded bytes, status byte included.
    Fixed(usize),
    /// Open-ended run bracketed by 0xF0 / 0xF7.
    Sysex,
}

#[derive(Debug)]
pub struct MessageSpec {
    pub kind: MessageType,
    pub name: &'static str,
    /// Status byte; channel voice entries keep the channel nibble at zero.
    pub status: u8,
    pub params: &'static [ParamSpec],
    pub length: Length,
}

impl MessageSpec {
    /// Data bytes following the status byte, `None` for sysex.
    #[inline]
    pub fn data_len(&self) -> Option<usize> {
        match self.length {
            Length::Fixed(n) => Some(n - 1),
            Length::Sysex => None,
        }
    }

    pub fn param(&self, name: &str) -> Option<(usize, &'static ParamSpec)> {
        self.params
            .iter()
            .enumerate()
            .find(|(_, param)| param.name == name)
    }
}

const CHANNEL: ParamSpec = ParamSpec::int("channel", 0, 15);
const NOTE: ParamSpec = ParamSpec::int("note", 0, 127);
const VELOCITY: ParamSpec = ParamSpec::int("velocity", 0, 127);
const VALUE: ParamSpec = ParamSpec::int("value", 0, 127);
const CONTROL: ParamSpec = ParamSpec::int("control", 0, 127);
const PROGRAM: ParamSpec = ParamSpec::int("program", 0, 127);
const PITCH: ParamSpec = ParamSpec::int("pitch", -8192, 8191);
const DATA: ParamSpec = ParamSpec {
    name: "data",
    kind: ParamKind::Bytes,
    min: 0,
    max: 127,
};
const FRAME_TYPE: ParamSpec = ParamSpec::int("frame_type", 0, 7);
const FRAME_VALUE: ParamSpec = ParamSpec::int("frame_value", 0, 15);
const POS: ParamSpec = ParamSpec::int("pos", 0, 16383);
const SONG: ParamSpec = ParamSpec::int("song", 0, 127);

const fn entry(
    kind: MessageType,
    name: &'static str,
    status: u8,
    params: &'static [ParamSpec],
    length: Length,
) -> MessageSpec {
    MessageSpec {
        kind,
        name,
        status,
        params,
        length,
    }
}

static SPECS: [MessageSpec; 18] = [
    entry(MessageType::NoteOff, "note_off", 0x80, &[CHANNEL, NOTE, VELOCITY], Length::Fixed(3)),
    entry(MessageType::NoteOn, "note_on", 0x90, &[CHANNEL, NOTE, VELOCITY], Length::Fixed(3)),
    entry(MessageType::Polytouch, "polytouch", 0xA0, &[CHANNEL, NOTE, VALUE], Length::Fixed(3)),
    entry(
        MessageType::ControlChange,
        "control_change",
        0xB0,
        &[CHANNEL, CONTROL, VALUE],
        Length::Fixed(3),
    ),
    entry(
        MessageType::ProgramChange,
        "program_change",
        0xC0,
        &[CHANNEL, PROGRAM],
        Length::Fixed(2),
    ),
    entry(MessageType::Aftertouch, "aftertouch", 0xD0, &[CHANNEL, VALUE], Length::Fixed(2)),
    entry(MessageType::Pitchwheel, "pitchwheel", 0xE0, &[CHANNEL, PITCH], Length::Fixed(3)),
    entry(MessageType::Sysex, "sysex", 0xF0, &[DATA], Length::Sysex),
    entry(
        MessageType::QuarterFrame,
        "quarter_frame",
        0xF1,
        &[FRAME_TYPE, FRAME_VALUE],
        Length::Fixed(2),
    ),
    entry(MessageType::Songpos, "songpos", 0xF2, &[POS], Length::Fixed(3)),
    entry(MessageType::SongSelect, "song_select", 0xF3, &[SONG], Length::Fixed(2)),
    entry(MessageType::TuneRequest, "tune_request", 0xF6, &[], Length::Fixed(1)),
    entry(MessageType::Clock, "clock", 0xF8, &[], Length::Fixed(1)),
    entry(MessageType::Start, "start", 0xFA, &[], Length::Fixed(1)),
    entry(MessageType::Continue, "continue", 0xFB, &[], Length::Fixed(1)),
    entry(MessageType::Stop, "stop", 0xFC, &[], Length::Fixed(1)),
    entry(MessageType::ActiveSensing, "active_sensing", 0xFE, &[], Length::Fixed(1)),
    entry(MessageType::Reset, "reset", 0xFF, &[], Length::Fixed(1)),
];

/// Table entry for a status byte, if the status is defined.
#[inline]
pub fn spec_for_status(status: u8) -> Option<&'static MessageSpec> {
    MessageType::from_status(status).map(MessageType::spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_discriminants() {
        for ty in MessageType::ALL {
            assert_eq!(ty.spec().kind, ty);
        }
    }

    #[test]
    fn test_status_lookup_round_trip() {
        for ty in MessageType::ALL {
            assert_eq!(MessageType::from_status(ty.spec().status), Some(ty));
        }
        assert_eq!(MessageType::from_status(0x9F), Some(MessageType::NoteOn));
        assert_eq!(MessageType::from_status(0xEA), Some(MessageType::Pitchwheel));
    }

    #[test]
    fn test_undefined_statuses() {
        for status in [0x00, 0x7F, 0xF4, 0xF5, 0xF7, 0xF9, 0xFD] {
            assert!(spec_for_status(status).is_none(), "0x{:02X}", status);
        }
    }

    #[test]
    fn test_names_parse() {
        for ty in MessageType::ALL {
            assert_eq!(ty.name().parse::<MessageType>().unwrap(), ty);
        }
        assert_eq!(
            "note_of".parse::<MessageType>(),
            Err(Error::UnknownType("note_of".into()))
        );
    }

    #[test]
    fn test_categories() {
        assert!(MessageType::Pitchwheel.is_channel_voice());
        assert!(!MessageType::Sysex.is_channel_voice());
        assert!(MessageType::Sysex.is_system_common());
        assert!(MessageType::TuneRequest.is_system_common());
        assert!(MessageType::Clock.is_realtime());
        assert!(MessageType::Reset.is_realtime());
        assert!(!MessageType::Clock.is_system_common());
    }

    #[test]
    fn test_param_check() {
        let spec = MessageType::Pitchwheel.spec();
        let (index, pitch) = spec.param("pitch").unwrap();
        assert_eq!(index, 1);
        assert!(pitch.check(&Value::Int(-8192)).is_ok());
        assert!(pitch.check(&Value::Int(8191)).is_ok());
        assert!(pitch.check(&Value::Int(8192)).is_err());
        assert!(pitch.check(&Value::Bytes(vec![1])).is_err());

        let (_, data) = MessageType::Sysex.spec().param("data").unwrap();
        assert!(data.check(&Value::Bytes(vec![0, 127])).is_ok());
        assert!(data.check(&Value::Bytes(vec![0, 128])).is_err());
    }

    #[test]
    fn test_lengths() {
        assert_eq!(MessageType::NoteOn.spec().data_len(), Some(2));
        assert_eq!(MessageType::ProgramChange.spec().data_len(), Some(1));
        assert_eq!(MessageType::Clock.spec().data_len(), Some(0));
        assert_eq!(MessageType::Sysex.spec().data_len(), None);
    }
}
