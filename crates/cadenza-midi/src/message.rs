//! MIDI message value type with validated, table-driven parameters.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::table::{Length, MessageType};

/// Dynamically named parameter value, as used by [`Message::with_params`] and friends.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i64),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Int(_) => None,
            Value::Bytes(bytes) => Some(bytes),
        }
    }
}

macro_rules! value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

value_from_int!(u8, u16, u32, i8, i16, i32, i64);

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(bytes: [u8; N]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

/// One message per variant, each with its own statically typed fields.
///
/// Constructing a `MessageKind` directly does not validate it; wrap it with
/// [`Message::new`] to get a checked [`Message`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    NoteOff { channel: u8, note: u8, velocity: u8 },
    NoteOn { channel: u8, note: u8, velocity: u8 },
    Polytouch { channel: u8, note: u8, value: u8 },
    ControlChange { channel: u8, control: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    Aftertouch { channel: u8, value: u8 },
    /// Signed bend, -8192..=8191, 0 is centre.
    Pitchwheel { channel: u8, pitch: i16 },
    /// Payload without the 0xF0 / 0xF7 brackets.
    Sysex { data: Vec<u8> },
    QuarterFrame { frame_type: u8, frame_value: u8 },
    Songpos { pos: u16 },
    SongSelect { song: u8 },
    TuneRequest,
    Clock,
    Start,
    Continue,
    Stop,
    ActiveSensing,
    Reset,
}

type Values = SmallVec<[Value; 3]>;

impl MessageKind {
    pub fn message_type(&self) -> MessageType {
        match self {
            MessageKind::NoteOff { .. } => MessageType::NoteOff,
            MessageKind::NoteOn { .. } => MessageType::NoteOn,
            MessageKind::Polytouch { .. } => MessageType::Polytouch,
            MessageKind::ControlChange { .. } => MessageType::ControlChange,
            MessageKind::ProgramChange { .. } => MessageType::ProgramChange,
            MessageKind::Aftertouch { .. } => MessageType::Aftertouch,
            MessageKind::Pitchwheel { .. } => MessageType::Pitchwheel,
            MessageKind::Sysex { .. } => MessageType::Sysex,
            MessageKind::QuarterFrame { .. } => MessageType::QuarterFrame,
            MessageKind::Songpos { .. } => MessageType::Songpos,
            MessageKind::SongSelect { .. } => MessageType::SongSelect,
            MessageKind::TuneRequest => MessageType::TuneRequest,
            MessageKind::Clock => MessageType::Clock,
            MessageKind::Start => MessageType::Start,
            MessageKind::Continue => MessageType::Continue,
            MessageKind::Stop => MessageType::Stop,
            MessageKind::ActiveSensing => MessageType::ActiveSensing,
            MessageKind::Reset => MessageType::Reset,
        }
    }

    /// Parameter values in table order.
    fn values(&self) -> Values {
        let mut out = Values::new();
        match self {
            MessageKind::NoteOff {
                channel,
                note,
                velocity,
            }
            | MessageKind::NoteOn {
                channel,
                note,
                velocity,
            } => out.extend([(*channel).into(), (*note).into(), (*velocity).into()]),
            MessageKind::Polytouch {
                channel,
                note,
                value,
            } => out.extend([(*channel).into(), (*note).into(), (*value).into()]),
            MessageKind::ControlChange {
                channel,
                control,
                value,
            } => out.extend([(*channel).into(), (*control).into(), (*value).into()]),
            MessageKind::ProgramChange { channel, program } => {
                out.extend([(*channel).into(), (*program).into()])
            }
            MessageKind::Aftertouch { channel, value } => {
                out.extend([(*channel).into(), (*value).into()])
            }
            MessageKind::Pitchwheel { channel, pitch } => {
                out.extend([(*channel).into(), (*pitch).into()])
            }
            MessageKind::Sysex { data } => out.push(Value::Bytes(data.clone())),
            MessageKind::QuarterFrame {
                frame_type,
                frame_value,
            } => out.extend([(*frame_type).into(), (*frame_value).into()]),
            MessageKind::Songpos { pos } => out.push((*pos).into()),
            MessageKind::SongSelect { song } => out.push((*song).into()),
            MessageKind::TuneRequest
            | MessageKind::Clock
            | MessageKind::Start
            | MessageKind::Continue
            | MessageKind::Stop
            | MessageKind::ActiveSensing
            | MessageKind::Reset => {}
        }
        out
    }

    /// Rebuilds a kind from table-ordered values that already passed validation.
    fn from_values(ty: MessageType, mut values: Values) -> MessageKind {
        let int = |values: &Values, i: usize| values.get(i).and_then(Value::as_int).unwrap_or(0);
        let byte = |values: &Values, i: usize| int(values, i) as u8;
        match ty {
            MessageType::NoteOff => MessageKind::NoteOff {
                channel: byte(&values, 0),
                note: byte(&values, 1),
                velocity: byte(&values, 2),
            },
            MessageType::NoteOn => MessageKind::NoteOn {
                channel: byte(&values, 0),
                note: byte(&values, 1),
                velocity: byte(&values, 2),
            },
            MessageType::Polytouch => MessageKind::Polytouch {
                channel: byte(&values, 0),
                note: byte(&values, 1),
                value: byte(&values, 2),
            },
            MessageType::ControlChange => MessageKind::ControlChange {
                channel: byte(&values, 0),
                control: byte(&values, 1),
                value: byte(&values, 2),
            },
            MessageType::ProgramChange => MessageKind::ProgramChange {
                channel: byte(&values, 0),
                program: byte(&values, 1),
            },
            MessageType::Aftertouch => MessageKind::Aftertouch {
                channel: byte(&values, 0),
                value: byte(&values, 1),
            },
            MessageType::Pitchwheel => MessageKind::Pitchwheel {
                channel: byte(&values, 0),
                pitch: int(&values, 1) as i16,
            },
            MessageType::Sysex => {
                let data = match values.drain(..).next() {
                    Some(Value::Bytes(data)) => data,
                    _ => Vec::new(),
                };
                MessageKind::Sysex { data }
            }
            MessageType::QuarterFrame => MessageKind::QuarterFrame {
                frame_type: byte(&values, 0),
                frame_value: byte(&values, 1),
            },
            MessageType::Songpos => MessageKind::Songpos {
                pos: int(&values, 0) as u16,
            },
            MessageType::SongSelect => MessageKind::SongSelect {
                song: byte(&values, 0),
            },
            MessageType::TuneRequest => MessageKind::TuneRequest,
            MessageType::Clock => MessageKind::Clock,
            MessageType::Start => MessageKind::Start,
            MessageType::Continue => MessageKind::Continue,
            MessageType::Stop => MessageKind::Stop,
            MessageType::ActiveSensing => MessageKind::ActiveSensing,
            MessageType::Reset => MessageKind::Reset,
        }
    }

    /// Builds a kind from a status byte and its data bytes.
    ///
    /// Callers guarantee the status is defined, not sysex, and that `data` holds the
    /// table's data length of 7-bit bytes. Every 7-bit combination is in range.
    pub(crate) fn from_wire(status: u8, data: &[u8]) -> MessageKind {
        let channel = status & 0x0F;
        let d0 = data.first().copied().unwrap_or(0);
        let d1 = data.get(1).copied().unwrap_or(0);
        let fourteen = u16::from(d0) | (u16::from(d1) << 7);
        match MessageType::from_status(status) {
            Some(MessageType::NoteOff) => MessageKind::NoteOff {
                channel,
                note: d0,
                velocity: d1,
            },
            Some(MessageType::NoteOn) => MessageKind::NoteOn {
                channel,
                note: d0,
                velocity: d1,
            },
            Some(MessageType::Polytouch) => MessageKind::Polytouch {
                channel,
                note: d0,
                value: d1,
            },
            Some(MessageType::ControlChange) => MessageKind::ControlChange {
                channel,
                control: d0,
                value: d1,
            },
            Some(MessageType::ProgramChange) => MessageKind::ProgramChange {
                channel,
                program: d0,
            },
            Some(MessageType::Aftertouch) => MessageKind::Aftertouch { channel, value: d0 },
            Some(MessageType::Pitchwheel) => MessageKind::Pitchwheel {
                channel,
                pitch: fourteen as i16 - 8192,
            },
            Some(MessageType::Sysex) => MessageKind::Sysex {
                data: data.to_vec(),
            },
            Some(MessageType::QuarterFrame) => MessageKind::QuarterFrame {
                frame_type: d0 >> 4,
                frame_value: d0 & 0x0F,
            },
            Some(MessageType::Songpos) => MessageKind::Songpos { pos: fourteen },
            Some(MessageType::SongSelect) => MessageKind::SongSelect { song: d0 },
            Some(MessageType::TuneRequest) => MessageKind::TuneRequest,
            Some(MessageType::Clock) => MessageKind::Clock,
            Some(MessageType::Start) => MessageKind::Start,
            Some(MessageType::Continue) => MessageKind::Continue,
            Some(MessageType::Stop) => MessageKind::Stop,
            Some(MessageType::ActiveSensing) => MessageKind::ActiveSensing,
            Some(MessageType::Reset) | None => MessageKind::Reset,
        }
    }
}

/// A single MIDI message.
///
/// Parameters are validated against the message table on construction and on every
/// mutation. `time` is caller metadata: it is never encoded and never compared.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "crate::serde_support::RawMessage")]
#[serde(into = "crate::serde_support::RawMessage")]
pub struct Message {
    kind: MessageKind,
    time: f64,
}

impl Message {
    /// Validates `kind` and wraps it.
    pub fn new(kind: MessageKind) -> Result<Self> {
        let spec = kind.message_type().spec();
        for (param, value) in spec.params.iter().zip(kind.values().iter()) {
            param.check(value)?;
        }
        Ok(Self::from_kind(kind))
    }

    /// Skips validation; only for kinds built from 7-bit wire data.
    #[inline]
    pub(crate) fn from_kind(kind: MessageKind) -> Self {
        Self { kind, time: 0.0 }
    }

    /// Message with every parameter at its default (0, or empty sysex data).
    pub fn default_for(ty: MessageType) -> Self {
        let values = ty.spec().params.iter().map(|p| p.default_value()).collect();
        Self::from_kind(MessageKind::from_values(ty, values))
    }

    /// Builds a message by type name and named parameters.
    ///
    /// ```
    /// use cadenza_midi::Message;
    ///
    /// let msg = Message::with_params("note_on", [("note", 60), ("velocity", 64)]).unwrap();
    /// assert_eq!(msg.to_bytes(), vec![0x90, 60, 64]);
    /// ```
    pub fn with_params<N, V>(type_name: &str, params: impl IntoIterator<Item = (N, V)>) -> Result<Self>
    where
        N: AsRef<str>,
        V: Into<Value>,
    {
        let ty: MessageType = type_name.parse()?;
        Self::default_for(ty).copy_with(params)
    }

    /// Copy of `self` with the named parameters replaced. `time` is carried over.
    pub fn copy_with<N, V>(&self, overrides: impl IntoIterator<Item = (N, V)>) -> Result<Self>
    where
        N: AsRef<str>,
        V: Into<Value>,
    {
        let ty = self.message_type();
        let spec = ty.spec();
        let mut values = self.kind.values();
        for (name, value) in overrides {
            let name = name.as_ref();
            let (index, param) = spec.param(name).ok_or_else(|| Error::UnknownParameter {
                message_type: spec.name,
                name: name.to_string(),
            })?;
            let value = value.into();
            param.check(&value)?;
            values[index] = value;
        }
        Ok(Self {
            kind: MessageKind::from_values(ty, values),
            time: self.time,
        })
    }

    /// Replaces one parameter in place. On error `self` is left untouched.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        *self = self.copy_with([(name, value)])?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let (index, _) = self.message_type().spec().param(name)?;
        self.kind.values().into_iter().nth(index)
    }

    /// Named parameters in table order, channel first.
    pub fn params(&self) -> impl Iterator<Item = (&'static str, Value)> {
        let spec = self.message_type().spec();
        spec.params
            .iter()
            .map(|p| p.name)
            .zip(self.kind.values())
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Result<Self> {
        Self::new(MessageKind::NoteOn {
            channel,
            note,
            velocity,
        })
    }

    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Result<Self> {
        Self::new(MessageKind::NoteOff {
            channel,
            note,
            velocity,
        })
    }

    pub fn control_change(channel: u8, control: u8, value: u8) -> Result<Self> {
        Self::new(MessageKind::ControlChange {
            channel,
            control,
            value,
        })
    }

    pub fn program_change(channel: u8, program: u8) -> Result<Self> {
        Self::new(MessageKind::ProgramChange { channel, program })
    }

    /// `pitch`: signed 14-bit (-8192 to 8191).
    pub fn pitchwheel(channel: u8, pitch: i16) -> Result<Self> {
        Self::new(MessageKind::Pitchwheel { channel, pitch })
    }

    pub fn sysex(data: impl Into<Vec<u8>>) -> Result<Self> {
        Self::new(MessageKind::Sysex { data: data.into() })
    }

    #[inline]
    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    #[inline]
    pub fn into_kind(self) -> MessageKind {
        self.kind
    }

    #[inline]
    pub fn message_type(&self) -> MessageType {
        self.kind.message_type()
    }

    /// Channel for channel voice messages.
    #[inline]
    pub fn channel(&self) -> Option<u8> {
        match self.kind {
            MessageKind::NoteOff { channel, .. }
            | MessageKind::NoteOn { channel, .. }
            | MessageKind::Polytouch { channel, .. }
            | MessageKind::ControlChange { channel, .. }
            | MessageKind::ProgramChange { channel, .. }
            | MessageKind::Aftertouch { channel, .. }
            | MessageKind::Pitchwheel { channel, .. } => Some(channel),
            _ => None,
        }
    }

    #[inline]
    pub fn note(&self) -> Option<u8> {
        match self.kind {
            MessageKind::NoteOff { note, .. }
            | MessageKind::NoteOn { note, .. }
            | MessageKind::Polytouch { note, .. } => Some(note),
            _ => None,
        }
    }

    /// Sysex payload, without brackets.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.kind {
            MessageKind::Sysex { data } => Some(data),
            _ => None,
        }
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    #[inline]
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    #[inline]
    pub fn is_realtime(&self) -> bool {
        self.message_type().is_realtime()
    }

    #[inline]
    pub fn is_channel_voice(&self) -> bool {
        self.message_type().is_channel_voice()
    }

    /// Number of bytes [`Message::to_bytes`] produces.
    pub fn byte_len(&self) -> usize {
        match (&self.kind, self.message_type().spec().length) {
            (MessageKind::Sysex { data }, _) => data.len() + 2,
            (_, Length::Fixed(n)) => n,
            (_, Length::Sysex) => 2,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        self.write_to(&mut out);
        out
    }

    /// Appends the wire encoding to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        let status = self.message_type().spec().status;
        match &self.kind {
            MessageKind::NoteOff {
                channel,
                note,
                velocity,
            }
            | MessageKind::NoteOn {
                channel,
                note,
                velocity,
            } => out.extend_from_slice(&[status | channel, *note, *velocity]),
            MessageKind::Polytouch {
                channel,
                note,
                value,
            } => out.extend_from_slice(&[status | channel, *note, *value]),
            MessageKind::ControlChange {
                channel,
                control,
                value,
            } => out.extend_from_slice(&[status | channel, *control, *value]),
            MessageKind::ProgramChange { channel, program } => {
                out.extend_from_slice(&[status | channel, *program])
            }
            MessageKind::Aftertouch { channel, value } => {
                out.extend_from_slice(&[status | channel, *value])
            }
            MessageKind::Pitchwheel { channel, pitch } => {
                let unsigned = (i32::from(*pitch) + 8192) as u16;
                out.extend_from_slice(&[
                    status | channel,
                    (unsigned & 0x7F) as u8,
                    ((unsigned >> 7) & 0x7F) as u8,
                ]);
            }
            MessageKind::Sysex { data } => {
                out.push(0xF0);
                out.extend_from_slice(data);
                out.push(0xF7);
            }
            MessageKind::QuarterFrame {
                frame_type,
                frame_value,
            } => out.extend_from_slice(&[status, (frame_type << 4) | frame_value]),
            MessageKind::Songpos { pos } => {
                out.extend_from_slice(&[status, (pos & 0x7F) as u8, ((pos >> 7) & 0x7F) as u8])
            }
            MessageKind::SongSelect { song } => out.extend_from_slice(&[status, *song]),
            MessageKind::TuneRequest
            | MessageKind::Clock
            | MessageKind::Start
            | MessageKind::Continue
            | MessageKind::Stop
            | MessageKind::ActiveSensing
            | MessageKind::Reset => out.push(status),
        }
    }

    /// Strictly decodes exactly one complete message.
    ///
    /// Use [`crate::Parser`] for streams that may contain running status, interleaved
    /// realtime bytes or garbage.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (&status, data) = bytes
            .split_first()
            .ok_or_else(|| Error::Decode("no bytes".into()))?;
        if status < 0x80 {
            return Err(Error::Decode(format!(
                "first byte 0x{:02X} is not a status byte",
                status
            )));
        }
        let spec = MessageType::from_status(status)
            .map(MessageType::spec)
            .ok_or_else(|| Error::Decode(format!("undefined status byte 0x{:02X}", status)))?;

        let data = match spec.length {
            Length::Sysex => match data.split_last() {
                Some((&0xF7, payload)) => payload,
                _ => return Err(Error::Decode("sysex is missing its 0xF7 terminator".into())),
            },
            Length::Fixed(n) if bytes.len() != n => {
                return Err(Error::Decode(format!(
                    "{} takes {} bytes, got {}",
                    spec.name,
                    n,
                    bytes.len()
                )))
            }
            Length::Fixed(_) => data,
        };
        if let Some(b) = data.iter().find(|&&b| b > 0x7F) {
            return Err(Error::Decode(format!("data byte 0x{:02X} out of range", b)));
        }
        Ok(Self::from_kind(MessageKind::from_wire(status, data)))
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Message {}

impl Hash for Message {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl TryFrom<MessageKind> for Message {
    type Error = Error;

    fn try_from(kind: MessageKind) -> Result<Self> {
        Self::new(kind)
    }
}

impl TryFrom<&[u8]> for Message {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}

impl From<Message> for MessageKind {
    fn from(message: Message) -> Self {
        message.kind
    }
}
