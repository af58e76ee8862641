//! Human-readable message form: `note_on channel=0 note=60 velocity=64 time=0`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::message::{Message, Value};
use crate::table::MessageType;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Bytes(bytes) => {
                f.write_str("(")?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", b)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message_type().name())?;
        for (name, value) in self.params() {
            write!(f, " {}={}", name, value)?;
        }
        write!(f, " time={}", self.time())
    }
}

impl FromStr for Message {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut words = s.split_whitespace();
        let ty: MessageType = words
            .next()
            .ok_or_else(|| Error::Text("empty string".into()))?
            .parse()?;

        let mut time = 0.0;
        let mut params = Vec::new();
        for word in words {
            let (name, raw) = word
                .split_once('=')
                .ok_or_else(|| Error::Text(format!("expected name=value, got '{}'", word)))?;
            if name == "time" {
                time = raw
                    .parse::<f64>()
                    .map_err(|_| Error::Text(format!("invalid time '{}'", raw)))?;
            } else {
                params.push((name, parse_value(name, raw)?));
            }
        }
        Ok(Message::default_for(ty).copy_with(params)?.with_time(time))
    }
}

fn parse_value(name: &str, raw: &str) -> Result<Value> {
    if let Some(inner) = raw.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        let bytes = inner
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u8>()
                    .map_err(|_| Error::Text(format!("invalid byte '{}' in {}", part, name)))
            })
            .collect::<Result<Vec<u8>>>()?;
        return Ok(Value::Bytes(bytes));
    }
    raw.parse::<i64>()
        .map(Value::Int)
        .map_err(|_| Error::Text(format!("invalid value '{}' for {}", raw, name)))
}

/// Parses one message from its text form.
pub fn parse_string(text: &str) -> Result<Message> {
    text.parse()
}

/// Parses one message per line, skipping blank lines and `#` comments.
pub fn parse_string_stream<I>(lines: I) -> impl Iterator<Item = Result<Message>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    lines.into_iter().filter_map(|line| {
        let line = line.as_ref();
        let line = line.split_once('#').map_or(line, |(code, _)| code).trim();
        (!line.is_empty()).then(|| parse_string(line))
    })
}

impl Message {
    /// Encoded bytes as upper-case hex pairs, e.g. `F0 00 01 F7`.
    pub fn hex(&self) -> String {
        self.to_bytes()
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let msg = Message::note_on(0, 60, 64).unwrap();
        assert_eq!(msg.to_string(), "note_on channel=0 note=60 velocity=64 time=0");

        let msg = Message::sysex(vec![1, 2, 3]).unwrap().with_time(0.5);
        assert_eq!(msg.to_string(), "sysex data=(1,2,3) time=0.5");

        let msg = Message::default_for(MessageType::Clock);
        assert_eq!(msg.to_string(), "clock time=0");
    }

    #[test]
    fn test_parse_round_trip() {
        let samples = [
            Message::note_on(3, 60, 64).unwrap(),
            Message::pitchwheel(15, -8192).unwrap().with_time(2.0),
            Message::sysex(Vec::new()).unwrap(),
            Message::sysex(vec![0, 127]).unwrap(),
            Message::default_for(MessageType::Songpos),
        ];
        for msg in samples {
            let back: Message = msg.to_string().parse().unwrap();
            assert_eq!(back, msg);
            assert_eq!(back.time(), msg.time());
        }
    }

    #[test]
    fn test_parse_partial_params() {
        let msg = parse_string("control_change control=7 value=100").unwrap();
        assert_eq!(msg, Message::control_change(0, 7, 100).unwrap());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_string(""), Err(Error::Text(_))));
        assert!(matches!(parse_string("note_on note"), Err(Error::Text(_))));
        assert!(matches!(parse_string("note_on note=x"), Err(Error::Text(_))));
        assert!(matches!(parse_string("note_on time=soon"), Err(Error::Text(_))));
        assert!(matches!(parse_string("bogus"), Err(Error::UnknownType(_))));
        assert!(matches!(
            parse_string("note_on program=1"),
            Err(Error::UnknownParameter { .. })
        ));
        assert!(matches!(
            parse_string("note_on note=128"),
            Err(Error::InvalidParameter { name: "note", .. })
        ));
        assert!(matches!(
            parse_string("sysex data=(1,300)"),
            Err(Error::Text(_))
        ));
    }

    #[test]
    fn test_parse_string_stream() {
        let text = "note_on note=60\n\n# comment only\nclock time=1 # tick\nstop bad\n";
        let results: Vec<_> = parse_string_stream(text.lines()).collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().note(), Some(60));
        assert_eq!(results[1].as_ref().unwrap().time(), 1.0);
        assert!(results[2].is_err());
    }

    #[test]
    fn test_hex() {
        let msg = Message::sysex(vec![0, 1, 2, 3, 4]).unwrap();
        assert_eq!(msg.hex(), "F0 00 01 02 03 04 F7");
        assert_eq!(msg.byte_len(), 7);
    }
}
