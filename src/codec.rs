//! Generic tag-length-value message codec.
//!
//! This is the untyped half of the wire format: a message is an ordered list of
//! `(field number, value)` pairs where a field number may repeat. The typed
//! protocol schema lives in [`crate::license_protocol`]; this module is used
//! where a message must be inspected or passed through without a schema (the
//! opaque client identity blob, diagnostics).
use std::fmt::Write as _;

use prost::encoding::{decode_varint, encode_varint, encoded_len_varint};

use crate::error::{Error, Result};

/// Largest field number allowed by the wire format.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Wire types understood by the codec. Group wire types (3, 4) are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl TryFrom<u64> for WireType {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::Fixed32),
            other => Err(Error::MalformedMessage(format!(
                "unsupported wire type {}",
                other
            ))),
        }
    }
}

/// A single decoded field value.
///
/// Nested messages are carried as [`Value::Bytes`]; use
/// [`Value::as_message`] to decode them on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Varint(u64),
    Fixed64(u64),
    Bytes(Vec<u8>),
    Fixed32(u32),
}

impl Value {
    /// Wire type this value is encoded with.
    pub fn wire_type(&self) -> WireType {
        match self {
            Value::Varint(_) => WireType::Varint,
            Value::Fixed64(_) => WireType::Fixed64,
            Value::Bytes(_) => WireType::LengthDelimited,
            Value::Fixed32(_) => WireType::Fixed32,
        }
    }

    /// Decode a length-delimited value as a nested message.
    pub fn as_message(&self) -> Result<RawMessage> {
        match self {
            Value::Bytes(data) => RawMessage::decode(data),
            other => Err(Error::MalformedMessage(format!(
                "expected a nested message, found {:?}",
                other.wire_type()
            ))),
        }
    }
}

/// One `(number, value)` pair in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub number: u32,
    pub value: Value,
}

/// An untyped message preserving field order and repetition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMessage {
    fields: Vec<Field>,
}

impl RawMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a message from its wire bytes.
    ///
    /// Fails with [`Error::MalformedMessage`] on a truncated varint, a length
    /// prefix that runs past the end of the buffer, a zero field number, or an
    /// unsupported wire type.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut buf = data;
        let mut fields = Vec::new();

        while !buf.is_empty() {
            let key = decode_varint(&mut buf)?;
            let number = key >> 3;
            if number == 0 || number > u64::from(MAX_FIELD_NUMBER) {
                return Err(Error::MalformedMessage(format!(
                    "invalid field number {}",
                    number
                )));
            }
            let number = number as u32;

            let value = match WireType::try_from(key & 0x7)? {
                WireType::Varint => Value::Varint(decode_varint(&mut buf)?),
                WireType::Fixed64 => {
                    let (raw, rest) = split_checked(buf, 8, number)?;
                    buf = rest;
                    let mut le = [0u8; 8];
                    le.copy_from_slice(raw);
                    Value::Fixed64(u64::from_le_bytes(le))
                }
                WireType::Fixed32 => {
                    let (raw, rest) = split_checked(buf, 4, number)?;
                    buf = rest;
                    let mut le = [0u8; 4];
                    le.copy_from_slice(raw);
                    Value::Fixed32(u32::from_le_bytes(le))
                }
                WireType::LengthDelimited => {
                    let declared = decode_varint(&mut buf)?;
                    let len = usize::try_from(declared).map_err(|_| {
                        Error::MalformedMessage(format!(
                            "field {} length {} does not fit in memory",
                            number, declared
                        ))
                    })?;
                    let (raw, rest) = split_checked(buf, len, number)?;
                    buf = rest;
                    Value::Bytes(raw.to_vec())
                }
            };

            fields.push(Field { number, value });
        }

        Ok(Self { fields })
    }

    /// Serialize the message, preserving field order.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        for field in &self.fields {
            let key = (u64::from(field.number) << 3) | field.value.wire_type() as u64;
            encode_varint(key, &mut out);
            match &field.value {
                Value::Varint(v) => encode_varint(*v, &mut out),
                Value::Fixed64(v) => out.extend_from_slice(&v.to_le_bytes()),
                Value::Fixed32(v) => out.extend_from_slice(&v.to_le_bytes()),
                Value::Bytes(data) => {
                    encode_varint(data.len() as u64, &mut out);
                    out.extend_from_slice(data);
                }
            }
        }
        out
    }

    /// Exact size of [`RawMessage::encode`]'s output.
    pub fn encoded_len(&self) -> usize {
        self.fields
            .iter()
            .map(|field| {
                let key = (u64::from(field.number) << 3) | field.value.wire_type() as u64;
                encoded_len_varint(key)
                    + match &field.value {
                        Value::Varint(v) => encoded_len_varint(*v),
                        Value::Fixed64(_) => 8,
                        Value::Fixed32(_) => 4,
                        Value::Bytes(data) => encoded_len_varint(data.len() as u64) + data.len(),
                    }
            })
            .sum()
    }

    /// Append a field. Field numbers must be in `1..=MAX_FIELD_NUMBER`.
    pub fn push(&mut self, number: u32, value: Value) -> &mut Self {
        debug_assert!((1..=MAX_FIELD_NUMBER).contains(&number));
        self.fields.push(Field { number, value });
        self
    }

    /// Append a nested message as a length-delimited field.
    pub fn push_message(&mut self, number: u32, message: &RawMessage) -> &mut Self {
        self.push(number, Value::Bytes(message.encode()))
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every value recorded under `number`, in wire order.
    pub fn all(&self, number: u32) -> impl Iterator<Item = &Value> {
        self.fields
            .iter()
            .filter(move |f| f.number == number)
            .map(|f| &f.value)
    }

    /// Last length-delimited value under `number` (last one wins, as on the wire).
    pub fn bytes(&self, number: u32) -> Option<&[u8]> {
        self.all(number)
            .filter_map(|v| match v {
                Value::Bytes(data) => Some(data.as_slice()),
                _ => None,
            })
            .last()
    }

    /// Last varint value under `number`.
    pub fn varint(&self, number: u32) -> Option<u64> {
        self.all(number)
            .filter_map(|v| match v {
                Value::Varint(n) => Some(*n),
                _ => None,
            })
            .last()
    }

    /// Decode the last value under `number` as a nested message.
    pub fn message(&self, number: u32) -> Result<Option<RawMessage>> {
        self.bytes(number).map(RawMessage::decode).transpose()
    }

    /// Decode every value under `number` as a nested message.
    pub fn messages(&self, number: u32) -> Result<Vec<RawMessage>> {
        self.all(number).map(Value::as_message).collect()
    }

    /// Render a human-readable field tree.
    ///
    /// Length-delimited values that decode cleanly as a non-empty message are
    /// expanded; others are shown as text when printable, hex otherwise.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        for field in &self.fields {
            let _ = match &field.value {
                Value::Varint(v) => writeln!(out, "{}{}: {}", indent, field.number, v),
                Value::Fixed64(v) => writeln!(out, "{}{}: {:#018x}", indent, field.number, v),
                Value::Fixed32(v) => writeln!(out, "{}{}: {:#010x}", indent, field.number, v),
                Value::Bytes(data) => match RawMessage::decode(data) {
                    Ok(nested) if !nested.is_empty() && !is_printable(data) => {
                        let _ = writeln!(out, "{}{} {{", indent, field.number);
                        nested.dump_into(out, depth + 1);
                        writeln!(out, "{}}}", indent)
                    }
                    _ if is_printable(data) => writeln!(
                        out,
                        "{}{}: {:?}",
                        indent,
                        field.number,
                        String::from_utf8_lossy(data)
                    ),
                    _ => writeln!(out, "{}{}: 0x{}", indent, field.number, hex::encode(data)),
                },
            };
        }
    }
}

fn split_checked(buf: &[u8], len: usize, number: u32) -> Result<(&[u8], &[u8])> {
    if len > buf.len() {
        return Err(Error::MalformedMessage(format!(
            "field {} declares {} bytes but only {} remain",
            number,
            len,
            buf.len()
        )));
    }
    Ok(buf.split_at(len))
}

fn is_printable(data: &[u8]) -> bool {
    !data.is_empty() && data.iter().all(|b| b.is_ascii_graphic() || *b == b' ')
}
