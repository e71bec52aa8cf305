//! MessagePack codec with a base64 text boundary
//!
//! Binary MsgPack is carried as standard-alphabet base64 so it can move
//! through the same text pipeline as every other format.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{Error, ErrorKind, Result};
use crate::value::{Array, Object, Value};

/// Encode a value as MsgPack and wrap the bytes in base64
pub fn to_string(value: &Value) -> String {
    STANDARD.encode(encode(value))
}

/// Decode a base64-wrapped MsgPack payload
pub fn parse(input: &str) -> Result<Value> {
    let bytes = STANDARD
        .decode(input.trim())
        .map_err(|_| Error::semantic(ErrorKind::InvalidEncoding))?;
    let mut reader = Reader { bytes: &bytes, pos: 0 };
    let value = reader.read_value()?;
    if reader.pos != reader.bytes.len() {
        return Err(reader.error(ErrorKind::InvalidToken));
    }
    Ok(value)
}

/// Encode a value to raw MsgPack bytes
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => out.push(0xc0),
        Value::Bool(false) => out.push(0xc2),
        Value::Bool(true) => out.push(0xc3),
        Value::Int(n) => write_int(out, *n),
        Value::Float(f) => {
            out.push(0xcb);
            out.extend_from_slice(&f.to_be_bytes());
        }
        Value::String(s) => write_str(out, s),
        Value::Array(array) => {
            write_array_header(out, array.len());
            for item in array.iter() {
                write_value(out, item);
            }
        }
        Value::Object(object) => {
            write_map_header(out, object.len());
            for key in object.sorted_keys() {
                write_str(out, key);
                if let Some(item) = object.get(key) {
                    write_value(out, item);
                }
            }
        }
    }
}

fn write_int(out: &mut Vec<u8>, n: i64) {
    if (0..=0x7f).contains(&n) {
        out.push(int_byte(n));
    } else if (-32..0).contains(&n) {
        out.push(int_byte(n));
    } else if let Ok(v) = i8::try_from(n) {
        out.push(0xd0);
        out.push(int_byte(i64::from(v)));
    } else if let Ok(v) = i16::try_from(n) {
        out.push(0xd1);
        out.extend_from_slice(&v.to_be_bytes());
    } else if let Ok(v) = i32::try_from(n) {
        out.push(0xd2);
        out.extend_from_slice(&v.to_be_bytes());
    } else {
        out.push(0xd3);
        out.extend_from_slice(&n.to_be_bytes());
    }
}

fn int_byte(n: i64) -> u8 {
    // Callers guarantee n fits in one byte as two's complement
    n.to_be_bytes()[7]
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    let len = bytes.len();
    if len <= 31 {
        out.push(0xa0 | len_byte(len));
    } else if let Ok(v) = u8::try_from(len) {
        out.push(0xd9);
        out.push(v);
    } else if let Ok(v) = u16::try_from(len) {
        out.push(0xda);
        out.extend_from_slice(&v.to_be_bytes());
    } else {
        out.push(0xdb);
        out.extend_from_slice(&len_u32(len).to_be_bytes());
    }
    out.extend_from_slice(bytes);
}

fn write_array_header(out: &mut Vec<u8>, len: usize) {
    if len <= 15 {
        out.push(0x90 | len_byte(len));
    } else if let Ok(v) = u16::try_from(len) {
        out.push(0xdc);
        out.extend_from_slice(&v.to_be_bytes());
    } else {
        out.push(0xdd);
        out.extend_from_slice(&len_u32(len).to_be_bytes());
    }
}

fn write_map_header(out: &mut Vec<u8>, len: usize) {
    if len <= 15 {
        out.push(0x80 | len_byte(len));
    } else if let Ok(v) = u16::try_from(len) {
        out.push(0xde);
        out.extend_from_slice(&v.to_be_bytes());
    } else {
        out.push(0xdf);
        out.extend_from_slice(&len_u32(len).to_be_bytes());
    }
}

fn len_byte(len: usize) -> u8 {
    u8::try_from(len).unwrap_or(u8::MAX)
}

fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn error(&self, kind: ErrorKind) -> Error {
        Error::at(kind, self.pos, 1, 1)
    }

    fn byte(&mut self) -> Result<u8> {
        let b = self
            .bytes
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.error(ErrorKind::UnexpectedEof))?;
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| self.error(ErrorKind::UnexpectedEof))?;
        let slice = self.bytes.get(self.pos..end).unwrap_or(&[]);
        self.pos = end;
        Ok(slice)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_be_bytes(buf))
    }

    fn read_value(&mut self) -> Result<Value> {
        let marker = self.byte()?;
        match marker {
            0x00..=0x7f => Ok(Value::Int(i64::from(marker))),
            0xe0..=0xff => Ok(Value::Int(i64::from(i8::from_be_bytes([marker])))),
            0x80..=0x8f => self.read_map(usize::from(marker & 0x0f)),
            0x90..=0x9f => self.read_array(usize::from(marker & 0x0f)),
            0xa0..=0xbf => self.read_str(usize::from(marker & 0x1f)),
            0xc0 => Ok(Value::Null),
            0xc2 => Ok(Value::Bool(false)),
            0xc3 => Ok(Value::Bool(true)),
            0xc4 | 0xd9 => {
                let len = usize::from(self.byte()?);
                self.read_str(len)
            }
            0xc5 | 0xda => {
                let len = usize::from(self.read_u16()?);
                self.read_str(len)
            }
            0xc6 | 0xdb => {
                let len = self.read_u32()?;
                self.read_str(usize::try_from(len).unwrap_or(usize::MAX))
            }
            0xca => {
                let bits = self.read_u32()?;
                Ok(Value::Float(f64::from(f32::from_bits(bits))))
            }
            0xcb => {
                let bits = self.read_u64()?;
                Ok(Value::Float(f64::from_bits(bits)))
            }
            0xcc => Ok(Value::Int(i64::from(self.byte()?))),
            0xcd => Ok(Value::Int(i64::from(self.read_u16()?))),
            0xce => Ok(Value::Int(i64::from(self.read_u32()?))),
            0xcf => {
                let n = self.read_u64()?;
                i64::try_from(n)
                    .map(Value::Int)
                    .map_err(|_| self.error(ErrorKind::InvalidNumber))
            }
            0xd0 => Ok(Value::Int(i64::from(i8::from_be_bytes([self.byte()?])))),
            0xd1 => {
                let b = self.take(2)?;
                Ok(Value::Int(i64::from(i16::from_be_bytes([b[0], b[1]]))))
            }
            0xd2 => {
                let b = self.take(4)?;
                Ok(Value::Int(i64::from(i32::from_be_bytes([
                    b[0], b[1], b[2], b[3],
                ]))))
            }
            0xd3 => {
                let b = self.take(8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(b);
                Ok(Value::Int(i64::from_be_bytes(buf)))
            }
            0xdc => {
                let len = usize::from(self.read_u16()?);
                self.read_array(len)
            }
            0xdd => {
                let len = self.read_u32()?;
                self.read_array(usize::try_from(len).unwrap_or(usize::MAX))
            }
            0xde => {
                let len = usize::from(self.read_u16()?);
                self.read_map(len)
            }
            0xdf => {
                let len = self.read_u32()?;
                self.read_map(usize::try_from(len).unwrap_or(usize::MAX))
            }
            _ => Err(self.error(ErrorKind::InvalidToken)),
        }
    }

    fn read_str(&mut self, len: usize) -> Result<Value> {
        let pos = self.pos;
        let bytes = self.take(len)?;
        let s = std::str::from_utf8(bytes)
            .map_err(|_| Error::at(ErrorKind::InvalidEncoding, pos, 1, 1))?;
        Ok(Value::String(s.to_string()))
    }

    fn read_array(&mut self, len: usize) -> Result<Value> {
        let mut array = Array::with_capacity(len.min(1024));
        for _ in 0..len {
            array.push(self.read_value()?);
        }
        Ok(Value::Array(array))
    }

    fn read_map(&mut self, len: usize) -> Result<Value> {
        let mut object = Object::with_capacity(len.min(1024));
        for _ in 0..len {
            let key = match self.read_value()? {
                Value::String(s) => s,
                Value::Int(n) => n.to_string(),
                Value::Float(f) => f.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => "null".to_string(),
                other => other.type_name().to_string(),
            };
            object.insert(key, self.read_value()?);
        }
        Ok(Value::Object(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(input: &str) -> Value {
        crate::json::parser::parse(input).unwrap()
    }

    #[test]
    fn test_round_trip_scalars() -> Result<()> {
        for value in [
            Value::Null,
            Value::Bool(true),
            Value::Int(0),
            Value::Int(127),
            Value::Int(-32),
            Value::Int(-33),
            Value::Int(300),
            Value::Int(-70_000),
            Value::Int(i64::MAX),
            Value::Int(i64::MIN),
            Value::Float(1.5),
            Value::String("hello".to_string()),
        ] {
            assert_eq!(parse(&to_string(&value))?, value);
        }
        Ok(())
    }

    #[test]
    fn test_round_trip_nested() -> Result<()> {
        let value = json(r#"{"a":[1,2,{"b":null}],"c":{"d":true},"e":"x"}"#);
        assert_eq!(parse(&to_string(&value))?, value);
        Ok(())
    }

    #[test]
    fn test_fixint_encoding() {
        assert_eq!(encode(&Value::Int(5)), vec![0x05]);
        assert_eq!(encode(&Value::Int(-1)), vec![0xff]);
        assert_eq!(encode(&Value::Int(-32)), vec![0xe0]);
    }

    #[test]
    fn test_map_keys_sorted() {
        let mut object = Object::new();
        object.insert("b", 1i64);
        object.insert("a", 2i64);
        let bytes = encode(&Value::Object(object));
        assert_eq!(bytes, vec![0x82, 0xa1, b'a', 0x02, 0xa1, b'b', 0x01]);
    }

    #[test]
    fn test_long_string_header() -> Result<()> {
        let value = Value::String("x".repeat(300));
        let bytes = encode(&value);
        assert_eq!(&bytes[..3], &[0xda, 0x01, 0x2c]);
        assert_eq!(parse(&to_string(&value))?, value);
        Ok(())
    }

    #[test]
    fn test_bad_base64() {
        assert!(matches!(
            parse("not base64!!"),
            Err(err) if matches!(err.kind(), ErrorKind::InvalidEncoding)
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let trimmed = STANDARD.encode([0x91]);
        assert!(matches!(
            parse(&trimmed),
            Err(err) if matches!(err.kind(), ErrorKind::UnexpectedEof)
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let payload = STANDARD.encode([0xc0, 0xc0]);
        assert!(parse(&payload).is_err());
    }
}
