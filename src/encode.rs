//! Hand-rolled payload encoder.
//!
//! The webhook schema is strict about empty values: a member whose value is
//! empty is left out entirely, never written as `""`, `[]` or `null`. String
//! values only have backslash and double-quote escaped; every other byte,
//! control characters included, is copied through untouched.

use std::io::Write;

/// Canonical encoding of an object with no members.
pub const EMPTY_OBJECT: &[u8] = b"{}";

/// Error raised while encoding a payload.
///
/// Encoding into memory does not fail on data content; this only carries
/// failures bubbling up from nested writers.
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("failed to write encoded value: {0}")]
    Write(#[from] std::io::Error),
}

/// Types that know how to write themselves into a payload buffer.
pub trait Encode {
    /// Append the encoding of `self` to `buf`.
    fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError>;

    /// Encode into a fresh buffer.
    fn to_payload(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::with_capacity(128);
        self.encode(&mut buf)?;
        Ok(buf)
    }
}

/// Append `value` with `\` and `"` turned into two-byte escapes.
pub fn write_escaped(buf: &mut Vec<u8>, value: &[u8]) {
    buf.reserve(value.len());
    for &c in value {
        match c {
            b'\\' => buf.extend_from_slice(b"\\\\"),
            b'"' => buf.extend_from_slice(b"\\\""),
            _ => buf.push(c),
        }
    }
}

/// Render `value` through its `Display` impl and append it escaped.
pub fn write_display_escaped(
    buf: &mut Vec<u8>,
    value: &dyn std::fmt::Display,
) -> Result<(), EncodeError> {
    let mut rendered = Vec::new();
    write!(rendered, "{}", value)?;
    write_escaped(buf, &rendered);
    Ok(())
}

/// Incremental writer for a single JSON-like object.
///
/// Members are written in call order and separated by one comma. Callers
/// never have to track whether a separator is due.
pub struct ObjectWriter<'a> {
    buf: &'a mut Vec<u8>,
    first: bool,
}

impl<'a> ObjectWriter<'a> {
    pub fn new(buf: &'a mut Vec<u8>) -> Self {
        buf.push(b'{');
        ObjectWriter { buf, first: true }
    }

    fn key(&mut self, key: &str) {
        if !self.first {
            self.buf.push(b',');
        }
        self.first = false;
        self.buf.push(b'"');
        self.buf.extend_from_slice(key.as_bytes());
        self.buf.extend_from_slice(b"\":");
    }

    /// Write `"key":"value"`, skipping the member when `value` is empty.
    pub fn string(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        self.key(key);
        self.buf.push(b'"');
        write_escaped(&mut *self.buf, value.as_bytes());
        self.buf.push(b'"');
    }

    pub fn bool(&mut self, key: &str, value: bool) {
        self.key(key);
        let literal: &[u8] = if value { b"true" } else { b"false" };
        self.buf.extend_from_slice(literal);
    }

    /// Write `"key":` followed by whatever `write` appends.
    ///
    /// `write` must append a complete value.
    pub fn raw<F>(&mut self, key: &str, write: F) -> Result<(), EncodeError>
    where
        F: FnOnce(&mut Vec<u8>) -> Result<(), EncodeError>,
    {
        self.key(key);
        write(&mut *self.buf)
    }

    pub fn finish(self) {
        self.buf.push(b'}');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(input: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut it = input.iter();
        while let Some(&c) = it.next() {
            if c == b'\\' {
                if let Some(&next) = it.next() {
                    out.push(next);
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn escapes_only_backslash_and_quote() {
        let mut buf = Vec::new();
        write_escaped(&mut buf, b"a\\b\"c\n\td\x01");
        assert_eq!(buf, b"a\\\\b\\\"c\n\td\x01".to_vec());
    }

    #[test]
    fn escaping_is_reversible() {
        let inputs: [&[u8]; 4] = [
            b"plain",
            b"\\\\\"\"",
            b"C:\\path\\to \"file\"",
            b"line\nbreak\r\0",
        ];
        for input in inputs {
            let mut buf = Vec::new();
            write_escaped(&mut buf, input);
            assert_eq!(unescape(&buf), input.to_vec());
        }
    }

    #[test]
    fn object_writer_skips_empty_strings() {
        let mut buf = Vec::new();
        let mut obj = ObjectWriter::new(&mut buf);
        obj.string("a", "");
        obj.string("b", "x\"y");
        obj.string("c", "");
        obj.bool("d", false);
        obj.finish();
        assert_eq!(buf, br#"{"b":"x\"y","d":false}"#.to_vec());
    }

    #[test]
    fn object_writer_without_members_is_empty_object() {
        let mut buf = Vec::new();
        let mut obj = ObjectWriter::new(&mut buf);
        obj.string("a", "");
        obj.finish();
        assert_eq!(buf, EMPTY_OBJECT.to_vec());
    }
}
