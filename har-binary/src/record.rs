//! Fortran unformatted record framing.
//!
//! Each record on the wire is:
//!
//! ```text
//! len:     i32 LE            initiating length
//! payload: u8 × len
//! len:     i32 LE            terminating length, must equal the first
//! ```
//!
//! The paired lengths are the sole synchronization mechanism in the
//! stream. Every record except the 4-byte header-name record opens its
//! payload with the ASCII padding `"    "`; [`strip_padding`] validates
//! and removes it, and the write side emits it.

use har_core::{HarError, Result};
use std::io::{self, Read, Write};

/// The 4-byte ASCII padding carried at the front of most payloads.
pub const PADDING: [u8; 4] = *b"    ";

/// Payload byte cap used when chunking string and sparse-value records,
/// sized to the historical Fortran record buffer.
pub const MAX_PAYLOAD_BYTES: usize = 32_764;

// ============================================================================
// Record read/write
// ============================================================================

/// Read one framed record.
///
/// Returns `Ok(None)` on a clean end of stream (zero bytes available at
/// the record boundary). A stream that ends anywhere inside the record
/// fails with [`HarError::UnexpectedEof`]; disagreeing length fields fail
/// with [`HarError::InvalidData`].
pub fn read_record<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];
    if !read_exact_or_eof(reader, &mut len_bytes)? {
        return Ok(None);
    }
    let len = i32::from_le_bytes(len_bytes);
    if len < 0 {
        return Err(HarError::invalid_data(format!(
            "record length {len} is negative"
        )));
    }
    let mut payload = vec![0u8; len as usize];
    read_exact(reader, &mut payload)?;

    let mut term_bytes = [0u8; 4];
    read_exact(reader, &mut term_bytes)?;
    let term = i32::from_le_bytes(term_bytes);
    if term != len {
        return Err(HarError::invalid_data(
            "initiating and terminating lengths do not match",
        ));
    }
    Ok(Some(payload))
}

/// Read one framed record, failing on end of stream.
pub fn expect_record<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    read_record(reader)?.ok_or(HarError::UnexpectedEof)
}

/// Write one framed record.
pub fn write_record<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let len = i32::try_from(payload.len()).map_err(|_| {
        HarError::invalid_data(format!("record payload of {} bytes too large", payload.len()))
    })?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(payload)?;
    writer.write_all(&len.to_le_bytes())?;
    Ok(())
}

/// Write one framed record with the leading `"    "` padding prepended.
pub fn write_padded_record<W: Write>(writer: &mut W, body: &[u8]) -> Result<()> {
    let mut payload = Vec::with_capacity(PADDING.len() + body.len());
    payload.extend_from_slice(&PADDING);
    payload.extend_from_slice(body);
    write_record(writer, &payload)
}

/// Validate and strip the leading `"    "` padding from a payload.
pub fn strip_padding(payload: &[u8]) -> Result<&[u8]> {
    if payload.len() < PADDING.len() || payload[..PADDING.len()] != PADDING {
        return Err(HarError::invalid_data("failed to find expected padding"));
    }
    Ok(&payload[PADDING.len()..])
}

/// `read_exact` that distinguishes a clean zero-byte read from a
/// mid-record truncation. Returns `false` when the stream was already
/// exhausted before the first byte.
fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(HarError::UnexpectedEof),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// `read_exact` mapping truncation to [`HarError::UnexpectedEof`].
fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            HarError::UnexpectedEof
        } else {
            HarError::Io(e)
        }
    })
}

// ============================================================================
// Payload cursor
// ============================================================================

/// Position-tracking reader over one record payload.
pub struct PayloadCursor<'a> {
    data: &'a [u8],
    pos: usize,
    context: &'static str,
}

impl<'a> PayloadCursor<'a> {
    /// Cursor over `data`; `context` names the record in error messages.
    pub fn new(data: &'a [u8], context: &'static str) -> Self {
        Self {
            data,
            pos: 0,
            context,
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn ensure(&self, need: usize) -> Result<()> {
        if self.pos + need > self.data.len() {
            return Err(HarError::invalid_data(format!(
                "{}: truncated record (need {need} bytes at offset {}, have {})",
                self.context,
                self.pos,
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Read `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Read an `i32` LE.
    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        let v = i32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        Ok(v)
    }

    /// Read an `i32` LE that must be non-negative, as `usize`.
    pub fn read_count(&mut self, what: &str) -> Result<usize> {
        let v = self.read_i32()?;
        usize::try_from(v).map_err(|_| {
            HarError::invalid_data(format!("{}: negative {what} {v}", self.context))
        })
    }

    /// Read an IEEE-754 single LE.
    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        let v = f32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        Ok(v)
    }

    /// Read a fixed-width ASCII field, trailing spaces trimmed.
    pub fn read_str(&mut self, width: usize) -> Result<String> {
        let bytes = self.read_bytes(width)?;
        Ok(String::from_utf8_lossy(bytes).trim_end().to_string())
    }

    /// Read a fixed-width ASCII field without trimming.
    pub fn read_str_raw(&mut self, width: usize) -> Result<String> {
        let bytes = self.read_bytes(width)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

// ============================================================================
// Payload builder helpers
// ============================================================================

/// Append an `i32` LE.
pub fn push_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Append an IEEE-754 single LE.
pub fn push_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Append an ASCII field space-padded to `width`.
///
/// Fails when the text does not fit the field.
pub fn push_fixed_str(buf: &mut Vec<u8>, text: &str, width: usize) -> Result<()> {
    let bytes = text.as_bytes();
    if bytes.len() > width {
        return Err(HarError::invalid_data(format!(
            "text {text:?} longer than the {width}-byte field"
        )));
    }
    buf.extend_from_slice(bytes);
    buf.resize(buf.len() + (width - bytes.len()), b' ');
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
