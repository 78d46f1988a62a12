//! Header record pair: the 4-byte name record and the metadata record.
//!
//! Every array opens with two records:
//!
//! ```text
//! record 1: name[4]                          no leading padding
//! record 2 (after padding):
//!   type:    ASCII × 2                       RE | RL | 1C | 2I | 2R
//!   storage: ASCII × 4                       "FULL" dense, else sparse
//!   desc:    ASCII × 70                      trailing \0 \x02 ' ' padding
//!   rank:    i32                             0..=7
//!   dims:    i32 × rank
//! ```

use crate::record::{
    read_record, expect_record, strip_padding, write_record, write_padded_record, push_fixed_str,
    push_i32, PayloadCursor,
};
use har_core::{ArrayKind, HarError, Result, DESCRIPTION_WIDTH, DIMENSION_SLOTS, HEADER_WIDTH};
use std::io::{Read, Write};

/// Storage marker of a dense real array.
const STORAGE_FULL: &str = "FULL";

/// Storage marker emitted for sparse real arrays.
const STORAGE_SPARSE: &str = "SPSE";

/// Decoded header record pair.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayHeader {
    /// Array name, trailing spaces trimmed.
    pub name: String,
    /// Type tag.
    pub kind: ArrayKind,
    /// True for `FULL` storage; only meaningful for `RE`.
    pub dense: bool,
    /// Description, padding trimmed.
    pub description: String,
    /// Dimension sizes, `rank` entries.
    pub dimensions: Vec<i32>,
}

impl ArrayHeader {
    /// Total element count, the product of the dimensions.
    pub fn element_count(&self) -> usize {
        self.dimensions.iter().map(|&d| d.max(1) as usize).product()
    }

    /// Dimensions padded to the 7-slot vector.
    pub fn padded_dimensions(&self) -> [i32; DIMENSION_SLOTS] {
        let mut out = [1i32; DIMENSION_SLOTS];
        for (slot, &d) in out.iter_mut().zip(&self.dimensions) {
            *slot = d.max(1);
        }
        out
    }
}

/// Read the header record pair opening one array.
///
/// Returns `Ok(None)` on a clean end of stream before the name record.
pub fn read_array_header<R: Read>(reader: &mut R) -> Result<Option<ArrayHeader>> {
    let name_payload = match read_record(reader)? {
        Some(p) => p,
        None => return Ok(None),
    };
    if name_payload.len() != HEADER_WIDTH {
        return Err(HarError::invalid_data(format!(
            "header-name record is {} bytes, expected {HEADER_WIDTH}",
            name_payload.len()
        )));
    }
    let name = String::from_utf8_lossy(&name_payload).trim_end().to_string();

    let meta_payload = expect_record(reader)?;
    let body = strip_padding(&meta_payload)?;
    let mut cursor = PayloadCursor::new(body, "array header");

    let code = cursor.read_str_raw(2)?;
    let kind = ArrayKind::from_code(&code).ok_or_else(|| {
        HarError::invalid_data(format!("unknown array type code {code:?}"))
    })?;
    let storage = cursor.read_str_raw(4)?;
    let description = cursor.read_str(DESCRIPTION_WIDTH)?;
    let rank = cursor.read_count("rank")?;
    if rank > DIMENSION_SLOTS {
        return Err(HarError::invalid_data(format!(
            "rank {rank} exceeds the {DIMENSION_SLOTS}-dimension limit"
        )));
    }
    let mut dimensions = Vec::with_capacity(rank);
    for _ in 0..rank {
        dimensions.push(cursor.read_i32()?);
    }

    Ok(Some(ArrayHeader {
        name,
        kind,
        dense: storage == STORAGE_FULL,
        description,
        dimensions,
    }))
}

/// Write the header record pair opening one array.
pub fn write_array_header<W: Write>(
    writer: &mut W,
    name: &str,
    kind: ArrayKind,
    dense: bool,
    description: &str,
    dimensions: &[i32],
) -> Result<()> {
    let mut name_payload = Vec::with_capacity(HEADER_WIDTH);
    push_fixed_str(&mut name_payload, name, HEADER_WIDTH).map_err(|_| {
        HarError::invalid_data(format!(
            "header {name:?} longer than {HEADER_WIDTH} characters"
        ))
    })?;
    write_record(writer, &name_payload)?;

    let mut body = Vec::with_capacity(80 + 4 * dimensions.len());
    push_fixed_str(&mut body, kind.code(), 2)?;
    push_fixed_str(&mut body, if dense { STORAGE_FULL } else { STORAGE_SPARSE }, 4)?;
    push_fixed_str(&mut body, description, DESCRIPTION_WIDTH)?;
    push_i32(&mut body, dimensions.len() as i32);
    for &d in dimensions {
        push_i32(&mut body, d);
    }
    write_padded_record(writer, &body)
}
