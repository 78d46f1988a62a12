//! Shared sub-records of the real-array encodings.
//!
//! Dense and sparse `RE` arrays open with the same label sub-records:
//!
//! ```text
//! labels header (after padding):
//!   set_count:  i32                 number of defining sets `a`
//!   has_labels: i32                 non-zero when element records follow
//!   reserved:   i32
//!   group:      ASCII × 8           set-group field
//!   names:      ASCII × 12 × a      set names
//!
//! set elements, max(a, 1) records (after padding):
//!   block:      i32                 1-based block index
//!   count:      i32                 element count
//!   cap:        i32                 element cap (mirrors count)
//!   labels:     ASCII × 12 × count  set element names
//!
//! extent record (after padding):
//!   trailing:   i32                 records remaining in this array
//!   limit:      i32                 always 7
//!   extents:    i32 × 7             d0..d6, unused extents 1
//!
//! dimension descriptor (after padding, skip-decoded on read):
//!   bounds:     (i32, i32) × 7      (1, dk) slice bounds per dimension
//! ```

use crate::record::{
    expect_record, push_fixed_str, push_i32, strip_padding, write_padded_record, PayloadCursor,
};
use har_core::{Result, SetDefinition, DIMENSION_SLOTS};
use std::io::{Read, Write};

/// Width of a set name field.
pub const SET_NAME_WIDTH: usize = 12;

/// Width of a set element label field.
pub const LABEL_WIDTH: usize = 12;

/// Width of the set-group field in the labels header.
pub const SET_GROUP_WIDTH: usize = 8;

/// Decoded label sub-records.
pub struct SetHeader {
    /// The defining sets; empty when the array declares none.
    pub sets: Vec<SetDefinition>,
    /// Declared set count `a`.
    pub declared: usize,
    /// Element records carried labels.
    pub has_labels: bool,
}

/// Read the labels header and the `max(a, 1)` set-element records.
pub fn read_set_header<R: Read>(reader: &mut R) -> Result<SetHeader> {
    let payload = expect_record(reader)?;
    let body = strip_padding(&payload)?;
    let mut cursor = PayloadCursor::new(body, "labels header");
    let declared = cursor.read_count("set count")?;
    let has_labels = cursor.read_i32()? != 0;
    let _reserved = cursor.read_i32()?;
    let _group = cursor.read_bytes(SET_GROUP_WIDTH)?;
    let mut names = Vec::with_capacity(declared);
    for _ in 0..declared {
        names.push(cursor.read_str(SET_NAME_WIDTH)?);
    }

    let mut label_lists: Vec<Vec<String>> = Vec::with_capacity(declared.max(1));
    for _ in 0..declared.max(1) {
        let payload = expect_record(reader)?;
        let body = strip_padding(&payload)?;
        let mut cursor = PayloadCursor::new(body, "set elements");
        let _block = cursor.read_i32()?;
        let count = cursor.read_count("label count")?;
        let _cap = cursor.read_i32()?;
        let mut labels = Vec::with_capacity(count);
        for _ in 0..count {
            labels.push(cursor.read_str(LABEL_WIDTH)?);
        }
        label_lists.push(labels);
    }

    let sets = names
        .into_iter()
        .zip(label_lists)
        .map(|(name, labels)| SetDefinition::new(name, labels))
        .collect();
    Ok(SetHeader {
        sets,
        declared,
        has_labels,
    })
}

/// Write the labels header and the set-element records.
pub fn write_set_header<W: Write>(writer: &mut W, sets: &[SetDefinition]) -> Result<()> {
    let mut body = Vec::with_capacity(20 + SET_NAME_WIDTH * sets.len());
    push_i32(&mut body, sets.len() as i32);
    push_i32(&mut body, 1);
    push_i32(&mut body, 0);
    body.resize(body.len() + SET_GROUP_WIDTH, b' ');
    for set in sets {
        push_fixed_str(&mut body, set.name(), SET_NAME_WIDTH)?;
    }
    write_padded_record(writer, &body)?;

    if sets.is_empty() {
        let mut block = Vec::with_capacity(12);
        push_i32(&mut block, 1);
        push_i32(&mut block, 0);
        push_i32(&mut block, 0);
        write_padded_record(writer, &block)?;
        return Ok(());
    }
    for (index, set) in sets.iter().enumerate() {
        let mut block = Vec::with_capacity(12 + LABEL_WIDTH * set.len());
        push_i32(&mut block, (index + 1) as i32);
        push_i32(&mut block, set.len() as i32);
        push_i32(&mut block, set.len() as i32);
        for element in set.elements() {
            push_fixed_str(&mut block, element, LABEL_WIDTH)?;
        }
        write_padded_record(writer, &block)?;
    }
    Ok(())
}

/// Read the extent record: seven dimension extents, unused slots 1.
pub fn read_extent_record<R: Read>(reader: &mut R) -> Result<[i32; DIMENSION_SLOTS]> {
    let payload = expect_record(reader)?;
    let body = strip_padding(&payload)?;
    let mut cursor = PayloadCursor::new(body, "extent record");
    let _trailing = cursor.read_i32()?;
    let limit = cursor.read_i32()?;
    if limit != DIMENSION_SLOTS as i32 {
        return Err(har_core::HarError::invalid_data(format!(
            "extent record declares dimension limit {limit}, expected {DIMENSION_SLOTS}"
        )));
    }
    let mut extents = [1i32; DIMENSION_SLOTS];
    for slot in extents.iter_mut() {
        *slot = cursor.read_i32()?.max(1);
    }
    Ok(extents)
}

/// Write the extent record.
pub fn write_extent_record<W: Write>(
    writer: &mut W,
    trailing: i32,
    extents: &[i32; DIMENSION_SLOTS],
) -> Result<()> {
    let mut body = Vec::with_capacity(4 * (2 + DIMENSION_SLOTS));
    push_i32(&mut body, trailing);
    push_i32(&mut body, DIMENSION_SLOTS as i32);
    for &d in extents {
        push_i32(&mut body, d.max(1));
    }
    write_padded_record(writer, &body)
}

/// Write the dimension-descriptor record: `(1, dk)` slice bounds per
/// dimension. The read side skips the record whole.
pub fn write_descriptor_record<W: Write>(
    writer: &mut W,
    extents: &[i32; DIMENSION_SLOTS],
) -> Result<()> {
    let mut body = Vec::with_capacity(8 * DIMENSION_SLOTS);
    for &d in extents {
        push_i32(&mut body, 1);
        push_i32(&mut body, d.max(1));
    }
    write_padded_record(writer, &body)
}
