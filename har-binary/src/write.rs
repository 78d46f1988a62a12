//! Binary HAR writer: the bit-exact inverse of the reader.
//!
//! Given an ordered sequence of header arrays, emits each in turn. Output
//! is deterministic: the same arrays always produce identical bytes.

use crate::header::write_array_header;
use crate::layout::{write_descriptor_record, write_extent_record, write_set_header};
use crate::record::{push_f32, push_i32, write_padded_record, MAX_PAYLOAD_BYTES};
use har_core::{
    ArrayKind, HarError, HarFile, HeaderArray, HeaderArrayPayload, Result, SequenceDictionary,
};
use std::io::Write;
use tracing::debug;

/// Stored-to-total density at or above which `RE` output is dense.
pub const DENSE_THRESHOLD: f64 = 0.5;

/// Streaming writer emitting arrays onto one byte stream.
pub struct HarWriter<W> {
    inner: W,
}

impl<W: Write> HarWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Recover the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Write every array of a file in order.
    pub fn write_file(&mut self, file: &HarFile) -> Result<()> {
        for array in file.iter() {
            self.write_array(array)?;
        }
        Ok(())
    }

    /// Write one array, choosing dense or sparse `RE` output by stored
    /// density (sparse below [`DENSE_THRESHOLD`]).
    pub fn write_array(&mut self, array: &HeaderArray) -> Result<()> {
        match array.payload() {
            HeaderArrayPayload::Reals(dict) if array.kind() == ArrayKind::Real => {
                let dense =
                    dict.stored_len() as f64 >= DENSE_THRESHOLD * dict.total_size() as f64;
                self.write_real_array(array, dense)
            }
            _ => self.write_array_dispatch(array, true),
        }
    }

    /// Write an `RE` array with an explicit density choice.
    ///
    /// Both encodings round-trip to the same logical value.
    pub fn write_real_array(&mut self, array: &HeaderArray, dense: bool) -> Result<()> {
        if array.kind() != ArrayKind::Real {
            return Err(HarError::invalid_data(format!(
                "density choice applies to RE arrays, not {}",
                array.kind()
            )));
        }
        self.write_array_dispatch(array, dense)
    }

    fn write_array_dispatch(&mut self, array: &HeaderArray, dense: bool) -> Result<()> {
        match array.payload() {
            HeaderArrayPayload::Strings(dict) => self.write_character(array, dict)?,
            HeaderArrayPayload::Ints(dict) => {
                let values: Vec<i32> = dict.logical_values().collect();
                let mut body = Vec::with_capacity(4 + 4 * values.len());
                push_i32(&mut body, 1);
                for v in values {
                    push_i32(&mut body, v);
                }
                self.write_value_list(array, body)?;
            }
            HeaderArrayPayload::Reals(dict) => match array.kind() {
                ArrayKind::Real if dense => self.write_real_full(array, dict)?,
                ArrayKind::Real => self.write_real_sparse(array, dict)?,
                _ => {
                    let values: Vec<f32> = dict.logical_values().collect();
                    let mut body = Vec::with_capacity(4 + 4 * values.len());
                    push_i32(&mut body, 1);
                    for v in values {
                        push_f32(&mut body, v);
                    }
                    self.write_value_list(array, body)?;
                }
            },
        }
        debug!(
            header = %array.header(),
            kind = %array.kind(),
            "encoded header array"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // 1C
    // ------------------------------------------------------------------

    fn write_character(
        &mut self,
        array: &HeaderArray,
        dict: &SequenceDictionary<String>,
    ) -> Result<()> {
        let rank = array.rank();
        write_array_header(
            &mut self.inner,
            array.header(),
            ArrayKind::Character,
            true,
            array.description(),
            &array.dimensions()[..rank],
        )?;

        let values: Vec<String> = dict.logical_values().collect();
        let total = values.len();
        if total == 0 {
            let mut body = Vec::with_capacity(12);
            push_i32(&mut body, 1);
            push_i32(&mut body, 0);
            push_i32(&mut body, 0);
            return write_padded_record(&mut self.inner, &body);
        }

        let width = values.iter().map(String::len).max().unwrap_or(0).max(1);
        let cap = ((MAX_PAYLOAD_BYTES - 12) / width).max(1);
        let mut vectors = total.div_ceil(cap).max(array.serialized_vectors().max(1) as usize);
        let per_record = total.div_ceil(vectors);
        vectors = total.div_ceil(per_record);

        for (index, chunk) in values.chunks(per_record).enumerate() {
            let mut body = Vec::with_capacity(12 + chunk.len() * width);
            push_i32(&mut body, vectors as i32);
            push_i32(&mut body, total as i32);
            push_i32(&mut body, per_record as i32);
            for value in chunk {
                if value.len() > width {
                    return Err(HarError::invalid_data(format!(
                        "string {value:?} wider than the computed field of {width}"
                    )));
                }
                body.extend_from_slice(value.as_bytes());
                body.resize(body.len() + (width - value.len()), b' ');
            }
            write_padded_record(&mut self.inner, &body)?;
            debug_assert!(index < vectors);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // RE FULL
    // ------------------------------------------------------------------

    fn write_real_full(
        &mut self,
        array: &HeaderArray,
        dict: &SequenceDictionary<f32>,
    ) -> Result<()> {
        let rank = array.rank();
        write_array_header(
            &mut self.inner,
            array.header(),
            ArrayKind::Real,
            true,
            array.description(),
            &array.dimensions()[..rank],
        )?;
        write_set_header(&mut self.inner, dict.sets())?;

        let descriptor = !dict.sets().is_empty();
        write_extent_record(
            &mut self.inner,
            if descriptor { 2 } else { 1 },
            array.dimensions(),
        )?;
        if descriptor {
            write_descriptor_record(&mut self.inner, array.dimensions())?;
        }

        let mut body = Vec::with_capacity(4 + 4 * dict.total_size());
        push_i32(&mut body, 1);
        for value in dict.logical_values() {
            push_f32(&mut body, value);
        }
        write_padded_record(&mut self.inner, &body)
    }

    // ------------------------------------------------------------------
    // RE SPSE
    // ------------------------------------------------------------------

    fn write_real_sparse(
        &mut self,
        array: &HeaderArray,
        dict: &SequenceDictionary<f32>,
    ) -> Result<()> {
        let rank = array.rank();
        write_array_header(
            &mut self.inner,
            array.header(),
            ArrayKind::Real,
            false,
            array.description(),
            &array.dimensions()[..rank],
        )?;
        write_set_header(&mut self.inner, dict.sets())?;

        let mut entries: Vec<(usize, f32)> = dict
            .stored_entries()
            .map(|(key, value)| Ok((dict.position_of(key)?, *value)))
            .collect::<Result<_>>()?;
        entries.sort_unstable_by_key(|&(position, _)| position);

        let mut body = Vec::with_capacity(12);
        push_i32(&mut body, entries.len() as i32);
        push_i32(&mut body, 0);
        push_i32(&mut body, 0);
        write_padded_record(&mut self.inner, &body)?;

        if entries.is_empty() {
            let mut body = Vec::with_capacity(12);
            push_i32(&mut body, 1);
            push_i32(&mut body, 0);
            push_i32(&mut body, 0);
            return write_padded_record(&mut self.inner, &body);
        }

        let per_record = ((MAX_PAYLOAD_BYTES - 12) / 8).max(1);
        let chunk_count = entries.len().div_ceil(per_record);
        for (index, chunk) in entries.chunks(per_record).enumerate() {
            let mut body = Vec::with_capacity(12 + chunk.len() * 8);
            push_i32(&mut body, (chunk_count - index) as i32);
            push_i32(&mut body, 0);
            push_i32(&mut body, chunk.len() as i32);
            for &(position, _) in chunk {
                push_i32(&mut body, (position + 1) as i32);
            }
            for &(_, value) in chunk {
                push_f32(&mut body, value);
            }
            write_padded_record(&mut self.inner, &body)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // RL / 2I / 2R
    // ------------------------------------------------------------------

    fn write_value_list(&mut self, array: &HeaderArray, data_body: Vec<u8>) -> Result<()> {
        let rank = array.rank();
        write_array_header(
            &mut self.inner,
            array.header(),
            array.kind(),
            true,
            array.description(),
            &array.dimensions()[..rank],
        )?;
        write_extent_record(&mut self.inner, 2, array.dimensions())?;
        write_descriptor_record(&mut self.inner, array.dimensions())?;
        write_padded_record(&mut self.inner, &data_body)
    }
}

// ============================================================================
// Tests
// ============================================================================
