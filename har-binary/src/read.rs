//! Binary HAR reader: a pull-based lazy sequence of header arrays.
//!
//! Each pull reads the header record pair, dispatches on the type code,
//! and yields one fully-populated [`HeaderArray`]. A clean end of stream
//! at an array boundary terminates the sequence; truncation inside an
//! array fails with `UnexpectedEof`. Unknown type codes are fatal because
//! the stream cannot be advanced without knowing the array's record
//! layout.

use crate::header::{read_array_header, ArrayHeader};
use crate::layout::{read_extent_record, read_set_header};
use crate::record::{expect_record, strip_padding, PayloadCursor};
use har_core::{
    positional_sets, ArrayKind, HarError, HarFile, HeaderArray, HeaderArrayPayload, Result,
    SequenceDictionary, SetDefinition, DIMENSION_SLOTS,
};
use std::io::Read;
use tracing::debug;

/// Streaming reader over the arrays of one `.har` / `.sl4` byte stream.
///
/// The input stream is exclusively owned for the duration of the read
/// session. The iterator fuses after the first error: a parse failure
/// aborts the current array and the stream is not resynchronized.
pub struct HarReader<R> {
    inner: R,
    done: bool,
}

impl<R: Read> HarReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, done: false }
    }

    /// Read every remaining array into an in-memory file.
    pub fn read_file(self) -> Result<HarFile> {
        let mut file = HarFile::new();
        for array in self {
            file.push(array?)?;
        }
        Ok(file)
    }

    fn next_array(&mut self) -> Result<Option<HeaderArray>> {
        let header = match read_array_header(&mut self.inner)? {
            Some(h) => h,
            None => return Ok(None),
        };
        let array = match header.kind {
            ArrayKind::Character => read_character(&mut self.inner, &header)?,
            ArrayKind::Real if header.dense => read_real_full(&mut self.inner, &header)?,
            ArrayKind::Real => read_real_sparse(&mut self.inner, &header)?,
            ArrayKind::RealList | ArrayKind::RealNoSets | ArrayKind::Integer => {
                read_value_list(&mut self.inner, &header)?
            }
        };
        debug!(
            header = %array.header(),
            kind = %array.kind(),
            stored = array.payload().stored_len(),
            "decoded header array"
        );
        Ok(Some(array))
    }
}

impl<R: Read> Iterator for HarReader<R> {
    type Item = Result<HeaderArray>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_array() {
            Ok(Some(array)) => Some(Ok(array)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

// ============================================================================
// 1C - character arrays
// ============================================================================

fn read_character<R: Read>(reader: &mut R, header: &ArrayHeader) -> Result<HeaderArray> {
    let mut strings: Vec<String> = Vec::new();
    let mut total: Option<usize> = None;
    let mut vectors = 1usize;
    loop {
        let payload = expect_record(reader)?;
        let body = strip_padding(&payload)?;
        let mut cursor = PayloadCursor::new(body, "string record");
        let x0 = cursor.read_count("sub-record count")?;
        let x1 = cursor.read_count("string count")?;
        let x2 = cursor.read_count("per-record cap")?;

        let expected = *total.get_or_insert(x1);
        if x1 != expected {
            return Err(HarError::invalid_data(format!(
                "string count changed between records ({expected} then {x1})"
            )));
        }
        vectors = x0.max(1);
        if expected == 0 {
            break;
        }
        let in_record = x2.min(expected - strings.len());
        if in_record == 0 {
            return Err(HarError::invalid_data("string record advances no strings"));
        }
        let width = cursor.remaining() / in_record;
        if width == 0 {
            return Err(HarError::invalid_data(format!(
                "string record holds {} bytes for {in_record} strings",
                cursor.remaining()
            )));
        }
        for _ in 0..in_record {
            strings.push(cursor.read_str(width)?);
        }
        if strings.len() >= expected {
            break;
        }
    }

    let dims = header.padded_dimensions();
    if header.element_count() != strings.len() {
        return Err(HarError::invalid_data(format!(
            "dimensional-product disagreement: header declares {} strings, records carry {}",
            header.element_count(),
            strings.len()
        )));
    }
    let sets = positional_sets(&dims);
    let dict = SequenceDictionary::from_logical_values(sets, strings)?;
    HeaderArray::new(
        &header.name,
        &header.description,
        ArrayKind::Character,
        header.dimensions.as_slice(),
        vectors as i32,
        HeaderArrayPayload::Strings(dict),
    )
}

// ============================================================================
// RE FULL - dense reals
// ============================================================================

fn read_real_full<R: Read>(reader: &mut R, header: &ArrayHeader) -> Result<HeaderArray> {
    let set_header = read_set_header(reader)?;
    let extents = read_extent_record(reader)?;
    let total: usize = extents.iter().map(|&d| d as usize).product();
    if total != header.element_count() {
        return Err(HarError::invalid_data(format!(
            "dimensional-product disagreement: extents give {total}, header gives {}",
            header.element_count()
        )));
    }
    check_label_counts(&set_header.sets, &extents)?;

    if !set_header.sets.is_empty() && set_header.has_labels && total > 0 {
        // Dimension descriptor: slice bounds for partial reads, skip-decoded
        // when reading full arrays.
        let _ = expect_record(reader)?;
    }

    let payload = expect_record(reader)?;
    let body = strip_padding(&payload)?;
    let mut cursor = PayloadCursor::new(body, "real data record");
    let _data_dim = cursor.read_i32()?;
    let mut values = Vec::with_capacity(total);
    for _ in 0..total {
        values.push(cursor.read_f32()?);
    }

    let sets = resolve_sets(set_header.sets, &extents);
    let dict = SequenceDictionary::from_logical_values(sets, values)?;
    HeaderArray::new(
        &header.name,
        &header.description,
        ArrayKind::Real,
        header.dimensions.as_slice(),
        1,
        HeaderArrayPayload::Reals(dict),
    )
}

// ============================================================================
// RE SPSE - sparse reals
// ============================================================================

fn read_real_sparse<R: Read>(reader: &mut R, header: &ArrayHeader) -> Result<HeaderArray> {
    let set_header = read_set_header(reader)?;
    let dims = header.padded_dimensions();
    let total = header.element_count();
    check_label_counts(&set_header.sets, &dims)?;

    let payload = expect_record(reader)?;
    let body = strip_padding(&payload)?;
    let mut cursor = PayloadCursor::new(body, "sparse value-count record");
    let declared = cursor.read_count("stored-value count")?;
    let _ = cursor.read_i32()?;
    let _ = cursor.read_i32()?;

    let sets = resolve_sets(set_header.sets, &dims);
    let mut dict = SequenceDictionary::new(sets);
    let mut consumed = 0usize;
    let mut first = true;
    while first || consumed < declared {
        first = false;
        let payload = expect_record(reader)?;
        let body = strip_padding(&payload)?;
        let mut cursor = PayloadCursor::new(body, "sparse data record");
        let _records_left = cursor.read_i32()?;
        let _ = cursor.read_i32()?;
        let count = cursor.read_count("entry count")?;
        if count == 0 && consumed < declared {
            return Err(HarError::invalid_data("sparse data record advances no entries"));
        }
        if consumed + count > declared {
            return Err(HarError::invalid_data(format!(
                "sparse records carry more than the declared {declared} entries"
            )));
        }
        let mut positions = Vec::with_capacity(count);
        for _ in 0..count {
            positions.push(cursor.read_count("linear index")?);
        }
        for position in positions {
            let value = cursor.read_f32()?;
            if position == 0 || position > total {
                return Err(HarError::invalid_data(format!(
                    "sparse index {position} outside 1..={total}"
                )));
            }
            dict.insert_at(position - 1, value)?;
        }
        consumed += count;
    }

    HeaderArray::new(
        &header.name,
        &header.description,
        ArrayKind::Real,
        header.dimensions.as_slice(),
        1,
        HeaderArrayPayload::Reals(dict),
    )
}

// ============================================================================
// RL / 2I / 2R - label-less value lists
// ============================================================================

fn read_value_list<R: Read>(reader: &mut R, header: &ArrayHeader) -> Result<HeaderArray> {
    let extents = read_extent_record(reader)?;
    let total: usize = extents.iter().map(|&d| d as usize).product();
    if total != header.element_count() {
        return Err(HarError::invalid_data(format!(
            "dimensional-product disagreement: extents give {total}, header gives {}",
            header.element_count()
        )));
    }
    // Dimension descriptor, skip-decoded.
    let _ = expect_record(reader)?;

    let payload = expect_record(reader)?;
    let body = strip_padding(&payload)?;
    let mut cursor = PayloadCursor::new(body, "value-list data record");
    let _data_dim = cursor.read_i32()?;

    let sets = positional_sets(&extents);
    let payload = match header.kind {
        ArrayKind::Integer => {
            let mut values = Vec::with_capacity(total);
            for _ in 0..total {
                values.push(cursor.read_i32()?);
            }
            HeaderArrayPayload::Ints(SequenceDictionary::from_logical_values(sets, values)?)
        }
        _ => {
            let mut values = Vec::with_capacity(total);
            for _ in 0..total {
                values.push(cursor.read_f32()?);
            }
            HeaderArrayPayload::Reals(SequenceDictionary::from_logical_values(sets, values)?)
        }
    };
    HeaderArray::new(
        &header.name,
        &header.description,
        header.kind,
        header.dimensions.as_slice(),
        1,
        payload,
    )
}

// ============================================================================
// Shared checks
// ============================================================================

/// Each defining set must match its dimension extent.
fn check_label_counts(sets: &[SetDefinition], extents: &[i32; DIMENSION_SLOTS]) -> Result<()> {
    for (index, set) in sets.iter().enumerate() {
        let extent = extents[index].max(1) as usize;
        if set.len() != extent {
            return Err(HarError::invalid_data(format!(
                "label-count mismatch for set {:?}: {} labels, extent {extent}",
                set.name(),
                set.len()
            )));
        }
    }
    Ok(())
}

/// Named sets when the file carries them, positional sets otherwise.
fn resolve_sets(sets: Vec<SetDefinition>, extents: &[i32; DIMENSION_SLOTS]) -> Vec<SetDefinition> {
    if sets.is_empty() {
        positional_sets(extents)
    } else {
        sets
    }
}
