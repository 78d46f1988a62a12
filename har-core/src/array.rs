//! Header arrays - the public logical object of a HAR file.

use crate::dict::SequenceDictionary;
use crate::error::{HarError, Result};
use crate::key::KeySequence;
use crate::set::SetDefinition;

/// Width of the description field in the binary metadata record.
pub const DESCRIPTION_WIDTH: usize = 70;

/// Width of the header-name record in the binary format.
pub const HEADER_WIDTH: usize = 4;

/// Number of dimension slots carried by every array; unused slots are 1.
pub const DIMENSION_SLOTS: usize = 7;

// ============================================================================
// Array kind
// ============================================================================

/// Two-character type tag of a header array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    /// `RE` - reals addressed element-wise by named sets.
    Real,
    /// `RL` - a real list without set labels.
    RealList,
    /// `1C` - fixed-width character strings.
    Character,
    /// `2I` - integers without set labels.
    Integer,
    /// `2R` - reals without set labels.
    RealNoSets,
}

impl ArrayKind {
    /// The two-character wire code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Real => "RE",
            Self::RealList => "RL",
            Self::Character => "1C",
            Self::Integer => "2I",
            Self::RealNoSets => "2R",
        }
    }

    /// Parse a wire code. Unknown codes return `None`; callers treat them
    /// as fatal because the record layout cannot be advanced past.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "RE" => Some(Self::Real),
            "RL" => Some(Self::RealList),
            "1C" => Some(Self::Character),
            "2I" => Some(Self::Integer),
            "2R" => Some(Self::RealNoSets),
            _ => None,
        }
    }

    /// True for the kinds whose payload is `f32`.
    pub fn holds_reals(self) -> bool {
        matches!(self, Self::Real | Self::RealList | Self::RealNoSets)
    }
}

impl std::fmt::Display for ArrayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Payload
// ============================================================================

/// Tagged payload variant over the element type.
///
/// The defining sets live on the payload dictionary; [`HeaderArray::sets`]
/// delegates here.
#[derive(Clone, Debug)]
pub enum HeaderArrayPayload {
    Strings(SequenceDictionary<String>),
    Reals(SequenceDictionary<f32>),
    Ints(SequenceDictionary<i32>),
}

impl HeaderArrayPayload {
    /// The defining sets, in dimension order.
    pub fn sets(&self) -> &[SetDefinition] {
        match self {
            Self::Strings(d) => d.sets(),
            Self::Reals(d) => d.sets(),
            Self::Ints(d) => d.sets(),
        }
    }

    /// Product of the set sizes.
    pub fn total_size(&self) -> usize {
        match self {
            Self::Strings(d) => d.total_size(),
            Self::Reals(d) => d.total_size(),
            Self::Ints(d) => d.total_size(),
        }
    }

    /// Number of stored (non-default) entries.
    pub fn stored_len(&self) -> usize {
        match self {
            Self::Strings(d) => d.stored_len(),
            Self::Reals(d) => d.stored_len(),
            Self::Ints(d) => d.stored_len(),
        }
    }

    fn matches_kind(&self, kind: ArrayKind) -> bool {
        match self {
            Self::Strings(_) => kind == ArrayKind::Character,
            Self::Reals(_) => kind.holds_reals(),
            Self::Ints(_) => kind == ArrayKind::Integer,
        }
    }
}

// ============================================================================
// Header array
// ============================================================================

/// A single named array within a HAR file.
///
/// Immutable after construction. Readers and the solution assembler create
/// them; writers and enumerators consume them. [`HeaderArray::with_header`]
/// returns a renamed shallow copy.
#[derive(Clone, Debug)]
pub struct HeaderArray {
    header: String,
    description: String,
    kind: ArrayKind,
    dimensions: [i32; DIMENSION_SLOTS],
    serialized_vectors: i32,
    payload: HeaderArrayPayload,
}

impl HeaderArray {
    /// Construct an array, enforcing the model invariants.
    ///
    /// The header is trimmed of trailing spaces (the binary writer re-pads
    /// to 4 characters and rejects longer names); the description is
    /// trimmed of NUL/STX/space padding and truncated to the 70-byte
    /// field. The set-size product of the payload must equal the product
    /// of the dimensions.
    pub fn new(
        header: impl Into<String>,
        description: impl Into<String>,
        kind: ArrayKind,
        dimensions: impl AsRef<[i32]>,
        serialized_vectors: i32,
        payload: HeaderArrayPayload,
    ) -> Result<Self> {
        if !payload.matches_kind(kind) {
            return Err(HarError::invalid_data(format!(
                "payload element type does not match array kind {kind}"
            )));
        }
        let dimensions = normalize_dimensions(dimensions.as_ref())?;
        let dim_product: usize = dimensions.iter().map(|&d| d as usize).product();
        if payload.total_size() != dim_product {
            return Err(HarError::invalid_data(format!(
                "set product {} disagrees with dimension product {dim_product}",
                payload.total_size()
            )));
        }
        let mut description: String = description.into();
        trim_field(&mut description);
        description.truncate(DESCRIPTION_WIDTH);
        let header: String = header.into();
        Ok(Self {
            header: header.trim_end().to_string(),
            description,
            kind,
            dimensions,
            serialized_vectors: serialized_vectors.max(1),
            payload,
        })
    }

    /// Array name. At most 4 characters for arrays that travel through the
    /// binary format; solution variables may carry longer names.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Description, at most 70 characters.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Type tag.
    pub fn kind(&self) -> ArrayKind {
        self.kind
    }

    /// The 7-slot dimension vector; unused slots are 1.
    pub fn dimensions(&self) -> &[i32; DIMENSION_SLOTS] {
        &self.dimensions
    }

    /// Number of used dimension slots (at least 1).
    pub fn rank(&self) -> usize {
        self.dimensions
            .iter()
            .rposition(|&d| d > 1)
            .map(|i| i + 1)
            .unwrap_or(1)
    }

    /// Total element count: the product of the dimensions.
    pub fn element_count(&self) -> usize {
        self.dimensions.iter().map(|&d| d as usize).product()
    }

    /// Count of sub-vectors used by the binary layout.
    pub fn serialized_vectors(&self) -> i32 {
        self.serialized_vectors
    }

    /// The defining sets, one per non-trivial dimension.
    pub fn sets(&self) -> &[SetDefinition] {
        self.payload.sets()
    }

    /// The payload variant.
    pub fn payload(&self) -> &HeaderArrayPayload {
        &self.payload
    }

    /// Shallow copy under a new header name.
    pub fn with_header(&self, header: impl Into<String>) -> Self {
        let header: String = header.into();
        Self {
            header: header.trim_end().to_string(),
            ..self.clone()
        }
    }

    /// Real payload dictionary, when the kind holds reals.
    pub fn as_reals(&self) -> Option<&SequenceDictionary<f32>> {
        match &self.payload {
            HeaderArrayPayload::Reals(d) => Some(d),
            _ => None,
        }
    }

    /// String payload dictionary, for `1C` arrays.
    pub fn as_strings(&self) -> Option<&SequenceDictionary<String>> {
        match &self.payload {
            HeaderArrayPayload::Strings(d) => Some(d),
            _ => None,
        }
    }

    /// Integer payload dictionary, for `2I` arrays.
    pub fn as_ints(&self) -> Option<&SequenceDictionary<i32>> {
        match &self.payload {
            HeaderArrayPayload::Ints(d) => Some(d),
            _ => None,
        }
    }

    /// Real value at a key given as components. `None` for non-real kinds.
    pub fn real(&self, parts: &[&str]) -> Option<f32> {
        self.as_reals().map(|d| d.get(&KeySequence::new(parts)))
    }

    /// String value at a key given as components. `None` for non-string kinds.
    pub fn string(&self, parts: &[&str]) -> Option<String> {
        self.as_strings().map(|d| d.get(&KeySequence::new(parts)))
    }

    /// Integer value at a key given as components. `None` for non-int kinds.
    pub fn int(&self, parts: &[&str]) -> Option<i32> {
        self.as_ints().map(|d| d.get(&KeySequence::new(parts)))
    }
}

/// Pad-or-validate a dimension slice into the 7-slot vector.
fn normalize_dimensions(dims: &[i32]) -> Result<[i32; DIMENSION_SLOTS]> {
    if dims.len() > DIMENSION_SLOTS {
        return Err(HarError::invalid_data(format!(
            "rank {} exceeds the {DIMENSION_SLOTS}-dimension limit",
            dims.len()
        )));
    }
    let mut out = [1i32; DIMENSION_SLOTS];
    for (slot, &d) in out.iter_mut().zip(dims) {
        if d < 0 {
            return Err(HarError::invalid_data(format!("negative dimension {d}")));
        }
        *slot = d.max(1);
    }
    Ok(out)
}

/// Strip the NUL/STX/space padding GEMPACK leaves in fixed-width fields.
fn trim_field(text: &mut String) {
    while text.ends_with(['\0', '\x02', ' ']) {
        text.pop();
    }
}

/// Positional sets for a label-less dimension vector.
///
/// One set per non-unit dimension, elements `"1".."dk"`. A fully unit
/// vector yields no sets (a scalar addressed by the empty key).
pub fn positional_sets(dims: &[i32]) -> Vec<SetDefinition> {
    dims.iter()
        .filter(|&&d| d > 1)
        .map(|&d| SetDefinition::positional(d as usize))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn real_payload(values: &[f32], sets: Vec<SetDefinition>) -> HeaderArrayPayload {
        HeaderArrayPayload::Reals(
            SequenceDictionary::from_logical_values(sets, values.iter().copied()).unwrap(),
        )
    }

    #[test]
    fn test_kind_codes_round_trip() {
        for kind in [
            ArrayKind::Real,
            ArrayKind::RealList,
            ArrayKind::Character,
            ArrayKind::Integer,
            ArrayKind::RealNoSets,
        ] {
            assert_eq!(ArrayKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ArrayKind::from_code("XX"), None);
    }

    #[test]
    fn test_new_validates_dimension_product() {
        let sets = vec![SetDefinition::new("REG", ["a", "b", "c"])];
        let payload = real_payload(&[1.0, 2.0, 3.0], sets.clone());
        assert!(HeaderArray::new("ARR1", "", ArrayKind::Real, [3], 1, payload).is_ok());

        let payload = real_payload(&[1.0, 2.0, 3.0], sets);
        assert!(HeaderArray::new("ARR1", "", ArrayKind::Real, [4], 1, payload).is_err());
    }

    #[test]
    fn test_new_rejects_kind_payload_mismatch() {
        let sets = vec![SetDefinition::new("REG", ["a"])];
        let payload = real_payload(&[1.0], sets);
        assert!(HeaderArray::new("ARR1", "", ArrayKind::Character, [1], 1, payload).is_err());
    }

    #[test]
    fn test_description_trimmed_of_padding() {
        let payload = real_payload(&[1.0], vec![]);
        let arr = HeaderArray::new(
            "ARR1",
            "gross output\0\x02  ",
            ArrayKind::Real,
            [1],
            1,
            payload,
        )
        .unwrap();
        assert_eq!(arr.description(), "gross output");
    }

    #[test]
    fn test_rank_and_dimension_padding() {
        let sets = vec![
            SetDefinition::new("A", ["a1", "a2"]),
            SetDefinition::new("B", ["b1", "b2"]),
        ];
        let payload = real_payload(&[1.0, 2.0, 3.0, 4.0], sets);
        let arr = HeaderArray::new("ARR1", "", ArrayKind::Real, [2, 2], 1, payload).unwrap();
        assert_eq!(arr.dimensions(), &[2, 2, 1, 1, 1, 1, 1]);
        assert_eq!(arr.rank(), 2);
        assert_eq!(arr.element_count(), 4);
    }

    #[test]
    fn test_with_header_renames_only() {
        let payload = real_payload(&[5.0], vec![]);
        let arr = HeaderArray::new("OLD1", "desc", ArrayKind::Real, [1], 1, payload).unwrap();
        let renamed = arr.with_header("NEW1");
        assert_eq!(renamed.header(), "NEW1");
        assert_eq!(renamed.description(), "desc");
        assert_eq!(renamed.real(&[]), Some(5.0));
    }

    #[test]
    fn test_positional_sets_skip_unit_dims() {
        let sets = positional_sets(&[3, 1, 2, 1, 1, 1, 1]);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].len(), 3);
        assert_eq!(sets[1].len(), 2);
    }
}
