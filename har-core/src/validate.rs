//! Set consistency validation across the arrays of one file.
//!
//! Set names used with identical labels across a file must carry identical
//! element lists. Violations are findings, not errors: the validator
//! collects [`SetMismatch`] records, optionally reporting each to a text
//! sink, and never aborts the walk.

use crate::array::HeaderArray;
use crate::set::SetDefinition;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

/// One inconsistent reuse of a set name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetMismatch {
    pub set_name: String,
    pub first_seen: Vec<String>,
    pub found: Vec<String>,
}

impl std::fmt::Display for SetMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "set {}: first seen [{}], found [{}]",
            self.set_name,
            self.first_seen.join(", "),
            self.found.join(", ")
        )
    }
}

/// Streaming set-consistency checker.
///
/// Set names are matched case-insensitively; positional (unnamed) sets are
/// skipped. Element comparison is case-insensitive ordinal, sequence-wise.
#[derive(Default)]
pub struct SetValidator {
    seen: HashMap<String, (String, Vec<Arc<str>>)>,
    mismatches: Vec<SetMismatch>,
}

impl SetValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every named set of one array against the first-seen lists.
    pub fn check(&mut self, array: &HeaderArray) {
        for set in array.sets() {
            self.check_set(set);
        }
    }

    fn check_set(&mut self, set: &SetDefinition) {
        if set.is_positional() {
            return;
        }
        let key = set.name().to_ascii_lowercase();
        match self.seen.get(&key) {
            None => {
                self.seen
                    .insert(key, (set.name().to_string(), set.elements().to_vec()));
            }
            Some((first_name, first_elements)) => {
                let equal = first_elements.len() == set.len()
                    && first_elements
                        .iter()
                        .zip(set.elements())
                        .all(|(a, b)| a.eq_ignore_ascii_case(b));
                if !equal {
                    self.mismatches.push(SetMismatch {
                        set_name: first_name.clone(),
                        first_seen: first_elements.iter().map(|e| e.to_string()).collect(),
                        found: set.elements().iter().map(|e| e.to_string()).collect(),
                    });
                }
            }
        }
    }

    /// All findings so far, in discovery order.
    pub fn mismatches(&self) -> &[SetMismatch] {
        &self.mismatches
    }

    /// True when no mismatch has been found.
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Walk a sequence of arrays, reporting each mismatch to `sink`.
///
/// Returns "all consistent". Running twice over the same arrays produces
/// identical output.
pub fn validate_sets<'a>(
    arrays: impl IntoIterator<Item = &'a HeaderArray>,
    mut sink: Option<&mut dyn io::Write>,
) -> bool {
    let mut validator = SetValidator::new();
    for array in arrays {
        let before = validator.mismatches.len();
        validator.check(array);
        if let Some(out) = sink.as_deref_mut() {
            for mismatch in &validator.mismatches[before..] {
                let _ = writeln!(out, "{mismatch}");
            }
        }
    }
    validator.is_consistent()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{ArrayKind, HeaderArray, HeaderArrayPayload};
    use crate::dict::SequenceDictionary;

    fn real_array(header: &str, set: SetDefinition, values: &[f32]) -> HeaderArray {
        let dims = [set.len() as i32];
        let dict =
            SequenceDictionary::from_logical_values(vec![set], values.iter().copied()).unwrap();
        HeaderArray::new(
            header,
            "",
            ArrayKind::Real,
            dims,
            1,
            HeaderArrayPayload::Reals(dict),
        )
        .unwrap()
    }

    #[test]
    fn test_consistent_sets_pass() {
        let a = real_array("AAA1", SetDefinition::new("REG", ["AUS", "USA"]), &[1.0, 2.0]);
        let b = real_array("BBB1", SetDefinition::new("REG", ["aus", "usa"]), &[3.0, 4.0]);
        assert!(validate_sets([&a, &b], None));
    }

    #[test]
    fn test_mismatch_reported_not_fatal() {
        let a = real_array("AAA1", SetDefinition::new("REG", ["AUS", "USA"]), &[1.0, 2.0]);
        let b = real_array("BBB1", SetDefinition::new("REG", ["AUS", "CAN"]), &[3.0, 4.0]);

        let mut validator = SetValidator::new();
        validator.check(&a);
        validator.check(&b);
        assert!(!validator.is_consistent());
        assert_eq!(validator.mismatches().len(), 1);
        let m = &validator.mismatches()[0];
        assert_eq!(m.set_name, "REG");
        assert_eq!(m.first_seen, vec!["AUS", "USA"]);
        assert_eq!(m.found, vec!["AUS", "CAN"]);
    }

    #[test]
    fn test_sink_receives_messages() {
        let a = real_array("AAA1", SetDefinition::new("REG", ["AUS", "USA"]), &[1.0, 2.0]);
        let b = real_array("BBB1", SetDefinition::new("REG", ["AUS", "CAN"]), &[3.0, 4.0]);

        let mut out = Vec::new();
        let consistent = validate_sets([&a, &b], Some(&mut out));
        assert!(!consistent);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("REG"));
        assert!(text.contains("CAN"));
    }

    #[test]
    fn test_validation_idempotent() {
        let a = real_array("AAA1", SetDefinition::new("REG", ["AUS", "USA"]), &[1.0, 2.0]);
        let b = real_array("BBB1", SetDefinition::new("REG", ["AUS", "CAN"]), &[3.0, 4.0]);

        let mut first = Vec::new();
        let mut second = Vec::new();
        validate_sets([&a, &b], Some(&mut first));
        validate_sets([&a, &b], Some(&mut second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_positional_sets_skipped() {
        let a = real_array("AAA1", SetDefinition::positional(2), &[1.0, 2.0]);
        let b = real_array("BBB1", SetDefinition::positional(3), &[1.0, 2.0, 3.0]);
        assert!(validate_sets([&a, &b], None));
    }
}
