//! Sequence dictionaries - sparse maps over a Cartesian product of sets.
//!
//! A `SequenceDictionary<V>` carries its *defining sets* and stores only
//! entries whose value differs from `V::default()`. The logical content is
//! the full Cartesian product of the sets: missing entries materialize
//! lazily as default-valued pairs during expanded enumeration.
//!
//! Expanded enumeration is reverse-lex: the first set varies fastest and
//! the last set slowest, matching the column-major payload order of the
//! binary format. Stored entries additionally preserve insertion order for
//! serialized forms.

use crate::error::{HarError, Result};
use crate::key::KeySequence;
use crate::set::SetDefinition;
use std::collections::HashMap;
use std::sync::Arc;

/// Sparse mapping from key sequence to value over a product of sets.
#[derive(Clone, Debug)]
pub struct SequenceDictionary<V> {
    sets: Vec<SetDefinition>,
    entries: Vec<(KeySequence, V)>,
    index: HashMap<KeySequence, usize>,
}

impl<V> SequenceDictionary<V>
where
    V: Clone + Default + PartialEq,
{
    /// Empty dictionary over the given defining sets.
    pub fn new(sets: Vec<SetDefinition>) -> Self {
        Self {
            sets,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build a dictionary from the full logical value slice in expanded
    /// enumeration order (first set fastest).
    ///
    /// Fails when the value count disagrees with the set-size product.
    pub fn from_logical_values(
        sets: Vec<SetDefinition>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self> {
        let mut dict = Self::new(sets);
        let total = dict.total_size();
        let mut position = 0usize;
        for value in values {
            if position >= total {
                return Err(HarError::invalid_data(format!(
                    "value count exceeds set product of {total}"
                )));
            }
            if value != V::default() {
                let key = dict.key_at(position).ok_or_else(|| {
                    HarError::invalid_data(format!(
                        "linear position {position} outside product of {total}"
                    ))
                })?;
                dict.push_canonical(key, value);
            }
            position += 1;
        }
        if position != total {
            return Err(HarError::invalid_data(format!(
                "value count {position} disagrees with set product {total}"
            )));
        }
        Ok(dict)
    }

    /// The defining sets, in dimension order.
    pub fn sets(&self) -> &[SetDefinition] {
        &self.sets
    }

    /// Product of the set sizes - the logical entry count.
    ///
    /// The empty product is 1: a dictionary with no sets holds a single
    /// scalar addressed by the empty key sequence.
    pub fn total_size(&self) -> usize {
        self.sets.iter().map(SetDefinition::len).product()
    }

    /// Number of stored (non-default) entries.
    pub fn stored_len(&self) -> usize {
        self.entries.len()
    }

    /// Insert a value for `key`.
    ///
    /// Inserting `V::default()` is a no-op - default values are never
    /// stored. The key must draw one element from each defining set
    /// (case-insensitive); it is canonicalized to the sets' spelling
    /// before storage. Inserting an existing key overwrites in place.
    pub fn insert(&mut self, key: KeySequence, value: V) -> Result<()> {
        let canonical = self.canonicalize(&key).ok_or_else(|| {
            HarError::invalid_data(format!("key {key} is not in the set product"))
        })?;
        if value == V::default() {
            return Ok(());
        }
        self.push_canonical(canonical, value);
        Ok(())
    }

    /// Insert a value at a linear position of the expanded enumeration.
    pub fn insert_at(&mut self, position: usize, value: V) -> Result<()> {
        let key = self.key_at(position).ok_or_else(|| {
            HarError::invalid_data(format!(
                "linear position {position} outside product of {}",
                self.total_size()
            ))
        })?;
        if value == V::default() {
            return Ok(());
        }
        self.push_canonical(key, value);
        Ok(())
    }

    /// Stored value for `key`, or `V::default()` when absent.
    ///
    /// Components are matched case-insensitively against the defining
    /// sets; a key outside the set product reads as default.
    pub fn get(&self, key: &KeySequence) -> V {
        match self.canonicalize(key) {
            Some(canonical) => self.get_canonical(&canonical),
            None => V::default(),
        }
    }

    /// Stored value for an already-canonical key (exact components).
    fn get_canonical(&self, key: &KeySequence) -> V {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1.clone())
            .unwrap_or_default()
    }

    /// Sub-dictionary over the suffix Cartesian product of every entry
    /// whose leading components match `prefix`.
    ///
    /// Fails with [`HarError::KeyNotFound`] when the prefix is not itself
    /// a valid partial set product.
    pub fn get_partial(&self, prefix: &KeySequence) -> Result<SequenceDictionary<V>> {
        if prefix.len() > self.sets.len() {
            return Err(HarError::key_not_found(prefix.to_string()));
        }
        for (component, set) in prefix.iter().zip(&self.sets) {
            if set.position_of(component).is_none() {
                return Err(HarError::key_not_found(prefix.to_string()));
            }
        }
        let split = prefix.len();
        let mut sub = SequenceDictionary::new(self.sets[split..].to_vec());
        for (key, value) in &self.entries {
            let matches = prefix
                .iter()
                .zip(key.iter())
                .all(|(p, k)| p.eq_ignore_ascii_case(k));
            if matches {
                sub.push_canonical(key.suffix(split), value.clone());
            }
        }
        Ok(sub)
    }

    /// Linear position of `key` in the expanded enumeration.
    pub fn position_of(&self, key: &KeySequence) -> Result<usize> {
        if key.len() != self.sets.len() {
            return Err(HarError::key_not_found(key.to_string()));
        }
        let mut position = 0usize;
        let mut stride = 1usize;
        for (component, set) in key.iter().zip(&self.sets) {
            let slot = set
                .position_of(component)
                .ok_or_else(|| HarError::key_not_found(key.to_string()))?;
            position += slot * stride;
            stride *= set.len();
        }
        Ok(position)
    }

    /// Key at a linear position of the expanded enumeration, or `None`
    /// when the position falls outside the set product.
    pub fn key_at(&self, position: usize) -> Option<KeySequence> {
        if position >= self.total_size() {
            return None;
        }
        let mut components: Vec<Arc<str>> = Vec::with_capacity(self.sets.len());
        let mut remainder = position;
        for set in &self.sets {
            let slot = remainder % set.len();
            remainder /= set.len();
            components.push(set.element(slot)?.clone());
        }
        Some(KeySequence::from_shared(components))
    }

    /// Lazy enumeration of *all* key sequences in reverse-lex order
    /// (first set fastest, last set slowest).
    pub fn expanded_keys(&self) -> ExpandedKeys<'_> {
        ExpandedKeys::over(&self.sets)
    }

    /// `expanded_keys()` mapped through `get`: the full logical value
    /// sequence in expanded order.
    pub fn logical_values(&self) -> impl Iterator<Item = V> + '_ {
        self.expanded_keys().map(|key| self.get_canonical(&key))
    }

    /// Stored entries in insertion order.
    pub fn stored_entries(&self) -> impl Iterator<Item = (&KeySequence, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Rewrite `key` using the defining sets' element spellings.
    fn canonicalize(&self, key: &KeySequence) -> Option<KeySequence> {
        if key.len() != self.sets.len() {
            return None;
        }
        let mut components = Vec::with_capacity(key.len());
        for (component, set) in key.iter().zip(&self.sets) {
            let slot = set.position_of(component)?;
            components.push(set.element(slot)?.clone());
        }
        Some(KeySequence::from_shared(components))
    }

    /// Store a canonical key, overwriting an existing slot in place.
    fn push_canonical(&mut self, key: KeySequence, value: V) {
        if let Some(&slot) = self.index.get(&key) {
            self.entries[slot].1 = value;
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, value));
        }
    }
}

// ============================================================================
// Expanded enumeration
// ============================================================================

/// Odometer over a set product: the first set steps fastest.
pub struct ExpandedKeys<'a> {
    sets: &'a [SetDefinition],
    counters: Vec<usize>,
    remaining: usize,
}

impl<'a> ExpandedKeys<'a> {
    fn over(sets: &'a [SetDefinition]) -> Self {
        let remaining = sets.iter().map(SetDefinition::len).product();
        Self {
            sets,
            counters: vec![0; sets.len()],
            remaining,
        }
    }
}

impl Iterator for ExpandedKeys<'_> {
    type Item = KeySequence;

    fn next(&mut self) -> Option<KeySequence> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let components: Vec<Arc<str>> = self
            .counters
            .iter()
            .zip(self.sets)
            .map(|(&slot, set)| set.elements()[slot].clone())
            .collect();
        for (counter, set) in self.counters.iter_mut().zip(self.sets) {
            *counter += 1;
            if *counter < set.len() {
                break;
            }
            *counter = 0;
        }
        Some(KeySequence::from_shared(components))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ExpandedKeys<'_> {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> Vec<SetDefinition> {
        vec![
            SetDefinition::new("COM", ["c1", "c2"]),
            SetDefinition::new("REG", ["r1", "r2"]),
        ]
    }

    fn key(parts: &[&str]) -> KeySequence {
        KeySequence::new(parts)
    }

    #[test]
    fn test_expanded_keys_first_set_fastest() {
        let dict: SequenceDictionary<f32> = SequenceDictionary::new(two_by_two());
        let keys: Vec<KeySequence> = dict.expanded_keys().collect();
        assert_eq!(
            keys,
            vec![
                key(&["c1", "r1"]),
                key(&["c2", "r1"]),
                key(&["c1", "r2"]),
                key(&["c2", "r2"]),
            ]
        );
    }

    #[test]
    fn test_expanded_length_is_set_product() {
        let sets = vec![
            SetDefinition::new("A", ["a1", "a2", "a3"]),
            SetDefinition::new("B", ["b1", "b2"]),
        ];
        let dict: SequenceDictionary<f32> = SequenceDictionary::new(sets);
        assert_eq!(dict.total_size(), 6);
        assert_eq!(dict.expanded_keys().count(), 6);
    }

    #[test]
    fn test_empty_set_list_is_scalar() {
        let dict: SequenceDictionary<f32> = SequenceDictionary::new(vec![]);
        assert_eq!(dict.total_size(), 1);
        let keys: Vec<KeySequence> = dict.expanded_keys().collect();
        assert_eq!(keys, vec![KeySequence::empty()]);
    }

    #[test]
    fn test_default_values_never_stored() {
        let mut dict = SequenceDictionary::new(two_by_two());
        dict.insert(key(&["c1", "r1"]), 0.0f32).unwrap();
        dict.insert(key(&["c2", "r1"]), 1.5f32).unwrap();
        assert_eq!(dict.stored_len(), 1);
        assert_eq!(dict.get(&key(&["c1", "r1"])), 0.0);
        assert_eq!(dict.get(&key(&["c2", "r1"])), 1.5);
    }

    #[test]
    fn test_insert_rejects_foreign_keys() {
        let mut dict = SequenceDictionary::new(two_by_two());
        assert!(dict.insert(key(&["c9", "r1"]), 1.0f32).is_err());
        assert!(dict.insert(key(&["c1"]), 1.0f32).is_err());
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let mut dict = SequenceDictionary::new(two_by_two());
        dict.insert(key(&["C1", "R2"]), 3.0f32).unwrap();
        assert_eq!(dict.get(&key(&["c1", "r2"])), 3.0);
        // Stored under the set's spelling.
        let stored: Vec<String> = dict
            .stored_entries()
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(stored, vec!["[c1][r2]"]);
    }

    #[test]
    fn test_from_logical_values_column_major() {
        let dict =
            SequenceDictionary::from_logical_values(two_by_two(), [1.0f32, 2.0, 3.0, 4.0])
                .unwrap();
        assert_eq!(dict.get(&key(&["c1", "r1"])), 1.0);
        assert_eq!(dict.get(&key(&["c2", "r1"])), 2.0);
        assert_eq!(dict.get(&key(&["c1", "r2"])), 3.0);
        assert_eq!(dict.get(&key(&["c2", "r2"])), 4.0);
    }

    #[test]
    fn test_from_logical_values_count_mismatch() {
        assert!(SequenceDictionary::from_logical_values(two_by_two(), [1.0f32, 2.0]).is_err());
        assert!(SequenceDictionary::from_logical_values(
            two_by_two(),
            [1.0f32, 2.0, 3.0, 4.0, 5.0]
        )
        .is_err());
    }

    #[test]
    fn test_logical_values_materialize_defaults() {
        let mut dict = SequenceDictionary::new(two_by_two());
        dict.insert(key(&["c2", "r2"]), 9.0f32).unwrap();
        let values: Vec<f32> = dict.logical_values().collect();
        assert_eq!(values, vec![0.0, 0.0, 0.0, 9.0]);
    }

    #[test]
    fn test_position_of_and_key_at_agree() {
        let dict: SequenceDictionary<f32> = SequenceDictionary::new(two_by_two());
        for (i, k) in dict.expanded_keys().enumerate() {
            assert_eq!(dict.position_of(&k).unwrap(), i);
            assert_eq!(dict.key_at(i).unwrap(), k);
        }
        assert!(dict.key_at(4).is_none());
        assert!(dict.position_of(&key(&["c1", "nope"])).is_err());
    }

    #[test]
    fn test_get_partial_suffix_product() {
        let mut dict = SequenceDictionary::new(two_by_two());
        dict.insert(key(&["c1", "r1"]), 1.0f32).unwrap();
        dict.insert(key(&["c1", "r2"]), 3.0f32).unwrap();
        dict.insert(key(&["c2", "r2"]), 4.0f32).unwrap();

        let sub = dict.get_partial(&key(&["c1"])).unwrap();
        assert_eq!(sub.sets().len(), 1);
        assert_eq!(sub.sets()[0].name(), "REG");
        assert_eq!(sub.get(&key(&["r1"])), 1.0);
        assert_eq!(sub.get(&key(&["r2"])), 3.0);
        let values: Vec<f32> = sub.logical_values().collect();
        assert_eq!(values, vec![1.0, 3.0]);
    }

    #[test]
    fn test_get_partial_invalid_prefix() {
        let dict: SequenceDictionary<f32> = SequenceDictionary::new(two_by_two());
        assert!(matches!(
            dict.get_partial(&key(&["nope"])),
            Err(HarError::KeyNotFound(_))
        ));
        assert!(dict.get_partial(&key(&["c1", "r1", "x"])).is_err());
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut dict = SequenceDictionary::new(two_by_two());
        dict.insert(key(&["c1", "r1"]), 1.0f32).unwrap();
        dict.insert(key(&["c2", "r1"]), 2.0f32).unwrap();
        dict.insert(key(&["c1", "r1"]), 7.0f32).unwrap();
        assert_eq!(dict.stored_len(), 2);
        let order: Vec<String> = dict.stored_entries().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, vec!["[c1][r1]", "[c2][r1]"]);
        assert_eq!(dict.get(&key(&["c1", "r1"])), 7.0);
    }

    #[test]
    fn test_string_dictionary_defaults() {
        let sets = vec![SetDefinition::new("REG", ["AUS", "USA", "CHN"])];
        let mut dict: SequenceDictionary<String> = SequenceDictionary::new(sets);
        dict.insert(key(&["AUS"]), "Oz".to_string()).unwrap();
        dict.insert(key(&["USA"]), String::new()).unwrap();
        assert_eq!(dict.stored_len(), 1);
        assert_eq!(dict.get(&key(&["USA"])), "");
        assert_eq!(dict.get(&key(&["AUS"])), "Oz");
    }
}
