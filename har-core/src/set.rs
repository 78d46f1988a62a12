//! Set definitions - named ordered element lists indexing one dimension.

use std::sync::Arc;

/// A named ordered list of string elements that indexes one dimension of a
/// header array.
///
/// Element membership tests are case-insensitive ordinal, matching the
/// comparator rules in [`crate::key`]. Label-less dimensions (RL, `2I`,
/// `2R`, setless RE) carry *positional* sets with an empty name and
/// elements `"1".."n"`; the set validator skips unnamed sets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetDefinition {
    name: String,
    elements: Vec<Arc<str>>,
}

impl SetDefinition {
    /// Create a set from a name and its ordered elements.
    pub fn new(name: impl Into<String>, elements: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            name: name.into(),
            elements: elements
                .into_iter()
                .map(|e| Arc::from(e.as_ref()))
                .collect(),
        }
    }

    /// Positional set for a label-less dimension of `size` elements.
    ///
    /// Elements are the one-based index strings `"1".."size"`.
    pub fn positional(size: usize) -> Self {
        Self {
            name: String::new(),
            elements: (1..=size).map(|i| Arc::from(i.to_string().as_str())).collect(),
        }
    }

    /// Set name. Empty for positional sets.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True for synthesized positional sets.
    pub fn is_positional(&self) -> bool {
        self.name.is_empty()
    }

    /// Ordered elements.
    pub fn elements(&self) -> &[Arc<str>] {
        &self.elements
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when the set has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Position of `element`, case-insensitive.
    pub fn position_of(&self, element: &str) -> Option<usize> {
        self.elements
            .iter()
            .position(|e| e.eq_ignore_ascii_case(element))
    }

    /// Element at `index`, shared.
    pub fn element(&self, index: usize) -> Option<&Arc<str>> {
        self.elements.get(index)
    }
}
