//! Key sequences - ordered tuples of set-element keys.
//!
//! A key sequence addresses one logical entry of a header array. Its
//! canonical string form is `[k0][k1]...[kn-1]`; the empty sequence
//! stringifies to the empty string.
//!
//! ## Ordering
//!
//! Two comparators exist, both case-insensitive ordinal per component:
//! - [`cmp_forward`] compares components left-to-right.
//! - [`cmp_reverse`] compares with the component order reversed, so that
//!   when sorting a Cartesian product the *last* set varies slowest. This
//!   mirrors Fortran column-major storage.
//!
//! Equality and hashing are exact (case-sensitive) on the components;
//! the case folding applies to ordering only.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Immutable ordered tuple of string keys.
///
/// Components are `Arc<str>` so that sequences built from shared set
/// elements clone cheaply during expanded enumeration.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct KeySequence {
    keys: Vec<Arc<str>>,
}

impl KeySequence {
    /// Create a sequence from owned components.
    pub fn new(keys: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            keys: keys.into_iter().map(|k| Arc::from(k.as_ref())).collect(),
        }
    }

    /// Create a sequence from pre-shared components.
    ///
    /// Use this when the components already live in a set definition.
    pub fn from_shared(keys: Vec<Arc<str>>) -> Self {
        Self { keys }
    }

    /// The empty sequence.
    pub fn empty() -> Self {
        Self { keys: Vec::new() }
    }

    /// Single-component sequence.
    pub fn single(key: impl AsRef<str>) -> Self {
        Self {
            keys: vec![Arc::from(key.as_ref())],
        }
    }

    /// Parse a sequence from its string form.
    ///
    /// Accepts the canonical `[a][b][c]` form as well as `*`-separated
    /// keys (`a*b*c`); surrounding brackets are trimmed per component.
    /// The empty string parses to the empty sequence.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::empty();
        }
        let inner = trimmed.strip_prefix('[').unwrap_or(trimmed);
        let inner = inner.strip_suffix(']').unwrap_or(inner);
        let keys = inner
            .split("][")
            .flat_map(|part| part.split('*'))
            .map(|part| Arc::from(part.trim().trim_matches(&['[', ']'][..]).trim()))
            .collect();
        Self { keys }
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when the sequence has no components.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Component at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(|k| k.as_ref())
    }

    /// Iterate over components.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.keys.iter().map(|k| k.as_ref())
    }

    /// Shared view of the components.
    pub fn components(&self) -> &[Arc<str>] {
        &self.keys
    }

    /// New sequence holding components `at..`.
    pub fn suffix(&self, at: usize) -> KeySequence {
        Self {
            keys: self.keys[at..].to_vec(),
        }
    }

    /// New sequence with `other` appended after `self`.
    pub fn join(&self, other: &KeySequence) -> KeySequence {
        let mut keys = Vec::with_capacity(self.keys.len() + other.keys.len());
        keys.extend(self.keys.iter().cloned());
        keys.extend(other.keys.iter().cloned());
        Self { keys }
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.keys {
            write!(f, "[{key}]")?;
        }
        Ok(())
    }
}

impl fmt::Debug for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeySequence({self})")
    }
}

impl<S: AsRef<str>> FromIterator<S> for KeySequence {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

// ============================================================================
// Comparators
// ============================================================================

/// Case-insensitive ordinal comparison of two components.
#[inline]
pub fn cmp_component(a: &str, b: &str) -> Ordering {
    let la = a.bytes().map(|c| c.to_ascii_lowercase());
    let lb = b.bytes().map(|c| c.to_ascii_lowercase());
    la.cmp(lb)
}

/// True when two components are equal under case-insensitive ordinal
/// comparison.
#[inline]
pub fn component_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Forward comparator: components left-to-right, shorter sequences first
/// on a shared prefix.
#[inline]
pub fn cmp_forward(a: &KeySequence, b: &KeySequence) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match cmp_component(x, y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Reverse comparator: components compared last-to-first.
///
/// Sorting a full Cartesian product with this comparator makes the last
/// set vary slowest, matching the column-major payload order of the
/// binary format.
#[inline]
pub fn cmp_reverse(a: &KeySequence, b: &KeySequence) -> Ordering {
    for (x, y) in a.iter().rev().zip(b.iter().rev()) {
        match cmp_component(x, y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

// ============================================================================
// Tests
// ============================================================================
