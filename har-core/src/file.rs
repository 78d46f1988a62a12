//! In-memory HAR file: an ordered collection of header arrays.

use crate::array::HeaderArray;
use crate::error::{HarError, Result};
use std::collections::HashMap;

/// Ordered arrays of one HAR file with lookup by header name.
///
/// Header names are distinct within a file (case- and space-sensitive on
/// the trimmed name); collecting a duplicate fails.
#[derive(Clone, Debug, Default)]
pub struct HarFile {
    arrays: Vec<HeaderArray>,
    index: HashMap<String, usize>,
}

impl HarFile {
    /// Empty file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect arrays, rejecting duplicate headers.
    pub fn from_arrays(arrays: impl IntoIterator<Item = HeaderArray>) -> Result<Self> {
        let mut file = Self::new();
        for array in arrays {
            file.push(array)?;
        }
        Ok(file)
    }

    /// Append one array.
    pub fn push(&mut self, array: HeaderArray) -> Result<()> {
        let name = array.header().to_string();
        if self.index.contains_key(&name) {
            return Err(HarError::invalid_data(format!(
                "duplicate header {name:?} in file"
            )));
        }
        self.index.insert(name, self.arrays.len());
        self.arrays.push(array);
        Ok(())
    }

    /// Array by header name.
    pub fn get(&self, header: &str) -> Option<&HeaderArray> {
        self.index.get(header).map(|&i| &self.arrays[i])
    }

    /// Array by header name, as an error when absent.
    pub fn require(&self, header: &str) -> Result<&HeaderArray> {
        self.get(header).ok_or_else(|| {
            HarError::invalid_data(format!("missing required header {header:?}"))
        })
    }

    /// Arrays in file order.
    pub fn arrays(&self) -> &[HeaderArray] {
        &self.arrays
    }

    /// Number of arrays.
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// True when the file holds no arrays.
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Iterate arrays in file order.
    pub fn iter(&self) -> impl Iterator<Item = &HeaderArray> {
        self.arrays.iter()
    }
}

impl IntoIterator for HarFile {
    type Item = HeaderArray;
    type IntoIter = std::vec::IntoIter<HeaderArray>;

    fn into_iter(self) -> Self::IntoIter {
        self.arrays.into_iter()
    }
}
