//! Solution metadata: sets and variables cross-indexed from SL4 headers.
//!
//! An `.sl4` is a HAR file whose parallel metadata arrays describe the
//! model's sets and variables:
//!
//! - `STNM` / `STLB` / `STTP` / `SSZ` / `STEL`: set names, descriptions,
//!   type flags (`i` intertemporal), sizes, and the flat concatenation of
//!   every set's elements.
//! - `VCNM` / `VCL0` / `VCLE` / `VCT0` / `VCS0`: variable names,
//!   descriptions, unit labels, change-type codes, and kind codes.
//! - `VCSP` / `VCNI` / `VCSN`: per-variable 1-based offset into `VCSN`,
//!   set count, and the 1-based set indices themselves.
//!
//! Every 1-based file index is rebased to 0 here and never escapes this
//! module.

use har_core::{HarError, HarFile, HeaderArray, Result, SetDefinition};

// ============================================================================
// Code enums
// ============================================================================

/// Variable kind carried by `VCS0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum VariableKind {
    Exogenous = 0,
    Endogenous = 1,
    Backsolved = 2,
    Condensed = 3,
}

impl VariableKind {
    /// Decode the wire code. Unknown codes return `None`.
    pub fn from_repr(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Exogenous),
            1 => Some(Self::Endogenous),
            2 => Some(Self::Backsolved),
            3 => Some(Self::Condensed),
            _ => None,
        }
    }

    /// True for the kinds reconstructed from the cumulative-results block.
    pub fn is_reconstructed(self) -> bool {
        matches!(self, Self::Backsolved | Self::Condensed)
    }
}

/// Change type carried by `VCT0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ChangeType {
    #[default]
    Percent = 0,
    Linear = 1,
}

impl ChangeType {
    /// Decode the wire code. Unknown codes return `None`.
    pub fn from_repr(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Percent),
            1 => Some(Self::Linear),
            _ => None,
        }
    }
}

// ============================================================================
// Model
// ============================================================================

/// One model set.
#[derive(Clone, Debug)]
pub struct SolutionSet {
    pub name: String,
    pub description: String,
    pub intertemporal: bool,
    pub definition: SetDefinition,
}

/// One model variable with its defining sets resolved.
#[derive(Clone, Debug)]
pub struct SolutionVariable {
    /// Position in the `VCNM` list.
    pub index: usize,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub change_type: ChangeType,
    pub kind: VariableKind,
    pub sets: Vec<SetDefinition>,
}

impl SolutionVariable {
    /// Logical value count: the product of the set sizes.
    pub fn total_size(&self) -> usize {
        self.sets.iter().map(SetDefinition::len).product()
    }
}

/// Sets and variables of one solution file.
#[derive(Clone, Debug)]
pub struct SolutionMetadata {
    pub sets: Vec<SolutionSet>,
    pub variables: Vec<SolutionVariable>,
}

impl SolutionMetadata {
    /// Cross-index the metadata headers of a solution file.
    pub fn from_file(file: &HarFile) -> Result<Self> {
        let sets = read_sets(file)?;
        let variables = read_variables(file, &sets)?;
        Ok(Self { sets, variables })
    }
}

// ============================================================================
// Header accessors
// ============================================================================

pub(crate) fn strings_of(file: &HarFile, header: &str) -> Result<Vec<String>> {
    let array = file.require(header)?;
    string_values(array, header)
}

pub(crate) fn strings_opt(file: &HarFile, header: &str) -> Result<Option<Vec<String>>> {
    match file.get(header) {
        Some(array) => string_values(array, header).map(Some),
        None => Ok(None),
    }
}

pub(crate) fn ints_of(file: &HarFile, header: &str) -> Result<Vec<i32>> {
    let array = file.require(header)?;
    int_values(array, header)
}

pub(crate) fn ints_opt(file: &HarFile, header: &str) -> Result<Option<Vec<i32>>> {
    match file.get(header) {
        Some(array) => int_values(array, header).map(Some),
        None => Ok(None),
    }
}

pub(crate) fn reals_of(file: &HarFile, header: &str) -> Result<Vec<f32>> {
    let array = file.require(header)?;
    array
        .as_reals()
        .map(|d| d.logical_values().collect())
        .ok_or_else(|| {
            HarError::invalid_data(format!("header {header:?} does not hold reals"))
        })
}

fn string_values(array: &HeaderArray, header: &str) -> Result<Vec<String>> {
    array
        .as_strings()
        .map(|d| d.logical_values().collect())
        .ok_or_else(|| {
            HarError::invalid_data(format!("header {header:?} does not hold strings"))
        })
}

fn int_values(array: &HeaderArray, header: &str) -> Result<Vec<i32>> {
    array
        .as_ints()
        .map(|d| d.logical_values().collect())
        .ok_or_else(|| {
            HarError::invalid_data(format!("header {header:?} does not hold integers"))
        })
}

/// Parallel metadata arrays must share their length.
pub(crate) fn check_parallel(field: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(HarError::validation(
            field,
            expected.to_string(),
            actual.to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Set construction
// ============================================================================

fn read_sets(file: &HarFile) -> Result<Vec<SolutionSet>> {
    let names = strings_of(file, "STNM")?;
    let types = strings_of(file, "STTP")?;
    let sizes = ints_of(file, "SSZ")?;
    let elements = strings_of(file, "STEL")?;
    let labels = strings_opt(file, "STLB")?.unwrap_or_else(|| vec![String::new(); names.len()]);
    check_parallel("STTP", names.len(), types.len())?;
    check_parallel("SSZ", names.len(), sizes.len())?;
    check_parallel("STLB", names.len(), labels.len())?;

    let mut sets = Vec::with_capacity(names.len());
    let mut offset = 0usize;
    for (index, name) in names.iter().enumerate() {
        let size = usize::try_from(sizes[index]).map_err(|_| {
            HarError::validation(
                format!("SSZ[{index}]"),
                "a non-negative size".to_string(),
                sizes[index].to_string(),
            )
        })?;
        if offset + size > elements.len() {
            return Err(HarError::validation(
                format!("STEL[{name}]"),
                format!("{size} elements at offset {offset}"),
                format!("{} elements total", elements.len()),
            ));
        }
        let slice = &elements[offset..offset + size];
        offset += size;
        sets.push(SolutionSet {
            name: name.clone(),
            description: labels[index].clone(),
            intertemporal: types[index].eq_ignore_ascii_case("i"),
            definition: SetDefinition::new(name, slice),
        });
    }
    Ok(sets)
}

// ============================================================================
// Variable construction
// ============================================================================

fn read_variables(file: &HarFile, sets: &[SolutionSet]) -> Result<Vec<SolutionVariable>> {
    let names = strings_of(file, "VCNM")?;
    let set_counts = ints_of(file, "VCNI")?;
    let set_offsets = ints_of(file, "VCSP")?;
    let set_indices = ints_of(file, "VCSN")?;
    let kinds = ints_of(file, "VCS0")?;
    let change_types = ints_opt(file, "VCT0")?;
    let descriptions = strings_opt(file, "VCL0")?;
    let units = strings_opt(file, "VCLE")?;
    check_parallel("VCNI", names.len(), set_counts.len())?;
    check_parallel("VCSP", names.len(), set_offsets.len())?;
    check_parallel("VCS0", names.len(), kinds.len())?;
    if let Some(codes) = &change_types {
        check_parallel("VCT0", names.len(), codes.len())?;
    }

    if let Some(check_names) = strings_opt(file, "VARS")? {
        check_parallel("VARS", names.len(), check_names.len())?;
        for (index, (expected, actual)) in names.iter().zip(&check_names).enumerate() {
            if expected != actual {
                return Err(HarError::validation(
                    format!("VARS[{index}]"),
                    expected.clone(),
                    actual.clone(),
                ));
            }
        }
    }

    let mut variables = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        let count = usize::try_from(set_counts[index]).map_err(|_| {
            HarError::validation(
                format!("VCNI[{index}]"),
                "a non-negative set count".to_string(),
                set_counts[index].to_string(),
            )
        })?;

        let mut var_sets = Vec::with_capacity(count);
        if count > 0 {
            // VCSP is a 1-based offset into VCSN.
            let start = set_offsets[index] - 1;
            let start = usize::try_from(start).map_err(|_| {
                HarError::validation(
                    format!("VCSP[{index}]"),
                    "a 1-based offset".to_string(),
                    set_offsets[index].to_string(),
                )
            })?;
            if start + count > set_indices.len() {
                return Err(HarError::validation(
                    format!("VCSN[{name}]"),
                    format!("{count} indices at offset {start}"),
                    format!("{} indices total", set_indices.len()),
                ));
            }
            for &set_index in &set_indices[start..start + count] {
                // VCSN entries are 1-based set indices.
                let slot = usize::try_from(set_index - 1).ok().filter(|&s| s < sets.len());
                let slot = slot.ok_or_else(|| {
                    HarError::validation(
                        format!("VCSN[{name}]"),
                        format!("a set index in 1..={}", sets.len()),
                        set_index.to_string(),
                    )
                })?;
                var_sets.push(sets[slot].definition.clone());
            }
        }

        let kind = VariableKind::from_repr(kinds[index]).ok_or_else(|| {
            HarError::validation(
                format!("VCS0[{index}]"),
                "a variable kind code in 0..=3".to_string(),
                kinds[index].to_string(),
            )
        })?;
        let change_type = match &change_types {
            Some(codes) => ChangeType::from_repr(codes[index]).ok_or_else(|| {
                HarError::validation(
                    format!("VCT0[{index}]"),
                    "a change-type code in 0..=1".to_string(),
                    codes[index].to_string(),
                )
            })?,
            None => ChangeType::default(),
        };

        variables.push(SolutionVariable {
            index,
            name: name.clone(),
            description: descriptions
                .as_ref()
                .and_then(|d| d.get(index).cloned())
                .unwrap_or_default(),
            unit: units
                .as_ref()
                .and_then(|u| u.get(index).cloned())
                .unwrap_or_default(),
            change_type,
            kind,
            sets: var_sets,
        });
    }
    Ok(variables)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{int_array, string_array};

    fn metadata_file() -> HarFile {
        HarFile::from_arrays([
            string_array("STNM", &["COM", "REG"]),
            string_array("STLB", &["commodities", "regions"]),
            string_array("STTP", &["n", "i"]),
            int_array("SSZ", &[2, 2]),
            string_array("STEL", &["c1", "c2", "r1", "r2"]),
            string_array("VCNM", &["gdp", "p3cs"]),
            int_array("VCNI", &[0, 2]),
            int_array("VCSP", &[1, 1]),
            int_array("VCSN", &[1, 2]),
            int_array("VCS0", &[1, 2]),
            int_array("VCT0", &[0, 1]),
        ])
        .unwrap()
    }

    #[test]
    fn test_sets_sliced_from_flat_elements() {
        let metadata = SolutionMetadata::from_file(&metadata_file()).unwrap();
        assert_eq!(metadata.sets.len(), 2);
        assert_eq!(metadata.sets[0].name, "COM");
        assert!(!metadata.sets[0].intertemporal);
        assert!(metadata.sets[1].intertemporal);
        assert_eq!(
            metadata.sets[1]
                .definition
                .elements()
                .iter()
                .map(|e| e.as_ref())
                .collect::<Vec<_>>(),
            vec!["r1", "r2"]
        );
    }

    #[test]
    fn test_variable_sets_resolved_from_one_based_indices() {
        let metadata = SolutionMetadata::from_file(&metadata_file()).unwrap();
        let p3cs = &metadata.variables[1];
        assert_eq!(p3cs.name, "p3cs");
        assert_eq!(p3cs.kind, VariableKind::Backsolved);
        assert_eq!(p3cs.change_type, ChangeType::Linear);
        assert_eq!(p3cs.sets.len(), 2);
        assert_eq!(p3cs.sets[0].name(), "COM");
        assert_eq!(p3cs.sets[1].name(), "REG");
        assert_eq!(p3cs.total_size(), 4);

        let gdp = &metadata.variables[0];
        assert_eq!(gdp.kind, VariableKind::Endogenous);
        assert!(gdp.sets.is_empty());
        assert_eq!(gdp.total_size(), 1);
    }

    #[test]
    fn test_vars_cross_check() {
        let mut arrays: Vec<_> = metadata_file().into_iter().collect();
        arrays.push(string_array("VARS", &["gdp", "wrong"]));
        let file = HarFile::from_arrays(arrays).unwrap();
        let err = SolutionMetadata::from_file(&file).unwrap_err();
        assert!(matches!(err, HarError::DataValidation { .. }));
        assert!(err.to_string().contains("VARS[1]"));
    }

    #[test]
    fn test_unknown_kind_code_rejected() {
        let mut arrays: Vec<_> = metadata_file()
            .into_iter()
            .filter(|a| a.header() != "VCS0")
            .collect();
        arrays.push(int_array("VCS0", &[1, 9]));
        let file = HarFile::from_arrays(arrays).unwrap();
        let err = SolutionMetadata::from_file(&file).unwrap_err();
        assert!(err.to_string().contains("VCS0[1]"));
    }

    #[test]
    fn test_missing_required_header() {
        let arrays: Vec<_> = metadata_file()
            .into_iter()
            .filter(|a| a.header() != "SSZ")
            .collect();
        let file = HarFile::from_arrays(arrays).unwrap();
        assert!(SolutionMetadata::from_file(&file).is_err());
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(VariableKind::from_repr(0), Some(VariableKind::Exogenous));
        assert_eq!(VariableKind::from_repr(3), Some(VariableKind::Condensed));
        assert_eq!(VariableKind::from_repr(4), None);
        assert!(VariableKind::Backsolved.is_reconstructed());
        assert!(!VariableKind::Exogenous.is_reconstructed());
    }
}
