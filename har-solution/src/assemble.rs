//! Solution assembly: endogenous arrays from the cumulative-results block.
//!
//! Reconstructs one `RE` array per back-solved or condensed variable by
//! slicing `CUMS` at the `PCUM`/`CMND` offsets and applying the command
//! file's exogenous / shock overrides. Variables are independent and only
//! read shared immutable metadata, so reconstruction runs in parallel;
//! the output order is fixed by an explicit sort on the variable index.

use crate::command::CommandFile;
use crate::metadata::{check_parallel, ints_of, reals_of, SolutionMetadata, SolutionVariable};
use har_core::{
    ArrayKind, HarError, HarFile, HeaderArray, HeaderArrayPayload, KeySequence, Result,
    SequenceDictionary,
};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Reconstruct the back-solved and condensed variables of a solution
/// file, ascending by variable index.
pub fn assemble(file: &HarFile) -> Result<Vec<HeaderArray>> {
    let metadata = SolutionMetadata::from_file(file)?;
    let commands = CommandFile::from_file(file)?;
    let starts = ints_of(file, "PCUM")?;
    let lengths = ints_of(file, "CMND")?;
    let cumulative = reals_of(file, "CUMS")?;
    check_parallel("PCUM", metadata.variables.len(), starts.len())?;
    check_parallel("CMND", metadata.variables.len(), lengths.len())?;

    let mut targets: Vec<&SolutionVariable> = metadata
        .variables
        .iter()
        .filter(|v| v.kind.is_reconstructed())
        .collect();
    targets.sort_unstable_by_key(|v| v.index);
    debug!(variables = targets.len(), "assembling solution variables");

    targets
        .par_iter()
        .map(|&variable| build_variable(variable, &starts, &lengths, &cumulative, &commands))
        .collect()
}

/// Reconstruct the back-solved and condensed variables into a file.
pub fn assemble_file(file: &HarFile) -> Result<HarFile> {
    HarFile::from_arrays(assemble(file)?)
}

fn build_variable(
    variable: &SolutionVariable,
    starts: &[i32],
    lengths: &[i32],
    cumulative: &[f32],
    commands: &CommandFile,
) -> Result<HeaderArray> {
    let total = variable.total_size();
    let mut values = vec![0.0f32; total];

    // PCUM[i]-1 rebases the 1-based start; PCUM[i] == 0 marks a
    // shocked-only variable whose values stay all-zero.
    let start = starts[variable.index] - 1;
    if start >= 0 {
        let start = start as usize;
        let length = usize::try_from(lengths[variable.index]).map_err(|_| {
            HarError::validation(
                format!("CMND[{}]", variable.name),
                "a non-negative length".to_string(),
                lengths[variable.index].to_string(),
            )
        })?;
        if length > total {
            return Err(HarError::validation(
                format!("CMND[{}]", variable.name),
                format!("at most the {total} logical values"),
                length.to_string(),
            ));
        }
        if start + length > cumulative.len() {
            return Err(HarError::validation(
                format!("PCUM[{}]", variable.name),
                format!("{length} values at offset {start}"),
                format!("{} cumulative values total", cumulative.len()),
            ));
        }
        values[..length].copy_from_slice(&cumulative[start..start + length]);
    }

    // The exogenized positions are not part of the cumulative solution;
    // shocks then impose their first value at the matching position.
    let probe: SequenceDictionary<f32> = SequenceDictionary::new(variable.sets.clone());
    for exogenous in commands.exogenous_for(&variable.name) {
        match probe.position_of(&KeySequence::new(&exogenous.indexes)) {
            Ok(position) => values[position] = 0.0,
            Err(_) => warn!(
                variable = %variable.name,
                indexes = ?exogenous.indexes,
                "exogenous record outside the variable's set product"
            ),
        }
    }
    for shock in commands.shocks_for(&variable.name) {
        let Some(&value) = shock.values.first() else {
            continue;
        };
        match probe.position_of(&KeySequence::new(&shock.indexes)) {
            Ok(position) => values[position] = value,
            Err(_) => warn!(
                variable = %variable.name,
                indexes = ?shock.indexes,
                "shock record outside the variable's set product"
            ),
        }
    }

    let dimensions: Vec<i32> = if variable.sets.is_empty() {
        vec![1]
    } else {
        variable.sets.iter().map(|s| s.len() as i32).collect()
    };
    let dict = SequenceDictionary::from_logical_values(variable.sets.clone(), values)?;
    HeaderArray::new(
        &variable.name,
        &variable.description,
        ArrayKind::Real,
        dimensions.as_slice(),
        1,
        HeaderArrayPayload::Reals(dict),
    )
}

// ============================================================================
// Tests
// ============================================================================
