//! Reconstruction of GEMPACK solution (`.sl4`) variables.
//!
//! A solution file is a HAR file of metadata headers plus a compressed
//! cumulative-results block. This crate cross-indexes the metadata into
//! sets and variables ([`SolutionMetadata`]), extracts shock / exogenous
//! records from the embedded command file ([`CommandFile`]), and
//! reconstructs one `RE` array per back-solved or condensed variable
//! ([`assemble`]).

pub mod assemble;
pub mod command;
pub mod metadata;

#[cfg(test)]
mod test_support;

pub use assemble::{assemble, assemble_file};
pub use command::{CommandFile, ExogenousDefinition, ShockDefinition};
pub use metadata::{ChangeType, SolutionMetadata, SolutionSet, SolutionVariable, VariableKind};
