//! # HAR Core
//!
//! Logical model for GEMPACK header arrays.
//!
//! This crate provides:
//! - Core types: [`KeySequence`], [`SetDefinition`], [`SequenceDictionary`]
//! - The [`HeaderArray`] object with its tagged payload variant
//! - Set-consistency validation across the arrays of one file
//!
//! ## Design Principles
//!
//! 1. **Immutable arrays**: readers and the solution assembler construct
//!    `HeaderArray`s; nothing mutates them afterwards, so they share freely
//!    across threads.
//! 2. **Sparse storage, dense semantics**: dictionaries store only
//!    non-default entries but enumerate the full Cartesian product of
//!    their sets, last set varying slowest.
//! 3. **No wire knowledge**: byte layouts live in `har-binary` and
//!    `har-archive`; this crate never sees a record.

pub mod array;
pub mod dict;
pub mod error;
pub mod file;
pub mod key;
pub mod set;
pub mod validate;

// Re-export main types
pub use array::{
    positional_sets, ArrayKind, HeaderArray, HeaderArrayPayload, DESCRIPTION_WIDTH,
    DIMENSION_SLOTS, HEADER_WIDTH,
};
pub use dict::{ExpandedKeys, SequenceDictionary};
pub use error::{HarError, Result};
pub use file::HarFile;
pub use key::{cmp_forward, cmp_reverse, KeySequence};
pub use set::SetDefinition;
pub use validate::{validate_sets, SetMismatch, SetValidator};
