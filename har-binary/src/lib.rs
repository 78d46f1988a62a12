//! Binary codec for GEMPACK header array files.
//!
//! This crate owns the on-disk binary format of `.har` data files and
//! `.sl4` solution files: Fortran unformatted record framing, the header
//! record pair, and the payload encodings (`1C` strings, dense and sparse
//! `RE` reals, `RL`/`2R` real lists, `2I` integer lists).
//!
//! Reading is a pull-based lazy sequence — [`HarReader`] yields one
//! [`har_core::HeaderArray`] per pull and owns its byte stream for the
//! session. [`HarWriter`] is the bit-exact inverse.

pub mod header;
pub mod layout;
pub mod read;
pub mod record;
pub mod write;

pub use header::{read_array_header, write_array_header, ArrayHeader};
pub use read::HarReader;
pub use record::{read_record, strip_padding, write_record, MAX_PAYLOAD_BYTES, PADDING};
pub use write::{HarWriter, DENSE_THRESHOLD};
