//! HARX reading: one JSON blob per header inside a ZIP archive.

use crate::json::HarxArray;
use har_core::{HarError, HarFile, HeaderArray, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Read every array of a `.harx` archive, preserving archive order.
///
/// Entries that are not `*.json` are ignored.
pub fn read_harx<R: Read + Seek>(reader: R) -> Result<HarFile> {
    let mut archive = ZipArchive::new(reader).map_err(zip_error)?;
    let mut file = HarFile::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(zip_error)?;
        if !entry.name().ends_with(".json") {
            continue;
        }
        let name = entry.name().to_string();
        let mut text = String::new();
        entry.read_to_string(&mut text)?;
        let model: HarxArray = serde_json::from_str(&text).map_err(|e| {
            HarError::invalid_data(format!("malformed JSON in {name}: {e}"))
        })?;
        let array = HeaderArray::try_from(model)?;
        debug!(header = %array.header(), entry = %name, "decoded archive entry");
        file.push(array)?;
    }
    Ok(file)
}

/// Read a `.harx` archive from disk.
pub fn read_harx_path(path: impl AsRef<Path>) -> Result<HarFile> {
    let file = File::open(path)?;
    read_harx(BufReader::new(file))
}

fn zip_error(e: zip::result::ZipError) -> HarError {
    HarError::invalid_data(format!("archive error: {e}"))
}
