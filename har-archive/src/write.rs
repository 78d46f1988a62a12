//! HARX writing: one deflated `{header}.json` entry per array.

use crate::json::HarxArray;
use har_core::{HarError, HarFile, Result};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write every array of a file into a `.harx` archive, in file order.
pub fn write_harx<W: Write + Seek>(writer: W, file: &HarFile) -> Result<W> {
    let mut archive = ZipWriter::new(writer);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for array in file.iter() {
        let entry_name = format!("{}.json", array.header().trim());
        let model = HarxArray::from(array);
        let text = serde_json::to_string_pretty(&model).map_err(|e| {
            HarError::invalid_data(format!("JSON encode error for {entry_name}: {e}"))
        })?;
        archive
            .start_file(entry_name.as_str(), options)
            .map_err(zip_error)?;
        archive.write_all(text.as_bytes())?;
        debug!(header = %array.header(), entry = %entry_name, "encoded archive entry");
    }
    archive.finish().map_err(zip_error)
}

/// Write a `.harx` archive to disk.
pub fn write_harx_path(path: impl AsRef<Path>, file: &HarFile) -> Result<()> {
    let out = File::create(path)?;
    let out = write_harx(BufWriter::new(out), file)?;
    out.into_inner().map_err(|e| HarError::Io(e.into_error()))?;
    Ok(())
}

fn zip_error(e: zip::result::ZipError) -> HarError {
    HarError::invalid_data(format!("archive error: {e}"))
}
