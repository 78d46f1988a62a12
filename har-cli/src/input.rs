use crate::detect::{detect_input_format, FileFormat};
use crate::error::CliResult;
use har_binary::HarReader;
use har_core::HarFile;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load every array of a `.har`, `.sl4`, or `.harx` file.
pub fn load(path: &Path) -> CliResult<HarFile> {
    match detect_input_format(path)? {
        FileFormat::Binary => {
            let file = File::open(path)?;
            Ok(HarReader::new(BufReader::new(file)).read_file()?)
        }
        FileFormat::Archive => Ok(har_archive::read_harx_path(path)?),
    }
}
