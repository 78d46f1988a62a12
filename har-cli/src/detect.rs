use crate::error::{CliError, CliResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Container form of a header array file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Fortran unformatted binary (.har / .sl4).
    Binary,
    /// JSON-in-ZIP archive (.harx).
    Archive,
}

/// Detect an input file's format.
///
/// Priority: file extension > content sniffing (ZIP magic).
pub fn detect_input_format(path: &Path) -> CliResult<FileFormat> {
    if let Some(format) = format_from_extension(path) {
        return Ok(format);
    }
    sniff_format(path)
}

/// Detect an output file's format from its extension alone.
pub fn detect_output_format(path: &Path) -> CliResult<FileFormat> {
    format_from_extension(path).ok_or_else(|| {
        CliError::Usage(format!(
            "cannot tell the output format of '{}'\n  {} use a .har, .sl4, or .harx extension",
            path.display(),
            colored::Colorize::bold(colored::Colorize::cyan("help:"))
        ))
    })
}

fn format_from_extension(path: &Path) -> Option<FileFormat> {
    match path.extension()?.to_str()?.to_lowercase().as_str() {
        "har" | "sl4" => Some(FileFormat::Binary),
        "harx" => Some(FileFormat::Archive),
        _ => None,
    }
}

fn sniff_format(path: &Path) -> CliResult<FileFormat> {
    let mut magic = [0u8; 2];
    let mut file = File::open(path)?;
    let read = file.read(&mut magic)?;
    if read == 2 && magic == *b"PK" {
        Ok(FileFormat::Archive)
    } else {
        Ok(FileFormat::Binary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_extension_detection() {
        assert_eq!(format_from_extension(Path::new("a.har")), Some(FileFormat::Binary));
        assert_eq!(format_from_extension(Path::new("a.SL4")), Some(FileFormat::Binary));
        assert_eq!(format_from_extension(Path::new("a.harx")), Some(FileFormat::Archive));
        assert_eq!(format_from_extension(Path::new("a.txt")), None);
        assert_eq!(format_from_extension(&PathBuf::from("noext")), None);
    }

    #[test]
    fn test_output_format_requires_extension() {
        assert!(detect_output_format(Path::new("out.harx")).is_ok());
        assert!(detect_output_format(Path::new("out.bin")).is_err());
    }
}
