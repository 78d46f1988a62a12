use crate::detect::{detect_output_format, FileFormat};
use crate::error::CliResult;
use crate::input;
use har_binary::HarWriter;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Convert between the binary and archive forms; with `solution`, emit
/// the assembled back-solved/condensed variables instead of the raw
/// arrays.
pub fn run(input_path: &Path, output_path: &Path, solution: bool, quiet: bool) -> CliResult<()> {
    let file = input::load(input_path)?;
    let file = if solution {
        har_solution::assemble_file(&file)?
    } else {
        file
    };

    match detect_output_format(output_path)? {
        FileFormat::Binary => {
            let out = File::create(output_path)?;
            let mut writer = HarWriter::new(BufWriter::new(out));
            writer.write_file(&file)?;
        }
        FileFormat::Archive => {
            har_archive::write_harx_path(output_path, &file)?;
        }
    }

    if !quiet {
        println!("{} arrays -> {}", file.len(), output_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use har_core::{
        ArrayKind, HarFile, HeaderArray, HeaderArrayPayload, SequenceDictionary, SetDefinition,
    };
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("har-cli-{}-{name}", std::process::id()))
    }

    fn sample_file() -> HarFile {
        let sets = vec![SetDefinition::new("REG", ["r1", "r2"])];
        let dict = SequenceDictionary::from_logical_values(sets, [1.5f32, 0.0]).unwrap();
        let array = HeaderArray::new(
            "VAL1",
            "sample",
            ArrayKind::Real,
            [2],
            1,
            HeaderArrayPayload::Reals(dict),
        )
        .unwrap();
        HarFile::from_arrays([array]).unwrap()
    }

    #[test]
    fn test_binary_to_archive_and_back() {
        let har = temp_path("a.har");
        let harx = temp_path("a.harx");
        let har2 = temp_path("b.har");

        let mut writer = HarWriter::new(BufWriter::new(File::create(&har).unwrap()));
        writer.write_file(&sample_file()).unwrap();
        drop(writer);

        run(&har, &harx, false, true).unwrap();
        run(&harx, &har2, false, true).unwrap();

        let back = input::load(&har2).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.get("VAL1").unwrap().real(&["r1"]), Some(1.5));

        for p in [har, harx, har2] {
            let _ = std::fs::remove_file(p);
        }
    }
}
