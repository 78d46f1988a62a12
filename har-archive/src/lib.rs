//! Portable JSON-in-ZIP form of header array files.
//!
//! A `.harx` archive is a standard-deflate ZIP holding one
//! `{header}.json` blob per array. The JSON model ([`HarxArray`]) keeps
//! the full logical content - named sets included - so conversions
//! between `.har` and `.harx` are value-preserving in both directions.

pub mod json;
pub mod read;
pub mod write;

pub use json::{HarxArray, HarxSet};
pub use read::{read_harx, read_harx_path};
pub use write::{write_harx, write_harx_path};

#[cfg(test)]
mod tests {
    use super::*;
    use har_core::{
        ArrayKind, HarFile, HeaderArray, HeaderArrayPayload, SequenceDictionary, SetDefinition,
    };
    use std::io::Cursor;

    fn sample_file() -> HarFile {
        let sets = vec![
            SetDefinition::new("COM", ["c1", "c2"]),
            SetDefinition::new("REG", ["r1", "r2"]),
        ];
        let reals =
            SequenceDictionary::from_logical_values(sets, [1.0f32, 2.0, 3.0, 4.0]).unwrap();
        let re = HeaderArray::new(
            "VAL1",
            "basic values",
            ArrayKind::Real,
            [2, 2],
            1,
            HeaderArrayPayload::Reals(reals),
        )
        .unwrap();

        let names = SequenceDictionary::from_logical_values(
            vec![SetDefinition::new("REG", ["AUS", "USA", "CHN"])],
            ["Oz".to_string(), "States".to_string(), "China".to_string()],
        )
        .unwrap();
        let strings = HeaderArray::new(
            "REG1",
            "region names",
            ArrayKind::Character,
            [3],
            1,
            HeaderArrayPayload::Strings(names),
        )
        .unwrap();

        HarFile::from_arrays([re, strings]).unwrap()
    }

    fn round_trip(file: &HarFile) -> HarFile {
        let cursor = write_harx(Cursor::new(Vec::new()), file).unwrap();
        read_harx(Cursor::new(cursor.into_inner())).unwrap()
    }

    #[test]
    fn test_archive_round_trip() {
        let file = sample_file();
        let back = round_trip(&file);
        assert_eq!(back.len(), 2);

        let re = back.get("VAL1").unwrap();
        assert_eq!(re.real(&["c1", "r2"]), Some(3.0));
        assert_eq!(re.dimensions(), &[2, 2, 1, 1, 1, 1, 1]);

        // Named sets survive the archive form, element-keyed lookup included.
        let strings = back.get("REG1").unwrap();
        assert_eq!(strings.string(&["AUS"]), Some("Oz".to_string()));
        assert_eq!(strings.string(&["CHN"]), Some("China".to_string()));
        assert_eq!(strings.dimensions()[0], 3);
    }

    #[test]
    fn test_archive_preserves_file_order() {
        let file = sample_file();
        let back = round_trip(&file);
        let headers: Vec<&str> = back.iter().map(|a| a.header()).collect();
        assert_eq!(headers, vec!["VAL1", "REG1"]);
    }

    #[test]
    fn test_sparse_entries_only_in_json() {
        let sets = vec![SetDefinition::new("CELL", (1..=10).map(|i| format!("e{i}")))];
        let mut dict = SequenceDictionary::new(sets);
        dict.insert_at(3, 1.5f32).unwrap();
        let array = HeaderArray::new(
            "SPRS",
            "",
            ArrayKind::Real,
            [10],
            1,
            HeaderArrayPayload::Reals(dict),
        )
        .unwrap();
        let file = HarFile::from_arrays([array]).unwrap();

        let model = HarxArray::from(file.get("SPRS").unwrap());
        assert_eq!(model.entries.len(), 1);

        let back = round_trip(&file);
        let values: Vec<f32> = back
            .get("SPRS")
            .unwrap()
            .as_reals()
            .unwrap()
            .logical_values()
            .collect();
        assert_eq!(values[3], 1.5);
        assert_eq!(values.iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn test_malformed_archive_rejected() {
        assert!(read_harx(Cursor::new(b"not a zip".to_vec())).is_err());
    }
}
