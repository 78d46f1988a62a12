//! Builders for the small metadata arrays the tests assemble from.

use har_core::{
    ArrayKind, HeaderArray, HeaderArrayPayload, SequenceDictionary, SetDefinition,
};

pub(crate) fn string_array(header: &str, values: &[&str]) -> HeaderArray {
    let sets = vec![SetDefinition::positional(values.len())];
    let dict = SequenceDictionary::from_logical_values(
        sets,
        values.iter().map(|v| v.to_string()),
    )
    .unwrap();
    HeaderArray::new(
        header,
        "",
        ArrayKind::Character,
        [values.len() as i32],
        1,
        HeaderArrayPayload::Strings(dict),
    )
    .unwrap()
}

pub(crate) fn int_array(header: &str, values: &[i32]) -> HeaderArray {
    let sets = vec![SetDefinition::positional(values.len())];
    let dict = SequenceDictionary::from_logical_values(sets, values.iter().copied()).unwrap();
    HeaderArray::new(
        header,
        "",
        ArrayKind::Integer,
        [values.len() as i32],
        1,
        HeaderArrayPayload::Ints(dict),
    )
    .unwrap()
}

pub(crate) fn real_list(header: &str, values: &[f32]) -> HeaderArray {
    let sets = vec![SetDefinition::positional(values.len())];
    let dict = SequenceDictionary::from_logical_values(sets, values.iter().copied()).unwrap();
    HeaderArray::new(
        header,
        "",
        ArrayKind::RealList,
        [values.len() as i32],
        1,
        HeaderArrayPayload::Reals(dict),
    )
    .unwrap()
}
