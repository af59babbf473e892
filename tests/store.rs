use std::collections::BTreeSet;

use symptom_pipeline::data::{
    merge::CanonicalRecord,
    store::{master_from_csv, master_to_csv, write_atomic},
};

#[test]
fn master_csv_keeps_symptom_sets() {
    let records = vec![CanonicalRecord {
        disease: "common cold".into(),
        symptoms: BTreeSet::from(["runny nose".to_string(), "sneezing, mild".to_string()]),
        source: "a.csv".into(),
    }];
    let bytes = master_to_csv(&records).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.starts_with("disease,symptoms,source\n"));
    assert!(text.contains("runny nose|sneezing, mild"));
    assert_eq!(master_from_csv(bytes.as_slice()).unwrap(), records);
}

#[test]
fn atomic_write_replaces_whole_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/out.txt");
    write_atomic(&path, b"first version").unwrap();
    write_atomic(&path, b"second").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
}
