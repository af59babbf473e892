use std::collections::BTreeSet;

use symptom_pipeline::{
    data::{
        merge::{CanonicalRecord, MasterDataset, MergeStats},
        store::{self, ArtifactPaths},
    },
    features::FeatureIndex,
    PipelineError,
};

#[test]
fn columns_follow_sorted_vocabulary() {
    let index = FeatureIndex::from_vocabulary(["fever", "cough", "ache", "cough"]);
    assert_eq!(index.len(), 3);
    assert_eq!(index.get("ache"), Some(0));
    assert_eq!(index.get("cough"), Some(1));
    assert_eq!(index.get("fever"), Some(2));
    assert_eq!(index.symptom(2), Some("fever"));
}

#[test]
fn bare_mapping_keeps_its_columns() {
    let index = FeatureIndex::from_json(r#"{"fever": 0, "cough": 1}"#).unwrap();
    assert_eq!(index.symptoms().collect::<Vec<_>>(), vec!["fever", "cough"]);
}

#[test]
fn gaps_and_collisions_are_rejected() {
    assert!(FeatureIndex::from_json(r#"{"fever": 0, "cough": 2}"#).is_err());
    assert!(FeatureIndex::from_json(r#"{"fever": 0, "cough": 0}"#).is_err());
}

#[test]
fn tampered_fingerprint_is_rejected() {
    let index = FeatureIndex::from_vocabulary(["fever"]);
    let text = index.to_json().unwrap().replace(&index.fingerprint(), "deadbeef");
    assert!(matches!(
        FeatureIndex::from_json(&text),
        Err(PipelineError::InvalidIndex(_))
    ));
}

#[test]
fn fingerprint_depends_on_order() {
    let sorted = FeatureIndex::from_vocabulary(["a", "b"]);
    let swapped = FeatureIndex::from_json(r#"{"b": 0, "a": 1}"#).unwrap();
    assert_ne!(sorted.fingerprint(), swapped.fingerprint());
}

#[test]
fn saved_file_loads_back_with_same_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index/features.json");
    let index = FeatureIndex::from_vocabulary(["runny nose", "fever", "cough"]);

    index.save(&path).unwrap();
    let loaded = FeatureIndex::load(&path).unwrap();
    assert_eq!(loaded, index);
    assert_eq!(loaded.fingerprint(), index.fingerprint());

    let shrunk = FeatureIndex::from_vocabulary(["fever"]);
    shrunk.save(&path).unwrap();
    assert_eq!(FeatureIndex::load(&path).unwrap().len(), 1);
}

#[test]
fn published_index_matches_saved_form() {
    let dir = tempfile::tempdir().unwrap();
    let index = FeatureIndex::from_vocabulary(["cough", "fever"]);
    let master = MasterDataset {
        records: vec![CanonicalRecord {
            disease: "flu".into(),
            symptoms: BTreeSet::from(["cough".to_string(), "fever".to_string()]),
            source: "a.csv".into(),
        }],
        index: index.clone(),
    };
    let paths = ArtifactPaths::in_dir(dir.path());
    store::publish(&paths, &master, &MergeStats::default()).unwrap();

    let saved = dir.path().join("saved.json");
    index.save(&saved).unwrap();
    assert_eq!(
        std::fs::read_to_string(&paths.features).unwrap(),
        std::fs::read_to_string(&saved).unwrap()
    );
}

#[test]
fn missing_index_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = FeatureIndex::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, PipelineError::MissingInput { .. }));
}
