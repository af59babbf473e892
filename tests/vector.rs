use std::collections::BTreeSet;

use proptest::prelude::*;
use symptom_pipeline::{
    data::{merge::CanonicalRecord, normalize::SynonymTable},
    features::{build_request_vector, build_vector, dataset_to_matrix, FeatureIndex},
};

#[test]
fn known_symptoms_set_their_columns() {
    let index = FeatureIndex::from_json(r#"{"fever": 0, "cough": 1}"#).unwrap();
    let vector = build_vector(["cough", "fever", "headache"], &index);
    assert_eq!(vector.to_vec(), vec![1, 1]);
}

#[test]
fn unknown_symptoms_give_all_zero_vector() {
    let index = FeatureIndex::from_vocabulary(["cough", "fever", "rash"]);
    let vector = build_vector(["not_in_index"], &index);
    assert_eq!(vector.to_vec(), vec![0, 0, 0]);
    let empty: [&str; 0] = [];
    assert_eq!(build_vector(empty, &index).len(), 3);
}

#[test]
fn request_symptoms_go_through_synonyms() {
    let index = FeatureIndex::from_vocabulary(["cough", "fever"]);
    let synonyms = SynonymTable::new([("fever", vec!["pyrexia"])]);
    let vector = build_request_vector(["Pyrexia", " COUGH "], &index, &synonyms);
    assert_eq!(vector.to_vec(), vec![1, 1]);
    assert_eq!(build_vector(["Pyrexia"], &index).to_vec(), vec![0, 0]);
}

#[test]
fn verbatim_lookup_skips_normalisation() {
    let index = FeatureIndex::from_vocabulary(["fever"]);
    assert_eq!(build_vector(["  FEVER!! "], &index).to_vec(), vec![0]);
    let normalised = build_request_vector(["  FEVER!! "], &index, &SynonymTable::default());
    assert_eq!(normalised.to_vec(), vec![1]);
}

#[test]
fn matrix_has_one_row_per_record() {
    let index = FeatureIndex::from_vocabulary(["a", "b", "c"]);
    let records = vec![
        CanonicalRecord {
            disease: "x".into(),
            symptoms: BTreeSet::from(["a".to_string(), "c".to_string()]),
            source: "s".into(),
        },
        CanonicalRecord {
            disease: "y".into(),
            symptoms: BTreeSet::new(),
            source: "s".into(),
        },
    ];
    let (matrix, labels) = dataset_to_matrix(&records, &index);
    assert_eq!(matrix.dim(), (2, 3));
    assert_eq!(matrix.row(0).to_vec(), vec![1, 0, 1]);
    assert_eq!(matrix.row(1).to_vec(), vec![0, 0, 0]);
    assert_eq!(labels, vec!["x", "y"]);
}

#[test]
fn empty_record_set_keeps_width() {
    let index = FeatureIndex::from_vocabulary(["a", "b"]);
    let (matrix, labels) = dataset_to_matrix(&[], &index);
    assert_eq!(matrix.dim(), (0, 2));
    assert!(labels.is_empty());
}

proptest! {
    #[test]
    fn vector_width_matches_vocabulary(
        vocabulary in prop::collection::btree_set("[a-z]{1,6}", 0..40),
        request in prop::collection::vec("[a-z]{1,6}", 0..20),
    ) {
        let index = FeatureIndex::from_vocabulary(&vocabulary);
        let vector = build_vector(&request, &index);
        prop_assert_eq!(vector.len(), vocabulary.len());
        for (column, value) in vector.iter().enumerate() {
            let symptom = index.symptom(column).unwrap();
            prop_assert_eq!(*value == 1, request.iter().any(|r| r == symptom));
        }
    }

    #[test]
    fn saved_index_loads_back_equal(
        vocabulary in prop::collection::btree_set("[a-z ()/-]{1,10}", 1..40),
    ) {
        let index = FeatureIndex::from_vocabulary(&vocabulary);
        let loaded = FeatureIndex::from_json(&index.to_json().unwrap()).unwrap();
        prop_assert_eq!(&loaded, &index);
        for symptom in &vocabulary {
            prop_assert_eq!(loaded.get(symptom), index.get(symptom));
        }
    }
}
