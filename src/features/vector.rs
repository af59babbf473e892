//! Binary feature vectors and training matrices.

use ndarray::{Array1, Array2};

use crate::{
    data::{
        merge::CanonicalRecord,
        normalize::{canonicalize, SynonymTable},
    },
    features::index::FeatureIndex,
};

/// Fixed-width 0/1 vector laid out by a [`FeatureIndex`].
pub type FeatureVector = Array1<u8>;

/// Set the column of every known symptom; unknown symptoms are ignored.
pub fn build_vector<I, S>(symptoms: I, index: &FeatureIndex) -> FeatureVector
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut vector = Array1::zeros(index.len());
    for symptom in symptoms {
        if let Some(column) = index.get(symptom.as_ref()) {
            vector[column] = 1;
        }
    }
    vector
}

/// Vectorise free-form request symptoms, canonicalising them first.
pub fn build_request_vector<I, S>(
    symptoms: I,
    index: &FeatureIndex,
    synonyms: &SynonymTable,
) -> FeatureVector
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    build_vector(
        symptoms
            .into_iter()
            .map(|s| canonicalize(s.as_ref(), synonyms)),
        index,
    )
}

/// Row-wise vectorisation of a record set plus the parallel disease labels.
pub fn dataset_to_matrix(
    records: &[CanonicalRecord],
    index: &FeatureIndex,
) -> (Array2<u8>, Vec<String>) {
    let mut matrix = Array2::zeros((records.len(), index.len()));
    let mut labels = Vec::with_capacity(records.len());
    for (mut row, record) in matrix.rows_mut().into_iter().zip(records) {
        row.assign(&build_vector(&record.symptoms, index));
        labels.push(record.disease.clone());
    }
    (matrix, labels)
}
