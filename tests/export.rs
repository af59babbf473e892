use ndarray::array;
use polars::prelude::{ParquetReader, SerReader};
use symptom_pipeline::features::{
    export::{matrix_frame, write_matrix_parquet, LABEL_COLUMN},
    FeatureIndex,
};

#[test]
fn frame_has_feature_columns_then_label() {
    let index = FeatureIndex::from_vocabulary(["cough", "fever"]);
    let matrix = array![[1u8, 0], [1, 1]];
    let labels = vec!["cold".to_string(), "flu".to_string()];
    let df = matrix_frame(&matrix, &labels, &index).unwrap();
    let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    assert_eq!(names, vec!["cough", "fever", LABEL_COLUMN]);
    assert_eq!(df.height(), 2);
}

#[test]
fn width_mismatch_is_refused() {
    let index = FeatureIndex::from_vocabulary(["cough"]);
    let matrix = array![[1u8, 0]];
    assert!(matrix_frame(&matrix, &["flu".to_string()], &index).is_err());
}

#[test]
fn parquet_export_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model/training.parquet");
    let index = FeatureIndex::from_vocabulary(["cough", "fever"]);
    let matrix = array![[1u8, 0], [1, 1], [0, 1]];
    let labels: Vec<String> = ["cold", "flu", "flu"].iter().map(|s| s.to_string()).collect();
    write_matrix_parquet(&matrix, &labels, &index, &path).unwrap();

    let file = std::fs::File::open(&path).unwrap();
    let df = ParquetReader::new(file).finish().unwrap();
    assert_eq!(df.shape(), (3, 3));
}
