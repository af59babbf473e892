//! Parquet export of the training matrix for external trainers.

use std::path::Path;

use anyhow::{ensure, Result};
use ndarray::Array2;
use polars::prelude::{DataFrame, NamedFrom, ParquetWriter, Series};
use tracing::info;

use crate::{data::store, features::index::FeatureIndex};

/// Name of the label column; symptom columns keep their canonical names.
pub const LABEL_COLUMN: &str = "_label";

/// Build a frame with one i32 column per feature followed by the label column.
pub fn matrix_frame(matrix: &Array2<u8>, labels: &[String], index: &FeatureIndex) -> Result<DataFrame> {
    ensure!(
        matrix.ncols() == index.len(),
        "matrix has {} columns but index has {}",
        matrix.ncols(),
        index.len()
    );
    ensure!(
        matrix.nrows() == labels.len(),
        "matrix has {} rows but {} labels were given",
        matrix.nrows(),
        labels.len()
    );

    let mut columns = Vec::with_capacity(index.len() + 1);
    for (column, symptom) in index.symptoms().enumerate() {
        let values: Vec<i32> = matrix.column(column).iter().map(|v| i32::from(*v)).collect();
        columns.push(Series::new(symptom.into(), values));
    }
    columns.push(Series::new(LABEL_COLUMN.into(), labels.to_vec()));
    Ok(DataFrame::new(columns)?)
}

/// Write the matrix and labels as parquet, replacing any previous export.
pub fn write_matrix_parquet(
    matrix: &Array2<u8>,
    labels: &[String],
    index: &FeatureIndex,
    path: &Path,
) -> Result<()> {
    let mut df = matrix_frame(matrix, labels, index)?;
    let mut buffer = Vec::new();
    ParquetWriter::new(&mut buffer).finish(&mut df)?;
    store::write_atomic(path, &buffer)?;
    info!(path = %path.display(), rows = df.height(), features = index.len(), "wrote training matrix parquet");
    Ok(())
}
