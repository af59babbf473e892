//! Top-1 and top-k accuracy over a labelled matrix.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{error::Result, model::Classifier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub rows: usize,
    pub accuracy: f64,
    pub top_k: usize,
    pub top_k_accuracy: f64,
}

/// Score every row; labels the classifier has never seen count as misses.
pub fn evaluate<C: Classifier + ?Sized>(
    classifier: &C,
    matrix: &Array2<u8>,
    labels: &[String],
    top_k: usize,
) -> Result<Evaluation> {
    let mut top1 = 0usize;
    let mut topk = 0usize;
    for (row, label) in matrix.rows().into_iter().zip(labels) {
        let ranked = classifier.rank(row, top_k.max(1))?;
        if ranked.first().is_some_and(|r| &r.condition == label) {
            top1 += 1;
        }
        if ranked.iter().any(|r| &r.condition == label) {
            topk += 1;
        }
    }
    let rows = matrix.nrows().min(labels.len());
    let ratio = |hits: usize| if rows == 0 { 0.0 } else { hits as f64 / rows as f64 };
    Ok(Evaluation {
        rows,
        accuracy: ratio(top1),
        top_k,
        top_k_accuracy: ratio(topk),
    })
}
