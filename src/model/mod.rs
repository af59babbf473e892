//! Classifier boundary: the vector contract, label mapping and ranking.

pub mod evaluate;
pub mod softmax;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::{
    error::{PipelineError, Result},
    features::index::FeatureIndex,
};

pub use evaluate::{evaluate, Evaluation};
pub use softmax::{LabelEncoder, SoftmaxModel, TrainOptions};

/// One condition and its probability, as returned to serving callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCondition {
    pub condition: String,
    pub probability: f64,
}

/// Anything that consumes feature vectors and scores a fixed label set.
pub trait Classifier {
    /// Width of the vectors this classifier was trained on.
    fn feature_count(&self) -> usize;

    /// Fingerprint of the feature index used at training time.
    fn index_fingerprint(&self) -> &str;

    /// Labels in class-id order.
    fn classes(&self) -> &[String];

    /// Probability per class, in class-id order.
    fn predict_proba(&self, vector: ArrayView1<'_, u8>) -> Result<Array1<f64>>;

    /// Highest-probability conditions first, at most `top_k` of them.
    fn rank(&self, vector: ArrayView1<'_, u8>, top_k: usize) -> Result<Vec<RankedCondition>> {
        let proba = self.predict_proba(vector)?;
        let mut order: Vec<usize> = (0..proba.len()).collect();
        order.sort_by(|a, b| proba[*b].total_cmp(&proba[*a]).then(a.cmp(b)));
        Ok(order
            .into_iter()
            .take(top_k)
            .map(|class| RankedCondition {
                condition: self.classes()[class].clone(),
                probability: proba[class],
            })
            .collect())
    }
}

/// Refuse to pair a classifier with an index it was not trained against.
pub fn ensure_paired<C: Classifier + ?Sized>(classifier: &C, index: &FeatureIndex) -> Result<()> {
    if classifier.feature_count() != index.len() {
        return Err(PipelineError::DimensionMismatch {
            expected: classifier.feature_count(),
            actual: index.len(),
        });
    }
    let actual = index.fingerprint();
    if classifier.index_fingerprint() != actual {
        return Err(PipelineError::StaleIndex {
            expected: classifier.index_fingerprint().to_string(),
            actual,
        });
    }
    Ok(())
}

pub(crate) fn check_width(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(PipelineError::DimensionMismatch { expected, actual })
    }
}
