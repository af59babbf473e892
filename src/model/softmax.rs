//! Multinomial logistic adapter fitted with `linfa-logistic`.

use std::{collections::BTreeSet, path::Path};

use anyhow::{anyhow, ensure, Context, Result};
use linfa::{dataset::DatasetBase, prelude::Fit};
use linfa_logistic::MultiLogisticRegression;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    data::store,
    error,
    features::index::FeatureIndex,
    model::{check_width, Classifier},
};

/// Sorted distinct labels mapped to dense class ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Self {
        let classes: BTreeSet<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .ok()
    }

    pub fn decode(&self, class: usize) -> Option<&str> {
        self.classes.get(class).map(String::as_str)
    }

    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Array1<usize>> {
        labels
            .iter()
            .map(|label| {
                self.encode(label.as_ref())
                    .ok_or_else(|| anyhow!("label '{}' was not seen during fit", label.as_ref()))
            })
            .collect()
    }

    pub fn into_classes(self) -> Vec<String> {
        self.classes
    }
}

/// Training knobs passed through to the solver.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub max_iterations: u64,
    pub alpha: f64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            alpha: 1.0,
        }
    }
}

/// Linear softmax classifier: `softmax(x · weights + intercept)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftmaxModel {
    fingerprint: String,
    classes: Vec<String>,
    /// Shape `(features, classes)`.
    weights: Array2<f64>,
    intercept: Array1<f64>,
}

impl SoftmaxModel {
    /// Fit against a training matrix laid out by `index`.
    pub fn train(
        matrix: &Array2<u8>,
        labels: &[String],
        index: &FeatureIndex,
        options: &TrainOptions,
    ) -> Result<Self> {
        check_width(index.len(), matrix.ncols())?;
        ensure!(
            matrix.nrows() == labels.len(),
            "{} rows but {} labels",
            matrix.nrows(),
            labels.len()
        );
        let encoder = LabelEncoder::fit(labels);
        ensure!(
            encoder.len() >= 2,
            "training needs at least two distinct conditions, found {}",
            encoder.len()
        );

        let targets = encoder.transform(labels)?;
        let dataset = DatasetBase::new(matrix.mapv(f64::from), targets);
        let fitted = MultiLogisticRegression::<f64>::default()
            .max_iterations(options.max_iterations)
            .alpha(options.alpha)
            .fit(&dataset)
            .context("fitting multinomial logistic regression")?;

        info!(
            rows = matrix.nrows(),
            features = matrix.ncols(),
            classes = encoder.len(),
            "trained softmax model"
        );
        Ok(Self {
            fingerprint: index.fingerprint(),
            classes: encoder.into_classes(),
            weights: fitted.params().to_owned(),
            intercept: fitted.intercept().to_owned(),
        })
    }

    /// Assemble a model from fitted parameters; `weights` is `(features, classes)`.
    pub fn from_parts(
        fingerprint: String,
        classes: Vec<String>,
        weights: Array2<f64>,
        intercept: Array1<f64>,
    ) -> Result<Self> {
        let model = Self {
            fingerprint,
            classes,
            weights,
            intercept,
        };
        model.check_dimensions()?;
        Ok(model)
    }

    fn check_dimensions(&self) -> Result<()> {
        ensure!(
            self.weights.ncols() == self.classes.len() && self.intercept.len() == self.classes.len(),
            "{} classes but weights have {} columns and intercept has {} entries",
            self.classes.len(),
            self.weights.ncols(),
            self.intercept.len()
        );
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string(self)?;
        store::write_atomic(path, text.as_bytes())
            .with_context(|| format!("writing model {}", path.display()))?;
        info!(path = %path.display(), classes = self.classes.len(), "wrote model");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading model {}", path.display()))?;
        let model: Self = serde_json::from_str(&text)?;
        model
            .check_dimensions()
            .with_context(|| format!("model file {} is inconsistent", path.display()))?;
        Ok(model)
    }
}

impl Classifier for SoftmaxModel {
    fn feature_count(&self) -> usize {
        self.weights.nrows()
    }

    fn index_fingerprint(&self) -> &str {
        &self.fingerprint
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, vector: ArrayView1<'_, u8>) -> error::Result<Array1<f64>> {
        check_width(self.feature_count(), vector.len())?;
        let x = vector.mapv(f64::from);
        let logits = x.dot(&self.weights) + &self.intercept;
        let max = logits.fold(f64::NEG_INFINITY, |acc, v| acc.max(*v));
        let exp = logits.mapv(|v| (v - max).exp());
        let total = exp.sum();
        Ok(exp / total)
    }
}
