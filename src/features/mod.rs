//! Feature vocabulary, vectorisation and matrix export.

pub mod export;
pub mod index;
pub mod shared;
pub mod vector;

pub use index::FeatureIndex;
pub use shared::SharedIndex;
pub use vector::{build_request_vector, build_vector, dataset_to_matrix, FeatureVector};
