//! Canonicalise heterogeneous disease/symptom datasets into stable feature vectors.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod pipeline;

pub use error::{PipelineError, Result};
