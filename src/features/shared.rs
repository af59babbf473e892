//! Published feature index shared by concurrent readers.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::features::index::FeatureIndex;

/// Holder for the currently published index.
///
/// Readers take a cheap `Arc` snapshot and keep using it for the rest of their
/// request; publishing swaps the whole index and never edits it in place.
#[derive(Debug, Clone, Default)]
pub struct SharedIndex {
    current: Arc<RwLock<Arc<FeatureIndex>>>,
}

impl SharedIndex {
    pub fn new(index: FeatureIndex) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(index))),
        }
    }

    /// Snapshot of the index as published right now.
    pub fn current(&self) -> Arc<FeatureIndex> {
        self.current.read().clone()
    }

    /// Replace the published index, returning the previous one.
    pub fn publish(&self, index: FeatureIndex) -> Arc<FeatureIndex> {
        let next = Arc::new(index);
        info!(
            features = next.len(),
            fingerprint = %next.fingerprint(),
            "publishing feature index"
        );
        std::mem::replace(&mut *self.current.write(), next)
    }
}
