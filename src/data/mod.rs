//! Data ingestion, canonicalisation and master dataset persistence.

pub mod loaders;
pub mod merge;
pub mod normalize;
pub mod store;
