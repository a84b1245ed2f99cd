//! A named collection of vectors: durable storage, a search index, and the
//! batch/search/metadata-filter contract built on top of them.

mod core;
mod types;

pub use core::{Collection, CollectionOptions};
pub use types::{
    CollectionDescriptor, CollectionStats, InsertBatchOutcome, SearchRequest, SearchResponse,
    DESCRIPTOR_SCHEMA_VERSION,
};
