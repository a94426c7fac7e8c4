//! In-memory vector index for single-document retrieval.
//!
//! Stores chunk vectors together with their provenance metadata, answers exact
//! nearest-neighbor queries under a metric fixed at build time, and round-trips
//! the whole index through a single serialized artifact. The index is built once
//! per document and is read-only afterward, so a loaded index can be shared
//! freely across query tasks.

pub mod error;
pub mod index;
pub mod metric;
pub mod storage;

pub use error::{IndexError, Result};
pub use index::{ChunkRecord, IndexMetadata, SearchHit, VectorIndex};
pub use metric::DistanceMetric;
