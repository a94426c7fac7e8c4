//! Document loading and chunking

pub mod chunker;
pub mod loader;

pub use chunker::{ChunkIter, Chunker};
pub use loader::PdfLoader;
