//! Core data types shared across the pipeline

pub mod document;
pub mod response;

pub use document::{Document, Page};
pub use response::{Answer, Citation, QueryResponse};
