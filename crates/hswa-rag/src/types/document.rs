//! Source document and page types

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A single page of extracted text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    pub number: u32,
    /// Raw extracted text
    pub text: String,
}

/// An ingested source document: an ordered sequence of pages.
///
/// Created once at ingestion and immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Source label shown in citations
    pub source: String,
    /// Ordered pages, 1-based numbering
    pub pages: Vec<Page>,
}

impl Document {
    /// Build a document from pre-segmented page texts.
    pub fn from_pages(source: impl Into<String>, page_texts: Vec<String>) -> Self {
        let pages = page_texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Page {
                number: i as u32 + 1,
                text,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            source: source.into(),
            pages,
        }
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// SHA-256 of the concatenated page text, hex-encoded.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for page in &self.pages {
            hasher.update(page.text.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_one_based() {
        let doc = Document::from_pages("test", vec!["a".into(), "b".into()]);
        assert_eq!(doc.pages[0].number, 1);
        assert_eq!(doc.pages[1].number, 2);
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn content_hash_is_stable() {
        let a = Document::from_pages("test", vec!["alpha".into(), "beta".into()]);
        let b = Document::from_pages("test", vec!["alpha".into(), "beta".into()]);
        assert_eq!(a.content_hash(), b.content_hash());

        let c = Document::from_pages("test", vec!["alpha".into(), "gamma".into()]);
        assert_ne!(a.content_hash(), c.content_hash());
    }
}
