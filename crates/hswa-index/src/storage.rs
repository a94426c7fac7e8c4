//! Single-file persistence for the vector index
//!
//! Artifact layout: 8 magic bytes, a little-endian u16 format version, then
//! the bincode-encoded index. The magic and version are checked before any
//! decoding so a malformed or stale artifact fails loudly instead of producing
//! silently-wrong rankings.

use std::fs;
use std::path::Path;

use crate::error::{IndexError, Result};
use crate::index::VectorIndex;

const MAGIC: &[u8; 8] = b"HSWAIDX\0";
const FORMAT_VERSION: u16 = 1;

impl VectorIndex {
    /// Serialize the full index (vectors, chunk records, metadata) to `path`.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let body = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| IndexError::Encode(e.to_string()))?;

        let mut artifact = Vec::with_capacity(MAGIC.len() + 2 + body.len());
        artifact.extend_from_slice(MAGIC);
        artifact.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        artifact.extend_from_slice(&body);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &artifact)?;

        tracing::info!(
            path = %path.display(),
            entries = self.len(),
            bytes = artifact.len(),
            "persisted vector index"
        );

        Ok(())
    }

    /// Load an index previously written by [`VectorIndex::persist`].
    pub fn load(path: &Path) -> Result<Self> {
        let artifact = fs::read(path).map_err(|e| {
            IndexError::format(
                path.display().to_string(),
                format!("cannot read artifact: {e}"),
            )
        })?;

        if artifact.len() < MAGIC.len() + 2 {
            return Err(IndexError::format(
                path.display().to_string(),
                "artifact too short to contain a header",
            ));
        }

        if &artifact[..MAGIC.len()] != MAGIC {
            return Err(IndexError::format(
                path.display().to_string(),
                "not an index artifact (bad magic bytes)",
            ));
        }

        let version = u16::from_le_bytes([artifact[MAGIC.len()], artifact[MAGIC.len() + 1]]);
        if version != FORMAT_VERSION {
            return Err(IndexError::format(
                path.display().to_string(),
                format!("unsupported format version {version}, expected {FORMAT_VERSION}"),
            ));
        }

        let (index, _): (VectorIndex, usize) = bincode::serde::decode_from_slice(
            &artifact[MAGIC.len() + 2..],
            bincode::config::standard(),
        )
        .map_err(|e| IndexError::Decode(e.to_string()))?;

        tracing::info!(
            path = %path.display(),
            entries = index.len(),
            model = %index.metadata().embedding_model,
            "loaded vector index"
        );

        Ok(index)
    }
}
