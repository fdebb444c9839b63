//! Shard persistence for the sparse retriever.
//!
//! Each shard is one independently persisted BM25 index covering a logical
//! document group. Shards are stored under a deterministic
//! `{corpora_tag}_{id}` name inside the corpus directory; that name is the
//! storage contract, so it must stay stable across saves and loads.
//!
//! Load failures are soft: a missing or unreadable shard is reported as
//! [`ShardLoadOutcome::Missing`] rather than raised, so a corpus with some
//! damaged shards remains queryable.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SagittaError};
use crate::sparse::bm25::Bm25Index;

/// Metadata persisted alongside a shard's index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardMetadata {
    /// Number of documents in the shard.
    pub doc_count: u64,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// The on-disk representation of one shard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedShard {
    /// Shard metadata.
    pub metadata: ShardMetadata,

    /// The BM25 index.
    pub index: Bm25Index,

    /// Raw document texts, stored so loads can rehydrate them on request.
    pub documents: Option<Vec<String>>,
}

/// Outcome of loading one shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShardLoadOutcome {
    /// The shard was loaded and is available for retrieval.
    Loaded,

    /// The shard could not be loaded and is excluded from retrieval.
    Missing(String),
}

impl ShardLoadOutcome {
    /// Whether this outcome is `Loaded`.
    pub fn is_loaded(&self) -> bool {
        matches!(self, ShardLoadOutcome::Loaded)
    }
}

/// Per-shard report returned by a corpus load.
#[derive(Debug, Clone)]
pub struct ShardLoadReport {
    /// The requested shard id.
    pub id: u64,

    /// What happened to this shard.
    pub outcome: ShardLoadOutcome,

    /// Metadata of the loaded shard, when available.
    pub metadata: Option<ShardMetadata>,
}

/// Persists and loads shards under a corpus directory.
#[derive(Debug, Clone)]
pub struct ShardStore {
    root: PathBuf,
    tag: String,
}

impl ShardStore {
    /// Create a shard store rooted at `root` for the given corpora tag.
    ///
    /// The tag becomes part of every shard's file name and must be
    /// non-empty and free of path separators.
    pub fn new<P: Into<PathBuf>, S: Into<String>>(root: P, tag: S) -> Result<Self> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(SagittaError::invalid_argument(
                "corpora_tag must not be empty",
            ));
        }
        if tag.contains('/') || tag.contains('\\') || tag.contains("..") {
            return Err(SagittaError::invalid_argument(
                "corpora_tag must not contain path separators",
            ));
        }

        Ok(ShardStore {
            root: root.into(),
            tag,
        })
    }

    /// The corpora tag this store was created with.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The stable file name of a shard: `{corpora_tag}_{id}`.
    pub fn shard_name(&self, id: u64) -> String {
        format!("{}_{}", self.tag, id)
    }

    /// The on-disk path of a shard.
    pub fn shard_path(&self, id: u64) -> PathBuf {
        self.root.join(self.shard_name(id))
    }

    /// Persist a shard atomically (temp file + rename).
    pub fn save(&self, id: u64, shard: &PersistedShard) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        let bytes = bincode::serialize(shard)
            .map_err(|e| SagittaError::serialization(format!("shard {id}: {e}")))?;

        let path = self.shard_path(id);
        let tmp_path = self.root.join(format!(".{}.tmp", self.shard_name(id)));
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, &path)?;

        log::debug!(
            "saved shard {} ({} bytes) to {}",
            self.shard_name(id),
            bytes.len(),
            path.display()
        );

        Ok(())
    }

    /// Load a shard, optionally memory-mapping the file instead of reading
    /// it into an owned buffer, and optionally dropping the stored
    /// documents.
    pub fn load(&self, id: u64, use_memory_map: bool, load_documents: bool) -> Result<PersistedShard> {
        let path = self.shard_path(id);

        let mut shard: PersistedShard = if use_memory_map {
            let file = File::open(&path)?;
            // Mapped read-only; the file is never mutated after a save.
            let mmap = unsafe { Mmap::map(&file)? };
            Self::deserialize(&mmap, &path)?
        } else {
            let bytes = fs::read(&path)?;
            Self::deserialize(&bytes, &path)?
        };

        if !load_documents {
            shard.documents = None;
        }

        Ok(shard)
    }

    fn deserialize(bytes: &[u8], path: &Path) -> Result<PersistedShard> {
        bincode::deserialize(bytes).map_err(|e| {
            SagittaError::serialization(format!("corrupt shard at {}: {e}", path.display()))
        })
    }
}
