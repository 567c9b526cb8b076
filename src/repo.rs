//! Item repositories
//!
//! Workers push normalized records into per-item-type repositories. A
//! repository batches what it receives and reports artifact summaries
//! (item type + count per batch) that ride along on the terminal event.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default number of items per artifact batch
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Summary of one uploaded batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub item_type: String,
    pub item_count: usize,
}

/// A batching sink for one item type
#[derive(Debug)]
pub struct Repo {
    item_type: String,
    batch_size: usize,
    items: Vec<Value>,
}

impl Repo {
    /// Create a repository for an item type
    pub fn new(item_type: impl Into<String>, batch_size: usize) -> Self {
        Self {
            item_type: item_type.into(),
            batch_size,
            items: Vec::new(),
        }
    }

    /// The item type this repository collects
    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    /// Push a slice of records, serializing each to JSON
    pub fn push<T: Serialize>(&mut self, records: &[T]) -> Result<()> {
        for record in records {
            let value = serde_json::to_value(record)
                .map_err(|e| Error::state(format!("Failed to serialize item: {e}")))?;
            self.items.push(value);
        }
        Ok(())
    }

    /// All items pushed so far
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Number of items pushed
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been pushed
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Artifact summaries, one per full-or-partial batch
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.items
            .chunks(self.batch_size)
            .map(|chunk| Artifact {
                item_type: self.item_type.clone(),
                item_count: chunk.len(),
            })
            .collect()
    }
}

/// The set of repositories a worker run writes into
#[derive(Debug, Default)]
pub struct RepoSet {
    repos: Vec<Repo>,
}

impl RepoSet {
    /// Create an empty repo set
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize repositories for the given item types
    pub fn initialize(&mut self, item_types: &[&str]) {
        self.initialize_with_batch_size(item_types, DEFAULT_BATCH_SIZE);
    }

    /// Initialize repositories with a custom batch size
    pub fn initialize_with_batch_size(&mut self, item_types: &[&str], batch_size: usize) {
        for item_type in item_types {
            if self.get(item_type).is_none() {
                self.repos.push(Repo::new(*item_type, batch_size));
            }
        }
    }

    /// Get a repository by item type
    pub fn get(&mut self, item_type: &str) -> Option<&mut Repo> {
        self.repos.iter_mut().find(|r| r.item_type == item_type)
    }

    /// Artifact summaries across all repositories
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.repos.iter().flat_map(Repo::artifacts).collect()
    }

    /// Total items across all repositories
    pub fn total_items(&self) -> usize {
        self.repos.iter().map(Repo::len).sum()
    }
}
