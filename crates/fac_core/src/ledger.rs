use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Local record of which reference documents have already been ingested,
/// keyed by reference namespace. This is a dedup fast-path only: the
/// vector store stays authoritative for namespace contents, the ledger
/// answers "have I already paid the ingestion cost for this file".
///
/// Serialized as a JSON object `{namespace: [filename, ...]}`, read at
/// startup and rewritten wholesale on each update.
#[derive(Debug, Clone)]
pub struct IngestionLedger {
    path: PathBuf,
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl IngestionLedger {
    /// Load the ledger, treating a missing file as an empty ledger.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                entries: BTreeMap::new(),
            });
        }
        let bytes = fs::read(&path).map_err(|e| {
            AppError::new("LEDGER_FAILED", "Failed to read ingestion ledger")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        let entries: BTreeMap<String, BTreeSet<String>> =
            serde_json::from_slice(&bytes).map_err(|e| {
                AppError::new("LEDGER_FAILED", "Failed to decode ingestion ledger")
                    .with_details(format!("path={}; err={}", path.display(), e))
            })?;
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub fn contains(&self, namespace: &str, filename: &str) -> bool {
        self.entries
            .get(namespace)
            .map(|names| names.contains(filename))
            .unwrap_or(false)
    }

    pub fn filenames(&self, namespace: &str) -> Vec<String> {
        self.entries
            .get(namespace)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Record a filename as ingested. Returns `true` when the entry is
    /// new; marking an already-present filename is a no-op that leaves
    /// the file untouched.
    pub fn mark(&mut self, namespace: &str, filename: &str) -> Result<bool, AppError> {
        let inserted = self
            .entries
            .entry(namespace.to_string())
            .or_default()
            .insert(filename.to_string());
        if inserted {
            self.save()?;
        }
        Ok(inserted)
    }

    /// Drop a stale entry, e.g. when the ledger claims a file was
    /// ingested but the namespace turned out to be empty.
    pub fn unmark(&mut self, namespace: &str, filename: &str) -> Result<bool, AppError> {
        let removed = self
            .entries
            .get_mut(namespace)
            .map(|names| names.remove(filename))
            .unwrap_or(false);
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    fn save(&self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::new("LEDGER_FAILED", "Failed to create ledger directory")
                        .with_details(format!("path={}; err={}", parent.display(), e))
                })?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            AppError::new("LEDGER_FAILED", "Failed to encode ingestion ledger")
                .with_details(e.to_string())
        })?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json.as_bytes()).map_err(|e| {
            AppError::new("LEDGER_FAILED", "Failed to write ingestion ledger")
                .with_details(format!("path={}; err={}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AppError::new("LEDGER_FAILED", "Failed to finalize ledger write").with_details(
                format!(
                    "tmp={}; dest={}; err={}",
                    tmp.display(),
                    self.path.display(),
                    e
                ),
            )
        })?;
        Ok(())
    }
}
