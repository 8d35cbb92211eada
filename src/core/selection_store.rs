/*
 * Persists the merge selection of one project in a JSON sidecar file at the
 * project root. The sidecar records the ordered list of selected files (the
 * merge order) and the set of directories that were expanded in the browser.
 *
 * Loading is forgiving: a missing sidecar is an empty selection, a corrupt one
 * is treated as empty, and entries whose file has disappeared are pruned. When
 * pruning removed anything the cleaned document is written back straight away;
 * a failure to do so is reported as a status message rather than an error.
 */
use crate::core::path_utils;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SIDECAR_FILENAME: &str = ".allcode";
pub const MERGED_OUTPUT_FILENAME: &str = "allcode.txt";

#[derive(Debug)]
pub enum SelectionStoreError {
    Io(io::Error),
    Serde(serde_json::Error),
}

impl From<io::Error> for SelectionStoreError {
    fn from(err: io::Error) -> Self {
        SelectionStoreError::Io(err)
    }
}

impl From<serde_json::Error> for SelectionStoreError {
    fn from(err: serde_json::Error) -> Self {
        SelectionStoreError::Serde(err)
    }
}

impl std::fmt::Display for SelectionStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionStoreError::Io(e) => write!(f, "I/O error: {e}"),
            SelectionStoreError::Serde(e) => write!(f, "Serialization/Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for SelectionStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SelectionStoreError::Io(e) => Some(e),
            SelectionStoreError::Serde(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, SelectionStoreError>;

// On-disk layout of the sidecar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SelectionDocument {
    #[serde(default)]
    selected_files: Vec<String>,
    #[serde(default)]
    expanded_dirs: Vec<String>,
}

/*
 * Result of loading a sidecar. `status` carries a one-line message for the
 * status bar when something noteworthy happened (corruption, pruning, or a
 * failed auto-clean).
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedSelection {
    pub selected_files: Vec<String>,
    pub expanded_dirs: BTreeSet<String>,
    pub status: Option<String>,
}

pub trait SelectionStoreOperations: Send + Sync {
    fn load_selection(&self, root: &Path) -> LoadedSelection;
    fn save_selection(
        &self,
        root: &Path,
        selected_files: &[String],
        expanded_dirs: &BTreeSet<String>,
    ) -> Result<()>;
}

pub struct CoreSelectionStore {}

impl CoreSelectionStore {
    pub fn new() -> Self {
        CoreSelectionStore {}
    }

    pub fn sidecar_path(root: &Path) -> PathBuf {
        root.join(SIDECAR_FILENAME)
    }

    fn read_document(path: &Path) -> Result<SelectionDocument> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn write_document(path: &Path, document: &SelectionDocument) -> Result<()> {
        let text = serde_json::to_string_pretty(document)?;
        fs::write(path, text)?;
        Ok(())
    }

    /*
     * Keeps the entries that name an existing file inside `root`, in their
     * original order, dropping repeats after the first occurrence.
     */
    fn retain_existing_files(root: &Path, entries: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        entries
            .into_iter()
            .filter(|relative| {
                path_utils::is_contained_relative_path(relative)
                    && root.join(relative).is_file()
                    && seen.insert(relative.clone())
            })
            .collect()
    }
}

impl Default for CoreSelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStoreOperations for CoreSelectionStore {
    fn load_selection(&self, root: &Path) -> LoadedSelection {
        let path = Self::sidecar_path(root);
        if !path.is_file() {
            log::debug!("SelectionStore: No sidecar at {path:?}; starting empty.");
            return LoadedSelection::default();
        }

        let (document, mut status) = match Self::read_document(&path) {
            Ok(document) => (document, None),
            Err(e) => {
                log::warn!("SelectionStore: Sidecar {path:?} unreadable ({e}); treating as empty.");
                (
                    SelectionDocument::default(),
                    Some(format!("Could not read {SIDECAR_FILENAME}; starting with an empty selection")),
                )
            }
        };

        let original_count = document.selected_files.len();
        let expanded_dirs: BTreeSet<String> = document.expanded_dirs.into_iter().collect();
        let selected_files = Self::retain_existing_files(root, document.selected_files);

        if selected_files.len() < original_count {
            log::info!(
                "SelectionStore: Pruned {} stale entries from {path:?}.",
                original_count - selected_files.len()
            );
            let cleaned = SelectionDocument {
                selected_files: selected_files.clone(),
                expanded_dirs: expanded_dirs.iter().cloned().collect(),
            };
            status = match Self::write_document(&path, &cleaned) {
                Ok(()) => Some(format!("Cleaned missing files from {SIDECAR_FILENAME}")),
                Err(e) => {
                    log::error!("SelectionStore: Auto-clean of {path:?} failed: {e}");
                    Some(format!("Read-only {SIDECAR_FILENAME}? Could not auto-clean: {e}"))
                }
            };
        }

        LoadedSelection {
            selected_files,
            expanded_dirs,
            status,
        }
    }

    /*
     * Overwrites the sidecar. The selection keeps its order; the expanded
     * directories come out sorted because they are held in a `BTreeSet`.
     */
    fn save_selection(
        &self,
        root: &Path,
        selected_files: &[String],
        expanded_dirs: &BTreeSet<String>,
    ) -> Result<()> {
        let path = Self::sidecar_path(root);
        let document = SelectionDocument {
            selected_files: selected_files.to_vec(),
            expanded_dirs: expanded_dirs.iter().cloned().collect(),
        };
        Self::write_document(&path, &document)?;
        log::debug!(
            "SelectionStore: Saved {} selected files and {} expanded dirs to {path:?}.",
            document.selected_files.len(),
            document.expanded_dirs.len()
        );
        Ok(())
    }
}
