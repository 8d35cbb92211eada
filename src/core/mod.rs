/*
 * This module consolidates the core, platform-agnostic logic of the application:
 * the ignore-rule matcher, the global config store, the per-project selection
 * sidecar, the directory scanner that builds the browsable tree, and the file
 * launcher. Each I/O-facing component is fronted by an `...Operations` trait so
 * the application logic can be tested against mocks.
 */
pub mod config;
pub mod file_system;
pub mod ignore_rules;
pub mod launcher;
pub mod models;
pub mod path_utils;
pub mod selection_store;

pub use models::{EntryKind, FileNode};

pub use ignore_rules::IgnoreRuleSet;

pub use file_system::{CoreFileSystemScanner, FileSystemError, FileSystemScannerOperations};

pub use config::{ConfigManagerOperations, ConfigPaths, CoreConfigManager};

pub use selection_store::{
    CoreSelectionStore, LoadedSelection, SelectionStoreError, SelectionStoreOperations,
};

pub use launcher::{CoreFileLauncher, FileLauncherOperations, LaunchOutcome};
