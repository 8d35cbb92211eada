/*
 * Manages the application-wide settings document: the active project
 * directory, the recently used directories, the recognized file types and the
 * preferred editor. The document lives in a small JSON file whose location is
 * injected through `ConfigPaths`, so tests can point it at a temporary
 * directory.
 *
 * Loading never fails from the caller's perspective. A missing, unreadable or
 * structurally incomplete file is replaced by a freshly synthesized default,
 * which is persisted immediately. The trait `ConfigManagerOperations` keeps the
 * storage mechanism swappable for tests.
 */
use crate::core::path_utils;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_FILETYPES_FILENAME: &str = "default_filetypes.json";
pub const VERSION_FILENAME: &str = "version.txt";
const RESOURCES_DIR_NAME: &str = "resources";
pub const MAX_RECENT_DIRECTORIES: usize = 10;
const UNKNOWN_VERSION_PART: &str = "?";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoConfigDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Configuration format error: {e}"),
            ConfigError::NoConfigDirectory => {
                write!(f, "Could not determine a directory for the configuration")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            ConfigError::NoConfigDirectory => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/*
 * One recognized file type. `ext` includes the leading dot (".py"); only
 * entries with `active` set take part in tree population.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeEntry {
    pub ext: String,
    #[serde(default)]
    pub active: bool,
}

impl FileTypeEntry {
    pub fn new(ext: &str, active: bool) -> Self {
        FileTypeEntry {
            ext: ext.to_string(),
            active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AppConfig {
    pub active_directory: String,
    pub recent_directories: Vec<String>,
    pub filetypes: Vec<FileTypeEntry>,
    pub default_editor: String,
    // Keys written by other versions of the tool are carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppConfig {
    pub fn active_extensions(&self) -> HashSet<String> {
        self.filetypes
            .iter()
            .filter(|ft| ft.active)
            .map(|ft| ft.ext.clone())
            .collect()
    }

    /*
     * Makes `directory` the active one and moves it to the front of the recent
     * list, which is kept free of duplicates and bounded in length.
     */
    pub fn set_active_directory(&mut self, directory: &str) {
        self.active_directory = directory.to_string();
        self.recent_directories.retain(|d| d != directory);
        self.recent_directories.insert(0, directory.to_string());
        self.recent_directories.truncate(MAX_RECENT_DIRECTORIES);
    }
}

// Mirror of the on-disk document where every field may be missing.
#[derive(Debug, Deserialize)]
struct StoredAppConfig {
    #[serde(default)]
    active_directory: Option<String>,
    #[serde(default)]
    recent_directories: Option<Vec<String>>,
    #[serde(default)]
    filetypes: Option<Vec<FileTypeEntry>>,
    #[serde(default)]
    default_editor: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/*
 * Locations of the files the config store reads and writes. Passed in at
 * construction time instead of being global constants.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
    pub default_filetypes_file: PathBuf,
    pub version_file: PathBuf,
}

impl ConfigPaths {
    pub fn in_dir(config_dir: &Path, resources_dir: &Path) -> Self {
        ConfigPaths {
            config_file: config_dir.join(CONFIG_FILENAME),
            default_filetypes_file: resources_dir.join(DEFAULT_FILETYPES_FILENAME),
            version_file: resources_dir.join(VERSION_FILENAME),
        }
    }

    /*
     * Standard layout: the settings file in the per-user config directory, the
     * bundled template and version file in `resources/` next to the executable.
     */
    pub fn for_app(app_name: &str) -> Result<Self> {
        let config_dir = path_utils::get_base_app_config_local_dir(app_name)
            .ok_or(ConfigError::NoConfigDirectory)?;
        let exe_dir = std::env::current_exe()?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(ConfigPaths::in_dir(
            &config_dir,
            &exe_dir.join(RESOURCES_DIR_NAME),
        ))
    }
}

pub trait ConfigManagerOperations: Send + Sync {
    /*
     * Loads the settings, regenerating and persisting a default document when
     * the stored one is missing or unusable. The second element is a one-line
     * status message when regeneration happened.
     */
    fn load_config_with_status(&self) -> (AppConfig, Option<String>);
    fn save_config(&self, config: &AppConfig) -> Result<()>;

    fn load_config(&self) -> AppConfig {
        self.load_config_with_status().0
    }

    fn load_active_extensions(&self) -> HashSet<String> {
        self.load_config().active_extensions()
    }

    fn load_all_filetypes(&self) -> Vec<FileTypeEntry> {
        self.load_config().filetypes
    }

    fn save_filetypes(&self, filetypes: Vec<FileTypeEntry>) -> Result<()> {
        let mut config = self.load_config();
        config.filetypes = filetypes;
        self.save_config(&config)
    }
}

pub struct CoreConfigManager {
    paths: ConfigPaths,
}

impl CoreConfigManager {
    pub fn new(paths: ConfigPaths) -> Self {
        CoreConfigManager { paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    fn read_stored_config(&self) -> Result<StoredAppConfig> {
        let text = fs::read_to_string(&self.paths.config_file)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn load_default_filetypes(&self) -> Vec<FileTypeEntry> {
        let template = &self.paths.default_filetypes_file;
        match fs::read_to_string(template)
            .map_err(ConfigError::from)
            .and_then(|text| serde_json::from_str(&text).map_err(ConfigError::from))
        {
            Ok(filetypes) => filetypes,
            Err(e) => {
                log::warn!(
                    "CoreConfigManager: Default filetypes template {template:?} unusable ({e}); starting with none."
                );
                Vec::new()
            }
        }
    }

    fn create_default_config(&self) -> AppConfig {
        let config = AppConfig {
            filetypes: self.load_default_filetypes(),
            ..AppConfig::default()
        };
        if let Err(e) = self.save_config(&config) {
            log::error!(
                "CoreConfigManager: Failed to persist regenerated config to {:?}: {e}",
                self.paths.config_file
            );
        }
        config
    }

    /*
     * Reads `key = value` lines from the version file and formats them as
     * `v{major}.{minor}.{revision}`. Missing parts are shown as `?`.
     */
    pub fn load_app_version(&self) -> String {
        let Ok(text) = fs::read_to_string(&self.paths.version_file) else {
            log::debug!(
                "CoreConfigManager: Version file {:?} not readable.",
                self.paths.version_file
            );
            return format_version(None, None, None);
        };
        let mut major = None;
        let mut minor = None;
        let mut revision = None;
        for line in text.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let value = value.trim().to_string();
            match key.trim().to_lowercase().as_str() {
                "major" => major = Some(value),
                "minor" => minor = Some(value),
                "revision" => revision = Some(value),
                _ => {}
            }
        }
        format_version(major.as_deref(), minor.as_deref(), revision.as_deref())
    }
}

fn format_version(major: Option<&str>, minor: Option<&str>, revision: Option<&str>) -> String {
    format!(
        "v{}.{}.{}",
        major.unwrap_or(UNKNOWN_VERSION_PART),
        minor.unwrap_or(UNKNOWN_VERSION_PART),
        revision.unwrap_or(UNKNOWN_VERSION_PART)
    )
}

impl ConfigManagerOperations for CoreConfigManager {
    fn load_config_with_status(&self) -> (AppConfig, Option<String>) {
        let config_file = &self.paths.config_file;
        log::trace!("CoreConfigManager: Loading config from {config_file:?}");
        let stored = match self.read_stored_config() {
            Ok(stored) => stored,
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("CoreConfigManager: No config at {config_file:?}; creating default.");
                return (self.create_default_config(), None);
            }
            Err(e) => {
                log::warn!("CoreConfigManager: Config {config_file:?} unusable ({e}); regenerating.");
                return (
                    self.create_default_config(),
                    Some("Settings file was unreadable and has been reset".to_string()),
                );
            }
        };

        let Some(filetypes) = stored.filetypes else {
            log::warn!("CoreConfigManager: Config {config_file:?} has no 'filetypes'; regenerating.");
            return (
                self.create_default_config(),
                Some("Settings file was incomplete and has been reset".to_string()),
            );
        };

        let config = AppConfig {
            active_directory: stored.active_directory.unwrap_or_default(),
            recent_directories: stored.recent_directories.unwrap_or_default(),
            filetypes,
            default_editor: stored.default_editor.unwrap_or_default(),
            extra: stored.extra,
        };
        log::debug!(
            "CoreConfigManager: Loaded config with {} filetypes from {config_file:?}.",
            config.filetypes.len()
        );
        (config, None)
    }

    /*
     * Writes the full document. Filetypes are sorted by extension first so the
     * file diffs cleanly between saves.
     */
    fn save_config(&self, config: &AppConfig) -> Result<()> {
        let mut sorted = config.clone();
        sorted.filetypes.sort_by(|a, b| a.ext.cmp(&b.ext));
        let text = serde_json::to_string_pretty(&sorted)?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.paths.config_file, text)?;
        log::debug!(
            "CoreConfigManager: Saved config to {:?}.",
            self.paths.config_file
        );
        Ok(())
    }
}
