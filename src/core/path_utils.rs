/*
 * Path helpers shared by the core modules: locating the per-user configuration
 * directory and converting absolute paths into the root-relative, forward-slash
 * form that is stored in the sidecar file and used as the tree index key.
 */
use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/*
 * Retrieves the application's local configuration directory, creating it if
 * necessary. Returns `None` if the platform offers no suitable location or the
 * directory could not be created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Attempting to get base app config local dir for '{app_name}'");
    ProjectDirs::from("", "", app_name).and_then(|proj_dirs| {
        let config_path = proj_dirs.config_local_dir();
        if !config_path.exists() {
            if let Err(e) = fs::create_dir_all(config_path) {
                log::error!(
                    "PathUtils: Failed to create base app config directory {config_path:?}: {e}"
                );
                return None;
            }
            log::debug!("PathUtils: Created base app config directory: {config_path:?}");
        }
        Some(config_path.to_path_buf())
    })
}

/*
 * Computes `path` relative to `root` and joins the components with `/`,
 * regardless of the host separator. Returns `None` when `path` is not under
 * `root` or is the root itself.
 */
pub fn to_relative_posix(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/*
 * True if a stored relative path stays inside the root it is joined to: it must
 * be non-empty, relative, and free of `..` components.
 */
pub fn is_contained_relative_path(relative: &str) -> bool {
    if relative.trim().is_empty() {
        return false;
    }
    let path = Path::new(relative);
    if path.is_absolute() || relative.starts_with('/') || relative.starts_with('\\') {
        return false;
    }
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/*
 * Resolves a user-supplied project directory against the current working
 * directory so it stays meaningful when stored and reused from elsewhere.
 */
pub fn absolute_project_dir(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    if !absolute.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", absolute.display()),
        ));
    }
    Ok(absolute)
}
