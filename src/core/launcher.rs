/*
 * Opens a file for the user, either in the configured editor or with the
 * operating system's default handler. The application logic only sees the
 * `LaunchOutcome`, which it turns into a user-facing message; no outcome is
 * fatal to the session.
 */
use std::io;
use std::path::Path;
use std::process::Command;
use std::thread;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Launched,
    NotFound,
    // No editor configured and no usable system opener.
    Unsupported,
    Failed(String),
}

pub trait FileLauncherOperations: Send + Sync {
    /*
     * Opens `path`. `preferred_editor` is the configured editor executable, or
     * an empty string to fall back to the system default.
     */
    fn launch_file(&self, path: &Path, preferred_editor: &str) -> LaunchOutcome;
}

pub struct CoreFileLauncher {}

impl CoreFileLauncher {
    pub fn new() -> Self {
        CoreFileLauncher {}
    }

    #[cfg(target_os = "windows")]
    fn system_open_command(path: &Path) -> Command {
        let mut command = Command::new("cmd");
        // The empty string is the window title `start` expects before the target.
        command.arg("/C").arg("start").arg("").arg(path);
        command
    }

    #[cfg(target_os = "macos")]
    fn system_open_command(path: &Path) -> Command {
        let mut command = Command::new("open");
        command.arg(path);
        command
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    fn system_open_command(path: &Path) -> Command {
        let mut command = Command::new("xdg-open");
        command.arg(path);
        command
    }

    /*
     * Picks the program for `path`: the configured editor when it names an
     * existing file, otherwise the system opener.
     */
    fn command_for(path: &Path, preferred_editor: &str) -> (Command, &'static str) {
        if !preferred_editor.is_empty() && Path::new(preferred_editor).is_file() {
            let mut command = Command::new(preferred_editor);
            command.arg(path);
            (command, "the configured editor")
        } else {
            (Self::system_open_command(path), "the system file opener")
        }
    }

    /*
     * Starts `command` without blocking the caller. The child is reaped on a
     * background thread so long sessions do not accumulate zombie processes.
     */
    fn spawn(mut command: Command, what: &str) -> LaunchOutcome {
        match command.spawn() {
            Ok(mut child) => {
                let what = what.to_string();
                thread::spawn(move || match child.wait() {
                    Ok(status) if !status.success() => {
                        log::info!("FileLauncher: {what} exited with {status}.");
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("FileLauncher: Could not wait for {what}: {e}"),
                });
                LaunchOutcome::Launched
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("FileLauncher: {what} is not available: {e}");
                LaunchOutcome::Unsupported
            }
            Err(e) => {
                log::error!("FileLauncher: Failed to start {what}: {e}");
                LaunchOutcome::Failed(e.to_string())
            }
        }
    }
}

impl Default for CoreFileLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl FileLauncherOperations for CoreFileLauncher {
    fn launch_file(&self, path: &Path, preferred_editor: &str) -> LaunchOutcome {
        if !path.is_file() {
            log::warn!("FileLauncher: {path:?} does not exist.");
            return LaunchOutcome::NotFound;
        }

        let (command, what) = Self::command_for(path, preferred_editor);
        log::debug!("FileLauncher: Opening {path:?} with {what}.");
        Self::spawn(command, what)
    }
}
