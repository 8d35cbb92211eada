// src/main.rs

mod app_logic;
mod core;

use crate::app_logic::ui_types::{RowBounds, UiCommand, UiEvent, UiEventHandler};
use crate::app_logic::FileManagerLogic;
use crate::core::{
    path_utils, ConfigManagerOperations, ConfigPaths, CoreConfigManager, CoreFileLauncher,
    CoreFileSystemScanner, CoreSelectionStore,
};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const APP_NAME: &str = "AllcodeSelector";

// Rows reported for `open <index>`; the driver has no real list geometry.
const DRIVER_ROW_HEIGHT: i32 = 20;

/*
 * Sets up terminal logging. Safe to call more than once; tests call it from
 * every setup helper and only the first call installs the logger.
 */
pub fn initialize_logging() {
    let level = if cfg!(test) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn print_help() {
    println!("Commands:");
    println!("  select <path>     focus a tree entry");
    println!("  click [path]      click a tree entry (or empty space)");
    println!("  toggle            toggle the focused tree entry (Enter)");
    println!("  expand <path>     mark a directory expanded");
    println!("  collapse <path>   mark a directory collapsed");
    println!("  list <index>      focus a merge list row");
    println!("  up | down         move the focused row");
    println!("  remove            remove the focused row");
    println!("  open <index>      open a merge list file");
    println!("  show              print the merge list");
    println!("  save              save and close");
    println!("  quit              close without saving");
}

fn print_command(command: &UiCommand) {
    match command {
        UiCommand::PopulateTree { items } => {
            println!("[tree] populated with {} top-level entries", items.len())
        }
        UiCommand::UpdateStatus { text } => println!("[status] {text}"),
        UiCommand::ShowMessageBox {
            severity,
            title,
            text,
        } => println!("[{severity:?}] {title}: {text}"),
        other => println!("  {other:?}"),
    }
}

/*
 * Translates one driver line into events. Paths are resolved to tree entries
 * through the synchronizer; unknown paths are reported and produce nothing.
 */
fn parse_line(logic: &FileManagerLogic, line: &str) -> Option<Vec<UiEvent>> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?;
    let argument = parts.next();

    let entry_for = |path: Option<&str>| {
        let path = path?;
        let id = logic.synchronizer().entry_id_for_path(path);
        if id.is_none() {
            println!("Unknown tree path '{path}'.");
        }
        id
    };
    let index_of = |arg: Option<&str>| arg.and_then(|a| a.parse::<usize>().ok());

    let events = match verb {
        "select" => vec![UiEvent::TreeSelectionChanged {
            selected: Some(entry_for(argument)?),
        }],
        "click" => vec![UiEvent::TreeClicked {
            hit: match argument {
                Some(_) => Some(entry_for(argument)?),
                None => None,
            },
            timestamp_ms: now_ms(),
        }],
        "toggle" => vec![UiEvent::TreeEnterPressed],
        "expand" | "collapse" => vec![UiEvent::TreeItemExpansionChanged {
            id: entry_for(argument)?,
            expanded: verb == "expand",
        }],
        "list" => vec![UiEvent::ListSelectionChanged {
            selected: index_of(argument),
        }],
        "up" => vec![UiEvent::MoveUpClicked],
        "down" => vec![UiEvent::MoveDownClicked],
        "remove" => vec![UiEvent::RemoveClicked],
        "open" => {
            let index = index_of(argument)?;
            let top = index as i32 * DRIVER_ROW_HEIGHT;
            vec![UiEvent::ListDoubleClicked {
                y: top + DRIVER_ROW_HEIGHT / 2,
                row: Some((
                    index,
                    RowBounds {
                        top,
                        height: DRIVER_ROW_HEIGHT,
                    },
                )),
            }]
        }
        "show" => {
            let focused = logic.synchronizer().focused_list_path();
            for (i, path) in logic.synchronizer().ordered_selection().iter().enumerate() {
                let marker = if focused == Some(path.as_str()) { '*' } else { ' ' };
                println!("{marker}{i:>3}  {path}");
            }
            Vec::new()
        }
        "save" => vec![UiEvent::SaveAndCloseClicked],
        "quit" => vec![UiEvent::CloseRequested],
        _ => {
            print_help();
            Vec::new()
        }
    };
    Some(events)
}

// Applies queued commands. Returns true once the window was asked to close.
fn drain_and_print(logic: &mut FileManagerLogic) -> bool {
    let mut closed = false;
    while let Some(command) = logic.try_dequeue_command() {
        if command == UiCommand::CloseWindow {
            closed = true;
        }
        print_command(&command);
    }
    closed
}

fn main() -> ExitCode {
    initialize_logging();

    let config_paths = match ConfigPaths::for_app(APP_NAME) {
        Ok(paths) => paths,
        Err(e) => {
            log::error!("Main: Could not locate configuration directory: {e}");
            return ExitCode::FAILURE;
        }
    };
    let config_manager = CoreConfigManager::new(config_paths);
    log::info!(
        "Main: Starting {APP_NAME} {}",
        config_manager.load_app_version()
    );

    let (mut config, config_status) = config_manager.load_config_with_status();
    if let Some(status) = config_status {
        println!("[status] {status}");
    }

    let root = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None if !config.active_directory.is_empty() => PathBuf::from(&config.active_directory),
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                log::error!("Main: No project directory given and no current directory: {e}");
                return ExitCode::FAILURE;
            }
        },
    };
    let root = match path_utils::absolute_project_dir(&root) {
        Ok(root) => root,
        Err(e) => {
            log::error!("Main: Cannot use {root:?} as project directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    config.set_active_directory(&root.to_string_lossy());
    if let Err(e) = config_manager.save_config(&config) {
        log::warn!("Main: Could not save configuration: {e}");
    }

    let mut logic = FileManagerLogic::new(
        root,
        config.active_extensions(),
        config.default_editor.clone(),
        Arc::new(CoreFileSystemScanner::new()),
        Arc::new(CoreSelectionStore::new()),
        Arc::new(CoreFileLauncher::new()),
    );

    logic.handle_event(UiEvent::WindowOpened);
    drain_and_print(&mut logic);
    print_help();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                log::error!("Main: Failed to read input: {e}");
                return ExitCode::FAILURE;
            }
            None => {
                log::info!("Main: Input closed; exiting without saving.");
                return ExitCode::SUCCESS;
            }
        };
        let Some(events) = parse_line(&logic, &line) else {
            continue;
        };
        for event in events {
            logic.handle_event(event);
        }
        if drain_and_print(&mut logic) {
            return ExitCode::SUCCESS;
        }
    }
}
