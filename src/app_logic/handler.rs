use super::activation::{
    ActivationState, detect_double_activation, list_click_hits_row, should_clear_tree_selection,
};
use super::synchronizer::SelectionSynchronizer;
use super::ui_constants;
use super::ui_types::{
    EntryId, MessageSeverity, MoveDirection, RowBounds, UiCommand, UiEvent, UiEventHandler,
};
use crate::core::{
    FileLauncherOperations, FileSystemScannerOperations, IgnoreRuleSet, LaunchOutcome,
    SelectionStoreOperations,
};
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

/*
 * Drives the file manager window for one project directory. It receives
 * toolkit-neutral `UiEvent`s from the front end, routes them to the
 * `SelectionSynchronizer` and queues the resulting `UiCommand`s for the front
 * end to dequeue. Scanning, persistence and file launching go through the
 * injected trait objects so the whole flow can run against mocks.
 */
pub struct FileManagerLogic {
    pub(crate) root_path: PathBuf,
    pub(crate) active_extensions: HashSet<String>,
    pub(crate) default_editor: String,
    pub(crate) synchronizer: SelectionSynchronizer,
    pub(crate) activation_state: ActivationState,
    pending_commands: VecDeque<UiCommand>,
    file_system_scanner: Arc<dyn FileSystemScannerOperations>,
    selection_store: Arc<dyn SelectionStoreOperations>,
    file_launcher: Arc<dyn FileLauncherOperations>,
}

impl FileManagerLogic {
    pub fn new(
        root_path: PathBuf,
        active_extensions: HashSet<String>,
        default_editor: String,
        file_system_scanner: Arc<dyn FileSystemScannerOperations>,
        selection_store: Arc<dyn SelectionStoreOperations>,
        file_launcher: Arc<dyn FileLauncherOperations>,
    ) -> Self {
        FileManagerLogic {
            root_path,
            active_extensions,
            default_editor,
            synchronizer: SelectionSynchronizer::new(),
            activation_state: ActivationState::default(),
            pending_commands: VecDeque::new(),
            file_system_scanner,
            selection_store,
            file_launcher,
        }
    }

    pub fn synchronizer(&self) -> &SelectionSynchronizer {
        &self.synchronizer
    }

    fn enqueue(&mut self, commands: Vec<UiCommand>) {
        self.pending_commands.extend(commands);
    }

    fn message_box(severity: MessageSeverity, title: &str, text: String) -> UiCommand {
        UiCommand::ShowMessageBox {
            severity,
            title: title.to_string(),
            text,
        }
    }

    /*
     * Loads ignore rules and the saved selection, scans the project and
     * populates both views. A scan failure is reported in a dialog and leaves
     * an empty tree; the saved merge list is still shown.
     */
    fn on_window_opened(&mut self) {
        self.enqueue(vec![UiCommand::SetWindowTitle {
            title: format!(
                "{}{}",
                ui_constants::WINDOW_TITLE_PREFIX,
                self.root_path.display()
            ),
        }]);

        let rules = IgnoreRuleSet::load(&self.root_path);
        let loaded = self.selection_store.load_selection(&self.root_path);
        if let Some(status) = &loaded.status {
            self.enqueue(vec![UiCommand::UpdateStatus {
                text: status.clone(),
            }]);
        }

        let built = self.synchronizer.build_tree(
            self.file_system_scanner.as_ref(),
            &self.root_path,
            &rules,
            &self.active_extensions,
            &loaded,
        );
        match built {
            Ok(commands) => self.enqueue(commands),
            Err(e) => {
                log::error!("AppLogic: Failed to scan {:?}: {e}", self.root_path);
                let commands = self.synchronizer.populate_from_nodes(&[], &loaded);
                self.enqueue(commands);
                self.enqueue(vec![Self::message_box(
                    MessageSeverity::Error,
                    ui_constants::ERROR_TITLE,
                    format!("Could not read {}:\n{e}", self.root_path.display()),
                )]);
            }
        }
    }

    fn on_tree_clicked(&mut self, hit: Option<EntryId>, timestamp_ms: u64) {
        if should_clear_tree_selection(hit, self.synchronizer.has_tree_focus()) {
            log::debug!("AppLogic: Click on empty tree space; clearing tree selection.");
            self.enqueue(vec![UiCommand::ClearTreeSelection]);
            let commands = self.synchronizer.focus_tree_entry(None);
            self.enqueue(commands);
        }

        let (is_double, next_state) =
            detect_double_activation(self.activation_state, hit, timestamp_ms);
        self.activation_state = next_state;
        if let (true, Some(id)) = (is_double, hit) {
            log::debug!("AppLogic: Double activation on {id:?}; toggling.");
            let commands = self.synchronizer.toggle_entry(id);
            self.enqueue(commands);
        }
    }

    fn on_list_double_clicked(&mut self, y: i32, row: Option<(usize, RowBounds)>) {
        let Some((index, bounds)) = row else {
            return;
        };
        if !list_click_hits_row(y, Some(bounds)) {
            log::debug!("AppLogic: List double click at y={y} missed row {index}.");
            return;
        }
        let Some(relative_path) = self.synchronizer.ordered_selection().get(index).cloned() else {
            return;
        };
        self.open_file(&relative_path);
    }

    // Opens a merge list entry and reports any failure as a dialog.
    fn open_file(&mut self, relative_path: &str) {
        let full_path = self.root_path.join(relative_path);
        let outcome = self
            .file_launcher
            .launch_file(&full_path, &self.default_editor);
        log::debug!("AppLogic: Opening {full_path:?} gave {outcome:?}.");

        let command = match outcome {
            LaunchOutcome::Launched => return,
            LaunchOutcome::NotFound => Self::message_box(
                MessageSeverity::Warning,
                ui_constants::FILE_NOT_FOUND_TITLE,
                format!("File not found:\n{}", full_path.display()),
            ),
            LaunchOutcome::Unsupported => Self::message_box(
                MessageSeverity::Information,
                ui_constants::UNSUPPORTED_ACTION_TITLE,
                ui_constants::UNSUPPORTED_ACTION_TEXT.to_string(),
            ),
            LaunchOutcome::Failed(message) => Self::message_box(
                MessageSeverity::Error,
                ui_constants::ERROR_TITLE,
                format!("Could not open file:\n{message}"),
            ),
        };
        self.enqueue(vec![command]);
    }

    fn on_save_and_close(&mut self) {
        match self
            .synchronizer
            .commit(self.selection_store.as_ref(), &self.root_path)
        {
            Ok(commands) => {
                self.enqueue(commands);
                self.enqueue(vec![UiCommand::CloseWindow]);
            }
            Err(e) => {
                log::error!("AppLogic: Could not save selection for {:?}: {e}", self.root_path);
                self.enqueue(vec![Self::message_box(
                    MessageSeverity::Error,
                    ui_constants::ERROR_TITLE,
                    format!("Could not save the file selection:\n{e}"),
                )]);
            }
        }
    }
}

impl UiEventHandler for FileManagerLogic {
    fn handle_event(&mut self, event: UiEvent) {
        log::trace!("AppLogic: Handling {event:?}");
        match event {
            UiEvent::WindowOpened => self.on_window_opened(),
            UiEvent::TreeClicked { hit, timestamp_ms } => self.on_tree_clicked(hit, timestamp_ms),
            UiEvent::TreeSelectionChanged { selected } => {
                let commands = self.synchronizer.focus_tree_entry(selected);
                self.enqueue(commands);
            }
            UiEvent::TreeEnterPressed | UiEvent::TreeActionButtonClicked => {
                let commands = self.synchronizer.toggle_selection();
                self.enqueue(commands);
            }
            UiEvent::TreeItemExpansionChanged { id, expanded } => {
                if !self.synchronizer.set_directory_expanded(id, expanded) {
                    log::warn!("AppLogic: Expansion change for unknown directory {id:?}.");
                }
            }
            UiEvent::ListSelectionChanged { selected } => {
                let commands = self.synchronizer.focus_list_entry(selected);
                self.enqueue(commands);
            }
            UiEvent::ListDoubleClicked { y, row } => self.on_list_double_clicked(y, row),
            UiEvent::MoveUpClicked => {
                let commands = self.synchronizer.move_focused(MoveDirection::Up);
                self.enqueue(commands);
            }
            UiEvent::MoveDownClicked => {
                let commands = self.synchronizer.move_focused(MoveDirection::Down);
                self.enqueue(commands);
            }
            UiEvent::RemoveClicked => {
                let commands = self.synchronizer.remove_focused();
                self.enqueue(commands);
            }
            UiEvent::SaveAndCloseClicked => self.on_save_and_close(),
            UiEvent::CloseRequested => {
                log::info!("AppLogic: Closing without saving.");
                self.enqueue(vec![UiCommand::CloseWindow]);
            }
        }
    }

    fn try_dequeue_command(&mut self) -> Option<UiCommand> {
        self.pending_commands.pop_front()
    }
}
