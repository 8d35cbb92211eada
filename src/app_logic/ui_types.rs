/*
 * Toolkit-neutral vocabulary between the application logic and whatever front
 * end renders the file manager window. The front end translates its native
 * callbacks into `UiEvent`s; the logic answers with `UiCommand`s that describe
 * exactly which visual change to make. Nothing here depends on a rendering
 * library, which keeps the whole selection engine testable headless.
 */

// Identifies an entry of the file tree. Allocated by the logic, never reused
// within one tree build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

// Visual check state of a file entry in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Checked,
    Unchecked,
}

impl CheckState {
    pub fn from_checked(checked: bool) -> Self {
        if checked {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        }
    }
}

// Describes one tree item for the initial population of the tree control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItemDescriptor {
    pub id: EntryId,
    pub text: String,
    pub is_folder: bool,
    pub state: CheckState,
    pub expanded: bool,
    pub children: Vec<TreeItemDescriptor>,
}

// Vertical extent of a rendered list row, in the list's own coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBounds {
    pub top: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageSeverity {
    Information,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    // The window is shown; the logic scans the project and populates both views.
    WindowOpened,
    // Mouse press in the tree. `hit` is the entry under the cursor, if any.
    TreeClicked {
        hit: Option<EntryId>,
        timestamp_ms: u64,
    },
    TreeSelectionChanged {
        selected: Option<EntryId>,
    },
    TreeEnterPressed,
    TreeActionButtonClicked,
    TreeItemExpansionChanged {
        id: EntryId,
        expanded: bool,
    },
    ListSelectionChanged {
        selected: Option<usize>,
    },
    // Double click in the merge list; `row` is the hit-tested row under the cursor.
    ListDoubleClicked {
        y: i32,
        row: Option<(usize, RowBounds)>,
    },
    MoveUpClicked,
    MoveDownClicked,
    RemoveClicked,
    SaveAndCloseClicked,
    CloseRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    SetWindowTitle {
        title: String,
    },
    PopulateTree {
        items: Vec<TreeItemDescriptor>,
    },
    // Only used for the initial fill of the merge list.
    ReplaceListItems {
        items: Vec<String>,
    },
    UpdateTreeItem {
        id: EntryId,
        text: String,
        state: CheckState,
    },
    ClearTreeSelection,
    ListInsert {
        index: usize,
        text: String,
    },
    ListRemove {
        index: usize,
    },
    ListSelect {
        index: usize,
    },
    ClearListSelection,
    ClearHighlights,
    HighlightListRow {
        index: usize,
    },
    HighlightTreeItem {
        id: EntryId,
    },
    EnsureTreeItemVisible {
        id: EntryId,
    },
    SetListButtonsEnabled {
        enabled: bool,
    },
    SetTreeActionButton {
        enabled: bool,
        label: String,
    },
    UpdateStatus {
        text: String,
    },
    ShowMessageBox {
        severity: MessageSeverity,
        title: String,
        text: String,
    },
    CloseWindow,
}

/*
 * Implemented by the application logic. The front end feeds events in and then
 * drains the queued commands, applying them in order.
 */
pub trait UiEventHandler {
    fn handle_event(&mut self, event: UiEvent);
    fn try_dequeue_command(&mut self) -> Option<UiCommand>;
}
