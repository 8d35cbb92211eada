/*
 * The selection engine behind the file manager window. It owns the file tree
 * model, the ordered merge list and the current focus, and keeps the three
 * consistent while the user toggles, reorders and removes files.
 *
 * Every operation mutates the model and returns the `UiCommand`s a front end
 * needs to bring its widgets in line. The merge list is only ever edited with
 * explicit insert/remove/select commands after the initial fill; a full
 * rebuild would drop the list's own selection cursor in the middle of a
 * reorder.
 */
use super::ui_constants::{
    CHECKED_BOX_CHAR, STATUS_SELECTION_SAVED, TREE_ACTION_ADD_LABEL, TREE_ACTION_REMOVE_LABEL,
    UNCHECKED_BOX_CHAR,
};
use super::ui_types::{CheckState, EntryId, MoveDirection, TreeItemDescriptor, UiCommand};
use crate::core::{
    EntryKind, FileNode, FileSystemError, FileSystemScannerOperations, IgnoreRuleSet,
    LoadedSelection, SelectionStoreError, SelectionStoreOperations,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

/*
 * One entry of the tree model. Files use `checked`, directories use
 * `expanded`; the other flag stays false.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub id: EntryId,
    pub relative_path: String,
    pub name: String,
    pub kind: EntryKind,
    pub parent: Option<EntryId>,
    pub children: Vec<EntryId>,
    pub checked: bool,
    pub expanded: bool,
}

impl TreeEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn display_text(&self) -> String {
        match self.kind {
            EntryKind::File => {
                let mark = if self.checked {
                    CHECKED_BOX_CHAR
                } else {
                    UNCHECKED_BOX_CHAR
                };
                format!("{mark} {}", self.name)
            }
            EntryKind::Directory => self.name.clone(),
        }
    }
}

// Where the user's focus currently is. Tree and list focus exclude each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusLocus {
    #[default]
    Nothing,
    TreeEntry(EntryId),
    ListEntry(usize),
}

// The counterpart currently marked in the other view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossHighlight {
    ListRow(usize),
    TreeEntry(EntryId),
}

#[derive(Debug, Default)]
pub struct SelectionSynchronizer {
    entries: HashMap<EntryId, TreeEntry>,
    root_entries: Vec<EntryId>,
    path_to_entry_id: HashMap<String, EntryId>,
    next_entry_id_counter: u64,
    ordered_selection: Vec<String>,
    focus: FocusLocus,
    highlight: Option<CrossHighlight>,
}

impl SelectionSynchronizer {
    pub fn new() -> Self {
        SelectionSynchronizer {
            next_entry_id_counter: 1,
            ..Default::default()
        }
    }

    pub fn entry(&self, id: EntryId) -> Option<&TreeEntry> {
        self.entries.get(&id)
    }

    pub fn entry_id_for_path(&self, relative_path: &str) -> Option<EntryId> {
        self.path_to_entry_id.get(relative_path).copied()
    }

    pub fn root_entries(&self) -> &[EntryId] {
        &self.root_entries
    }

    pub fn ordered_selection(&self) -> &[String] {
        &self.ordered_selection
    }

    pub fn focus(&self) -> FocusLocus {
        self.focus
    }

    pub fn current_highlight(&self) -> Option<CrossHighlight> {
        self.highlight
    }

    pub fn has_tree_focus(&self) -> bool {
        matches!(self.focus, FocusLocus::TreeEntry(_))
    }

    pub fn focused_list_path(&self) -> Option<&str> {
        match self.focus {
            FocusLocus::ListEntry(index) => self.ordered_selection.get(index).map(String::as_str),
            _ => None,
        }
    }

    /*
     * Scans `root` and rebuilds the model from the result, seeding checked and
     * expanded states from the loaded sidecar contents.
     */
    pub fn build_tree(
        &mut self,
        scanner: &dyn FileSystemScannerOperations,
        root: &Path,
        rules: &IgnoreRuleSet,
        extensions: &HashSet<String>,
        loaded: &LoadedSelection,
    ) -> Result<Vec<UiCommand>, FileSystemError> {
        let nodes = scanner.scan_directory(root, rules, extensions)?;
        Ok(self.populate_from_nodes(&nodes, loaded))
    }

    /*
     * Replaces the whole model. Emits the initial tree population and the
     * initial fill of the merge list, the only full list replacement this type
     * ever produces.
     */
    pub fn populate_from_nodes(
        &mut self,
        nodes: &[FileNode],
        loaded: &LoadedSelection,
    ) -> Vec<UiCommand> {
        self.entries.clear();
        self.path_to_entry_id.clear();
        self.next_entry_id_counter = 1;
        self.focus = FocusLocus::Nothing;
        self.highlight = None;
        self.ordered_selection = loaded.selected_files.clone();

        let selected: HashSet<&str> = loaded.selected_files.iter().map(String::as_str).collect();
        let mut root_entries = Vec::with_capacity(nodes.len());
        let items = self.insert_nodes_recursive(
            nodes,
            None,
            &selected,
            &loaded.expanded_dirs,
            &mut root_entries,
        );
        self.root_entries = root_entries;
        log::debug!(
            "SelectionSynchronizer: Built tree with {} entries; {} files selected.",
            self.entries.len(),
            self.ordered_selection.len()
        );

        let mut commands = vec![
            UiCommand::PopulateTree { items },
            UiCommand::ReplaceListItems {
                items: self.ordered_selection.clone(),
            },
        ];
        commands.extend(self.button_state_commands());
        commands
    }

    fn insert_nodes_recursive(
        &mut self,
        nodes: &[FileNode],
        parent: Option<EntryId>,
        selected: &HashSet<&str>,
        expanded_dirs: &BTreeSet<String>,
        ids_out: &mut Vec<EntryId>,
    ) -> Vec<TreeItemDescriptor> {
        let mut descriptors = Vec::with_capacity(nodes.len());
        for node in nodes {
            let id = EntryId(self.next_entry_id_counter);
            self.next_entry_id_counter += 1;
            ids_out.push(id);

            let is_dir = node.is_dir();
            let mut entry = TreeEntry {
                id,
                relative_path: node.relative_path.clone(),
                name: node.name.clone(),
                kind: node.kind,
                parent,
                children: Vec::new(),
                checked: !is_dir && selected.contains(node.relative_path.as_str()),
                expanded: is_dir && expanded_dirs.contains(&node.relative_path),
            };
            self.path_to_entry_id.insert(node.relative_path.clone(), id);

            let mut child_ids = Vec::with_capacity(node.children.len());
            let children = self.insert_nodes_recursive(
                &node.children,
                Some(id),
                selected,
                expanded_dirs,
                &mut child_ids,
            );
            entry.children = child_ids;

            descriptors.push(TreeItemDescriptor {
                id,
                text: entry.display_text(),
                is_folder: is_dir,
                state: CheckState::from_checked(entry.checked),
                expanded: entry.expanded,
                children,
            });
            self.entries.insert(id, entry);
        }
        descriptors
    }

    /*
     * Focus moved inside the tree. Selecting an entry takes focus away from the
     * list; losing the tree selection only matters if the tree had focus.
     */
    pub fn focus_tree_entry(&mut self, selected: Option<EntryId>) -> Vec<UiCommand> {
        let mut commands = Vec::new();
        match selected.filter(|id| self.entries.contains_key(id)) {
            Some(id) => {
                if matches!(self.focus, FocusLocus::ListEntry(_)) {
                    commands.push(UiCommand::ClearListSelection);
                }
                self.focus = FocusLocus::TreeEntry(id);
                commands.extend(self.cross_highlight());
            }
            None => {
                if self.has_tree_focus() {
                    self.focus = FocusLocus::Nothing;
                    commands.extend(self.cross_highlight());
                }
            }
        }
        commands.extend(self.button_state_commands());
        commands
    }

    pub fn focus_list_entry(&mut self, selected: Option<usize>) -> Vec<UiCommand> {
        let mut commands = Vec::new();
        match selected.filter(|index| *index < self.ordered_selection.len()) {
            Some(index) => {
                if self.has_tree_focus() {
                    commands.push(UiCommand::ClearTreeSelection);
                }
                self.focus = FocusLocus::ListEntry(index);
                commands.extend(self.cross_highlight());
            }
            None => {
                if matches!(self.focus, FocusLocus::ListEntry(_)) {
                    self.focus = FocusLocus::Nothing;
                    commands.extend(self.cross_highlight());
                }
            }
        }
        commands.extend(self.button_state_commands());
        commands
    }

    // Toggles the focused tree entry. Does nothing without tree focus.
    pub fn toggle_selection(&mut self) -> Vec<UiCommand> {
        match self.focus {
            FocusLocus::TreeEntry(id) => self.toggle_entry(id),
            _ => Vec::new(),
        }
    }

    /*
     * Adds a file to the end of the merge list, or removes it if already
     * listed. Directories are ignored.
     */
    pub fn toggle_entry(&mut self, id: EntryId) -> Vec<UiCommand> {
        let Some(entry) = self.entries.get(&id) else {
            return Vec::new();
        };
        if !entry.is_file() {
            return Vec::new();
        }
        let path = entry.relative_path.clone();

        let mut commands = Vec::new();
        let now_checked = match self.ordered_selection.iter().position(|p| *p == path) {
            Some(index) => {
                self.ordered_selection.remove(index);
                self.shift_list_focus_after_removal(index);
                commands.push(UiCommand::ListRemove { index });
                false
            }
            None => {
                self.ordered_selection.push(path.clone());
                commands.push(UiCommand::ListInsert {
                    index: self.ordered_selection.len() - 1,
                    text: path.clone(),
                });
                true
            }
        };
        log::debug!("SelectionSynchronizer: Toggled '{path}' to checked={now_checked}.");

        commands.extend(self.set_entry_checked(id, now_checked));
        commands.extend(self.cross_highlight());
        commands.extend(self.button_state_commands());
        commands
    }

    pub fn move_focused(&mut self, direction: MoveDirection) -> Vec<UiCommand> {
        match self.focus {
            FocusLocus::ListEntry(index) => self.move_selection(index, direction),
            _ => Vec::new(),
        }
    }

    /*
     * Moves the list entry at `index` one step. Nothing happens at the
     * boundaries. The list is updated with a remove/insert splice and the
     * moved row stays selected.
     */
    pub fn move_selection(&mut self, index: usize, direction: MoveDirection) -> Vec<UiCommand> {
        let len = self.ordered_selection.len();
        if index >= len {
            return Vec::new();
        }
        let new_index = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < len => index + 1,
            _ => return Vec::new(),
        };

        let path = self.ordered_selection.remove(index);
        self.ordered_selection.insert(new_index, path.clone());
        self.focus = FocusLocus::ListEntry(new_index);

        let mut commands = vec![
            UiCommand::ListRemove { index },
            UiCommand::ListInsert {
                index: new_index,
                text: path,
            },
            UiCommand::ListSelect { index: new_index },
        ];
        commands.extend(self.cross_highlight());
        commands.extend(self.button_state_commands());
        commands
    }

    pub fn remove_focused(&mut self) -> Vec<UiCommand> {
        match self.focus {
            FocusLocus::ListEntry(index) => self.remove_selection(index),
            _ => Vec::new(),
        }
    }

    // Drops the list entry at `index`, unticks it in the tree and clears focus.
    pub fn remove_selection(&mut self, index: usize) -> Vec<UiCommand> {
        if index >= self.ordered_selection.len() {
            return Vec::new();
        }
        let path = self.ordered_selection.remove(index);
        let mut commands = vec![UiCommand::ListRemove { index }];

        if let Some(id) = self.entry_id_for_path(&path) {
            commands.extend(self.set_entry_checked(id, false));
        }

        commands.push(UiCommand::ClearListSelection);
        self.focus = FocusLocus::Nothing;
        commands.extend(self.cross_highlight());
        commands.extend(self.button_state_commands());
        commands
    }

    /*
     * Re-derives the cross-highlight from the current focus. The previous
     * highlight is always cleared first; a focus without counterpart simply
     * ends up with no highlight.
     */
    pub fn cross_highlight(&mut self) -> Vec<UiCommand> {
        let mut commands = vec![UiCommand::ClearHighlights];
        self.highlight = None;

        match self.focus {
            FocusLocus::Nothing => {}
            FocusLocus::TreeEntry(id) => {
                let Some(entry) = self.entries.get(&id) else {
                    return commands;
                };
                if !entry.is_file() {
                    return commands;
                }
                if let Some(index) = self
                    .ordered_selection
                    .iter()
                    .position(|p| *p == entry.relative_path)
                {
                    self.highlight = Some(CrossHighlight::ListRow(index));
                    commands.push(UiCommand::HighlightListRow { index });
                }
            }
            FocusLocus::ListEntry(index) => {
                let Some(path) = self.ordered_selection.get(index) else {
                    return commands;
                };
                if let Some(id) = self.entry_id_for_path(path) {
                    self.highlight = Some(CrossHighlight::TreeEntry(id));
                    commands.push(UiCommand::HighlightTreeItem { id });
                    commands.push(UiCommand::EnsureTreeItemVisible { id });
                }
            }
        }
        commands
    }

    // Records a directory being opened or closed in the tree control.
    pub fn set_directory_expanded(&mut self, id: EntryId, expanded: bool) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) if entry.kind == EntryKind::Directory => {
                entry.expanded = expanded;
                true
            }
            _ => false,
        }
    }

    pub fn expanded_directories(&self) -> BTreeSet<String> {
        self.entries
            .values()
            .filter(|e| e.kind == EntryKind::Directory && e.expanded)
            .map(|e| e.relative_path.clone())
            .collect()
    }

    /*
     * Persists the merge list and the live expansion state through the
     * selection store and reports success on the status line.
     */
    pub fn commit(
        &self,
        store: &dyn SelectionStoreOperations,
        root: &Path,
    ) -> Result<Vec<UiCommand>, SelectionStoreError> {
        let expanded = self.expanded_directories();
        store.save_selection(root, &self.ordered_selection, &expanded)?;
        log::info!(
            "SelectionSynchronizer: Committed {} files for {root:?}.",
            self.ordered_selection.len()
        );
        Ok(vec![UiCommand::UpdateStatus {
            text: STATUS_SELECTION_SAVED.to_string(),
        }])
    }

    pub fn button_state_commands(&self) -> Vec<UiCommand> {
        let list_enabled = matches!(self.focus, FocusLocus::ListEntry(_));
        let (tree_enabled, label) = match self.focus {
            FocusLocus::TreeEntry(id) => match self.entries.get(&id) {
                Some(entry) if entry.is_file() => {
                    if entry.checked {
                        (true, TREE_ACTION_REMOVE_LABEL)
                    } else {
                        (true, TREE_ACTION_ADD_LABEL)
                    }
                }
                _ => (false, TREE_ACTION_ADD_LABEL),
            },
            _ => (false, TREE_ACTION_ADD_LABEL),
        };
        vec![
            UiCommand::SetListButtonsEnabled {
                enabled: list_enabled,
            },
            UiCommand::SetTreeActionButton {
                enabled: tree_enabled,
                label: label.to_string(),
            },
        ]
    }

    fn set_entry_checked(&mut self, id: EntryId, checked: bool) -> Option<UiCommand> {
        let entry = self.entries.get_mut(&id).filter(|e| e.is_file())?;
        entry.checked = checked;
        Some(UiCommand::UpdateTreeItem {
            id,
            text: entry.display_text(),
            state: CheckState::from_checked(checked),
        })
    }

    fn shift_list_focus_after_removal(&mut self, removed_index: usize) {
        if let FocusLocus::ListEntry(focused) = self.focus {
            self.focus = if focused == removed_index {
                FocusLocus::Nothing
            } else if focused > removed_index {
                FocusLocus::ListEntry(focused - 1)
            } else {
                FocusLocus::ListEntry(focused)
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> FileNode {
        FileNode::new_test(path, EntryKind::File, Vec::new())
    }

    fn dir(path: &str, children: Vec<FileNode>) -> FileNode {
        FileNode::new_test(path, EntryKind::Directory, children)
    }

    fn sample_tree() -> Vec<FileNode> {
        vec![
            dir(
                "src",
                vec![dir("src/util", vec![file("src/util/u.py")]), file("src/a.py"), file("src/b.py")],
            ),
            file("main.py"),
        ]
    }

    fn loaded(selected: &[&str], expanded: &[&str]) -> LoadedSelection {
        LoadedSelection {
            selected_files: selected.iter().map(|s| s.to_string()).collect(),
            expanded_dirs: expanded.iter().map(|s| s.to_string()).collect(),
            status: None,
        }
    }

    fn built(selected: &[&str], expanded: &[&str]) -> SelectionSynchronizer {
        let mut sync = SelectionSynchronizer::new();
        sync.populate_from_nodes(&sample_tree(), &loaded(selected, expanded));
        sync
    }

    fn id(sync: &SelectionSynchronizer, path: &str) -> EntryId {
        sync.entry_id_for_path(path).unwrap()
    }

    fn list_edits(commands: &[UiCommand]) -> Vec<&UiCommand> {
        commands
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    UiCommand::ListInsert { .. }
                        | UiCommand::ListRemove { .. }
                        | UiCommand::ListSelect { .. }
                        | UiCommand::ReplaceListItems { .. }
                )
            })
            .collect()
    }

    #[test]
    fn test_populate_seeds_checked_and_expanded_states() {
        // Arrange & Act
        let mut sync = SelectionSynchronizer::new();
        let commands = sync.populate_from_nodes(&sample_tree(), &loaded(&["src/b.py"], &["src"]));

        // Assert
        let src = sync.entry(id(&sync, "src")).unwrap();
        assert!(src.expanded);
        assert!(!sync.entry(id(&sync, "src/util")).unwrap().expanded);
        assert!(sync.entry(id(&sync, "src/b.py")).unwrap().checked);
        assert!(!sync.entry(id(&sync, "src/a.py")).unwrap().checked);
        assert_eq!(sync.root_entries().len(), 2);
        assert_eq!(src.children.len(), 3);

        let UiCommand::PopulateTree { items } = &commands[0] else {
            panic!("First command should populate the tree, got {:?}", commands[0]);
        };
        assert_eq!(items[0].text, "src");
        assert!(items[0].expanded);
        assert_eq!(items[0].children[2].text, "☑ b.py");
        assert_eq!(items[0].children[2].state, CheckState::Checked);
        assert_eq!(items[1].text, "☐ main.py");
        assert_eq!(
            commands[1],
            UiCommand::ReplaceListItems {
                items: vec!["src/b.py".to_string()]
            }
        );
    }

    #[test]
    fn test_toggle_appends_then_removes() {
        // Arrange
        let mut sync = built(&["main.py"], &[]);
        let a = id(&sync, "src/a.py");
        sync.focus_tree_entry(Some(a));

        // Act
        let added = sync.toggle_selection();

        // Assert
        assert_eq!(sync.ordered_selection(), &["main.py", "src/a.py"]);
        assert!(sync.entry(a).unwrap().checked);
        assert!(added.contains(&UiCommand::ListInsert {
            index: 1,
            text: "src/a.py".to_string()
        }));
        assert!(added.contains(&UiCommand::HighlightListRow { index: 1 }));
        assert!(added.contains(&UiCommand::SetTreeActionButton {
            enabled: true,
            label: TREE_ACTION_REMOVE_LABEL.to_string()
        }));

        // Act
        let removed = sync.toggle_selection();

        // Assert
        assert_eq!(sync.ordered_selection(), &["main.py"]);
        assert!(!sync.entry(a).unwrap().checked);
        assert!(removed.contains(&UiCommand::ListRemove { index: 1 }));
        assert!(!removed.iter().any(|c| matches!(c, UiCommand::HighlightListRow { .. })));
    }

    #[test]
    fn test_toggle_twice_restores_every_file() {
        for path in ["src/util/u.py", "src/a.py", "src/b.py", "main.py"] {
            let mut sync = built(&["src/b.py", "main.py"], &[]);
            let before = sync.ordered_selection().to_vec();
            let target = id(&sync, path);
            let checked_before = sync.entry(target).unwrap().checked;

            sync.toggle_entry(target);
            sync.toggle_entry(target);

            let after_checked = sync.entry(target).unwrap().checked;
            if before.contains(&path.to_string()) {
                // A listed file goes to the end when re-added; membership and
                // checked state are what must come back.
                let mut a = before.clone();
                let mut b = sync.ordered_selection().to_vec();
                a.sort();
                b.sort();
                assert_eq!(a, b);
            } else {
                assert_eq!(sync.ordered_selection(), before.as_slice());
            }
            assert_eq!(after_checked, checked_before, "checked state for {path}");
        }
    }

    #[test]
    fn test_toggle_on_directory_or_without_focus_is_noop() {
        let mut sync = built(&[], &[]);
        assert!(sync.toggle_selection().is_empty());

        sync.focus_tree_entry(Some(id(&sync, "src")));
        assert!(sync.toggle_selection().is_empty());
        assert!(sync.ordered_selection().is_empty());
    }

    #[test]
    fn test_move_uses_splice_and_tracks_focus() {
        // Arrange
        let mut sync = built(&["main.py", "src/a.py", "src/b.py"], &[]);
        sync.focus_list_entry(Some(2));

        // Act
        let commands = sync.move_focused(MoveDirection::Up);

        // Assert
        assert_eq!(sync.ordered_selection(), &["main.py", "src/b.py", "src/a.py"]);
        assert_eq!(sync.focus(), FocusLocus::ListEntry(1));
        assert_eq!(
            list_edits(&commands),
            vec![
                &UiCommand::ListRemove { index: 2 },
                &UiCommand::ListInsert {
                    index: 1,
                    text: "src/b.py".to_string()
                },
                &UiCommand::ListSelect { index: 1 },
            ]
        );
        assert_eq!(
            sync.current_highlight(),
            Some(CrossHighlight::TreeEntry(id(&sync, "src/b.py")))
        );
    }

    #[test]
    fn test_move_down_then_up_restores_order() {
        let mut sync = built(&["main.py", "src/a.py", "src/b.py"], &[]);
        sync.move_selection(0, MoveDirection::Down);
        assert_eq!(sync.ordered_selection(), &["src/a.py", "main.py", "src/b.py"]);
        sync.move_selection(1, MoveDirection::Up);
        assert_eq!(sync.ordered_selection(), &["main.py", "src/a.py", "src/b.py"]);
    }

    #[test]
    fn test_move_at_boundaries_is_noop() {
        let mut sync = built(&["main.py", "src/a.py"], &[]);
        assert!(sync.move_selection(0, MoveDirection::Up).is_empty());
        assert!(sync.move_selection(1, MoveDirection::Down).is_empty());
        assert!(sync.move_selection(7, MoveDirection::Up).is_empty());
        assert_eq!(sync.ordered_selection(), &["main.py", "src/a.py"]);
    }

    #[test]
    fn test_remove_unchecks_tree_entry_and_resets_focus() {
        // Arrange
        let mut sync = built(&["main.py", "src/a.py", "src/b.py"], &[]);
        sync.focus_list_entry(Some(1));

        // Act
        let commands = sync.remove_focused();

        // Assert
        assert_eq!(sync.ordered_selection(), &["main.py", "src/b.py"]);
        let a = id(&sync, "src/a.py");
        assert!(!sync.entry(a).unwrap().checked);
        assert!(commands.contains(&UiCommand::UpdateTreeItem {
            id: a,
            text: "☐ a.py".to_string(),
            state: CheckState::Unchecked
        }));
        assert_eq!(sync.focus(), FocusLocus::Nothing);
        assert_eq!(sync.current_highlight(), None);
        assert!(commands.contains(&UiCommand::SetListButtonsEnabled { enabled: false }));
    }

    #[test]
    fn test_remove_of_path_missing_from_tree_still_removes() {
        let mut sync = built(&["gone/elsewhere.py", "main.py"], &[]);
        let commands = sync.remove_selection(0);
        assert_eq!(sync.ordered_selection(), &["main.py"]);
        assert!(!commands.iter().any(|c| matches!(c, UiCommand::UpdateTreeItem { .. })));
    }

    #[test]
    fn test_cross_highlight_from_tree_and_list() {
        // Arrange
        let mut sync = built(&["main.py", "src/a.py"], &[]);

        // Act: tree focus on a listed file highlights its row.
        let commands = sync.focus_tree_entry(Some(id(&sync, "src/a.py")));

        // Assert
        let clear_pos = commands
            .iter()
            .position(|c| *c == UiCommand::ClearHighlights)
            .unwrap();
        let row_pos = commands
            .iter()
            .position(|c| *c == UiCommand::HighlightListRow { index: 1 })
            .unwrap();
        assert!(clear_pos < row_pos, "Old highlights are cleared first.");

        // Act: list focus highlights the tree entry and takes the tree selection away.
        let commands = sync.focus_list_entry(Some(0));

        // Assert
        let main = id(&sync, "main.py");
        assert_eq!(commands[0], UiCommand::ClearTreeSelection);
        assert!(commands.contains(&UiCommand::HighlightTreeItem { id: main }));
        assert!(commands.contains(&UiCommand::EnsureTreeItemVisible { id: main }));
        assert_eq!(sync.current_highlight(), Some(CrossHighlight::TreeEntry(main)));
    }

    #[test]
    fn test_cross_highlight_without_counterpart_is_empty() {
        let mut sync = built(&["filtered/out.py"], &[]);

        sync.focus_tree_entry(Some(id(&sync, "main.py")));
        assert_eq!(sync.current_highlight(), None);

        sync.focus_list_entry(Some(0));
        assert_eq!(sync.current_highlight(), None);
        assert_eq!(sync.cross_highlight(), vec![UiCommand::ClearHighlights]);
    }

    #[test]
    fn test_tree_deselect_does_not_steal_list_focus() {
        let mut sync = built(&["main.py"], &[]);
        sync.focus_list_entry(Some(0));

        sync.focus_tree_entry(None);

        assert_eq!(sync.focus(), FocusLocus::ListEntry(0));
    }

    #[test]
    fn test_expanded_directories_follow_live_state() {
        let mut sync = built(&[], &["src"]);
        let util = id(&sync, "src/util");
        let src = id(&sync, "src");

        assert!(sync.set_directory_expanded(util, true));
        assert!(sync.set_directory_expanded(src, false));
        assert!(!sync.set_directory_expanded(id(&sync, "main.py"), true));

        assert_eq!(
            sync.expanded_directories(),
            BTreeSet::from(["src/util".to_string()])
        );
    }
}
