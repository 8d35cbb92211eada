use super::ignore_rules::IgnoreRuleSet;
use super::models::FileNode;
use super::path_utils;
use super::selection_store::{MERGED_OUTPUT_FILENAME, SIDECAR_FILENAME};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/*
 * This module scans a project directory into the tree shown by the file
 * browser. Only "qualifying" files (whose extension is in the active set) are
 * kept, and a directory appears only when something qualifying lives somewhere
 * beneath it. Ignore rules, the sidecar file and the merged output file are
 * skipped at every level.
 */

#[derive(Debug)]
pub enum FileSystemError {
    Io(io::Error),
    Walk(walkdir::Error),
    InvalidPath(PathBuf),
}

impl From<io::Error> for FileSystemError {
    fn from(err: io::Error) -> Self {
        FileSystemError::Io(err)
    }
}

impl From<walkdir::Error> for FileSystemError {
    fn from(err: walkdir::Error) -> Self {
        FileSystemError::Walk(err)
    }
}

impl std::fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSystemError::Io(e) => write!(f, "I/O error: {e}"),
            FileSystemError::Walk(e) => write!(f, "Directory walk error: {e}"),
            FileSystemError::InvalidPath(p) => write!(f, "Invalid path: {p:?}"),
        }
    }
}

impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileSystemError::Io(e) => Some(e),
            FileSystemError::Walk(e) => Some(e),
            FileSystemError::InvalidPath(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileSystemError>;

/*
 * Abstracts building the project tree so the application logic can be tested
 * against canned trees.
 */
pub trait FileSystemScannerOperations: Send + Sync {
    fn scan_directory(
        &self,
        root_path: &Path,
        rules: &IgnoreRuleSet,
        extensions: &HashSet<String>,
    ) -> Result<Vec<FileNode>>;
}

pub struct CoreFileSystemScanner {}

impl CoreFileSystemScanner {
    pub fn new() -> Self {
        CoreFileSystemScanner {}
    }
}

impl Default for CoreFileSystemScanner {
    fn default() -> Self {
        Self::new()
    }
}

/*
 * The extension of `name` in the form stored in the config (".py"), lowercased.
 * Names without an extension, including dotfiles like ".gitignore", give "".
 */
pub fn dotted_extension(name: &str) -> String {
    match Path::new(name).extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy().to_lowercase()),
        None => String::new(),
    }
}

pub fn is_qualifying_file_name(name: &str, extensions: &HashSet<String>) -> bool {
    extensions.contains(&dotted_extension(name))
}

fn is_reserved_name(name: &str) -> bool {
    name == SIDECAR_FILENAME || name == MERGED_OUTPUT_FILENAME
}

/*
 * Directories first, then files; each group case-insensitively by name. Only
 * valid on yielded entries, whose file type already follows symlinks.
 */
fn compare_entries(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_is_file = !a.file_type().is_dir();
    let b_is_file = !b.file_type().is_dir();
    let a_name = a.file_name().to_string_lossy();
    let b_name = b.file_name().to_string_lossy();
    a_is_file
        .cmp(&b_is_file)
        .then_with(|| a_name.to_lowercase().cmp(&b_name.to_lowercase()))
        .then_with(|| a_name.cmp(&b_name))
}

struct ScanContext<'a> {
    root: &'a Path,
    rules: &'a IgnoreRuleSet,
    extensions: &'a HashSet<String>,
    // Canonical paths of the directories currently being walked.
    ancestor_dirs: Vec<PathBuf>,
}

impl ScanContext<'_> {
    fn is_skipped(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        if is_reserved_name(&name) {
            return true;
        }
        match path_utils::to_relative_posix(entry.path(), self.root) {
            Some(relative) => self
                .rules
                .is_relative_ignored(&relative, entry.file_type().is_dir()),
            None => false,
        }
    }

    fn is_qualifying_file(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_file()
            && is_qualifying_file_name(&entry.file_name().to_string_lossy(), self.extensions)
    }

    /*
     * Recursive pre-check: does `dir` hold at least one non-ignored qualifying
     * file at any depth? Unreadable subtrees count as empty.
     */
    fn has_relevant_files(&self, dir: &Path) -> bool {
        WalkDir::new(dir)
            .min_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| !self.is_skipped(entry))
            .filter_map(|entry_result| match entry_result {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::trace!("FileSystemScanner: Skipping unreadable entry under {dir:?}: {e}");
                    None
                }
            })
            .any(|entry| self.is_qualifying_file(&entry))
    }

    fn list_children(&self, dir: &Path) -> Vec<DirEntry> {
        let mut children = Vec::new();
        for entry_result in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            match entry_result {
                Ok(entry) => children.push(entry),
                Err(e) => log::warn!("FileSystemScanner: Cannot read entry in {dir:?}: {e}"),
            }
        }
        children.sort_by(compare_entries);
        children
    }

    fn walk(&mut self, dir: &Path) -> Vec<FileNode> {
        // Symlinked directories are followed unless they lead back into the
        // directory chain currently being walked.
        let canonical = dir.canonicalize().ok();
        if let Some(canonical) = &canonical {
            if self.ancestor_dirs.contains(canonical) {
                log::warn!("FileSystemScanner: Directory cycle at {dir:?}; not descending again.");
                return Vec::new();
            }
            self.ancestor_dirs.push(canonical.clone());
        }

        let nodes = self.walk_children(dir);

        if canonical.is_some() {
            self.ancestor_dirs.pop();
        }
        nodes
    }

    fn walk_children(&mut self, dir: &Path) -> Vec<FileNode> {
        let mut nodes = Vec::new();
        for entry in self.list_children(dir) {
            if self.is_skipped(&entry) {
                continue;
            }
            let Some(relative) = path_utils::to_relative_posix(entry.path(), self.root) else {
                continue;
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().is_dir() {
                if self.has_relevant_files(entry.path()) {
                    let children = self.walk(entry.path());
                    // Empty only when the link closes a cycle.
                    if children.is_empty() {
                        continue;
                    }
                    nodes.push(FileNode::new_directory(
                        entry.path().to_path_buf(),
                        relative,
                        name,
                        children,
                    ));
                }
            } else if self.is_qualifying_file(&entry) {
                nodes.push(FileNode::new_file(entry.path().to_path_buf(), relative, name));
            }
        }
        nodes
    }
}

impl FileSystemScannerOperations for CoreFileSystemScanner {
    /*
     * Builds the browsable tree under `root_path`, depth first. Within each
     * directory the subdirectories come first, then the files, both sorted
     * case-insensitively.
     */
    fn scan_directory(
        &self,
        root_path: &Path,
        rules: &IgnoreRuleSet,
        extensions: &HashSet<String>,
    ) -> Result<Vec<FileNode>> {
        if !root_path.is_dir() {
            return Err(FileSystemError::InvalidPath(root_path.to_path_buf()));
        }
        log::debug!(
            "FileSystemScanner: Scanning {root_path:?} with {} ignore patterns and {} active extensions.",
            rules.patterns().len(),
            extensions.len()
        );
        // An unreadable root is an error; unreadable entries below it are only logged.
        if let Some(Err(e)) = WalkDir::new(root_path).min_depth(1).max_depth(1).into_iter().next() {
            log::error!("FileSystemScanner: Cannot list {root_path:?}: {e}");
            return Err(e.into());
        }
        let mut context = ScanContext {
            root: root_path,
            rules,
            extensions,
            ancestor_dirs: Vec::new(),
        };
        let nodes = context.walk(root_path);
        log::debug!(
            "FileSystemScanner: Scan complete. Found {} top-level entries for {root_path:?}.",
            nodes.len()
        );
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::EntryKind;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    fn extensions(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn relative_paths(nodes: &[FileNode]) -> Vec<String> {
        let mut out = Vec::new();
        for node in nodes {
            out.push(node.relative_path.clone());
            out.extend(relative_paths(&node.children));
        }
        out
    }

    fn scan(root: &Path, rules: &IgnoreRuleSet, exts: &[&str]) -> Vec<FileNode> {
        CoreFileSystemScanner::new()
            .scan_directory(root, rules, &extensions(exts))
            .unwrap()
    }

    #[test]
    fn test_only_active_extensions_are_listed() -> Result<()> {
        // Arrange
        let dir = tempdir()?;
        touch(dir.path(), "src/a.py");
        touch(dir.path(), "src/b.txt");

        // Act
        let nodes = scan(dir.path(), &IgnoreRuleSet::default(), &[".py"]);

        // Assert
        assert_eq!(relative_paths(&nodes), vec!["src", "src/a.py"]);
        assert_eq!(nodes[0].kind, EntryKind::Directory);
        assert_eq!(nodes[0].children[0].kind, EntryKind::File);
        Ok(())
    }

    #[test]
    fn test_directory_without_qualifying_files_is_hidden() {
        // Arrange
        let dir = tempdir().unwrap();
        touch(dir.path(), "docs/readme.txt");
        touch(dir.path(), "logs/run.py");
        touch(dir.path(), "deep/er/still/nothing.md");
        touch(dir.path(), "keep/x.py");
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        let rules = IgnoreRuleSet::from_patterns(["logs/"]);

        // Act
        let nodes = scan(dir.path(), &rules, &[".py"]);

        // Assert
        assert_eq!(relative_paths(&nodes), vec!["keep", "keep/x.py"]);
    }

    #[test]
    fn test_ordering_directories_first_then_case_insensitive() {
        // Arrange
        let dir = tempdir().unwrap();
        touch(dir.path(), "b.py");
        touch(dir.path(), "A.py");
        touch(dir.path(), "zeta/z.py");
        touch(dir.path(), "Alpha/a.py");
        touch(dir.path(), "c.PY");

        // Act
        let nodes = scan(dir.path(), &IgnoreRuleSet::default(), &[".py"]);

        // Assert
        let top: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(top, vec!["Alpha", "zeta", "A.py", "b.py", "c.PY"]);
    }

    #[test]
    fn test_ignored_files_and_reserved_names_are_skipped() {
        // Arrange
        let dir = tempdir().unwrap();
        touch(dir.path(), "main.py");
        touch(dir.path(), "scratch.py");
        touch(dir.path(), "pkg/scratch.py");
        touch(dir.path(), MERGED_OUTPUT_FILENAME);
        fs::write(dir.path().join(SIDECAR_FILENAME), "{}").unwrap();
        let rules = IgnoreRuleSet::from_patterns(["scratch.py"]);

        // Act
        let nodes = scan(dir.path(), &rules, &[".py", ".txt", ""]);

        // Assert
        assert_eq!(relative_paths(&nodes), vec!["main.py"]);
    }

    #[test]
    fn test_anchored_rule_only_hides_top_level_directory() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "build/gen.py");
        touch(dir.path(), "src/build/real.py");
        let rules = IgnoreRuleSet::from_patterns(["/build"]);

        let nodes = scan(dir.path(), &rules, &[".py"]);

        assert_eq!(
            relative_paths(&nodes),
            vec!["src", "src/build", "src/build/real.py"]
        );
    }

    #[test]
    fn test_invalid_root_path() {
        let result = CoreFileSystemScanner::new().scan_directory(
            Path::new("this_path_does_not_exist_hopefully"),
            &IgnoreRuleSet::default(),
            &extensions(&[".py"]),
        );
        assert!(matches!(result, Err(FileSystemError::InvalidPath(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_nested_symlink_does_not_hide_real_directory() {
        // Arrange
        let dir = tempdir().unwrap();
        touch(dir.path(), "a/own.py");
        touch(dir.path(), "zlib/z.py");
        std::os::unix::fs::symlink(dir.path().join("zlib"), dir.path().join("a/vendored")).unwrap();

        // Act
        let nodes = scan(dir.path(), &IgnoreRuleSet::default(), &[".py"]);

        // Assert
        assert_eq!(
            relative_paths(&nodes),
            vec!["a", "a/vendored", "a/vendored/z.py", "a/own.py", "zlib", "zlib/z.py"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_sibling_symlink_sorts_as_directory_with_contents() {
        // Arrange
        let dir = tempdir().unwrap();
        touch(dir.path(), "src/a.py");
        touch(dir.path(), "top.py");
        std::os::unix::fs::symlink(dir.path().join("src"), dir.path().join("alias")).unwrap();

        // Act
        let nodes = scan(dir.path(), &IgnoreRuleSet::default(), &[".py"]);

        // Assert
        assert_eq!(
            relative_paths(&nodes),
            vec!["alias", "alias/a.py", "src", "src/a.py", "top.py"]
        );
        assert_eq!(nodes[0].kind, EntryKind::Directory);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_is_not_listed() {
        // Arrange
        let dir = tempdir().unwrap();
        touch(dir.path(), "pkg/m.py");
        std::os::unix::fs::symlink(dir.path().join("pkg"), dir.path().join("pkg/again")).unwrap();

        // Act
        let nodes = scan(dir.path(), &IgnoreRuleSet::default(), &[".py"]);

        // Assert
        assert_eq!(relative_paths(&nodes), vec!["pkg", "pkg/m.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_root_is_a_walk_error() {
        use std::os::unix::fs::PermissionsExt;

        // Arrange
        let dir = tempdir().unwrap();
        let root = dir.path().join("locked");
        touch(&root, "a.py");
        fs::set_permissions(&root, fs::Permissions::from_mode(0o000)).unwrap();
        let readable_anyway = fs::read_dir(&root).is_ok();

        // Act
        let result = CoreFileSystemScanner::new().scan_directory(
            &root,
            &IgnoreRuleSet::default(),
            &extensions(&[".py"]),
        );

        // Assert
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
        if !readable_anyway {
            assert!(matches!(result, Err(FileSystemError::Walk(_))));
        }
    }

    #[test]
    fn test_dotted_extension() {
        assert_eq!(dotted_extension("a.PY"), ".py");
        assert_eq!(dotted_extension("archive.tar.gz"), ".gz");
        assert_eq!(dotted_extension(".gitignore"), "");
        assert_eq!(dotted_extension("Makefile"), "");
    }
}
