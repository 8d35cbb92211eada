use std::path::PathBuf;

// Whether a scanned entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/*
 * A node of the scanned project tree. `relative_path` is root-relative and
 * always uses `/` as separator; it is the key shared with the sidecar file and
 * the merge list. Only directories carry children.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub path: PathBuf,
    pub relative_path: String,
    pub name: String,
    pub kind: EntryKind,
    pub children: Vec<FileNode>,
}

impl FileNode {
    pub fn new_file(path: PathBuf, relative_path: String, name: String) -> Self {
        FileNode {
            path,
            relative_path,
            name,
            kind: EntryKind::File,
            children: Vec::new(),
        }
    }

    pub fn new_directory(
        path: PathBuf,
        relative_path: String,
        name: String,
        children: Vec<FileNode>,
    ) -> Self {
        FileNode {
            path,
            relative_path,
            name,
            kind: EntryKind::Directory,
            children,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    #[cfg(test)]
    pub fn new_test(relative_path: &str, kind: EntryKind, children: Vec<FileNode>) -> Self {
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path)
            .to_string();
        FileNode {
            path: PathBuf::from("/test_root").join(relative_path),
            relative_path: relative_path.to_string(),
            name,
            kind,
            children,
        }
    }
}
