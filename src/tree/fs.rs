// File-system access used by the tree assembler
//
// `OsFs` is the real thing. `MemoryFs` keeps a whole tree in memory so
// traversal and writing can be exercised without touching the disk.

use crate::error::Result;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{Error as IoError, ErrorKind};
use std::path::{Component, Path, PathBuf};

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// One immediate child of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// The file operations the generator needs
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate children of `path`, in no particular order
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Create a single directory; the parent must exist
    fn create_dir(&self, path: &Path) -> Result<()>;

    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Remove an empty directory
    fn remove_dir(&self, path: &Path) -> Result<()>;
}

/// The operating system's file system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    /// Symlinked directories are left out so a link cycle cannot recurse;
    /// symlinked files are listed when their target is a regular file.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let kind = if file_type.is_dir() {
                EntryKind::Dir
            } else if file_type.is_file() || entry.path().is_file() {
                EntryKind::File
            } else {
                tracing::debug!(path = %entry.path().display(), "not following symlink");
                continue;
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| {
            IoError::new(e.kind(), format!("{}: {}", path.display(), e)).into()
        })
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        Ok(std::fs::create_dir(path)?)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        std::fs::write(path, contents).map_err(|e| {
            IoError::new(e.kind(), format!("{}: {}", path.display(), e)).into()
        })
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        Ok(std::fs::remove_dir(path)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MemoryNode {
    File(String),
    Dir,
}

/// An in-memory file tree rooted at `/`
#[derive(Debug)]
pub struct MemoryFs {
    nodes: RefCell<BTreeMap<PathBuf, MemoryNode>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(PathBuf::from("/"), MemoryNode::Dir);
        Self {
            nodes: RefCell::new(nodes),
        }
    }

    /// Add a file, creating any missing parent directories
    pub fn with_file(self, path: impl AsRef<Path>, contents: &str) -> Self {
        let path = normalize(path.as_ref());
        self.add_parents(&path);
        self.nodes
            .borrow_mut()
            .insert(path, MemoryNode::File(contents.to_string()));
        self
    }

    /// Add a directory and its parents
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        let path = normalize(path.as_ref());
        self.add_parents(&path);
        self.nodes.borrow_mut().insert(path, MemoryNode::Dir);
        self
    }

    /// Contents of a file, if present
    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        match self.nodes.borrow().get(&normalize(path.as_ref())) {
            Some(MemoryNode::File(contents)) => Some(contents.clone()),
            _ => None,
        }
    }

    /// Every path below `root`, sorted, with directories suffixed by `/`
    pub fn listing(&self, root: impl AsRef<Path>) -> Vec<String> {
        let root = normalize(root.as_ref());
        self.nodes
            .borrow()
            .iter()
            .filter(|(path, _)| **path != root)
            .filter_map(|(path, node)| {
                let relative = path.strip_prefix(&root).ok()?;
                let text = relative.to_string_lossy().replace('\\', "/");
                Some(match node {
                    MemoryNode::Dir => format!("{}/", text),
                    MemoryNode::File(_) => text,
                })
            })
            .collect()
    }

    fn add_parents(&self, path: &Path) {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.ancestors().skip(1) {
            nodes
                .entry(ancestor.to_path_buf())
                .or_insert(MemoryNode::Dir);
        }
    }

    fn node(&self, path: &Path) -> Option<MemoryNode> {
        self.nodes.borrow().get(&normalize(path)).cloned()
    }
}

/// Absolute, `.`-free form of a path so lookups are stable
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    out
}

fn not_found(path: &Path) -> IoError {
    IoError::new(ErrorKind::NotFound, format!("{}: not found", path.display()))
}

impl FileSystem for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.node(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.node(path), Some(MemoryNode::Dir))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let dir = normalize(path);
        if !self.is_dir(&dir) {
            return Err(not_found(path).into());
        }

        // reverse order, so callers cannot rely on the map being sorted
        let mut entries: Vec<DirEntry> = self
            .nodes
            .borrow()
            .iter()
            .filter(|(p, _)| p.parent() == Some(dir.as_path()))
            .filter_map(|(p, node)| {
                let name = p.file_name()?.to_string_lossy().into_owned();
                let kind = match node {
                    MemoryNode::Dir => EntryKind::Dir,
                    MemoryNode::File(_) => EntryKind::File,
                };
                Some(DirEntry { name, kind })
            })
            .collect();
        entries.reverse();
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.node(path) {
            Some(MemoryNode::File(contents)) => Ok(contents),
            Some(MemoryNode::Dir) => Err(IoError::new(
                ErrorKind::Other,
                format!("{}: is a directory", path.display()),
            )
            .into()),
            None => Err(not_found(path).into()),
        }
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        let path = normalize(path);
        if self.exists(&path) {
            return Err(IoError::new(
                ErrorKind::AlreadyExists,
                format!("{}: already exists", path.display()),
            )
            .into());
        }
        match path.parent() {
            Some(parent) if self.is_dir(parent) => {}
            _ => return Err(not_found(&path).into()),
        }
        self.nodes.borrow_mut().insert(path, MemoryNode::Dir);
        Ok(())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let path = normalize(path);
        if self.is_dir(&path) {
            return Err(IoError::new(
                ErrorKind::Other,
                format!("{}: is a directory", path.display()),
            )
            .into());
        }
        match path.parent() {
            Some(parent) if self.is_dir(parent) => {}
            _ => return Err(not_found(&path).into()),
        }
        self.nodes
            .borrow_mut()
            .insert(path, MemoryNode::File(contents.to_string()));
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        let path = normalize(path);
        if !self.is_dir(&path) {
            return Err(not_found(&path).into());
        }
        if !self.read_dir(&path)?.is_empty() {
            return Err(IoError::new(
                ErrorKind::Other,
                format!("{}: directory not empty", path.display()),
            )
            .into());
        }
        self.nodes.borrow_mut().remove(&path);
        Ok(())
    }
}
