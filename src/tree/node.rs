// Source directory scanning

use crate::config::Config;
use crate::error::Result;
use crate::tree::fs::{EntryKind, FileSystem};
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Decides which files are sources and which paths are skipped entirely
#[derive(Debug, Clone)]
pub struct SourceFilter {
    extension: String,
    exclude: Vec<Pattern>,
}

impl SourceFilter {
    pub fn new(extension: &str, exclude: Vec<Pattern>) -> Self {
        Self {
            extension: extension.to_string(),
            exclude,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(&config.source.extension, config.exclude_patterns()?))
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether a file name carries the source extension
    pub fn is_source(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .is_some_and(|ext| ext == self.extension.as_str())
    }

    /// Whether a path relative to the source root is excluded
    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

/// One source directory with its sources and subdirectories, both sorted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    /// Path relative to the source root; empty for the root itself
    pub path: PathBuf,
    /// Names of the source files directly inside
    pub files: Vec<String>,
    pub children: Vec<DirectoryNode>,
}

impl DirectoryNode {
    /// Scan the tree below `root`
    pub fn scan<F: FileSystem + ?Sized>(fs: &F, root: &Path, filter: &SourceFilter) -> Result<Self> {
        Self::scan_at(fs, root, PathBuf::new(), filter)
    }

    fn scan_at<F: FileSystem + ?Sized>(
        fs: &F,
        root: &Path,
        relative: PathBuf,
        filter: &SourceFilter,
    ) -> Result<Self> {
        let mut entries = fs.read_dir(&root.join(&relative))?;
        // listing order is up to the file system
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut files = Vec::new();
        let mut children = Vec::new();

        for entry in entries {
            let child_path = relative.join(&entry.name);
            if filter.is_excluded(&child_path) {
                tracing::debug!(path = %child_path.display(), "excluded");
                continue;
            }
            match entry.kind {
                EntryKind::File if filter.is_source(&entry.name) => files.push(entry.name),
                EntryKind::File => {}
                EntryKind::Dir => children.push(Self::scan_at(fs, root, child_path, filter)?),
            }
        }

        Ok(Self {
            path: relative,
            files,
            children,
        })
    }

    /// Directory name; empty for the root
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Whether a source file exists anywhere in this subtree
    pub fn has_sources(&self) -> bool {
        !self.files.is_empty() || self.children.iter().any(DirectoryNode::has_sources)
    }

    /// Number of source files in this subtree
    pub fn source_count(&self) -> usize {
        self.files.len() + self.children.iter().map(DirectoryNode::source_count).sum::<usize>()
    }
}

/// Count source files on disk ahead of a run, for progress reporting.
/// Matches `OsFs` listings: symlinked directories are not entered,
/// symlinked files are counted.
pub fn count_source_files(root: &Path, filter: &SourceFilter) -> Result<usize> {
    let mut count = 0;
    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        entry
            .path()
            .strip_prefix(root)
            .map(|rel| rel.as_os_str().is_empty() || !filter.is_excluded(rel))
            .unwrap_or(true)
    });

    for entry in walker {
        let entry = entry?;
        if entry.path().is_file() && filter.is_source(&entry.file_name().to_string_lossy()) {
            count += 1;
        }
    }

    Ok(count)
}
