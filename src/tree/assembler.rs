// Tree assembler
//
// Walks a scanned `DirectoryNode` depth-first and produces, in write order,
// the mirrored directories and pages plus the navigation entries. Nothing is
// written here; the output tree only exists as data until the generator
// applies it.

use crate::config::{EmptyDirs, OutputConfig, ParseErrorPolicy};
use crate::error::Result;
use crate::output::page::PageRenderer;
use crate::output::summary::SummaryEntry;
use crate::parser::{partition, PythonParser};
use crate::tree::fs::FileSystem;
use crate::tree::node::DirectoryNode;
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extension of generated pages
pub const PAGE_EXTENSION: &str = "md";

/// Something to create below the output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEntry {
    /// Mirrored directory, relative to the output root
    Dir(PathBuf),
    /// Rendered page, relative to the output root
    Page { path: PathBuf, contents: String },
}

/// A source file left out because it did not parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub message: String,
}

/// Everything one traversal produced
#[derive(Debug, Default)]
pub struct Assembly {
    /// Directories always precede the entries beneath them
    pub outputs: Vec<OutputEntry>,
    pub summary: Vec<SummaryEntry>,
    pub skipped: Vec<SkippedFile>,
}

impl Assembly {
    pub fn pages(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.outputs.iter().filter_map(|entry| match entry {
            OutputEntry::Page { path, contents } => Some((path.as_path(), contents.as_str())),
            OutputEntry::Dir(_) => None,
        })
    }

    pub fn dirs(&self) -> impl Iterator<Item = &Path> {
        self.outputs.iter().filter_map(|entry| match entry {
            OutputEntry::Dir(path) => Some(path.as_path()),
            OutputEntry::Page { .. } => None,
        })
    }
}

enum FileOutcome {
    Documented { entry: SummaryEntry, output: OutputEntry },
    Skipped(SkippedFile),
}

/// Builds pages and navigation for a source tree
pub struct Assembler<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    source_root: &'a Path,
    parser: PythonParser,
    renderer: &'a PageRenderer,
    empty_dirs: EmptyDirs,
    on_parse_error: ParseErrorPolicy,
    progress: ProgressBar,
}

impl<'a, F: FileSystem + ?Sized> Assembler<'a, F> {
    pub fn new(
        fs: &'a F,
        source_root: &'a Path,
        renderer: &'a PageRenderer,
        output: &OutputConfig,
    ) -> Result<Self> {
        Ok(Self {
            fs,
            source_root,
            parser: PythonParser::new()?,
            renderer,
            empty_dirs: output.empty_dirs,
            on_parse_error: output.on_parse_error,
            progress: ProgressBar::hidden(),
        })
    }

    /// Report each processed file on `progress`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Assemble the whole tree starting at `root`
    pub fn assemble(&mut self, root: &DirectoryNode) -> Result<Assembly> {
        self.assemble_level(root, 0)
    }

    fn assemble_level(&mut self, node: &DirectoryNode, depth: usize) -> Result<Assembly> {
        let mut assembly = Assembly::default();

        if !node.path.as_os_str().is_empty() {
            assembly.outputs.push(OutputEntry::Dir(node.path.clone()));
        }

        for file in &node.files {
            match self.document_file(node, file, depth)? {
                FileOutcome::Documented { entry, output } => {
                    assembly.summary.push(entry);
                    assembly.outputs.push(output);
                }
                FileOutcome::Skipped(skipped) => assembly.skipped.push(skipped),
            }
        }

        for child in &node.children {
            if self.empty_dirs == EmptyDirs::Lookahead && !child.has_sources() {
                tracing::debug!(dir = %child.path.display(), "no sources below, not mirrored");
                continue;
            }

            let nested = self.assemble_level(child, depth + 1)?;
            assembly.skipped.extend(nested.skipped);

            if !nested.summary.is_empty() {
                assembly.summary.push(SummaryEntry::heading(child.name(), depth));
                assembly.summary.extend(nested.summary);
                assembly.outputs.extend(nested.outputs);
            } else if self.empty_dirs == EmptyDirs::Prune {
                // created, then removed again by the pruning pass
                assembly.outputs.extend(nested.outputs);
            }
        }

        Ok(assembly)
    }

    fn document_file(&mut self, node: &DirectoryNode, file: &str, depth: usize) -> Result<FileOutcome> {
        let source_path = self.source_root.join(&node.path).join(file);
        self.progress.set_message(file.to_string());

        let source = self.fs.read_to_string(&source_path)?;
        let elements = match self.parser.parse_source(&source, &source_path) {
            Ok(elements) => elements,
            Err(err) if err.is_parse() && self.on_parse_error == ParseErrorPolicy::Skip => {
                tracing::warn!("skipping {}: {}", source_path.display(), err);
                self.progress.inc(1);
                return Ok(FileOutcome::Skipped(SkippedFile {
                    path: source_path,
                    message: err.to_string(),
                }));
            }
            Err(err) => return Err(err),
        };

        let (classes, functions) = partition(elements);
        tracing::debug!(
            file = %source_path.display(),
            classes = classes.len(),
            functions = functions.len(),
            "extracted"
        );
        let contents = self.renderer.render(file, &classes, &functions)?;

        let stem = Path::new(file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string());
        let page_path = node.path.join(format!("{}.{}", stem, PAGE_EXTENSION));

        self.progress.inc(1);
        Ok(FileOutcome::Documented {
            entry: SummaryEntry::page(stem, link_path(&page_path), depth),
            output: OutputEntry::Page {
                path: page_path,
                contents,
            },
        })
    }
}

/// Relative link with `/` separators regardless of platform
fn link_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::page::Placeholders;
    use crate::output::templates::Templates;
    use crate::tree::fs::MemoryFs;
    use crate::tree::node::SourceFilter;

    fn renderer() -> PageRenderer {
        PageRenderer::new(Templates::embedded().unwrap(), Placeholders::default())
    }

    fn assemble(fs: &MemoryFs, output: &OutputConfig) -> Result<Assembly> {
        let root = Path::new("/src");
        let tree = DirectoryNode::scan(fs, root, &SourceFilter::new("py", vec![]))?;
        let renderer = renderer();
        let mut assembler = Assembler::new(fs, root, &renderer, output)?;
        assembler.assemble(&tree)
    }

    fn sample_fs() -> MemoryFs {
        MemoryFs::new()
            .with_file("/src/pkg/a.py", "def f(x: int) -> int:\n    return x\n\ndef _g():\n    pass\n")
            .with_file("/src/pkg/sub/b.py", "class C:\n    def m(self):\n        pass\n")
            .with_file("/src/pkg/assets/logo.txt", "")
    }

    #[test]
    fn test_summary_depths() {
        let assembly = assemble(&sample_fs(), &OutputConfig::default()).unwrap();
        let lines: Vec<String> = assembly.summary.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "* [pkg]()",
                "    * [a](pkg/a.md)",
                "    * [sub]()",
                "        * [b](pkg/sub/b.md)",
            ]
        );
    }

    #[test]
    fn test_pages_and_dirs_in_write_order() {
        let assembly = assemble(&sample_fs(), &OutputConfig::default()).unwrap();
        let dirs: Vec<_> = assembly.dirs().map(link_path).collect();
        assert_eq!(dirs, vec!["pkg", "pkg/sub"]);

        let pages: Vec<_> = assembly.pages().map(|(p, _)| link_path(p)).collect();
        assert_eq!(pages, vec!["pkg/a.md", "pkg/sub/b.md"]);

        // every page comes after the directory holding it
        let position = |target: &OutputEntry| assembly.outputs.iter().position(|e| e == target).unwrap();
        let sub_dir = position(&OutputEntry::Dir(PathBuf::from("pkg/sub")));
        let b_page = assembly
            .outputs
            .iter()
            .position(|e| matches!(e, OutputEntry::Page { path, .. } if path == Path::new("pkg/sub/b.md")))
            .unwrap();
        assert!(sub_dir < b_page);
    }

    #[test]
    fn test_page_contents() {
        let assembly = assemble(&sample_fs(), &OutputConfig::default()).unwrap();
        let pages: Vec<_> = assembly.pages().collect();

        let (_, a) = pages[0];
        assert!(a.contains("# a.py"));
        assert!(a.contains("f(x: int) -> int"));
        assert!(!a.contains("_g"));
        assert!(a.contains("*No classes*"));

        let (_, b) = pages[1];
        assert!(b.contains("### class `C`"));
        assert!(b.contains("m(self)"));
        assert!(b.contains("*No functions*"));
    }

    #[test]
    fn test_root_files_at_depth_zero() {
        let fs = MemoryFs::new()
            .with_file("/src/main.py", "def run():\n    pass\n")
            .with_file("/src/lib/util.py", "");
        let assembly = assemble(&fs, &OutputConfig::default()).unwrap();
        let lines: Vec<String> = assembly.summary.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            lines,
            vec!["* [main](main.md)", "* [lib]()", "    * [util](lib/util.md)"]
        );
    }

    #[test]
    fn test_lookahead_skips_sourceless_dirs() {
        let assembly = assemble(&sample_fs(), &OutputConfig::default()).unwrap();
        assert!(!assembly.dirs().any(|d| d.ends_with("assets")));
        assert!(!assembly.summary.iter().any(|e| e.label == "assets"));
    }

    #[test]
    fn test_prune_mode_keeps_sourceless_dirs_for_pruning() {
        let output = OutputConfig {
            empty_dirs: EmptyDirs::Prune,
            ..OutputConfig::default()
        };
        let assembly = assemble(&sample_fs(), &output).unwrap();
        assert!(assembly.dirs().any(|d| d == Path::new("pkg/assets")));
        assert!(!assembly.summary.iter().any(|e| e.label == "assets"));
    }

    #[test]
    fn test_parse_error_aborts_by_default() {
        let fs = sample_fs().with_file("/src/pkg/broken.py", "def oops(:\n");
        let err = assemble(&fs, &OutputConfig::default()).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("broken.py"));
    }

    #[test]
    fn test_parse_error_skipped_when_configured() {
        let fs = sample_fs().with_file("/src/pkg/broken.py", "def oops(:\n");
        let output = OutputConfig {
            on_parse_error: ParseErrorPolicy::Skip,
            ..OutputConfig::default()
        };
        let assembly = assemble(&fs, &output).unwrap();
        assert_eq!(assembly.skipped.len(), 1);
        assert!(assembly.skipped[0].path.ends_with("pkg/broken.py"));
        assert!(!assembly.summary.iter().any(|e| e.label == "broken"));
        assert_eq!(assembly.pages().count(), 2);
    }

    #[test]
    fn test_directory_with_only_skipped_files_is_dropped() {
        let fs = MemoryFs::new()
            .with_file("/src/ok.py", "")
            .with_file("/src/bad/only.py", "class (:\n");
        let output = OutputConfig {
            on_parse_error: ParseErrorPolicy::Skip,
            ..OutputConfig::default()
        };
        let assembly = assemble(&fs, &output).unwrap();
        assert_eq!(assembly.dirs().count(), 0);
        let labels: Vec<_> = assembly.summary.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["ok"]);
    }

    #[test]
    fn test_dotted_file_name_keeps_inner_dots() {
        let fs = MemoryFs::new().with_file("/src/v1.compat.py", "");
        let assembly = assemble(&fs, &OutputConfig::default()).unwrap();
        assert_eq!(assembly.summary[0].to_string(), "* [v1.compat](v1.compat.md)");
    }
}
