// Markdown tree generator
//
// Ties a run together: precondition checks, scanning, assembly, then
// writing pages, the notice page and the navigation index.

use crate::config::{Config, EmptyDirs, OutputConfig};
use crate::error::{Error, Result};
use crate::output::page::{PageRenderer, Placeholders};
use crate::output::summary::render_summary;
use crate::output::templates::Templates;
use crate::tree::assembler::{Assembler, Assembly, OutputEntry, SkippedFile};
use crate::tree::fs::FileSystem;
use crate::tree::node::{DirectoryNode, SourceFilter};
use indicatif::ProgressBar;
use std::path::Path;

/// Outcome of a run
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub pages_written: usize,
    pub directories_created: usize,
    pub directories_pruned: usize,
    pub skipped: Vec<SkippedFile>,
}

impl GenerationReport {
    /// One-line description for the console
    pub fn summary(&self) -> String {
        let mut text = format!(
            "Wrote {} page{} in {} new director{}",
            self.pages_written,
            if self.pages_written == 1 { "" } else { "s" },
            self.directories_created,
            if self.directories_created == 1 { "y" } else { "ies" },
        );
        if self.directories_pruned > 0 {
            text.push_str(&format!(", pruned {} empty", self.directories_pruned));
        }
        if !self.skipped.is_empty() {
            text.push_str(&format!(", skipped {} unparsable", self.skipped.len()));
        }
        text
    }
}

/// Generates the documentation tree for one source root
pub struct DocGenerator<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    config: &'a Config,
    renderer: PageRenderer,
    progress: ProgressBar,
}

impl<'a, F: FileSystem + ?Sized> DocGenerator<'a, F> {
    /// Load templates and prepare a generator
    pub fn new(fs: &'a F, config: &'a Config) -> Result<Self> {
        config.validate()?;
        let templates = Templates::load(config.templates.directory.as_deref())?;
        Ok(Self::with_templates(fs, config, templates))
    }

    /// Prepare a generator around already loaded templates
    pub fn with_templates(fs: &'a F, config: &'a Config, templates: Templates) -> Self {
        Self {
            fs,
            config,
            renderer: PageRenderer::new(templates, Placeholders::from(&config.output)),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Document `source_root` into the existing directory `output_root`
    pub fn generate(&self, source_root: &Path, output_root: &Path) -> Result<GenerationReport> {
        if !self.fs.is_dir(output_root) {
            return Err(Error::OutputDirNotFound(output_root.to_path_buf()));
        }
        if !self.fs.is_dir(source_root) {
            return Err(Error::PathNotFound(source_root.to_path_buf()));
        }

        tracing::info!(
            source = %source_root.display(),
            output = %output_root.display(),
            "generating documentation"
        );

        let filter = SourceFilter::from_config(self.config)?;
        let tree = DirectoryNode::scan(self.fs, source_root, &filter)?;
        tracing::debug!(sources = tree.source_count(), "scanned source tree");

        let assembly = Assembler::new(self.fs, source_root, &self.renderer, &self.config.output)?
            .with_progress(self.progress.clone())
            .assemble(&tree)?;

        check_reserved_names(&assembly, &self.config.output)?;
        let mut report = self.write(output_root, &assembly)?;

        if self.config.output.empty_dirs == EmptyDirs::Prune {
            report.directories_pruned = prune_empty_dirs(self.fs, output_root, &assembly)?;
        }

        let output = &self.config.output;
        self.fs.write(&output_root.join(&output.notice_file), &output.notice)?;
        self.fs.write(
            &output_root.join(&output.summary_file),
            &render_summary(&assembly.summary),
        )?;

        self.progress.finish_and_clear();
        report.skipped = assembly.skipped;
        Ok(report)
    }

    /// Apply the assembled outputs in order
    fn write(&self, output_root: &Path, assembly: &Assembly) -> Result<GenerationReport> {
        let mut report = GenerationReport::default();

        for entry in &assembly.outputs {
            match entry {
                OutputEntry::Dir(relative) => {
                    let dir = output_root.join(relative);
                    if !self.fs.exists(&dir) {
                        self.fs.create_dir(&dir)?;
                        report.directories_created += 1;
                    }
                }
                OutputEntry::Page { path, contents } => {
                    self.fs.write(&output_root.join(path), contents)?;
                    report.pages_written += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Fail when a root page would be overwritten by the notice or the index
fn check_reserved_names(assembly: &Assembly, output: &OutputConfig) -> Result<()> {
    for (key, reserved) in [
        ("notice_file", &output.notice_file),
        ("summary_file", &output.summary_file),
    ] {
        if let Some((page, _)) = assembly.pages().find(|(path, _)| *path == Path::new(reserved)) {
            return Err(Error::config_validation(format!(
                "page {} collides with {} {:?}; rename the source file or set {}",
                page.display(),
                key,
                reserved,
                key
            )));
        }
    }
    Ok(())
}

/// Remove mirrored directories left empty, deepest first, so a parent
/// emptied by removing its children goes too. Returns how many were removed.
pub fn prune_empty_dirs<F: FileSystem + ?Sized>(
    fs: &F,
    output_root: &Path,
    assembly: &Assembly,
) -> Result<usize> {
    let dirs: Vec<&Path> = assembly.dirs().collect();
    let mut removed = 0;

    // pre-order reversed visits children before their parent
    for relative in dirs.into_iter().rev() {
        let dir = output_root.join(relative);
        if fs.is_dir(&dir) && fs.read_dir(&dir)?.is_empty() {
            tracing::debug!(dir = %dir.display(), "pruning empty directory");
            fs.remove_dir(&dir)?;
            removed += 1;
        }
    }

    Ok(removed)
}
