use crate::error::{Error, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pydoc-md.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub templates: TemplateConfig,
}

/// Which files are documented
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Source file extension, without the dot
    pub extension: String,
    /// Glob patterns matched against paths relative to the source root
    pub exclude: Vec<String>,
}

/// What is written into the output root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub notice_file: String,
    pub summary_file: String,
    /// Contents of the notice page
    pub notice: String,
    /// Placeholder for a page without classes
    pub no_classes: String,
    /// Placeholder for a page without functions
    pub no_functions: String,
    pub empty_dirs: EmptyDirs,
    pub on_parse_error: ParseErrorPolicy,
}

/// Template overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub directory: Option<PathBuf>,
}

/// How source directories without documented files are kept out of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptyDirs {
    /// Only descend into directories that hold a source file somewhere below
    #[default]
    Lookahead,
    /// Mirror every directory, then remove the ones left empty
    Prune,
}

/// What happens when a source file fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParseErrorPolicy {
    /// Stop the run at the first invalid file
    #[default]
    Abort,
    /// Leave the file out, warn, and keep going
    Skip,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            extension: "py".to_string(),
            exclude: vec!["**/__pycache__".to_string(), "**/.*".to_string()],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            notice_file: "README.md".to_string(),
            summary_file: "SUMMARY.md".to_string(),
            notice: "> This documentation was generated by `pydoc-md`.\n".to_string(),
            no_classes: "*No classes*".to_string(),
            no_functions: "*No functions*".to_string(),
            empty_dirs: EmptyDirs::default(),
            on_parse_error: ParseErrorPolicy::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from an explicit path, or from the default file when it
    /// exists, or fall back to defaults
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        templates: Option<PathBuf>,
        exclude: Vec<String>,
        prune: bool,
        skip_invalid: bool,
    ) {
        if let Some(dir) = templates {
            self.templates.directory = Some(dir);
        }

        if !exclude.is_empty() {
            self.source.exclude.extend(exclude);
        }

        if prune {
            self.output.empty_dirs = EmptyDirs::Prune;
        }

        if skip_invalid {
            self.output.on_parse_error = ParseErrorPolicy::Skip;
        }
    }

    /// Compiled exclude patterns
    pub fn exclude_patterns(&self) -> Result<Vec<Pattern>> {
        self.source
            .exclude
            .iter()
            .map(|p| Pattern::new(p).map_err(Error::from))
            .collect()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let ext = &self.source.extension;
        if ext.is_empty() {
            return Err(Error::config_validation("source extension must not be empty"));
        }
        if ext.contains('.') || ext.contains('/') || ext.contains('\\') {
            return Err(Error::config_validation(format!(
                "source extension must be a bare extension like \"py\", got {:?}",
                ext
            )));
        }

        for (key, name) in [
            ("notice_file", &self.output.notice_file),
            ("summary_file", &self.output.summary_file),
        ] {
            if name.is_empty() || name.contains('/') || name.contains('\\') {
                return Err(Error::config_validation(format!(
                    "{} must be a plain file name, got {:?}",
                    key, name
                )));
            }
        }

        if self.output.notice_file == self.output.summary_file {
            return Err(Error::config_validation(
                "notice_file and summary_file must differ",
            ));
        }

        self.exclude_patterns()?;
        Ok(())
    }
}
