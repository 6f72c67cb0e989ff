// Template set for Markdown pages

use crate::error::Result;
use std::path::Path;
use tera::{Context, Tera};

pub const FILE_TEMPLATE: &str = "file.md";
pub const CLASS_TEMPLATE: &str = "class.md";
pub const FUNCTION_TEMPLATE: &str = "function.md";

const TEMPLATE_EXTENSION: &str = "tera";

const EMBEDDED: [(&str, &str); 3] = [
    (FILE_TEMPLATE, include_str!("../../templates/file.md.tera")),
    (CLASS_TEMPLATE, include_str!("../../templates/class.md.tera")),
    (FUNCTION_TEMPLATE, include_str!("../../templates/function.md.tera")),
];

/// The file, class and function templates, loaded once per run
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Templates shipped with the binary
    pub fn embedded() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(EMBEDDED.to_vec())?;
        Ok(Self { tera })
    }

    /// Embedded templates, overridden by any `file.md.tera`, `class.md.tera`
    /// or `function.md.tera` present in `dir`
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut sources = Vec::with_capacity(EMBEDDED.len());
        for (name, default) in EMBEDDED {
            let path = dir.join(format!("{}.{}", name, TEMPLATE_EXTENSION));
            let source = if path.is_file() {
                tracing::debug!(template = name, path = %path.display(), "using template override");
                std::fs::read_to_string(&path)?
            } else {
                default.to_string()
            };
            sources.push((name, source));
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(sources)?;
        Ok(Self { tera })
    }

    /// Load from an optional override directory
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::embedded(),
        }
    }

    /// Render the page of one source file
    pub fn render_file(&self, filename: &str, classes: &str, functions: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("filename", filename);
        context.insert("classes", classes);
        context.insert("functions", functions);
        Ok(self.tera.render(FILE_TEMPLATE, &context)?)
    }

    /// Render one class block
    pub fn render_class(
        &self,
        signature: &str,
        description: Option<&str>,
        methods: &str,
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert("signature", signature);
        context.insert("description", description.unwrap_or(""));
        context.insert("methods", methods);
        Ok(self.tera.render(CLASS_TEMPLATE, &context)?)
    }

    /// Render one function or method block
    pub fn render_function(
        &self,
        name: &str,
        signature: &str,
        description: Option<&str>,
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert("name", name);
        context.insert("signature", signature);
        context.insert("description", description.unwrap_or(""));
        Ok(self.tera.render(FUNCTION_TEMPLATE, &context)?)
    }
}
