// Page rendering for one source file

use crate::config::OutputConfig;
use crate::error::Result;
use crate::output::templates::Templates;
use crate::parser::{Class, Function};

/// Separator between rendered blocks of the same kind
const BLOCK_SEPARATOR: &str = "\n";

/// Text substituted for a section with nothing in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    pub no_classes: String,
    pub no_functions: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self::from(&OutputConfig::default())
    }
}

impl From<&OutputConfig> for Placeholders {
    fn from(config: &OutputConfig) -> Self {
        Self {
            no_classes: config.no_classes.clone(),
            no_functions: config.no_functions.clone(),
        }
    }
}

/// Fills the templates with extracted elements
pub struct PageRenderer {
    templates: Templates,
    placeholders: Placeholders,
}

impl PageRenderer {
    pub fn new(templates: Templates, placeholders: Placeholders) -> Self {
        Self {
            templates,
            placeholders,
        }
    }

    /// Render the Markdown page for `filename`. Both sections are always
    /// present; an empty one shows its placeholder.
    pub fn render(&self, filename: &str, classes: &[Class], functions: &[Function]) -> Result<String> {
        let classes_block = classes
            .iter()
            .map(|class| self.render_class(class))
            .collect::<Result<Vec<_>>>()?
            .join(BLOCK_SEPARATOR);

        let functions_block = self.render_functions(functions)?;

        let classes_block = if classes_block.is_empty() {
            self.placeholders.no_classes.as_str()
        } else {
            classes_block.as_str()
        };
        let functions_block = if functions_block.is_empty() {
            self.placeholders.no_functions.as_str()
        } else {
            functions_block.as_str()
        };

        self.templates.render_file(filename, classes_block, functions_block)
    }

    fn render_class(&self, class: &Class) -> Result<String> {
        let methods = self.render_functions(&class.methods)?;
        self.templates
            .render_class(&class.signature, class.description.as_deref(), &methods)
    }

    fn render_functions(&self, functions: &[Function]) -> Result<String> {
        Ok(functions
            .iter()
            .map(|f| {
                self.templates
                    .render_function(&f.name, &f.signature, f.description.as_deref())
            })
            .collect::<Result<Vec<_>>>()?
            .join(BLOCK_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> PageRenderer {
        PageRenderer::new(Templates::embedded().unwrap(), Placeholders::default())
    }

    fn function(name: &str, signature: &str) -> Function {
        Function {
            name: name.to_string(),
            signature: signature.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_empty_module_shows_both_placeholders() {
        let page = renderer().render("empty.py", &[], &[]).unwrap();
        assert!(page.contains("# empty.py"));
        assert!(page.contains("*No classes*"));
        assert!(page.contains("*No functions*"));
    }

    #[test]
    fn test_functions_only() {
        let page = renderer()
            .render("a.py", &[], &[function("f", "f(x: int) -> int")])
            .unwrap();
        assert!(page.contains("*No classes*"));
        assert!(!page.contains("*No functions*"));
        assert!(page.contains("f(x: int) -> int"));
    }

    #[test]
    fn test_class_with_methods() {
        let class = Class {
            name: "C".to_string(),
            signature: "C".to_string(),
            description: Some("A class.".to_string()),
            methods: vec![function("m", "m(self)"), function("n", "n(self, x)")],
        };
        let page = renderer().render("b.py", &[class], &[]).unwrap();
        assert!(page.contains("### class `C`"));
        assert!(page.contains("A class."));
        assert!(page.contains("#### Methods"));
        let m = page.find("m(self)").unwrap();
        let n = page.find("n(self, x)").unwrap();
        assert!(m < n);
        assert!(page.contains("*No functions*"));
    }

    #[test]
    fn test_custom_placeholders() {
        let placeholders = Placeholders {
            no_classes: "_nothing here_".to_string(),
            no_functions: "_still nothing_".to_string(),
        };
        let page = PageRenderer::new(Templates::embedded().unwrap(), placeholders)
            .render("x.py", &[], &[])
            .unwrap();
        assert!(page.contains("_nothing here_"));
        assert!(page.contains("_still nothing_"));
    }
}
