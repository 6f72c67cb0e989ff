// Extracted declaration records
//
// Everything here has already been through the visibility filter; the
// signatures are rendered once at extraction time and stored as text.

use serde::{Deserialize, Serialize};

/// Marker that makes a name private when it leads the name
pub const PRIVATE_MARKER: &str = "_";

/// Whether a declaration name is documented.
///
/// Names are public unless they start with the private marker. Special
/// members such as `__init__` (marker on both sides) are always public.
pub fn is_public(name: &str) -> bool {
    !name.starts_with(PRIVATE_MARKER) || is_special(name)
}

/// Check for a `__name__` style special member
pub fn is_special(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// A single declared parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// Type annotation as written
    pub annotation: Option<String>,
    /// Default value as written
    pub default: Option<String>,
}

impl Parameter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            annotation: None,
            default: None,
        }
    }

    pub fn with_annotation(name: &str, annotation: &str) -> Self {
        Self {
            name: name.to_string(),
            annotation: Some(annotation.to_string()),
            default: None,
        }
    }

    pub fn with_default(name: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            annotation: None,
            default: Some(default.to_string()),
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;

        if let Some(ref annotation) = self.annotation {
            write!(f, ": {}", annotation)?;
        }

        match (&self.annotation, &self.default) {
            (Some(_), Some(default)) => write!(f, " = {}", default),
            (None, Some(default)) => write!(f, "={}", default),
            _ => Ok(()),
        }
    }
}

/// Parameters of one declaration, grouped by how callers may pass them
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParameterList {
    /// Before the `/` separator
    pub positional_only: Vec<Parameter>,
    pub positional_or_named: Vec<Parameter>,
    /// After `*` or `*args`
    pub named_only: Vec<Parameter>,
    /// `*args`
    pub variadic: Option<Parameter>,
    /// `**kwargs`
    pub variadic_named: Option<Parameter>,
}

impl ParameterList {
    pub fn is_empty(&self) -> bool {
        self.positional_only.is_empty()
            && self.positional_or_named.is_empty()
            && self.named_only.is_empty()
            && self.variadic.is_none()
            && self.variadic_named.is_none()
    }
}

/// A documented function or method
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Function {
    pub name: String,
    /// Rendered call signature, e.g. `f(x: int) -> int`
    pub signature: String,
    /// Leading string literal of the body
    pub description: Option<String>,
}

/// A documented class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Class {
    pub name: String,
    /// Name plus base list as declared, e.g. `Child(Base, metaclass=Meta)`
    pub signature: String,
    pub description: Option<String>,
    /// Documented methods in declaration order
    pub methods: Vec<Function>,
}

/// One documented top-level declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Element {
    Function(Function),
    Class(Class),
}

impl Element {
    pub fn name(&self) -> &str {
        match self {
            Element::Function(f) => &f.name,
            Element::Class(c) => &c.name,
        }
    }
}

/// Split elements into classes and functions, keeping declaration order
pub fn partition(elements: Vec<Element>) -> (Vec<Class>, Vec<Function>) {
    let mut classes = Vec::new();
    let mut functions = Vec::new();
    for element in elements {
        match element {
            Element::Class(class) => classes.push(class),
            Element::Function(function) => functions.push(function),
        }
    }
    (classes, functions)
}
