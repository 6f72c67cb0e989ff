// Python element extraction using tree-sitter

use crate::error::{Error, Result};
use crate::parser::ast::*;
use crate::parser::signature::render_signature;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Column width used when expanding tabs in descriptions
const TAB_WIDTH: usize = 8;

/// Parser for Python source files
pub struct PythonParser {
    parser: Parser,
}

/// Kind of a statement as far as documentation is concerned
enum Declaration<'tree> {
    Function(Node<'tree>),
    Class(Node<'tree>),
    Other,
}

impl<'tree> Declaration<'tree> {
    /// Classify a statement, looking through decorators
    fn classify(node: Node<'tree>) -> Self {
        match node.kind() {
            "function_definition" => Declaration::Function(node),
            "class_definition" => Declaration::Class(node),
            "decorated_definition" => match node.child_by_field_name("definition") {
                Some(inner) => Self::classify(inner),
                None => Declaration::Other,
            },
            _ => Declaration::Other,
        }
    }
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::language();
        parser
            .set_language(&language)
            .map_err(|e| Error::parser(format!("Failed to set Python language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Read and parse a Python file
    pub fn parse_file(&mut self, path: &Path) -> Result<Vec<Element>> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
        })?;
        self.parse_source(&source, path)
    }

    /// Extract the documented top-level elements of a module.
    ///
    /// `path` is only used to label errors. Source with any syntax error is
    /// rejected as a whole.
    pub fn parse_source(&mut self, source: &str, path: &Path) -> Result<Vec<Element>> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| Error::parse(path, "parser returned no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(Error::parse(path, describe_error(root)));
        }
        // the grammar still accepts Python 2 statements
        if let Some(node) = find_legacy_statement(root) {
            return Err(Error::parse(
                path,
                format!("`{}` statement is not valid Python 3 at {}", keyword(node), position(node)),
            ));
        }

        let src = source.as_bytes();
        let mut elements = Vec::new();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match Declaration::classify(child) {
                Declaration::Function(node) => {
                    let function = extract_function(node, src).map_err(|msg| Error::parse(path, msg))?;
                    if let Some(function) = function.filter(|f| is_public(&f.name)) {
                        elements.push(Element::Function(function));
                    }
                }
                Declaration::Class(node) => {
                    let class = extract_class(node, src).map_err(|msg| Error::parse(path, msg))?;
                    if let Some(class) = class.filter(|c| is_public(&c.name)) {
                        elements.push(Element::Class(class));
                    }
                }
                Declaration::Other => {}
            }
        }

        Ok(elements)
    }
}

/// Extraction failure message, turned into `Error::Parse` with the path
type Checked<T> = std::result::Result<T, String>;

/// 1-based `line:column` of a node
fn position(node: Node) -> String {
    let pos = node.start_position();
    format!("{}:{}", pos.row + 1, pos.column + 1)
}

/// Locate the first error or missing node and describe it
fn describe_error(root: Node) -> String {
    match first_error(root) {
        Some(node) if node.is_missing() => format!("missing `{}` at {}", node.kind(), position(node)),
        Some(node) => format!("invalid syntax at {}", position(node)),
        None => "invalid syntax".to_string(),
    }
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found
}

/// First `print` or `exec` statement anywhere in the tree
fn find_legacy_statement(node: Node) -> Option<Node> {
    if matches!(node.kind(), "print_statement" | "exec_statement") {
        return Some(node);
    }
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find_map(find_legacy_statement);
    found
}

fn keyword(node: Node) -> &'static str {
    match node.kind() {
        "exec_statement" => "exec",
        _ => "print",
    }
}

fn node_text<'a>(node: Node, src: &'a [u8]) -> Option<&'a str> {
    node.utf8_text(src).ok()
}

/// Collapse whitespace runs so multi-line annotations render on one line.
/// String literals are copied untouched.
fn squash(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut chars = text.trim().chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
            }
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                out.push(c);
            }
            None if c.is_whitespace() => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            None => out.push(c),
        }
    }

    out
}

/// PEP 695 type parameter list such as `[T, *Ts]`, or empty
fn type_parameters(node: Node, src: &[u8]) -> String {
    node.child_by_field_name("type_parameters")
        .and_then(|t| node_text(t, src))
        .map(squash)
        .unwrap_or_default()
}

fn extract_function(node: Node, src: &[u8]) -> Checked<Option<Function>> {
    let Some(name) = node.child_by_field_name("name").and_then(|n| node_text(n, src)) else {
        return Ok(None);
    };

    let params = match node.child_by_field_name("parameters") {
        Some(p) => parse_parameters(p, src)?,
        None => ParameterList::default(),
    };

    let returns = node
        .child_by_field_name("return_type")
        .and_then(|t| node_text(t, src))
        .map(squash);

    let description = node
        .child_by_field_name("body")
        .and_then(|body| extract_description(body, src));

    let declared = format!("{}{}", name, type_parameters(node, src));
    Ok(Some(Function {
        name: name.to_string(),
        signature: render_signature(&declared, &params, returns.as_deref()),
        description,
    }))
}

fn extract_class(node: Node, src: &[u8]) -> Checked<Option<Class>> {
    let Some(name) = node.child_by_field_name("name").and_then(|n| node_text(n, src)) else {
        return Ok(None);
    };

    let bases = node
        .child_by_field_name("superclasses")
        .map(|args| extract_bases(args, src))
        .unwrap_or_default();

    let mut signature = format!("{}{}", name, type_parameters(node, src));
    if !bases.is_empty() {
        signature.push_str(&format!("({})", bases.join(", ")));
    }

    let body = node.child_by_field_name("body");
    let description = body.and_then(|b| extract_description(b, src));
    let methods = match body {
        Some(b) => extract_methods(b, src)?,
        None => Vec::new(),
    };

    Ok(Some(Class {
        name: name.to_string(),
        signature,
        description,
        methods,
    }))
}

/// Base classes and class keywords, as written
fn extract_bases(node: Node, src: &[u8]) -> Vec<String> {
    let mut bases = Vec::new();
    let mut cursor = node.walk();

    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "comment" => {}
            "keyword_argument" => {
                let name = child.child_by_field_name("name").and_then(|n| node_text(n, src));
                let value = child.child_by_field_name("value").and_then(|v| node_text(v, src));
                if let (Some(name), Some(value)) = (name, value) {
                    bases.push(format!("{}={}", name, squash(value)));
                }
            }
            _ => {
                if let Some(text) = node_text(child, src) {
                    bases.push(squash(text));
                }
            }
        }
    }

    bases
}

/// Direct method declarations of a class body
fn extract_methods(body: Node, src: &[u8]) -> Checked<Vec<Function>> {
    let mut methods = Vec::new();
    let mut cursor = body.walk();

    for child in body.named_children(&mut cursor) {
        match Declaration::classify(child) {
            Declaration::Function(node) => {
                if let Some(method) = extract_function(node, src)?.filter(|m| is_public(&m.name)) {
                    methods.push(method);
                }
            }
            Declaration::Class(_) | Declaration::Other => {}
        }
    }

    Ok(methods)
}

/// Split a parameter list into its groups, rejecting the orderings Python
/// refuses to compile
fn parse_parameters(node: Node, src: &[u8]) -> Checked<ParameterList> {
    let mut params = ParameterList::default();
    let mut named_only = false;
    let mut seen_default = false;
    let mut bare_star: Option<Node> = None;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let param = match child.kind() {
            "/" | "positional_separator" => {
                if params.positional_or_named.is_empty() || named_only {
                    return Err(format!(
                        "`/` must follow at least one positional parameter at {}",
                        position(child)
                    ));
                }
                params.positional_only.append(&mut params.positional_or_named);
                continue;
            }
            "*" | "keyword_separator" => {
                named_only = true;
                bare_star = Some(child);
                continue;
            }
            "list_splat_pattern" => {
                params.variadic = splat_name(child, src).map(Parameter::new);
                named_only = true;
                continue;
            }
            "dictionary_splat_pattern" => {
                params.variadic_named = splat_name(child, src).map(Parameter::new);
                continue;
            }
            "typed_parameter" => {
                let annotation = child
                    .child_by_field_name("type")
                    .and_then(|t| node_text(t, src))
                    .map(squash);
                let Some(target) = child.named_child(0) else {
                    continue;
                };
                let mut param = match target.kind() {
                    "list_splat_pattern" | "dictionary_splat_pattern" => {
                        match splat_name(target, src) {
                            Some(name) => Parameter::new(name),
                            None => continue,
                        }
                    }
                    _ => match node_text(target, src) {
                        Some(name) => Parameter::new(name),
                        None => continue,
                    },
                };
                param.annotation = annotation;
                match target.kind() {
                    "list_splat_pattern" => {
                        params.variadic = Some(param);
                        named_only = true;
                        continue;
                    }
                    "dictionary_splat_pattern" => {
                        params.variadic_named = Some(param);
                        continue;
                    }
                    _ => param,
                }
            }
            "default_parameter" | "typed_default_parameter" => {
                let Some(name) = child.child_by_field_name("name").and_then(|n| node_text(n, src))
                else {
                    continue;
                };
                let mut param = Parameter::new(name);
                param.annotation = child
                    .child_by_field_name("type")
                    .and_then(|t| node_text(t, src))
                    .map(squash);
                param.default = child
                    .child_by_field_name("value")
                    .and_then(|v| node_text(v, src))
                    .map(squash);
                param
            }
            "identifier" => match node_text(child, src) {
                Some(name) => Parameter::new(name),
                None => continue,
            },
            _ => continue,
        };

        if named_only {
            params.named_only.push(param);
        } else {
            if param.default.is_some() {
                seen_default = true;
            } else if seen_default {
                return Err(format!(
                    "parameter without a default follows parameter with a default at {}",
                    position(child)
                ));
            }
            params.positional_or_named.push(param);
        }
    }

    if let Some(star) = bare_star {
        if params.named_only.is_empty() {
            return Err(format!("named parameters must follow bare `*` at {}", position(star)));
        }
    }

    Ok(params)
}

fn splat_name<'a>(node: Node, src: &'a [u8]) -> Option<&'a str> {
    let name = node_text(node, src)?.trim_start_matches('*').trim();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Leading string literal of a body, cleaned of quotes and indentation
fn extract_description(body: Node, src: &[u8]) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;

    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }

    let expr = first.named_child(0)?;
    let literal = match expr.kind() {
        "string" => string_value(expr, src)?,
        "concatenated_string" => {
            let mut inner = expr.walk();
            let parts = expr
                .named_children(&mut inner)
                .filter(|n| n.kind() == "string")
                .map(|s| string_value(s, src))
                .collect::<Option<Vec<_>>>()?;
            parts.concat()
        }
        _ => return None,
    };

    Some(clean_description(&literal))
}

/// Value of a plain string literal; byte strings and f-strings yield `None`
fn string_value(node: Node, src: &[u8]) -> Option<String> {
    let text = node_text(node, src)?;
    let quote_at = text.find(|c| c == '"' || c == '\'')?;
    let prefix = text[..quote_at].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }

    let quoted = &text[quote_at..];
    let delimiter = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    if quoted.len() < delimiter * 2 {
        return None;
    }
    let body = &quoted[delimiter..quoted.len() - delimiter];

    if prefix.contains('r') {
        Some(body.to_string())
    } else {
        Some(unescape(body))
    }
}

/// Decode backslash escapes the way Python does for `str` literals.
/// `\N{...}` and malformed escapes are kept verbatim.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\n') => {}
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('a') => out.push('\u{07}'),
            Some('b') => out.push('\u{08}'),
            Some('f') => out.push('\u{0C}'),
            Some('v') => out.push('\u{0B}'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(digit @ '0'..='7') => {
                let mut code = digit.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                match char::from_u32(code) {
                    Some(decoded) => out.push(decoded),
                    None => out.push(char::REPLACEMENT_CHARACTER),
                }
            }
            Some(kind @ ('x' | 'u' | 'U')) => {
                let width = match kind {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.clone().take(width).collect();
                let decoded = (digits.len() == width && digits.chars().all(|d| d.is_ascii_hexdigit()))
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => {
                        out.push(decoded);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(kind);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        match c {
            '\t' => {
                let pad = TAB_WIDTH - column % TAB_WIDTH;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

/// Normalize description indentation: the first line is left-trimmed, the
/// common indentation of the remaining lines is removed, and blank lines at
/// either end are dropped.
fn clean_description(raw: &str) -> String {
    let expanded = expand_tabs(raw);
    let lines: Vec<&str> = expanded.lines().collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            cleaned.push(line.trim_start().to_string());
        } else if line.trim().is_empty() {
            cleaned.push(String::new());
        } else {
            let dedented = line.get(margin..).unwrap_or_else(|| line.trim_start());
            cleaned.push(dedented.trim_end().to_string());
        }
    }

    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    let start = cleaned
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(cleaned.len());

    cleaned[start..].join("\n").trim_end().to_string()
}
