// Call signature rendering

use crate::parser::ast::{Parameter, ParameterList};

/// Render a call signature such as `f(a, b/, c, *, d) -> int`.
///
/// Segments in order: the positional-only group closed by `/`, the
/// positional-or-named group, `*args` or a bare `*` when named-only
/// parameters follow, the named-only group, then `**kwargs`.
pub fn render_signature(name: &str, params: &ParameterList, returns: Option<&str>) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !params.positional_only.is_empty() {
        parts.push(format!("{}/", join(&params.positional_only)));
    }

    parts.extend(params.positional_or_named.iter().map(Parameter::to_string));

    match &params.variadic {
        Some(args) => parts.push(format!("*{}", args)),
        None if !params.named_only.is_empty() => parts.push("*".to_string()),
        None => {}
    }

    parts.extend(params.named_only.iter().map(Parameter::to_string));

    if let Some(kwargs) = &params.variadic_named {
        parts.push(format!("**{}", kwargs));
    }

    let mut signature = format!("{}({})", name, parts.join(", "));
    if let Some(ret) = returns {
        signature.push_str(" -> ");
        signature.push_str(ret);
    }
    signature
}

fn join(params: &[Parameter]) -> String {
    params
        .iter()
        .map(Parameter::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
