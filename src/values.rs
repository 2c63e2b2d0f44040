//! Attribute value handling: binding-expression detection, resource-reference
//! parsing and type-directed literal formatting.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Number, Value};

use crate::emit::Expr;

lazy_static! {
    static ref BINDING_EXPRESSION_RE: Regex = Regex::new(r"(?s)^\s*\{(.*)\}\s*$").unwrap();

    static ref AT_RESOURCE_RE: Regex = Regex::new(
        r#"^\s*@Resource\s*\(\s*bundle\s*=\s*['"]([a-zA-Z0-9_$]+)['"]\s*,\s*key\s*=\s*['"]([a-zA-Z0-9_$]+)['"]\s*\)\s*$"#
    )
    .unwrap();
}

/// Whether a raw attribute or text value designates a binding (`{expr}`).
pub fn is_binding_expression(value: &str) -> bool {
    BINDING_EXPRESSION_RE.is_match(value)
}

/// The expression between the braces of a binding value.
pub fn binding_expression(value: &str) -> Option<&str> {
    BINDING_EXPRESSION_RE
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    pub bundle: String,
    pub key: String,
}

/// Parses `@Resource(bundle='B', key='K')`.
pub fn parse_resource_reference(value: &str) -> Option<ResourceReference> {
    let caps = AT_RESOURCE_RE.captures(value)?;
    Some(ResourceReference {
        bundle: caps.get(1)?.as_str().to_string(),
        key: caps.get(2)?.as_str().to_string(),
    })
}

/// Lookup call against the resource-manager singleton.
pub fn resource_access_code(resource_manager: &str, reference: &ResourceReference) -> String {
    format!(
        "{}.getInstance().getString({}, {})",
        resource_manager,
        Value::String(reference.bundle.clone()),
        Value::String(reference.key.clone())
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// LITERAL FORMATTING
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_integer(text: &str) -> Option<Value> {
    text.parse::<i64>().ok().map(|n| Value::Number(n.into()))
}

fn parse_number(text: &str) -> Option<Value> {
    parse_integer(text).or_else(|| {
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
    })
}

fn guess_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    match trimmed {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => parse_number(trimmed).unwrap_or_else(|| Value::String(raw.to_string())),
    }
}

/// Formats a literal attribute value according to the static type of the
/// member it is assigned to.
pub fn format_literal(raw: &str, type_name: Option<&str>) -> Expr {
    let trimmed = raw.trim();
    let value = match type_name {
        None | Some("*") | Some("Object") => guess_value(raw),
        Some("Boolean") => Value::Bool(trimmed == "true"),
        Some("Number") => parse_number(trimmed).unwrap_or_else(|| {
            tracing::warn!(value = raw, "not a number, keeping string literal");
            Value::String(raw.to_string())
        }),
        Some("int") | Some("uint") => parse_integer(trimmed).unwrap_or_else(|| {
            tracing::warn!(value = raw, "not an integer, keeping string literal");
            Value::String(raw.to_string())
        }),
        Some(_) => Value::String(raw.to_string()),
    };
    Expr::Literal(value)
}
