//! IDD field kind to Python type annotation.
//!
//! Every attribute renders as `Annotated[<type>, Field(<args>)]` so pydantic
//! style constraint metadata (`ge`, `gt`, `le`, `lt`, `default`) travels with
//! the type.

use eplus_stubs_schema::{FieldKind, SchemaFieldDef};
use std::fmt;

/// Placeholder pydantic reads as "no default, caller must supply".
pub const REQUIRED_MARKER: &str = "...";

/// Base Python type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Float,
    Int,
    /// Closed set of string literals, schema order
    Literal(Vec<String>),
    Str,
}

impl TypeExpr {
    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeExpr::Float | TypeExpr::Int)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Float => write!(f, "float"),
            TypeExpr::Int => write!(f, "int"),
            TypeExpr::Str => write!(f, "str"),
            TypeExpr::Literal(choices) => {
                let quoted: Vec<String> = choices.iter().map(|c| py_str_literal(c)).collect();
                write!(f, "Literal[{}]", quoted.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// `\minimum`
    Ge,
    /// `\minimum>`
    Gt,
    /// `\maximum`
    Le,
    /// `\maximum<`
    Lt,
}

impl BoundKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            BoundKind::Ge => "ge",
            BoundKind::Gt => "gt",
            BoundKind::Le => "le",
            BoundKind::Lt => "lt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub kind: BoundKind,
    pub value: String,
}

/// Result of mapping one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    pub base: TypeExpr,
    /// Ordered ge, gt, le, lt; empty for non-numeric types
    pub bounds: Vec<Bound>,
    /// Rendered Python literal
    pub default: Option<String>,
    /// Required with no default: render the `...` marker
    pub must_supply: bool,
}

impl MappedType {
    /// Arguments of the `Field(...)` call, in emission order.
    pub fn field_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.must_supply {
            args.push(REQUIRED_MARKER.to_string());
        }
        for bound in &self.bounds {
            args.push(format!("{}={}", bound.kind.keyword(), bound.value));
        }
        if let Some(default) = &self.default {
            args.push(format!("default={}", default));
        }
        args
    }

    /// Full annotation, e.g. `Annotated[float, Field(gt=0, lt=10, default=0.1)]`.
    pub fn annotation(&self) -> String {
        format!("Annotated[{}, Field({})]", self.base, self.field_args().join(", "))
    }
}

/// Map a field definition to its annotation parts. Never fails: anything
/// unrecognized is a plain `str`.
pub fn map_type(field: &SchemaFieldDef) -> MappedType {
    let base = base_type(field);
    let bounds = if base.is_numeric() {
        collect_bounds(field)
    } else {
        Vec::new()
    };
    let default = field
        .default
        .as_deref()
        .and_then(|raw| default_literal(raw, &base));
    let must_supply = field.required && default.is_none();

    MappedType {
        base,
        bounds,
        default,
        must_supply,
    }
}

fn base_type(field: &SchemaFieldDef) -> TypeExpr {
    match field.kind {
        FieldKind::Real => TypeExpr::Float,
        FieldKind::Integer => TypeExpr::Int,
        FieldKind::Choice if !field.choices.is_empty() => TypeExpr::Literal(field.choices.clone()),
        FieldKind::Choice | FieldKind::Alpha | FieldKind::Other(_) => TypeExpr::Str,
    }
}

fn collect_bounds(field: &SchemaFieldDef) -> Vec<Bound> {
    let candidates = [
        (BoundKind::Ge, &field.minimum),
        (BoundKind::Gt, &field.minimum_exclusive),
        (BoundKind::Le, &field.maximum),
        (BoundKind::Lt, &field.maximum_exclusive),
    ];

    candidates
        .into_iter()
        .filter_map(|(kind, value)| {
            let value = value.as_deref()?.trim();
            if let Some(value) = float_literal(value) {
                Some(Bound { kind, value })
            } else {
                tracing::warn!(
                    field = %field.name,
                    bound = kind.keyword(),
                    value,
                    "Dropping non-numeric bound"
                );
                None
            }
        })
        .collect()
}

/// `None` for empty or `none` defaults. A default that is not a literal of
/// the field's own numeric type is quoted.
fn default_literal(raw: &str, base: &TypeExpr) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
        return None;
    }
    let number = match base {
        TypeExpr::Int => int_literal(raw),
        TypeExpr::Float => float_literal(raw),
        TypeExpr::Literal(_) | TypeExpr::Str => None,
    };
    // Covers string types and numeric fields defaulting to e.g. `autosize`
    Some(number.unwrap_or_else(|| py_str_literal(raw)))
}

/// Python int literal; `007` and `+7` both become `7`.
fn int_literal(value: &str) -> Option<String> {
    value.parse::<i64>().ok().map(|n| n.to_string())
}

/// Python literal valid where a float is expected. Integral text goes
/// through [`int_literal`] since Python rejects leading zeros there.
fn float_literal(value: &str) -> Option<String> {
    if !is_numeric_literal(value) {
        return None;
    }
    Some(int_literal(value).unwrap_or_else(|| value.to_string()))
}

/// Plain decimal or scientific literal. Rejects `inf`/`nan`, which `f64`
/// parsing would accept but are not Python literals.
pub fn is_numeric_literal(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && value.parse::<f64>().is_ok()
}

/// Python `repr()` of a string: single quotes unless the text contains a
/// single quote and no double quote.
pub fn py_str_literal(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
