//! Identifier rules for IDD names.
//!
//! Object classes and fields follow different legality rules on purpose:
//! field names must match the attribute names eppy synthesizes at runtime.

use regex::Regex;
use std::sync::LazyLock;

static NON_ALNUM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9a-zA-Z]+").expect("valid regex"));

/// Separator used by [`normalize`].
pub const IDENT_SEPARATOR: char = '_';

/// Separator eppy uses between parts of an IDF object key.
pub const KEY_SEPARATOR: &str = ":";

/// Object class name to identifier.
///
/// Each run of characters outside `[0-9a-zA-Z]` becomes one `_`. Case is kept
/// as-is; title-casing would turn `BuildingSurface` into `Buildingsurface`.
pub fn normalize(raw: &str) -> String {
    NON_ALNUM_RUN.replace_all(raw, "_").into_owned()
}

/// Field name to attribute name, eppy style: drop everything outside
/// `[A-Za-z0-9 ]`, then spaces become underscores.
pub fn normalize_field(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Identifier to the upper-cased IDF key eppy selects objects by.
///
/// `BuildingSurface_Detailed` -> `BUILDINGSURFACE:DETAILED`
pub fn lookup_key(identifier: &str) -> String {
    identifier
        .split(IDENT_SEPARATOR)
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

/// `23.1` -> `IDF_23_1`
pub fn version_classname(eplus_version: &str) -> String {
    format!("IDF_{}", normalize(eplus_version))
}
