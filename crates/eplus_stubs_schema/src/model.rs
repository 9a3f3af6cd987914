//! IDD Object Model
//!
//! One [`SchemaObjectDef`] per IDD object class (e.g. `Zone`,
//! `BuildingSurface:Detailed`), each with its fields in declaration order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed IDD document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Value of the `!IDD_Version` line, if the file carried one
    pub idd_version: Option<String>,

    /// Object definitions in file order
    pub objects: Vec<SchemaObjectDef>,
}

/// One object class of the input data dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaObjectDef {
    /// Raw class name as written in the IDD (e.g. "Site:Location")
    pub name: String,

    /// Joined `\memo` lines
    pub documentation: Option<String>,

    /// Fields, in order
    pub fields: Vec<SchemaFieldDef>,
}

impl SchemaObjectDef {
    pub fn new(name: impl Into<String>, fields: Vec<SchemaFieldDef>) -> Self {
        Self {
            name: name.into(),
            documentation: None,
            fields,
        }
    }

    /// A nameless leading record, as prepended by some IDD readers.
    pub fn header() -> Self {
        Self::new("", Vec::new())
    }

    pub fn with_documentation(mut self, doc: impl Into<String>) -> Self {
        self.documentation = Some(doc.into());
        self
    }

    pub fn is_header(&self) -> bool {
        self.name.trim().is_empty()
    }
}

/// Declared primitive kind of a field (`\type`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Real,
    Integer,
    Choice,
    Alpha,
    /// Any other type code (`object-list`, `node`, `external-list`, ...)
    Other(String),
}

impl FieldKind {
    /// Parse an IDD `\type` value. Never fails: unknown codes are kept as `Other`.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "real" => FieldKind::Real,
            "integer" => FieldKind::Integer,
            "choice" => FieldKind::Choice,
            "alpha" => FieldKind::Alpha,
            other => FieldKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Real => write!(f, "real"),
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Choice => write!(f, "choice"),
            FieldKind::Alpha => write!(f, "alpha"),
            FieldKind::Other(code) => write!(f, "{}", code),
        }
    }
}

/// One field of an object class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFieldDef {
    /// Field name from `\field`
    pub name: String,

    pub kind: FieldKind,

    /// `\key` values, only meaningful for `Choice`
    pub choices: Vec<String>,

    /// Raw `\default` literal
    pub default: Option<String>,

    /// `\minimum` (inclusive)
    pub minimum: Option<String>,

    /// `\minimum>` (exclusive)
    pub minimum_exclusive: Option<String>,

    /// `\maximum` (inclusive)
    pub maximum: Option<String>,

    /// `\maximum<` (exclusive)
    pub maximum_exclusive: Option<String>,

    /// Joined `\note` lines
    pub note: Option<String>,

    /// `\required-field`
    pub required: bool,
}

impl SchemaFieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            choices: Vec::new(),
            default: None,
            minimum: None,
            minimum_exclusive: None,
            maximum: None,
            maximum_exclusive: None,
            note: None,
            required: false,
        }
    }

    pub fn alpha(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Alpha)
    }

    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Real)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn choice<I, S>(name: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut field = Self::new(name, FieldKind::Choice);
        field.choices = choices.into_iter().map(Into::into).collect();
        field
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_minimum(mut self, value: impl Into<String>) -> Self {
        self.minimum = Some(value.into());
        self
    }

    pub fn with_minimum_exclusive(mut self, value: impl Into<String>) -> Self {
        self.minimum_exclusive = Some(value.into());
        self
    }

    pub fn with_maximum(mut self, value: impl Into<String>) -> Self {
        self.maximum = Some(value.into());
        self
    }

    pub fn with_maximum_exclusive(mut self, value: impl Into<String>) -> Self {
        self.maximum_exclusive = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}
