//! Native reader for EnergyPlus `Energy+.idd` files.
//!
//! The IDD is line oriented. Object headers end in `,` (fields follow) or
//! `;` (no fields). Field codes (`A1`, `N3`) end in `,` or `;`, the `;`
//! closing the object. Everything after the first `\` on a line is a
//! directive (`\field`, `\type`, `\key`, ...) attached to the most recent
//! field on the object, or to the object itself before any field appears.

use crate::error::{Result, SchemaError};
use crate::model::{FieldKind, SchemaDocument, SchemaFieldDef, SchemaObjectDef};
use crate::source::SchemaSource;
use std::path::Path;

const VERSION_MARKER: &str = "!IDD_Version";

/// Stateless IDD parser; the default [`SchemaSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IddParser;

impl IddParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse IDD text into object definitions.
    pub fn parse_str(&self, text: &str) -> Result<SchemaDocument> {
        let mut state = ParseState::default();

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix(VERSION_MARKER) {
                state.idd_version = Some(rest.trim().to_string());
                continue;
            }
            if line.starts_with('!') {
                continue;
            }

            let (code, directive) = match line.find('\\') {
                Some(pos) => (&line[..pos], Some(&line[pos + 1..])),
                None => (line, None),
            };
            let code = match code.find('!') {
                Some(pos) => &code[..pos],
                None => code,
            };

            state.consume_code(code, line_no)?;
            if let Some(directive) = directive {
                state.apply_directive(directive);
            }
        }

        state.finish()
    }
}

impl SchemaSource for IddParser {
    fn load(&self, path: &Path) -> Result<SchemaDocument> {
        let bytes = std::fs::read(path).map_err(|e| SchemaError::io(path, e))?;
        // Older IDDs carry Latin-1 degree signs in notes
        let text = String::from_utf8_lossy(&bytes);
        let document = self.parse_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            objects = document.objects.len(),
            "Parsed IDD"
        );
        Ok(document)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Object,
    Field,
}

#[derive(Default)]
struct ParseState {
    idd_version: Option<String>,
    objects: Vec<SchemaObjectDef>,
    current: Option<SchemaObjectDef>,
    /// True while the current object still expects field codes
    open: bool,
    target: Option<Target>,
}

impl ParseState {
    fn consume_code(&mut self, code: &str, line_no: usize) -> Result<()> {
        let mut token = String::new();
        for ch in code.chars() {
            match ch {
                ',' | ';' => {
                    self.consume_token(token.trim(), ch == ';', line_no)?;
                    token.clear();
                }
                _ => token.push(ch),
            }
        }
        if !token.trim().is_empty() {
            return Err(SchemaError::parse(
                line_no,
                format!("'{}' is missing a ',' or ';' terminator", token.trim()),
            ));
        }
        Ok(())
    }

    fn consume_token(&mut self, token: &str, terminal: bool, line_no: usize) -> Result<()> {
        if self.open {
            let kind = field_kind_for_code(token).ok_or_else(|| {
                SchemaError::parse(line_no, format!("expected a field code, found '{}'", token))
            })?;
            let object = self
                .current
                .as_mut()
                .ok_or_else(|| SchemaError::parse(line_no, "field outside of an object"))?;
            object.fields.push(SchemaFieldDef::new(token, kind));
            self.target = Some(Target::Field);
            self.open = !terminal;
            return Ok(());
        }

        if token.is_empty() {
            return Err(SchemaError::parse(line_no, "empty object name"));
        }
        if let Some(done) = self.current.take() {
            self.objects.push(done);
        }
        self.current = Some(SchemaObjectDef::new(token, Vec::new()));
        self.target = Some(Target::Object);
        self.open = !terminal;
        Ok(())
    }

    fn apply_directive(&mut self, directive: &str) {
        let (name, value) = match directive.find(char::is_whitespace) {
            Some(pos) => (&directive[..pos], directive[pos..].trim()),
            None => (directive.trim(), ""),
        };
        let Some(object) = self.current.as_mut() else {
            return;
        };

        match self.target {
            Some(Target::Object) => {
                if name == "memo" {
                    append_text(&mut object.documentation, value);
                }
            }
            Some(Target::Field) => {
                if let Some(field) = object.fields.last_mut() {
                    apply_field_directive(field, name, value);
                }
            }
            None => {}
        }
    }

    fn finish(mut self) -> Result<SchemaDocument> {
        if self.open {
            let name = self
                .current
                .as_ref()
                .map(|o| o.name.clone())
                .unwrap_or_default();
            return Err(SchemaError::parse(
                0,
                format!("object '{}' is not terminated with ';'", name),
            ));
        }
        if let Some(done) = self.current.take() {
            self.objects.push(done);
        }
        Ok(SchemaDocument {
            idd_version: self.idd_version,
            objects: self.objects,
        })
    }
}

fn apply_field_directive(field: &mut SchemaFieldDef, name: &str, value: &str) {
    match name {
        "field" => field.name = value.to_string(),
        "type" => field.kind = FieldKind::from_code(value),
        "key" => field.choices.push(value.to_string()),
        "default" => field.default = Some(value.to_string()),
        "note" => append_text(&mut field.note, value),
        "required-field" => field.required = true,
        "minimum>" => field.minimum_exclusive = Some(value.to_string()),
        "maximum<" => field.maximum_exclusive = Some(value.to_string()),
        "minimum" => match value.strip_prefix('>') {
            Some(rest) => field.minimum_exclusive = Some(rest.trim().to_string()),
            None => field.minimum = Some(value.to_string()),
        },
        "maximum" => match value.strip_prefix('<') {
            Some(rest) => field.maximum_exclusive = Some(rest.trim().to_string()),
            None => field.maximum = Some(value.to_string()),
        },
        _ => {}
    }
}

/// `A<n>` fields default to alpha, `N<n>` fields to real.
fn field_kind_for_code(code: &str) -> Option<FieldKind> {
    let mut chars = code.chars();
    let kind = match chars.next()? {
        'A' | 'a' => FieldKind::Alpha,
        'N' | 'n' => FieldKind::Real,
        _ => return None,
    };
    let digits = chars.as_str();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(kind)
}

fn append_text(slot: &mut Option<String>, value: &str) {
    if value.is_empty() {
        return;
    }
    match slot {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(value);
        }
        None => *slot = Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"!IDD_Version 23.1.0
!IDD_BUILD 87ed9199d4
! Comment lines are ignored
\group Simulation Parameters

Lead Input;

Version,
      \memo Specifies the EnergyPlus version of the IDF file.
      \unique-object
  A1 ; \field Version Identifier
      \default 23.1

Material,
       \memo Regular materials described with full set of thermal properties
  A1 , \field Name
       \required-field
       \type alpha
  A2 , \field Roughness
       \required-field
       \type choice
       \key VeryRough
       \key Rough
       \key Smooth
  N1 , \field Thickness
       \units m
       \minimum> 0
       \maximum 3.0
  N2 ; \field Conductivity
       \type real
       \minimum> 0
       \note Thermal conductivity
       \note of the layer
"#;

    #[test]
    fn test_parse_objects_and_version() {
        let doc = IddParser::new().parse_str(SAMPLE).unwrap();
        assert_eq!(doc.idd_version.as_deref(), Some("23.1.0"));

        let names: Vec<&str> = doc.objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Lead Input", "Version", "Material"]);
        assert!(doc.objects[0].fields.is_empty());
    }

    #[test]
    fn test_parse_field_directives() {
        let doc = IddParser::new().parse_str(SAMPLE).unwrap();
        let material = &doc.objects[2];
        assert_eq!(
            material.documentation.as_deref(),
            Some("Regular materials described with full set of thermal properties")
        );
        assert_eq!(material.fields.len(), 4);

        let name = &material.fields[0];
        assert_eq!(name.name, "Name");
        assert_eq!(name.kind, FieldKind::Alpha);
        assert!(name.required);

        let roughness = &material.fields[1];
        assert_eq!(roughness.kind, FieldKind::Choice);
        assert_eq!(roughness.choices, vec!["VeryRough", "Rough", "Smooth"]);

        let thickness = &material.fields[2];
        assert_eq!(thickness.kind, FieldKind::Real, "untyped N field is real");
        assert_eq!(thickness.minimum_exclusive.as_deref(), Some("0"));
        assert_eq!(thickness.maximum.as_deref(), Some("3.0"));

        let conductivity = &material.fields[3];
        assert_eq!(conductivity.note.as_deref(), Some("Thermal conductivity of the layer"));
    }

    #[test]
    fn test_spaced_exclusive_bounds() {
        let text = "Thing,\n  N1 ; \\field Value\n   \\minimum >0\n   \\maximum <10\n";
        let doc = IddParser::new().parse_str(text).unwrap();
        let field = &doc.objects[0].fields[0];
        assert_eq!(field.minimum_exclusive.as_deref(), Some("0"));
        assert_eq!(field.maximum_exclusive.as_deref(), Some("10"));
        assert!(field.minimum.is_none());
    }

    #[test]
    fn test_field_without_name_keeps_code() {
        let doc = IddParser::new().parse_str("Thing,\n  A1 ;\n").unwrap();
        assert_eq!(doc.objects[0].fields[0].name, "A1");
    }

    #[test]
    fn test_unterminated_object_is_error() {
        let err = IddParser::new()
            .parse_str("Zone,\n  A1 , \\field Name\n")
            .unwrap_err();
        assert!(err.to_string().contains("Zone"), "{}", err);
    }

    #[test]
    fn test_bad_field_code_is_error() {
        let err = IddParser::new()
            .parse_str("Zone,\n  X1 ; \\field Name\n")
            .unwrap_err();
        match err {
            SchemaError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
