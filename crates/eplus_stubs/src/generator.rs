//! Per-object stub generation.
//!
//! All names are validated before the first file is written, so a collision
//! never leaves a half-written objects directory behind.

use crate::naming;
use crate::render::{ObjectContext, StubRenderer};
use eplus_stubs_schema::SchemaObjectDef;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Extension of generated stub files.
pub const STUB_EXTENSION: &str = "pyi";

#[derive(Error, Debug)]
pub enum GenerateError {
    /// Two objects share a lookup key, which also covers identifiers that
    /// differ only in case.
    #[error("Objects '{first}' and '{second}' both map to key '{key}'")]
    NameCollision {
        key: String,
        first: String,
        second: String,
    },

    #[error("Object '{raw}' normalizes to an empty class name")]
    EmptyClassName { raw: String },

    #[error("Field '{field}' of '{object}' normalizes to an empty attribute name")]
    EmptyFieldName { object: String, field: String },

    #[error("Object '{object}' declares attribute '{attribute}' twice")]
    DuplicateField { object: String, attribute: String },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Names produced by one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDraft {
    pub classnames: BTreeSet<String>,
}

impl ManifestDraft {
    pub fn file_count(&self) -> usize {
        self.classnames.len()
    }
}

/// File name of the stub for a class identifier.
pub fn stub_file_name(classname: &str) -> String {
    format!("{}.{}", classname, STUB_EXTENSION)
}

/// Render every object into `output_dir`, one `<Class>.pyi` per object.
///
/// Leading header records (nameless entries some IDD readers prepend) are
/// skipped.
pub fn generate(
    objects: &[SchemaObjectDef],
    output_dir: &Path,
    renderer: &dyn StubRenderer,
) -> Result<ManifestDraft, GenerateError> {
    let contexts = prepare(objects)?;
    write_stubs(&contexts, output_dir, renderer)
}

/// Skip leading headers and validate every name without touching disk.
pub fn prepare(objects: &[SchemaObjectDef]) -> Result<Vec<ObjectContext>, GenerateError> {
    let skip = objects.iter().take_while(|o| o.is_header()).count();
    if skip > 0 {
        debug!(skipped = skip, "Skipping leading header records");
    }
    validate(&objects[skip..])
}

/// Write contexts produced by [`prepare`].
pub fn write_stubs(
    contexts: &[ObjectContext],
    output_dir: &Path,
    renderer: &dyn StubRenderer,
) -> Result<ManifestDraft, GenerateError> {
    fs::create_dir_all(output_dir).map_err(|e| GenerateError::Io {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let mut draft = ManifestDraft::default();
    for ctx in contexts {
        let path = output_dir.join(stub_file_name(&ctx.classname));
        fs::write(&path, renderer.render_object(ctx))
            .map_err(|e| GenerateError::Io { path: path.clone(), source: e })?;
        debug!(class = %ctx.classname, fields = ctx.fields.len(), "Wrote stub");
        draft.classnames.insert(ctx.classname.clone());
    }

    info!(
        count = draft.file_count(),
        dir = %output_dir.display(),
        "Generated object stubs"
    );
    Ok(draft)
}

fn validate(objects: &[SchemaObjectDef]) -> Result<Vec<ObjectContext>, GenerateError> {
    // Keyed on the lookup key: upper-cased, so case-only differences collide
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(objects.len());
    let mut contexts = Vec::with_capacity(objects.len());

    for obj in objects {
        let ctx = ObjectContext::from_def(obj);
        if ctx.classname.is_empty() {
            return Err(GenerateError::EmptyClassName {
                raw: obj.name.clone(),
            });
        }
        let key = naming::lookup_key(&ctx.classname);
        if let Some(first) = seen.get(&key) {
            return Err(GenerateError::NameCollision {
                key,
                first: first.to_string(),
                second: obj.name.clone(),
            });
        }
        seen.insert(key, &obj.name);

        check_fields(obj, &ctx)?;
        contexts.push(ctx);
    }

    Ok(contexts)
}

fn check_fields(obj: &SchemaObjectDef, ctx: &ObjectContext) -> Result<(), GenerateError> {
    let mut attributes = HashSet::with_capacity(ctx.fields.len());
    for (field_ctx, field) in ctx.fields.iter().zip(&obj.fields) {
        if field_ctx.name.is_empty() {
            return Err(GenerateError::EmptyFieldName {
                object: obj.name.clone(),
                field: field.name.clone(),
            });
        }
        if !attributes.insert(field_ctx.name.as_str()) {
            return Err(GenerateError::DuplicateField {
                object: obj.name.clone(),
                attribute: field_ctx.name.clone(),
            });
        }
    }
    Ok(())
}
