//! Manifest and generation cache
//!
//! The manifest is the cache key for one EnergyPlus version: the SHA-256 of
//! the IDD bytes plus the sorted class names generated from it. A run whose
//! IDD digest matches the stored manifest reuses the shared objects without
//! parsing or rendering anything.

use crate::generator::{self, GenerateError, ManifestDraft};
use crate::layout::OutputLayout;
use crate::render::StubRenderer;
use eplus_stubs_schema::{SchemaError, SchemaSource};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl ManifestError {
    fn io(path: &Path, source: io::Error) -> Self {
        ManifestError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Persisted record of one generation pass.
///
/// Fields are declared in alphabetical order so the JSON keys come out sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Sorted class identifiers, one per generated stub
    pub classnames: Vec<String>,
    pub eplus_version: String,
    pub file_count: usize,
    pub idd_sha256: String,
    /// Always 0 here; package patch numbers are chosen at packaging time
    pub patch: u32,
}

impl Manifest {
    pub fn from_draft(eplus_version: &str, idd_sha256: &str, draft: ManifestDraft) -> Self {
        let classnames: Vec<String> = draft.classnames.into_iter().collect();
        Self {
            file_count: classnames.len(),
            classnames,
            eplus_version: eplus_version.to_string(),
            idd_sha256: idd_sha256.to_string(),
            patch: 0,
        }
    }

    /// Pretty JSON with two-space indent.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a manifest; `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ManifestError> {
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(path).map_err(|e| ManifestError::io(path, e))?;
        let manifest = serde_json::from_str(&text).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Some(manifest))
    }

    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ManifestError::io(parent, e))?;
        }
        fs::write(path, self.to_json()?).map_err(|e| ManifestError::io(path, e))
    }
}

/// Hex SHA-256 of a file, streamed.
pub fn sha256_file(path: &Path) -> Result<String, ManifestError> {
    let mut file = File::open(path).map_err(|e| ManifestError::io(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| ManifestError::io(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone)]
pub struct Resolved {
    pub objects_dir: PathBuf,
    pub manifest: Manifest,
    /// True when the stored manifest was reused
    pub cache_hit: bool,
}

/// Return shared objects for `eplus_version`, generating them only when the
/// IDD digest differs from the stored manifest.
pub fn resolve(
    idd_file: &Path,
    eplus_version: &str,
    layout: &OutputLayout,
    source: &dyn SchemaSource,
    renderer: &dyn StubRenderer,
) -> Result<Resolved, ManifestError> {
    let objects_dir = layout.objects_dir(eplus_version);
    let manifest_path = layout.manifest_path(eplus_version);

    let digest = sha256_file(idd_file)?;
    if let Some(existing) = Manifest::load(&manifest_path)? {
        if existing.idd_sha256 == digest && existing.eplus_version == eplus_version {
            info!(
                version = eplus_version,
                classes = existing.file_count,
                "IDD unchanged, reusing shared objects"
            );
            return Ok(Resolved {
                objects_dir,
                manifest: existing,
                cache_hit: true,
            });
        }
        info!(
            version = eplus_version,
            old = %existing.idd_sha256,
            new = %digest,
            "IDD changed, regenerating"
        );
    }

    // Parse and validate before clearing anything, so a bad IDD leaves the
    // last good output in place.
    let document = source.load(idd_file)?;
    let contexts = generator::prepare(&document.objects)?;

    // Old manifest goes first: a failed write below must not look like a hit.
    if manifest_path.is_file() {
        fs::remove_file(&manifest_path).map_err(|e| ManifestError::io(&manifest_path, e))?;
    }
    if objects_dir.is_dir() {
        fs::remove_dir_all(&objects_dir).map_err(|e| ManifestError::io(&objects_dir, e))?;
    }

    let draft = generator::write_stubs(&contexts, &objects_dir, renderer)?;
    let manifest = Manifest::from_draft(eplus_version, &digest, draft);
    manifest.write(&manifest_path)?;

    info!(
        version = eplus_version,
        classes = manifest.file_count,
        path = %manifest_path.display(),
        "Wrote manifest"
    );
    Ok(Resolved {
        objects_dir,
        manifest,
        cache_hit: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn draft(names: &[&str]) -> ManifestDraft {
        ManifestDraft {
            classnames: names.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn test_manifest_json_keys_sorted() {
        let manifest = Manifest::from_draft("23.1", "abc", draft(&["Zone", "Material"]));
        let json = manifest.to_json().unwrap();
        let expected = r#"{
  "classnames": [
    "Material",
    "Zone"
  ],
  "eplus_version": "23.1",
  "file_count": 2,
  "idd_sha256": "abc",
  "patch": 0
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_load_missing_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(Manifest::load(&temp.path().join("manifest.json")).unwrap().is_none());
    }

    #[test]
    fn test_load_malformed_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("manifest.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }), "{:?}", err);
    }

    #[test]
    fn test_write_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("23.1").join("manifest.json");
        let manifest = Manifest::from_draft("23.1", "abc", draft(&["Zone"]));
        manifest.write(&path).unwrap();
        assert_eq!(Manifest::load(&path).unwrap(), Some(manifest));
    }

    #[test]
    fn test_sha256_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Energy+.idd");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = sha256_file(&temp.path().join("nope.idd")).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }
}
