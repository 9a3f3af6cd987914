//! Stub package assembly
//!
//! Turns the shared generated objects for one EnergyPlus version into an
//! installable PEP 561 stub package. Both package kinds are built from the
//! same objects directory; nothing is re-rendered per kind except the entry
//! point and metadata files.
//!
//! ## Layout
//! ```text
//! <packages_root>/<kind>-stubs-<version>.<patch>/
//!   pyproject.toml
//!   README.md
//!   generated_by.json
//!   src/<kind>_stubs/
//!     __init__.py
//!     py.typed
//!     idf.pyi
//!     objects/<Class>.pyi
//! ```
//!
//! ## Usage
//! ```ignore
//! use eplus_stubs::packager::{package, PackageKind};
//!
//! let kind = PackageKind::Eppy;
//! let pkg = package(kind, "23.1", 0, &manifest, &objects_dir, root, &renderer)?;
//! println!("Wrote {}", pkg.root.display());
//! ```

use crate::generator::stub_file_name;
use crate::manifest::Manifest;
use crate::render::{IdfContext, PackageContext, StubRenderer};
use eplus_stubs_schema::full_version;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

const INIT_PY: &str = "__all__ = ['IDF', 'IDFObjectsDict']\n";
/// PEP 561 marker: the stubs do not cover every runtime module.
const PY_TYPED: &str = "partial\n";
const GENERATED_BY_FILE: &str = "generated_by.json";

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("Unknown package kind '{0}' (expected 'eppy' or 'archetypal')")]
    UnknownKind(String),

    #[error("Manifest lists '{classname}' but {path} does not exist")]
    MissingObject { classname: String, path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> PackageError + '_ {
    move |source| PackageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Library a stub package targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackageKind {
    Eppy,
    Archetypal,
}

impl PackageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::Eppy => "eppy",
            PackageKind::Archetypal => "archetypal",
        }
    }

    /// Distribution name, e.g. `eppy-stubs`.
    pub fn pypi_name(&self) -> String {
        format!("{}-stubs", self.as_str())
    }

    /// Import package name under `src/`, e.g. `eppy_stubs`.
    pub fn slug(&self) -> String {
        format!("{}_stubs", self.as_str())
    }

    pub fn library_name(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageKind {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eppy" => Ok(PackageKind::Eppy),
            "archetypal" => Ok(PackageKind::Archetypal),
            _ => Err(PackageError::UnknownKind(s.to_string())),
        }
    }
}

/// A package written by [`package`].
#[derive(Debug, Clone)]
pub struct GeneratedPackage<'m> {
    pub kind: PackageKind,
    /// `<eplus_version>.<patch>`
    pub version: String,
    pub root: PathBuf,
    pub classnames: &'m [String],
}

#[derive(Debug, Serialize)]
struct GeneratedBy<'a> {
    energyplus_version: String,
    idd_sha256: &'a str,
    generator_version: &'static str,
    timestamp_utc: String,
    options: GeneratorOptions,
}

#[derive(Debug, Serialize)]
struct GeneratorOptions {
    enum_style: &'static str,
    docstrings: bool,
}

/// Package directory name, e.g. `eppy-stubs-23.1.0`.
pub fn package_dir_name(kind: PackageKind, eplus_version: &str, patch: u32) -> String {
    format!("{}-{}.{}", kind.pypi_name(), eplus_version, patch)
}

/// Assemble one stub package from the shared objects in `source_dir`.
///
/// Every manifest-listed object must exist in `source_dir`; this is checked
/// before anything under `packages_root` is touched. Only listed objects are
/// copied. An existing package directory is replaced.
pub fn package<'m>(
    kind: PackageKind,
    eplus_version: &str,
    patch: u32,
    manifest: &'m Manifest,
    source_dir: &Path,
    packages_root: &Path,
    renderer: &dyn StubRenderer,
) -> Result<GeneratedPackage<'m>, PackageError> {
    let sources = manifest
        .classnames
        .iter()
        .map(|classname| {
            let path = source_dir.join(stub_file_name(classname));
            if path.is_file() {
                Ok((classname.as_str(), path))
            } else {
                Err(PackageError::MissingObject {
                    classname: classname.clone(),
                    path,
                })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let version = format!("{}.{}", eplus_version, patch);
    let root = packages_root.join(package_dir_name(kind, eplus_version, patch));
    if root.exists() {
        debug!(path = %root.display(), "Removing previous package");
        fs::remove_dir_all(&root).map_err(io_err(&root))?;
    }

    let ctx = PackageContext {
        pypi_name: kind.pypi_name(),
        slug: kind.slug(),
        version: version.clone(),
        eplus_version: eplus_version.to_string(),
        library_name: kind.library_name().to_string(),
    };

    let src_root = root.join("src").join(&ctx.slug);
    let objects_dest = src_root.join("objects");
    fs::create_dir_all(&objects_dest).map_err(io_err(&objects_dest))?;

    for (classname, from) in &sources {
        let to = objects_dest.join(stub_file_name(classname));
        fs::copy(from, &to).map_err(io_err(&to))?;
    }

    let idf = IdfContext::new(eplus_version, manifest.classnames.iter().map(String::as_str));
    write(&src_root.join("idf.pyi"), &renderer.render_idf(&idf))?;
    write(&src_root.join("__init__.py"), INIT_PY)?;
    write(&src_root.join("py.typed"), PY_TYPED)?;
    write(&root.join("pyproject.toml"), &renderer.render_pyproject(&ctx))?;
    write(&root.join("README.md"), &renderer.render_readme(&ctx))?;
    write_generated_by(&root, eplus_version, &manifest.idd_sha256)?;

    info!(
        package = %ctx.pypi_name,
        version = %version,
        objects = sources.len(),
        path = %root.display(),
        "Wrote stub package"
    );

    Ok(GeneratedPackage {
        kind,
        version,
        root,
        classnames: &manifest.classnames,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), PackageError> {
    fs::write(path, contents).map_err(io_err(path))
}

fn write_generated_by(
    root: &Path,
    eplus_version: &str,
    idd_sha256: &str,
) -> Result<(), PackageError> {
    let record = GeneratedBy {
        energyplus_version: full_version(eplus_version),
        idd_sha256,
        generator_version: env!("CARGO_PKG_VERSION"),
        timestamp_utc: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        options: GeneratorOptions {
            enum_style: "Literal",
            docstrings: true,
        },
    };
    write(&root.join(GENERATED_BY_FILE), &serde_json::to_string_pretty(&record)?)
}
