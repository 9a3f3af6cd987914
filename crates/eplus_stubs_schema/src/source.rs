//! Injection seams for the IDD collaborators.
//!
//! Generation never reaches for a parser or an EnergyPlus install on its own;
//! callers hand in a [`SchemaSource`] and, when no explicit IDD path is known,
//! an [`IddResolver`].

use crate::error::{Result, SchemaError};
use crate::model::SchemaDocument;
use std::path::{Path, PathBuf};

/// Name of the dictionary file inside an EnergyPlus install.
pub const IDD_FILE_NAME: &str = "Energy+.idd";

/// Turns an IDD file into object definitions.
pub trait SchemaSource {
    fn load(&self, path: &Path) -> Result<SchemaDocument>;
}

/// Finds the IDD file for an EnergyPlus version string.
pub trait IddResolver {
    fn resolve(&self, version: &str) -> Result<PathBuf>;
}

/// Expand `23.1` to `23.1.0`. Versions with three or more parts are returned as given.
pub fn full_version(version: &str) -> String {
    let parts: Vec<&str> = version.trim().split('.').collect();
    match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.trim().to_string(),
    }
}

/// Looks for `Energy+.idd` under the standard EnergyPlus install directories.
#[derive(Debug, Clone)]
pub struct InstallDirResolver {
    roots: Vec<PathBuf>,
}

impl Default for InstallDirResolver {
    fn default() -> Self {
        // `C:\` would be a relative directory name anywhere but Windows
        let roots = if cfg!(windows) {
            vec![PathBuf::from("C:\\")]
        } else {
            vec![PathBuf::from("/Applications"), PathBuf::from("/usr/local")]
        };
        Self { roots }
    }
}

impl InstallDirResolver {
    /// Search only the given parent directories.
    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Every candidate path for `version`, in search order.
    pub fn candidates(&self, version: &str) -> Vec<PathBuf> {
        let dashed = full_version(version).replace('.', "-");
        let dir_names = [
            format!("EnergyPlus-{}", dashed),
            format!("EnergyPlusV{}", dashed),
        ];
        self.roots
            .iter()
            .flat_map(|root| {
                dir_names
                    .iter()
                    .map(move |dir| root.join(dir).join(IDD_FILE_NAME))
            })
            .collect()
    }
}

impl IddResolver for InstallDirResolver {
    fn resolve(&self, version: &str) -> Result<PathBuf> {
        let searched = self.candidates(version);
        match searched.iter().find(|p| p.is_file()) {
            Some(found) => {
                tracing::info!(path = %found.display(), "Resolved IDD for EnergyPlus {}", version);
                Ok(found.clone())
            }
            None => Err(SchemaError::IddNotFound {
                version: version.to_string(),
                searched,
            }),
        }
    }
}
