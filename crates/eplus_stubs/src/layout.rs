//! Output directory layout
//!
//! ```text
//! <shared_root>/<version>/objects/*.pyi
//! <shared_root>/<version>/manifest.json
//! <packages_root>/<pkg-name>-<version>.<patch>/
//! ```

use std::path::{Path, PathBuf};

pub const DEFAULT_PACKAGES_ROOT: &str = "generated_package";
pub const DEFAULT_SHARED_ROOT: &str = "generated_package/shared";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const OBJECTS_DIR: &str = "objects";

/// Where shared objects and packages are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub shared_root: PathBuf,
    pub packages_root: PathBuf,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            shared_root: PathBuf::from(DEFAULT_SHARED_ROOT),
            packages_root: PathBuf::from(DEFAULT_PACKAGES_ROOT),
        }
    }
}

impl OutputLayout {
    pub fn new(shared_root: impl Into<PathBuf>, packages_root: impl Into<PathBuf>) -> Self {
        Self {
            shared_root: shared_root.into(),
            packages_root: packages_root.into(),
        }
    }

    /// Default layout relocated under `root` (`<root>/shared`, `<root>`).
    pub fn under(root: &Path) -> Self {
        Self::new(root.join("shared"), root)
    }

    pub fn version_dir(&self, eplus_version: &str) -> PathBuf {
        self.shared_root.join(eplus_version)
    }

    pub fn objects_dir(&self, eplus_version: &str) -> PathBuf {
        self.version_dir(eplus_version).join(OBJECTS_DIR)
    }

    pub fn manifest_path(&self, eplus_version: &str) -> PathBuf {
        self.version_dir(eplus_version).join(MANIFEST_FILE)
    }
}
