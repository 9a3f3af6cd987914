//! eplus_stubs - typed Python stubs for the EnergyPlus object model
//!
//! Reads an `Energy+.idd`, renders one `.pyi` class per IDD object into a
//! shared per-version directory (cached by the IDD's SHA-256), then packages
//! those objects as `eppy-stubs` and `archetypal-stubs`.
//!
//! Pipeline, leaf first:
//! - [`naming`]: IDD names to Python identifiers and IDF lookup keys
//! - [`type_map`]: field kind, bounds and default to an `Annotated[...]` type
//! - [`render`]: contexts and the [`StubRenderer`] seam
//! - [`generator`]: one stub file per object, with collision checks
//! - [`manifest`]: digest-keyed cache over the generator
//! - [`packager`]: PEP 561 package assembly

pub mod generator;
pub mod layout;
pub mod manifest;
pub mod naming;
pub mod packager;
pub mod render;
pub mod type_map;

pub use generator::{generate, GenerateError, ManifestDraft};
pub use layout::OutputLayout;
pub use manifest::{resolve, sha256_file, Manifest, ManifestError, Resolved};
pub use packager::{package, GeneratedPackage, PackageError, PackageKind};
pub use render::{render, PyiRenderer, StubRenderer};
pub use type_map::{map_type, MappedType, TypeExpr};
