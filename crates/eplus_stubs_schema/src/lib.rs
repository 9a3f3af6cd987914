//! EnergyPlus IDD object model
//!
//! The input data dictionary (`Energy+.idd`) declares every object class an
//! IDF file may contain, with typed fields, bounds, defaults and notes. This
//! crate holds that model and the collaborators that produce it:
//!
//! - [`model`]: `SchemaObjectDef`, `SchemaFieldDef`, `FieldKind`
//! - [`idd`]: native IDD text parser (the default [`SchemaSource`])
//! - [`source`]: the `SchemaSource` / `IddResolver` seams and the
//!   install-directory resolver

pub mod error;
pub mod idd;
pub mod model;
pub mod source;

pub use error::{Result, SchemaError};
pub use idd::IddParser;
pub use model::{FieldKind, SchemaDocument, SchemaFieldDef, SchemaObjectDef};
pub use source::{full_version, IddResolver, InstallDirResolver, SchemaSource, IDD_FILE_NAME};
