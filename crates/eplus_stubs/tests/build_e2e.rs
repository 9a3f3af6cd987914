//! End-to-end: IDD on disk -> shared objects + manifest -> packages.

use eplus_stubs::manifest::{self, ManifestError};
use eplus_stubs::packager::{self, PackageKind};
use eplus_stubs::{GenerateError, OutputLayout, PyiRenderer};
use eplus_stubs_schema::{IddParser, Result as SchemaResult, SchemaDocument, SchemaSource};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const IDD: &str = r#"!IDD_Version 23.1.0
\group Thermal Zones and Surfaces

Zone,
  \memo Defines a thermal zone of the building.
  A1 , \field Name
       \type alpha
  N1 ; \field Multiplier
       \type real
       \default 1.0

Material,
  A1 ; \field Name
       \type alpha
"#;

/// Delegates to the native parser and counts how often it is asked.
#[derive(Default)]
struct CountingSource {
    loads: Cell<usize>,
}

impl SchemaSource for CountingSource {
    fn load(&self, path: &Path) -> SchemaResult<SchemaDocument> {
        self.loads.set(self.loads.get() + 1);
        IddParser::new().load(path)
    }
}

fn setup() -> (TempDir, PathBuf, OutputLayout) {
    let temp = TempDir::new().unwrap();
    let idd = temp.path().join("Energy+.idd");
    fs::write(&idd, IDD).unwrap();
    let layout = OutputLayout::under(&temp.path().join("generated_package"));
    (temp, idd, layout)
}

#[test]
fn test_zone_and_material_end_to_end() {
    let (_temp, idd, layout) = setup();
    let renderer = PyiRenderer::new();

    let resolved = manifest::resolve(&idd, "23.1", &layout, &IddParser::new(), &renderer).unwrap();

    assert!(!resolved.cache_hit);
    assert_eq!(resolved.manifest.classnames, vec!["Material", "Zone"]);
    assert_eq!(resolved.manifest.file_count, 2);
    assert_eq!(resolved.manifest.patch, 0);
    assert_eq!(resolved.manifest.idd_sha256, manifest::sha256_file(&idd).unwrap());
    assert!(resolved.objects_dir.join("Zone.pyi").is_file());
    assert!(resolved.objects_dir.join("Material.pyi").is_file());

    let zone = fs::read_to_string(resolved.objects_dir.join("Zone.pyi")).unwrap();
    assert!(zone.contains("class Zone(EpBunch):"));
    assert!(zone.contains("Multiplier: Annotated[float, Field(default=1.0)]"));

    let pkg = packager::package(
        PackageKind::Eppy,
        "23.1",
        0,
        &resolved.manifest,
        &resolved.objects_dir,
        &layout.packages_root,
        &renderer,
    )
    .unwrap();
    assert_eq!(pkg.root, layout.packages_root.join("eppy-stubs-23.1.0"));

    let archetypal = packager::package(
        PackageKind::Archetypal,
        "23.1",
        1,
        &resolved.manifest,
        &resolved.objects_dir,
        &layout.packages_root,
        &renderer,
    )
    .unwrap();
    let pyproject = fs::read_to_string(archetypal.root.join("pyproject.toml")).unwrap();
    assert!(pyproject.contains("version = \"23.1.1\""));
    let py_typed = archetypal.root.join("src").join("archetypal_stubs").join("py.typed");
    assert_eq!(fs::read_to_string(py_typed).unwrap().trim(), "partial");
}

#[test]
fn test_second_run_is_a_cache_hit() {
    let (_temp, idd, layout) = setup();
    let renderer = PyiRenderer::new();
    let source = CountingSource::default();

    let first = manifest::resolve(&idd, "23.1", &layout, &source, &renderer).unwrap();
    let manifest_bytes = fs::read(layout.manifest_path("23.1")).unwrap();
    let zone_path = first.objects_dir.join("Zone.pyi");
    let zone_mtime = fs::metadata(&zone_path).unwrap().modified().unwrap();

    let second = manifest::resolve(&idd, "23.1", &layout, &source, &renderer).unwrap();

    assert!(second.cache_hit);
    assert_eq!(source.loads.get(), 1, "schema source must not be invoked on a hit");
    assert_eq!(second.manifest, first.manifest);
    assert_eq!(fs::read(layout.manifest_path("23.1")).unwrap(), manifest_bytes);
    assert_eq!(fs::metadata(&zone_path).unwrap().modified().unwrap(), zone_mtime);
}

#[test]
fn test_changed_idd_regenerates() {
    let (_temp, idd, layout) = setup();
    let renderer = PyiRenderer::new();
    let source = CountingSource::default();

    let first = manifest::resolve(&idd, "23.1", &layout, &source, &renderer).unwrap();

    // Rename Material -> Materiaz: one changed byte
    fs::write(&idd, IDD.replace("Material,", "Materiaz,")).unwrap();
    let second = manifest::resolve(&idd, "23.1", &layout, &source, &renderer).unwrap();

    assert!(!second.cache_hit);
    assert_eq!(source.loads.get(), 2);
    assert_ne!(second.manifest.idd_sha256, first.manifest.idd_sha256);
    assert_eq!(second.manifest.classnames, vec!["Materiaz", "Zone"]);
    assert!(!second.objects_dir.join("Material.pyi").exists(), "stale stub left behind");
}

#[test]
fn test_malformed_manifest_is_an_error() {
    let (_temp, idd, layout) = setup();
    let manifest_path = layout.manifest_path("23.1");
    fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();
    fs::write(&manifest_path, "{\"classnames\": ").unwrap();

    let err = manifest::resolve(&idd, "23.1", &layout, &IddParser::new(), &PyiRenderer::new())
        .unwrap_err();
    assert!(matches!(err, ManifestError::Parse { .. }), "{:?}", err);
}

#[test]
fn test_missing_idd_is_an_io_error() {
    let (temp, _idd, layout) = setup();
    let missing = temp.path().join("nope.idd");

    let err =
        manifest::resolve(&missing, "23.1", &layout, &IddParser::new(), &PyiRenderer::new())
            .unwrap_err();
    assert!(matches!(err, ManifestError::Io { .. }), "{:?}", err);
    assert!(!layout.manifest_path("23.1").exists());
}

#[test]
fn test_failed_regeneration_keeps_last_good_output() {
    let (_temp, idd, layout) = setup();
    let renderer = PyiRenderer::new();
    let good = manifest::resolve(&idd, "23.1", &layout, &IddParser::new(), &renderer).unwrap();
    let good_bytes = fs::read(layout.manifest_path("23.1")).unwrap();

    // A second `Zone` collides with the first
    fs::write(&idd, format!("{}\nZone;\n", IDD)).unwrap();
    let err = manifest::resolve(&idd, "23.1", &layout, &IddParser::new(), &renderer).unwrap_err();
    assert!(
        matches!(err, ManifestError::Generate(GenerateError::NameCollision { .. })),
        "{:?}",
        err
    );
    assert_eq!(fs::read(layout.manifest_path("23.1")).unwrap(), good_bytes);
    assert!(good.objects_dir.join("Zone.pyi").is_file());
    assert!(good.objects_dir.join("Material.pyi").is_file());

    // Unterminated object: the parser fails, output still untouched
    fs::write(&idd, "Zone,\n  A1 , \\field Name\n").unwrap();
    let err = manifest::resolve(&idd, "23.1", &layout, &IddParser::new(), &renderer).unwrap_err();
    assert!(matches!(err, ManifestError::Schema(_)), "{:?}", err);
    assert_eq!(fs::read(layout.manifest_path("23.1")).unwrap(), good_bytes);
    assert!(good.objects_dir.join("Zone.pyi").is_file());
}

#[test]
fn test_fresh_generations_write_identical_manifests() {
    let (temp, idd, first_layout) = setup();
    let second_layout = OutputLayout::under(&temp.path().join("elsewhere"));
    let renderer = PyiRenderer::new();

    manifest::resolve(&idd, "23.1", &first_layout, &IddParser::new(), &renderer).unwrap();
    manifest::resolve(&idd, "23.1", &second_layout, &IddParser::new(), &renderer).unwrap();

    let first = fs::read(first_layout.manifest_path("23.1")).unwrap();
    let second = fs::read(second_layout.manifest_path("23.1")).unwrap();
    assert_eq!(first, second);

    let zone = |layout: &OutputLayout| {
        fs::read(layout.objects_dir("23.1").join("Zone.pyi")).unwrap()
    };
    assert_eq!(zone(&first_layout), zone(&second_layout));
}
