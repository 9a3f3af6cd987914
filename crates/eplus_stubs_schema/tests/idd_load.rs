//! Loading IDD files from disk through the `SchemaSource` seam.

use eplus_stubs_schema::{FieldKind, IddParser, SchemaError, SchemaSource};
use tempfile::TempDir;

const ZONE_IDD: &str = r#"!IDD_Version 23.1.0
\group Thermal Zones and Surfaces

Zone,
  \memo Defines a thermal zone of the building.
  A1 , \field Name
       \required-field
       \type alpha
  N1 , \field Direction of Relative North
       \units deg
       \type real
       \default 0
  N2 ; \field Multiplier
       \type integer
       \default 1
       \minimum 1

BuildingSurface:Detailed,
  \memo Allows for detailed entry of building heat transfer surfaces.
  A1 , \field Name
       \required-field
  A2 ; \field Outside Boundary Condition
       \type choice
       \key Adiabatic
       \key Surface
       \key Outdoors
"#;

#[test]
fn test_load_idd_from_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Energy+.idd");
    std::fs::write(&path, ZONE_IDD).unwrap();

    let doc = IddParser::new().load(&path).unwrap();
    assert_eq!(doc.idd_version.as_deref(), Some("23.1.0"));
    assert_eq!(doc.objects.len(), 2);

    let zone = &doc.objects[0];
    assert_eq!(zone.name, "Zone");
    assert_eq!(zone.fields.len(), 3);
    assert_eq!(zone.fields[2].kind, FieldKind::Integer);
    assert_eq!(zone.fields[2].minimum.as_deref(), Some("1"));

    let surface = &doc.objects[1];
    assert_eq!(surface.name, "BuildingSurface:Detailed");
    assert_eq!(
        surface.fields[1].choices,
        vec!["Adiabatic", "Surface", "Outdoors"]
    );
}

#[test]
fn test_load_tolerates_latin1_bytes() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Energy+.idd");
    let mut bytes = b"Site:Location,\n  N1 ; \\field Latitude\n    \\note 90".to_vec();
    bytes.push(0xB0); // Latin-1 degree sign
    bytes.extend_from_slice(b" north\n");
    std::fs::write(&path, bytes).unwrap();

    let doc = IddParser::new().load(&path).unwrap();
    let note = doc.objects[0].fields[0].note.as_deref().unwrap();
    assert!(note.starts_with("90"));
    assert!(note.ends_with("north"));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let temp = TempDir::new().unwrap();
    let err = IddParser::new()
        .load(&temp.path().join("missing.idd"))
        .unwrap_err();
    assert!(matches!(err, SchemaError::Io { .. }), "{:?}", err);
}
