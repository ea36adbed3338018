use std::fs;

use api_kit::openapi::spec_json;
use api_kit::schema_file::{check_schema_file, write_schema_file, SchemaCommand};
use api_kit::{ApiConfig, ApiEndpoint, Error, RouteTable};
use pretty_assertions::assert_eq;

fn table() -> RouteTable {
    let endpoint = ApiEndpoint::get("health").handler(|_req| async { Ok("ok".to_string()) });
    RouteTable::new().route("health", endpoint)
}

fn config_with_path(path: &std::path::Path) -> ApiConfig {
    ApiConfig {
        schema_path: Some(path.to_path_buf()),
        ..ApiConfig::default()
    }
}

#[test]
fn write_then_check_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schemas/openapi.json");
    let config = config_with_path(&path);

    write_schema_file(&table(), &config).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        spec_json(&table(), &config).unwrap()
    );
    check_schema_file(&table(), &config).unwrap();
}

#[test]
fn drifted_file_fails_the_check() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("openapi.json");
    let config = config_with_path(&path);

    write_schema_file(&table(), &config).unwrap();
    fs::write(&path, "{}").unwrap();

    let error = check_schema_file(&table(), &config).unwrap_err();
    assert!(matches!(error, Error::SchemaOutOfSync));
}

#[test]
fn missing_file_fails_the_check() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_path(&dir.path().join("never-written.json"));
    assert!(matches!(
        check_schema_file(&table(), &config),
        Err(Error::Io(_))
    ));
}

#[test]
fn unset_output_path_is_a_config_error() {
    let config = ApiConfig::default();
    assert!(matches!(
        write_schema_file(&table(), &config),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        check_schema_file(&table(), &config),
        Err(Error::Config(_))
    ));
}

#[test]
fn command_writes_and_checks_through_the_output_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spec.json");
    let config = ApiConfig::default();

    let write = SchemaCommand {
        check: false,
        output: Some(path.clone()),
    };
    write.run(&table(), &config).unwrap();
    assert!(path.exists());

    let check = SchemaCommand {
        check: true,
        output: Some(path.clone()),
    };
    check.run(&table(), &config).unwrap();

    fs::write(&path, "stale").unwrap();
    assert!(matches!(
        check.run(&table(), &config),
        Err(Error::SchemaOutOfSync)
    ));
}
