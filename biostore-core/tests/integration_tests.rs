//! Integration tests for biostore-core infrastructure

use biostore_core::{
    config_error, BiostoreConfig, BiostoreError, ConnectionConfig, LogFormat, LoggingConfig,
    Permission, Project, ProjectRecord, ProtocolVersion,
};

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let config = BiostoreConfig {
        connection: ConnectionConfig::default()
            .with_endpoint("https://store.example.org/biostore/permission")
            .with_server_name("biblio.biouml.org")
            .with_timeout(30)
            .with_protocol(ProtocolVersion::V2),
        logging: LoggingConfig {
            format: LogFormat::Json,
            ..Default::default()
        },
    };
    config.save_to_file(&path).unwrap();

    let loaded = BiostoreConfig::from_file(&path).unwrap();
    assert_eq!(
        loaded.connection.endpoint_url,
        "https://store.example.org/biostore/permission"
    );
    assert_eq!(loaded.connection.server_name.as_deref(), Some("biblio.biouml.org"));
    assert_eq!(loaded.connection.timeout_seconds, 30);
    assert_eq!(loaded.connection.protocol, ProtocolVersion::V2);
    assert_eq!(loaded.logging.format, LogFormat::Json);
}

#[test]
fn test_missing_config_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = BiostoreConfig::from_file(dir.path().join("missing.toml"));

    match result.unwrap_err() {
        BiostoreError::Config { context, .. } => {
            assert_eq!(context.operation.as_deref(), Some("read_file"));
        }
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_malformed_config_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[connection\nendpoint_url = ").unwrap();

    let err = BiostoreConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, BiostoreError::Config { .. }));
    assert!(err.message().starts_with("Failed to parse config"));
}

#[test]
fn test_load_or_default_validates() {
    let dir = tempfile::tempdir().unwrap();

    // Missing file: defaults
    let config = BiostoreConfig::load_or_default(Some(dir.path().join("none.toml").as_path())).unwrap();
    assert_eq!(config.connection.protocol, ProtocolVersion::V1);

    // Present but invalid
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[connection]\ntimeout_seconds = 0\n").unwrap();
    assert!(BiostoreConfig::load_or_default(Some(path.as_path())).is_err());
}

#[test]
fn test_error_macro_and_logging() {
    let err = config_error!("Invalid endpoint", "validate");
    assert!(!err.is_recoverable());
    assert!(!err.is_security_failure());
    assert!(!err.context().error_id.is_empty());
    err.log();
}

#[test]
fn test_project_listing_shape() {
    let records: Vec<ProjectRecord> = serde_json::from_str(
        r#"[
            {"path": "data/Collaboration/Demo", "permissions": 3},
            {"path": "data/Collaboration/", "permissions": 31},
            {"path": "data/Projects/Atlas", "permissions": 31},
            {"path": "groups/staff", "permissions": 2}
        ]"#,
    )
    .unwrap();

    let projects: Vec<Project> = records.iter().filter_map(Project::from_record).collect();
    let rendered: Vec<String> = projects.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["Demo (Info/Read)", "Atlas (All)"]);
    assert_eq!(projects[1].permission(), Permission::ALL);
}
