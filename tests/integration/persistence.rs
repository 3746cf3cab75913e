//! Integration tests for saving and loading configurations

use super::test_utils::{full_argv, full_parser};
use argconf::{ArgSpec, ConfigError, ConfigParser, ErrorKind, Format, PersistenceError, Value};
use tempfile::TempDir;

#[test]
fn test_save_without_declarations_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("save.yaml");

    let parser = ConfigParser::new();
    let err = parser.save_config(&path).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Persistence(PersistenceError::NothingToSave)
    ));
    assert!(!path.exists());
}

#[test]
fn test_save_load_round_trip_all_formats() {
    let temp_dir = TempDir::new().unwrap();

    for file in ["saved.yaml", "saved.json", "saved.toml"] {
        let mut parser = full_parser();
        parser.try_parse_from(full_argv()).unwrap();
        parser
            .update_config([("optional_group1", Value::Int(0))])
            .unwrap();
        let parsed = parser.get_config();

        let path = temp_dir.path().join(file);
        parser.save_config(&path).unwrap();
        parser.load_config(&path).unwrap();
        assert_eq!(parser.get_config(), parsed, "round trip through {}", file);
    }
}

#[test]
fn test_round_trip_keeps_null_positionals() {
    let temp_dir = TempDir::new().unwrap();
    let parser = full_parser();
    for file in ["defaults.yaml", "defaults.toml"] {
        let path = temp_dir.path().join(file);
        parser.save_config(&path).unwrap();

        let mut restored = full_parser();
        restored.load_config(&path).unwrap();
        assert_eq!(restored.get_config(), parser.get_default_config(), "{}", file);
    }
}

#[test]
fn test_load_discards_prior_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("base.yaml");

    let mut parser = full_parser();
    parser.save_config(&path).unwrap();
    parser
        .update_config([("optional_arg1", Value::Int(42))])
        .unwrap();

    parser.load_config(&path).unwrap();
    assert_eq!(parser.get_config(), parser.get_default_config());
}

#[test]
fn test_load_rederives_groups_from_declarations() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("flat.yaml");
    // Every key sits under one arbitrary section; membership comes from the
    // declarations.
    std::fs::write(&path, "anything:\n  optional_group2: 5\n  arg3: 2.5\n").unwrap();

    let mut parser = full_parser();
    parser.load_config(&path).unwrap();
    let config = parser.get_config();
    assert_eq!(config.get("GROUP2", "optional_group2"), Some(&Value::Int(5)));
    assert_eq!(config.get("DEFAULT", "arg3"), Some(&Value::Float(2.5)));
    assert!(config.group("anything").is_none());
}

#[test]
fn test_load_unknown_key_leaves_state_intact() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.yaml");
    std::fs::write(&path, "DEFAULT:\n  optional_arg1: 3\n  mystery: 1\n").unwrap();

    let mut parser = full_parser();
    parser
        .update_config([("optional_arg1", Value::Int(8))])
        .unwrap();

    let err = parser.load_config(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Update);
    assert_eq!(parser.get_config().lookup("optional_arg1"), Some(&Value::Int(8)));
}

#[test]
fn test_malformed_file_is_persistence_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut parser = full_parser();
    let err = parser.load_config(&path).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Persistence(PersistenceError::Json(_))
    ));
}

#[test]
fn test_config_flag_overrides_command_line() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");

    let mut source = full_parser();
    source.try_parse_from(full_argv()).unwrap();
    source.save_config(&path).unwrap();
    let saved = source.get_config();

    let mut parser = full_parser();
    let path_arg = path.to_string_lossy().to_string();
    parser
        .try_parse_from(["app", "--optional_arg1", "99", "--config", path_arg.as_str()])
        .unwrap();
    assert_eq!(parser.get_config(), saved);

    let mut inline = full_parser();
    let inline_arg = format!("--config={}", path_arg);
    inline.try_parse_from(["app", inline_arg.as_str()]).unwrap();
    assert_eq!(inline.get_config(), saved);
}

#[test]
fn test_save_as_explicit_format() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.out");

    let mut parser = ConfigParser::new();
    parser.add_argument(ArgSpec::new(["--level"]).default(3)).unwrap();
    parser.save_config_as(&path, Format::Json).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["DEFAULT"]["level"], serde_json::json!(3));
}

#[test]
fn test_infinite_float_from_command_line() {
    let temp_dir = TempDir::new().unwrap();
    let mut parser = ConfigParser::new();
    parser
        .add_argument(ArgSpec::new(["--lr"]).value_type(argconf::TypeTag::Float).default(0.1))
        .unwrap();
    parser.try_parse_from(["app", "--lr", "inf"]).unwrap();
    let parsed = parser.get_config();
    assert_eq!(parsed.lookup("lr"), Some(&Value::Float(f64::INFINITY)));

    let json = temp_dir.path().join("c.json");
    let err = parser.save_config(&json).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Persistence(PersistenceError::NonFiniteFloat { .. })
    ));
    assert!(!json.exists());

    let yaml = temp_dir.path().join("c.yaml");
    parser.save_config(&yaml).unwrap();
    parser.load_config(&yaml).unwrap();
    assert_eq!(parser.get_config(), parsed);
}
