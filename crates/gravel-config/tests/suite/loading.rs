use std::path::PathBuf;

use gravel_config::{ConfigError, GravelConfig, LoggingConfig, ParserConfig};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn empty_config_uses_defaults() {
    let config = GravelConfig::load_from_str("").expect("empty config parses");
    assert_eq!(config, GravelConfig::default());
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.stderr);
    assert!(!config.logging.json);
    assert_eq!(config.parser.prediction_window, 8);
    assert!(config.parser.sll_first);
}

#[test]
fn every_section_is_read() {
    let text = r#"
[logging]
level = "debug"
json = true
stderr = false
file = "/tmp/gravel.log"

[parser]
prediction_window = 4
sll_first = false
"#;
    let config = GravelConfig::load_from_str(text).expect("config parses");
    assert_eq!(
        config,
        GravelConfig {
            logging: LoggingConfig {
                level: "debug".to_owned(),
                json: true,
                stderr: false,
                file: Some(PathBuf::from("/tmp/gravel.log")),
            },
            parser: ParserConfig {
                prediction_window: 4,
                sll_first: false,
            },
        }
    );

    let options = config.parser.parse_options();
    assert_eq!(options.prediction_window, 4);
    assert!(!options.sll_first);
}

#[test]
fn partial_sections_keep_field_defaults() {
    let config = GravelConfig::load_from_str("[parser]\nsll_first = false\n").expect("parses");
    assert_eq!(config.parser.prediction_window, 8);
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn unknown_keys_are_rejected() {
    let err = GravelConfig::load_from_str("[parser]\nwindow = 3\n").expect_err("unknown key");
    let ConfigError::Toml(message) = err else {
        panic!("expected a toml error, got {err:?}");
    };
    assert!(message.contains("unknown field `window`"), "{message}");

    let err = GravelConfig::load_from_str("[lexer]\n").expect_err("unknown table");
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn wrong_types_are_rejected() {
    let err = GravelConfig::load_from_str("[logging]\njson = \"yes\"\n").expect_err("bad type");
    assert!(err.to_string().starts_with("failed to parse toml config:"), "{err}");
}

#[test]
fn load_from_path_reads_the_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("gravel.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").expect("write config");

    let config = GravelConfig::load_from_path(&path).expect("config loads");
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("absent.toml");

    let err = GravelConfig::load_from_path(&path).expect_err("missing file");
    match err {
        ConfigError::Io { path: reported, .. } => {
            assert_eq!(reported, path.display().to_string())
        }
        other => panic!("expected an io error, got {other:?}"),
    }
}
