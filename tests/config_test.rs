//! Tests for loading client configuration from disk.

use connectn::{ClientConfig, GameConfig, Overrides};
use std::io::Write;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Create temp file");
    file.write_all(content.as_bytes()).expect("Write config");
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
host = "game.example.org"
port = 7000
name = "Ana"
color = "Yellow"

[game]
rows = 8
columns = 9
win_length = 5

[negotiation]
max_rounds = 10
round_timeout_ms = 250
"#,
    );

    let config = ClientConfig::from_file(file.path()).expect("Valid config");
    config.validate().expect("Config validates");

    assert_eq!(config.host(), "game.example.org");
    assert_eq!(*config.port(), 7000);
    assert_eq!(config.player_color().as_str(), "yellow");
    assert_eq!(*config.game(), GameConfig::new(8, 9, 5));
    assert_eq!(*config.negotiation().max_rounds(), 10);
    let board = config.game().board().expect("Board builds");
    assert_eq!((board.rows(), board.columns(), board.win_length()), (8, 9, 5));
}

#[test]
fn test_flags_override_file() {
    let file = write_config("name = \"Ana\"\ncolor = \"red\"\nport = 7000\n");
    let config = ClientConfig::from_file(file.path())
        .unwrap()
        .with_overrides(Overrides {
            port: Some(8000),
            color: Some("blue".into()),
            ..Overrides::default()
        });

    assert_eq!(*config.port(), 8000);
    assert_eq!(config.name(), "Ana");
    assert_eq!(config.color(), "blue");
}

#[test]
fn test_file_without_name_fails_validation() {
    let file = write_config("color = \"red\"\n");
    let config = ClientConfig::from_file(file.path()).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.message.contains("Name"));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ClientConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.starts_with("Failed to read config file"));
}
