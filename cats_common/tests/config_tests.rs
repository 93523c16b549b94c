//! Monitor configuration loading tests.
//!
//! Tests for `ConfigLoader` on `MonitorConfig`: defaults, overrides,
//! missing files, syntax errors and the validation rules of the robot
//! section.

use cats_common::config::{ConfigError, ConfigLoader, LogLevel};
use cats_common::robot::config::{FramingMode, MonitorConfig};
use cats_common::robot::model::Model;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write `content` as monitor.toml in a fresh directory.
fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("monitor.toml");
    fs::write(&path, content).unwrap();
    (dir, path)
}

const MINIMAL: &str = r#"
[shared]
service_name = "cats-monitor"

[robot]
host = "192.168.1.10"
"#;

#[test]
fn minimal_config_uses_defaults() {
    let (_dir, path) = write_config(MINIMAL);
    let cfg = MonitorConfig::load_validated(&path).unwrap();

    assert_eq!(cfg.shared.log_level, LogLevel::Info);
    assert_eq!(cfg.robot.model, Model::Cats);
    assert_eq!(cfg.robot.operate_port, 1000);
    assert_eq!(cfg.robot.monitor_port, 10000);
    assert_eq!(cfg.robot.update_interval_ms, 300);
    assert_eq!(cfg.robot.framing, FramingMode::SingleRead);
    assert_eq!(cfg.robot.safety.single_pass_threshold, 0);
    assert_eq!(cfg.robot.safety.double_pass_threshold, 1);
    assert!(cfg.robot.puck_types.is_none());
}

#[test]
fn full_config_round_trips() {
    let (_dir, path) = write_config(
        r#"
[shared]
log_level = "debug"
service_name = "id30a1-cats"

[robot]
host = "isara2.beamline"
operate_port = 1001
monitor_port = 10001
model = "ISARA2"
puck_types = "22222222222222222222222222222"
update_interval_ms = 500
reconnect_interval_s = 2
reconnect_timeout_s = 60
read_timeout_ms = 1500
framing = "delimited"

[robot.safety]
single_pass_threshold = 0
double_pass_threshold = 2
"#,
    );
    let cfg = MonitorConfig::load_validated(&path).unwrap();

    assert_eq!(cfg.shared.log_level, LogLevel::Debug);
    assert_eq!(cfg.robot.model, Model::Isara2);
    assert_eq!(cfg.robot.framing, FramingMode::Delimited);
    assert_eq!(cfg.robot.puck_types.as_deref().map(str::len), Some(29));
    assert_eq!(cfg.robot.reconnect_timeout().as_secs(), 60);
    assert_eq!(cfg.robot.read_timeout().as_millis(), 1500);
    assert_eq!(cfg.robot.safety.double_pass_threshold, 2);
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = MonitorConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound));
}

#[test]
fn syntax_error_is_a_parse_error() {
    let (_dir, path) = write_config("[robot\nhost = ");
    assert!(matches!(
        MonitorConfig::load(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn unknown_model_is_a_parse_error() {
    let (_dir, path) = write_config(&format!("{MINIMAL}model = \"cats3\"\n"));
    let err = MonitorConfig::load(&path).unwrap_err();
    match err {
        ConfigError::ParseError(msg) => assert!(msg.contains("cats3")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn validation_rejects_bad_robot_sections() {
    let cases = [
        ("host = \"\"", "host"),
        ("host = \"h\"\noperate_port = 0", "ports"),
        ("host = \"h\"\nupdate_interval_ms = 0", "update_interval_ms"),
        ("host = \"h\"\nread_timeout_ms = 0", "read_timeout_ms"),
        ("host = \"h\"\npuck_types = \"\"", "puck_types"),
        (
            "host = \"h\"\npuck_types = \"111111111111111111111111111111111\"",
            "puck_types",
        ),
    ];
    for (robot, expected) in cases {
        let (_dir, path) = write_config(&format!(
            "[shared]\nservice_name = \"m\"\n\n[robot]\n{robot}\n"
        ));
        match MonitorConfig::load_validated(&path) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains(expected), "{robot}: {msg}")
            }
            other => panic!("{robot}: expected validation error, got {other:?}"),
        }
    }
}

#[test]
fn empty_service_name_fails_validation() {
    let (_dir, path) = write_config("[shared]\nservice_name = \"\"\n\n[robot]\nhost = \"h\"\n");
    assert!(matches!(
        MonitorConfig::load_validated(&path),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn service_name_defaults_to_monitor() {
    let (_dir, path) = write_config("[shared]\n\n[robot]\nhost = \"h\"\n");
    let config = MonitorConfig::load_validated(&path).unwrap();
    assert_eq!(config.shared.service_name, "cats-monitor");
}
