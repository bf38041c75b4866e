//! Tests for config functionality.

use crate::config::{CONFIG_FILE_NAME, Config, DeviceType, PushConfig};
use crate::error::ConfgenError;
use crate::test_support::DirGuard;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.output_suffix, ".output");
    assert!(!config.strict_fields);
    assert_eq!(config.push.device_type, DeviceType::CiscoIos);
    assert_eq!(config.push.port, 22);
    assert_eq!(config.push.username, "admin");
    assert_eq!(config.push.password, "password");
    assert_eq!(config.push.command, "ssh -p {port} {username}@{address}");
    assert_eq!(config.push.timeout_seconds, 60);
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
strict_fields: true
push:
  port: 2222
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert!(config.strict_fields);
    assert_eq!(config.push.port, 2222);

    // Unspecified values should use defaults
    assert_eq!(config.output_suffix, ".output");
    assert_eq!(config.push.username, "admin");
    assert_eq!(config.push.timeout_seconds, 60);
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
output_suffix: ".cfg"
strict_fields: true
push:
  device_type: cisco_nxos
  port: 830
  username: netops
  password: s3cret
  command: "sshpass -p {password} ssh -p {port} {username}@{address}"
  timeout_seconds: 15
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.output_suffix, ".cfg");
    assert_eq!(
        config.push,
        PushConfig {
            device_type: DeviceType::CiscoNxos,
            port: 830,
            username: "netops".to_string(),
            password: "s3cret".to_string(),
            command: "sshpass -p {password} ssh -p {port} {username}@{address}".to_string(),
            timeout_seconds: 15,
        }
    );
}

#[test]
fn test_unknown_fields_ignored() {
    let yaml = r#"
output_suffix: ".out"
future_setting: 42
push:
  keepalive: true
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.output_suffix, ".out");
}

#[test]
fn test_device_type_uses_snake_case_names() {
    let config = Config::from_yaml("push:\n  device_type: cisco_s300\n").unwrap();
    assert_eq!(config.push.device_type, DeviceType::CiscoS300);
    assert!(Config::from_yaml("push:\n  device_type: CiscoS300\n").is_err());
}

#[test]
fn test_empty_suffix_rejected() {
    let err = Config::from_yaml("output_suffix: \"\"").unwrap_err();
    assert!(err.to_string().contains("output_suffix"));
}

#[test]
fn test_zero_timeout_rejected() {
    let err = Config::from_yaml("push:\n  timeout_seconds: 0").unwrap_err();
    assert!(err.to_string().contains("timeout_seconds"));
}

#[test]
fn test_malformed_push_command_rejected() {
    let err = Config::from_yaml("push:\n  command: \"ssh {address\"").unwrap_err();
    assert!(matches!(err, ConfgenError::Config(_)));
    assert!(err.to_string().contains("push.command"));
}

#[test]
fn test_unknown_push_placeholder_rejected() {
    let err = Config::from_yaml("push:\n  command: \"ssh {host}\"").unwrap_err();
    assert!(err.to_string().contains("'{host}'"), "got: {err}");
}

#[test]
fn test_invalid_device_type_rejected() {
    let err = Config::from_yaml("push:\n  device_type: juniper").unwrap_err();
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_load_missing_explicit_file() {
    let temp = TempDir::new().unwrap();
    let err = Config::discover(Some(&temp.path().join("missing.yaml"))).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
#[serial]
fn test_discover_uses_working_directory_file() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(CONFIG_FILE_NAME), "output_suffix: \".conf\"\n").unwrap();
    let _guard = DirGuard::new(temp.path());

    let config = Config::discover(None).unwrap();
    assert_eq!(config.output_suffix, ".conf");
}

#[test]
#[serial]
fn test_discover_falls_back_to_defaults() {
    let temp = TempDir::new().unwrap();
    let _guard = DirGuard::new(temp.path());

    assert_eq!(Config::discover(None).unwrap(), Config::default());
}
