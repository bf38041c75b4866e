//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for confgen.
///
/// This struct represents the contents of `confgen.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Appended to each template path to name its output file.
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Reject spreadsheets whose field row repeats a field name.
    #[serde(default)]
    pub strict_fields: bool,

    /// Settings for pushing rendered configuration to a device.
    #[serde(default)]
    pub push: PushConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_suffix: default_output_suffix(),
            strict_fields: false,
            push: PushConfig::default(),
        }
    }
}

/// Defaults for the push session; command-line flags override each of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Kind of device being configured.
    #[serde(default)]
    pub device_type: DeviceType,

    /// Remote session port.
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,

    /// Command line that opens a session and reads configuration on stdin.
    ///
    /// Placeholders: `{device_type}`, `{address}`, `{port}`, `{username}`, `{password}`.
    #[serde(default = "default_push_command")]
    pub command: String,

    /// Seconds each configuration block may take before the session is killed.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            device_type: DeviceType::default(),
            port: default_port(),
            username: default_username(),
            password: default_password(),
            command: default_push_command(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}
