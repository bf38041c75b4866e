//! Configuration types and defaults for confgen.
//!
//! This module defines enums and default value functions used by the Config
//! struct.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of device a push session talks to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum DeviceType {
    /// Cisco IOS (default).
    #[default]
    CiscoIos,
    /// Cisco NX-OS.
    CiscoNxos,
    /// Cisco IOS XR.
    CiscoXr,
    /// Cisco ASA.
    CiscoAsa,
    /// Cisco IOS XE.
    CiscoXe,
    /// Cisco TelePresence.
    CiscoTp,
    /// Cisco Small Business 300 series.
    CiscoS300,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::CiscoIos => "cisco_ios",
            DeviceType::CiscoNxos => "cisco_nxos",
            DeviceType::CiscoXr => "cisco_xr",
            DeviceType::CiscoAsa => "cisco_asa",
            DeviceType::CiscoXe => "cisco_xe",
            DeviceType::CiscoTp => "cisco_tp",
            DeviceType::CiscoS300 => "cisco_s300",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn default_output_suffix() -> String {
    ".output".to_string()
}
pub(crate) fn default_port() -> u16 {
    22
}
pub(crate) fn default_username() -> String {
    "admin".to_string()
}
pub(crate) fn default_password() -> String {
    "password".to_string()
}
pub(crate) fn default_push_command() -> String {
    "ssh -p {port} {username}@{address}".to_string()
}
pub(crate) fn default_timeout_seconds() -> u64 {
    60
}
