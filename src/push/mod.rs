//! Pushing rendered configuration to a device.
//!
//! The rendered blocks of one template are sent in order, one chunk per
//! record, through a [`Pusher`]. [`CommandPusher`] is the implementation used
//! by the CLI: it opens a session by running a configured command and writes
//! each block to the command's stdin.

mod command;

pub use command::CommandPusher;

use crate::config::{DeviceType, PushConfig};
use crate::error::{ConfgenError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use tracing::info;

/// Placeholders available to the push command template.
pub const TARGET_VARIABLES: &[&str] = &["device_type", "address", "port", "username", "password"];

/// Connection details for the device being configured.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    pub device_type: DeviceType,
    pub address: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceTarget")
            .field("device_type", &self.device_type)
            .field("address", &self.address)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl DeviceTarget {
    /// Build a target from an address and push settings.
    ///
    /// Fails with `MissingAddress` when no (or a blank) address is given.
    pub fn new(address: Option<&str>, settings: &PushConfig) -> Result<Self> {
        let address = match address.map(str::trim) {
            Some(address) if !address.is_empty() => address.to_string(),
            _ => return Err(ConfgenError::MissingAddress),
        };
        Ok(Self {
            device_type: settings.device_type,
            address,
            port: settings.port,
            username: settings.username.clone(),
            password: settings.password.clone(),
        })
    }

    /// Template variables describing this target, keyed by [`TARGET_VARIABLES`].
    pub fn variables(&self) -> HashMap<String, String> {
        crate::template::vars([
            ("device_type", self.device_type.to_string()),
            ("address", self.address.clone()),
            ("port", self.port.to_string()),
            ("username", self.username.clone()),
            ("password", self.password.clone()),
        ])
    }
}

/// A session that accepts configuration chunks.
pub trait Pusher {
    /// Send one configuration block and return the device's feedback.
    fn send(&mut self, block: &str) -> Result<String>;
}

/// Feedback for one pushed chunk.
#[derive(Debug, Clone)]
pub struct ChunkFeedback {
    /// 1-based chunk number.
    pub index: usize,
    pub sent_at: DateTime<Utc>,
    pub output: String,
}

/// Outcome of pushing all blocks of one template.
#[derive(Debug, Clone)]
pub struct PushReport {
    pub started_at: DateTime<Utc>,
    pub chunks: Vec<ChunkFeedback>,
}

impl PushReport {
    /// All chunk feedback concatenated in push order.
    pub fn feedback(&self) -> String {
        self.chunks.iter().map(|chunk| chunk.output.as_str()).collect()
    }
}

/// Send `blocks` in order, stopping at the first failure.
pub fn push_blocks<P: Pusher + ?Sized>(pusher: &mut P, blocks: &[String]) -> Result<PushReport> {
    let mut report = PushReport {
        started_at: Utc::now(),
        chunks: Vec::with_capacity(blocks.len()),
    };

    for (index, block) in blocks.iter().enumerate() {
        info!(
            element = index + 1,
            total = blocks.len(),
            "pushing configuration element"
        );
        let sent_at = Utc::now();
        let output = pusher.send(block)?;
        report.chunks.push(ChunkFeedback {
            index: index + 1,
            sent_at,
            output,
        });
    }
    Ok(report)
}
