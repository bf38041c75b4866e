//! Config loading, discovery, and validation.

use super::model::Config;
use crate::error::{ConfgenError, Result};
use crate::push::TARGET_VARIABLES;
use crate::template::Template;
use std::path::Path;
use tracing::debug;

/// Config file picked up from the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "confgen.yaml";

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(ConfgenError::Config)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfgenError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), "loaded config file");
        Self::from_yaml(&content)
    }

    /// Resolve the config for this run.
    ///
    /// An explicit path must exist. Without one, `confgen.yaml` in the current
    /// directory is used when present, and defaults otherwise.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = Path::new(CONFIG_FILE_NAME);
        if local.is_file() {
            Self::load(local)
        } else {
            debug!("no config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| ConfgenError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `output_suffix` must be non-empty, otherwise outputs would overwrite templates
    /// - `push.timeout_seconds` must be positive
    /// - `push.command` must be a well-formed template using only target placeholders
    pub fn validate(&self) -> Result<()> {
        if self.output_suffix.is_empty() {
            return Err(ConfgenError::Config(
                "config validation failed: output_suffix must not be empty".to_string(),
            ));
        }

        if self.push.timeout_seconds == 0 {
            return Err(ConfgenError::Config(
                "config validation failed: push.timeout_seconds must be greater than 0"
                    .to_string(),
            ));
        }

        let command = Template::parse(&self.push.command).map_err(|e| {
            ConfgenError::Config(format!(
                "config validation failed: push.command is not a valid template: {}",
                e
            ))
        })?;
        if let Some(unknown) = command.unknown_placeholders(TARGET_VARIABLES).first() {
            return Err(ConfgenError::Config(format!(
                "config validation failed: push.command uses unknown placeholder '{{{}}}'. Available: {}",
                unknown,
                TARGET_VARIABLES.join(", ")
            )));
        }

        Ok(())
    }
}
