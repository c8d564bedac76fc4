// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_ACK_TIMEOUT_MS, DEFAULT_PORT_CAPACITY};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Static description of a component.
///
/// The context names the component, lists the ports it exposes and carries
/// free-form configuration for the component's own logic. It is read-only
/// once loaded; the bridge never mutates it.
///
/// # Fields
/// * `id` - Unique identifier of the component
/// * `address` - Address used as message source (optional, defaults to `id`)
/// * `inputs` - Names of the input ports
/// * `outputs` - Names of the output ports
/// * `channels` - Channel buffering and acknowledgement options (optional)
/// * `config` - Component-specific configuration (optional)
///
/// # Example
/// ```yaml
/// id: word_counter
/// address: pipeline.word_counter
/// inputs: [in]
/// outputs: [counts]
/// channels:
///   capacity: 128
///   ack_timeout_ms: 5000
/// config:
///   lowercase: true
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ComponentContext {
    pub id: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub channels: ChannelOptions,
    #[serde(default)]
    pub config: HashMap<String, serde_yaml::Value>,
}

impl ComponentContext {
    /// Create a context with no ports and default options.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            channels: ChannelOptions::default(),
            config: HashMap::new(),
        }
    }

    pub fn with_input(mut self, port: impl Into<String>) -> Self {
        self.inputs.push(port.into());
        self
    }

    pub fn with_output(mut self, port: impl Into<String>) -> Self {
        self.outputs.push(port.into());
        self
    }

    pub fn with_channels(mut self, channels: ChannelOptions) -> Self {
        self.channels = channels;
        self
    }

    /// Address of the component, falling back to its id.
    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or(&self.id)
    }

    /// Look up a component-specific configuration value.
    pub fn config_value(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.config.get(key)
    }
}

/// Channel options for a component's ports.
///
/// # Fields
/// * `capacity` - Messages buffered per input port (defaults to 64)
/// * `ack_timeout_ms` - How long an output port waits for acknowledgement (defaults to 30s)
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ChannelOptions {
    pub capacity: Option<usize>,
    pub ack_timeout_ms: Option<u64>,
}

impl ChannelOptions {
    /// Get the input port capacity, using the built-in default if not configured.
    pub fn get_capacity(&self) -> usize {
        self.capacity.unwrap_or(DEFAULT_PORT_CAPACITY)
    }

    /// Get the acknowledgement timeout, using the built-in default if not configured.
    pub fn get_ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms.unwrap_or(DEFAULT_ACK_TIMEOUT_MS))
    }
}

/// Load a component context from a YAML file
pub fn load_context<P: AsRef<Path>>(path: P) -> Result<ComponentContext, ConfigError> {
    let content = fs::read_to_string(path)?;
    let context: ComponentContext = serde_yaml::from_str(&content)?;
    Ok(context)
}

/// Load a component context from a YAML file and validate it
pub fn load_and_validate_context<P: AsRef<Path>>(path: P) -> Result<ComponentContext, ConfigError> {
    let context = load_context(path)?;
    validate_context(&context)?;
    Ok(context)
}

/// Check that a context can back a component instance.
///
/// Rejects an empty id, a port name declared twice on the same side and a
/// zero channel capacity.
pub fn validate_context(context: &ComponentContext) -> Result<(), ConfigError> {
    if context.id.trim().is_empty() {
        return Err(ConfigError::EmptyId);
    }

    for (direction, ports) in [("input", &context.inputs), ("output", &context.outputs)] {
        let mut seen = HashSet::new();
        for port in ports {
            if !seen.insert(port.as_str()) {
                return Err(ConfigError::DuplicatePort {
                    component: context.id.clone(),
                    direction,
                    port: port.clone(),
                });
            }
        }
    }

    if context.channels.capacity == Some(0) {
        return Err(ConfigError::InvalidCapacity {
            component: context.id.clone(),
            capacity: 0,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_context(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_basic_context() {
        let yaml = r#"
id: word_counter
inputs: [in]
outputs: [counts, errors]
config:
  lowercase: true
"#;

        let context: ComponentContext = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(context.id, "word_counter");
        assert_eq!(context.address(), "word_counter");
        assert_eq!(context.inputs, vec!["in"]);
        assert_eq!(context.outputs, vec!["counts", "errors"]);
        assert_eq!(
            context.config_value("lowercase"),
            Some(&serde_yaml::Value::Bool(true))
        );
        assert_eq!(context.channels.get_capacity(), DEFAULT_PORT_CAPACITY);
        assert_eq!(
            context.channels.get_ack_timeout(),
            Duration::from_millis(DEFAULT_ACK_TIMEOUT_MS)
        );
    }

    #[test]
    fn test_load_and_validate_valid_context() {
        let file = write_context(
            r#"
id: splitter
address: pipeline.splitter
inputs: [lines]
outputs: [words]
channels:
  capacity: 8
  ack_timeout_ms: 250
"#,
        );

        let context = load_and_validate_context(file.path()).unwrap();
        assert_eq!(context.address(), "pipeline.splitter");
        assert_eq!(context.channels.get_capacity(), 8);
        assert_eq!(context.channels.get_ack_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_load_and_validate_duplicate_port() {
        let file = write_context(
            r#"
id: splitter
inputs: [lines, lines]
"#,
        );

        let error = load_and_validate_context(file.path()).unwrap_err();
        assert!(matches!(
            error,
            ConfigError::DuplicatePort { direction: "input", .. }
        ));
        assert!(error.to_string().contains("declares input port 'lines' more than once"));
    }

    #[test]
    fn test_load_and_validate_zero_capacity() {
        let file = write_context(
            r#"
id: splitter
channels:
  capacity: 0
"#,
        );

        let error = load_and_validate_context(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidCapacity { capacity: 0, .. }));
    }

    #[test]
    fn test_validate_rejects_blank_id() {
        let context = ComponentContext::new("  ");
        assert!(matches!(validate_context(&context), Err(ConfigError::EmptyId)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let error = load_context("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(error, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_malformed_yaml_is_parse_error() {
        let file = write_context("inputs: [in]\n");
        let error = load_context(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }
}
