// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for loading and validating component contexts.

use thiserror::Error;

/// Errors that can occur while loading a `ComponentContext` from YAML.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The context file could not be read.
    #[error("Failed to read context file: {0}")]
    Io(#[from] std::io::Error),

    /// The context file is not valid YAML or does not match the schema.
    #[error("Failed to parse context: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The component id is empty or whitespace.
    #[error("Component id must not be empty")]
    EmptyId,

    /// The same port name appears twice on one side of the component.
    #[error("Component '{component}' declares {direction} port '{port}' more than once")]
    DuplicatePort {
        component: String,
        direction: &'static str,
        port: String,
    },

    /// A channel capacity of zero cannot hold any message.
    #[error("Component '{component}' has invalid channel capacity: {capacity}")]
    InvalidCapacity { component: String, capacity: usize },
}
