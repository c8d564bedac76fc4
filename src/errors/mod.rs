// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod bridge;
mod config;

pub use bridge::BridgeError;
pub use config::ConfigError;
