// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod bridge;        // future -> ack/fail/callback adapter
pub mod channels;      // input/output port views
pub mod config;        // component context loading
pub mod errors;        // error handling
pub mod facade;        // per-component composition root
pub mod observability;
pub mod runtime;       // in-memory instances, ports, messages
pub mod traits;        // unified abstractions
