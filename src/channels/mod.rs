// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Thin views over a component's input and output ports.
//!
//! The views hold the channel traits from `traits::channel`, never a concrete
//! runtime, so callers reach ports the same way whichever runtime is
//! underneath. No payload is transformed here.

mod input;
mod output;

pub use input::{InputPortView, InputView};
pub use output::{OutputPortView, OutputView};
