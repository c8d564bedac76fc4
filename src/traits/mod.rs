// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod channel;
pub mod handler;
pub mod reporter;
pub mod unit_of_work;

pub use channel::{ChannelHost, InboundMessage, InputChannel, InputChannels, OutputChannel, OutputChannels};
pub use handler::MessageHandler;
pub use reporter::FailureReporter;
pub use unit_of_work::UnitOfWork;
