// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::anyhow;
use tokio::sync::oneshot;

use crate::bridge::{CompletionTarget, FailureReason};
use crate::traits::{InboundMessage, UnitOfWork};

/// What the receiver of a message reports back to its sender.
pub type Acknowledgement = Result<(), FailureReason>;

/// A message received on an input port.
///
/// The message is a unit of work: it must be acked or failed exactly once.
/// Dropping it without doing either abandons it, and the sender observes
/// `BridgeError::Abandoned`.
#[derive(Debug)]
pub struct Message {
    id: String,
    source: String,
    payload: serde_json::Value,
    reply: oneshot::Sender<Acknowledgement>,
}

impl Message {
    /// Create a message together with the receiver of its acknowledgement.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        payload: serde_json::Value,
    ) -> (Self, oneshot::Receiver<Acknowledgement>) {
        let (reply, acknowledgement) = oneshot::channel();
        let message = Self {
            id: id.into(),
            source: source.into(),
            payload,
            reply,
        };
        (message, acknowledgement)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Address of the output port that sent the message.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Move the payload out, leaving `null` behind.
    pub fn take_payload(&mut self) -> serde_json::Value {
        std::mem::take(&mut self.payload)
    }

    fn reply(self, acknowledgement: Acknowledgement) -> anyhow::Result<()> {
        let id = self.id;
        self.reply.send(acknowledgement).map_err(|_| {
            anyhow!("sender of message {} is no longer waiting for acknowledgement", id)
        })
    }
}

impl UnitOfWork for Message {
    fn id(&self) -> &str {
        &self.id
    }

    fn ack(self: Box<Self>) -> anyhow::Result<()> {
        (*self).reply(Ok(()))
    }

    fn fail(self: Box<Self>, reason: &FailureReason) -> anyhow::Result<()> {
        (*self).reply(Err(reason.clone()))
    }
}

impl InboundMessage for Message {
    fn source(&self) -> &str {
        Message::source(self)
    }

    fn payload(&self) -> &serde_json::Value {
        Message::payload(self)
    }

    fn take_payload(&mut self) -> serde_json::Value {
        Message::take_payload(self)
    }
}

impl From<Message> for CompletionTarget {
    fn from(message: Message) -> Self {
        CompletionTarget::Unit(Box::new(message))
    }
}
