// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::errors::BridgeError;
use crate::observability::messages::channel::{AckTimedOut, DispatchTimedOut, MessageDispatched};
use crate::observability::messages::StructuredLog;
use crate::runtime::message::{Acknowledgement, Message};
use crate::traits::{InboundMessage, InputChannel, OutputChannel};

/// Inbound port backed by a bounded channel.
///
/// The port keeps a sender of its own so output ports can be connected at any
/// time; `close` drops it, after which `recv` returns `None` once every
/// connected output port has also disconnected and the buffer is drained.
#[derive(Debug)]
pub struct InputPort {
    name: String,
    sender: Mutex<Option<mpsc::Sender<Message>>>,
    receiver: tokio::sync::Mutex<mpsc::Receiver<Message>>,
}

impl InputPort {
    pub(crate) fn new(name: impl Into<String>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            name: name.into(),
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next message, or `None` when the port is closed and drained.
    pub async fn recv(&self) -> Option<Message> {
        self.receiver.lock().await.recv().await
    }

    pub fn close(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub(crate) fn sender(&self) -> Option<mpsc::Sender<Message>> {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl InputChannel for InputPort {
    fn name(&self) -> &str {
        &self.name
    }

    async fn recv(&self) -> Option<Box<dyn InboundMessage>> {
        InputPort::recv(self)
            .await
            .map(|message| Box::new(message) as Box<dyn InboundMessage>)
    }
}

#[derive(Debug, Clone)]
struct Connection {
    target: String,
    sender: mpsc::Sender<Message>,
}

/// Outbound port that fans each payload out to its connected input ports.
#[derive(Debug)]
pub struct OutputPort {
    name: String,
    address: String,
    ack_timeout: Duration,
    sequence: AtomicU64,
    connections: RwLock<Vec<Connection>>,
}

impl OutputPort {
    pub(crate) fn new(name: impl Into<String>, component_address: &str, ack_timeout: Duration) -> Self {
        let name = name.into();
        Self {
            address: format!("{}.{}", component_address, name),
            name,
            ack_timeout,
            sequence: AtomicU64::new(0),
            connections: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified address, used as the source of sent messages.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Connect this port to `target`. Fails if the input port is closed.
    pub(crate) fn connect(&self, target: &InputPort, target_address: String) -> Result<(), BridgeError> {
        let sender = target.sender().ok_or_else(|| BridgeError::PortClosed {
            port: target_address.clone(),
        })?;

        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Connection {
                target: target_address,
                sender,
            });
        Ok(())
    }

    /// Addresses of the connected input ports.
    pub fn targets(&self) -> Vec<String> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|connection| connection.target.clone())
            .collect()
    }

    /// Disconnect every input port.
    pub fn close(&self) {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Send `payload` to every connected input port and wait for all of them
    /// to acknowledge.
    ///
    /// Handing the message to a full input port and waiting for its
    /// acknowledgement share one `ack_timeout` deadline. Every receiver is
    /// waited on until that deadline even after one of them failed, so a late
    /// ack from a healthy receiver still finds its sender. The first failure
    /// observed is returned: hand-over failures, then acknowledgement
    /// failures in connection order.
    ///
    /// Resolves immediately when nothing is connected.
    pub async fn send(&self, payload: serde_json::Value) -> Result<(), BridgeError> {
        let connections = self
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let id = format!("{}-{}", self.address, sequence);
        let deadline = Instant::now() + self.ack_timeout;

        let mut first_failure = None;
        let mut pending = Vec::with_capacity(connections.len());
        for connection in &connections {
            let (message, acknowledgement) = Message::new(id.clone(), self.address.clone(), payload.clone());
            match self.dispatch(connection, message, deadline).await {
                Ok(()) => pending.push(acknowledgement),
                Err(error) => {
                    first_failure.get_or_insert(error);
                }
            }
        }

        MessageDispatched {
            port: &self.address,
            message_id: &id,
            receivers: pending.len(),
        }
        .log();

        for acknowledgement in pending {
            if let Err(error) = self.await_acknowledgement(&id, acknowledgement, deadline).await {
                first_failure.get_or_insert(error);
            }
        }

        match first_failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn dispatch(
        &self,
        connection: &Connection,
        message: Message,
        deadline: Instant,
    ) -> Result<(), BridgeError> {
        match tokio::time::timeout_at(deadline, connection.sender.send(message)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(BridgeError::PortClosed {
                port: connection.target.clone(),
            }),
            Err(_) => {
                DispatchTimedOut {
                    port: &self.address,
                    target: &connection.target,
                    timeout: self.ack_timeout,
                }
                .log();
                Err(BridgeError::Backpressure {
                    port: connection.target.clone(),
                    timeout: self.ack_timeout,
                })
            }
        }
    }

    /// Wait for one acknowledgement until `deadline`.
    ///
    /// An acknowledgement that already arrived is taken even when the
    /// deadline has passed.
    async fn await_acknowledgement(
        &self,
        id: &str,
        acknowledgement: oneshot::Receiver<Acknowledgement>,
        deadline: Instant,
    ) -> Result<(), BridgeError> {
        match tokio::time::timeout_at(deadline, acknowledgement).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(reason))) => Err(BridgeError::Nacked {
                id: id.to_string(),
                reason,
            }),
            Ok(Err(_)) => Err(BridgeError::Abandoned { id: id.to_string() }),
            Err(_) => {
                AckTimedOut {
                    port: &self.address,
                    message_id: id,
                    timeout: self.ack_timeout,
                }
                .log();
                Err(BridgeError::AckTimeout {
                    id: id.to_string(),
                    timeout: self.ack_timeout,
                })
            }
        }
    }
}

#[async_trait]
impl OutputChannel for OutputPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn connections(&self) -> usize {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn send(&self, payload: serde_json::Value) -> Result<(), BridgeError> {
        OutputPort::send(self, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::FailureReason;
    use crate::traits::UnitOfWork;
    use serde_json::json;

    fn connected_pair(timeout: Duration) -> (OutputPort, InputPort) {
        let input = InputPort::new("in", 4);
        let output = OutputPort::new("out", "producer", timeout);
        output.connect(&input, "consumer.in".to_string()).unwrap();
        (output, input)
    }

    #[tokio::test]
    async fn test_send_resolves_after_ack() {
        let (output, input) = connected_pair(Duration::from_secs(5));

        let receiver = async {
            let message = input.recv().await.unwrap();
            assert_eq!(message.payload(), &json!({"word": "hello"}));
            assert_eq!(message.source(), "producer.out");
            Box::new(message).ack().unwrap();
        };

        let (sent, _) = tokio::join!(output.send(json!({"word": "hello"})), receiver);
        assert!(sent.is_ok());
    }

    #[tokio::test]
    async fn test_send_reports_nack() {
        let (output, input) = connected_pair(Duration::from_secs(5));

        let receiver = async {
            let message = input.recv().await.unwrap();
            Box::new(message).fail(&FailureReason::msg("rejected")).unwrap();
        };

        let (sent, _) = tokio::join!(output.send(json!(1)), receiver);
        match sent {
            Err(BridgeError::Nacked { id, reason }) => {
                assert_eq!(id, "producer.out-0");
                assert_eq!(reason.message(), "rejected");
            }
            other => panic!("Expected Nacked, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_reports_abandoned_message() {
        let (output, input) = connected_pair(Duration::from_secs(5));

        let receiver = async {
            drop(input.recv().await.unwrap());
        };

        let (sent, _) = tokio::join!(output.send(json!(1)), receiver);
        assert!(matches!(sent, Err(BridgeError::Abandoned { .. })));
    }

    #[tokio::test]
    async fn test_send_times_out_without_ack() {
        let (output, input) = connected_pair(Duration::from_millis(20));

        let sent = output.send(json!(1)).await;

        assert!(matches!(sent, Err(BridgeError::AckTimeout { .. })));
        // the message is still buffered for the receiver
        assert!(input.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_send_to_full_port_gives_up_at_deadline() {
        let input = InputPort::new("in", 1);
        let output = OutputPort::new("out", "producer", Duration::from_millis(20));
        output.connect(&input, "consumer.in".to_string()).unwrap();

        let first = output.send(json!(1)).await;
        assert!(matches!(first, Err(BridgeError::AckTimeout { .. })));

        // the buffer still holds the first message, so the second cannot be handed over
        let second = tokio::time::timeout(Duration::from_secs(1), output.send(json!(2)))
            .await
            .expect("send blocked past its deadline");
        match second {
            Err(BridgeError::Backpressure { port, timeout }) => {
                assert_eq!(port, "consumer.in");
                assert_eq!(timeout, Duration::from_millis(20));
            }
            other => panic!("Expected Backpressure, got {:?}", other),
        }

        assert_eq!(input.recv().await.unwrap().payload(), &json!(1));
    }

    #[tokio::test]
    async fn test_fan_out_waits_for_every_receiver() {
        let first = InputPort::new("in", 4);
        let second = InputPort::new("in", 4);
        let output = OutputPort::new("out", "producer", Duration::from_secs(5));
        output.connect(&first, "left.in".to_string()).unwrap();
        output.connect(&second, "right.in".to_string()).unwrap();

        let receivers = async {
            let rejected = first.recv().await.unwrap();
            let accepted = second.recv().await.unwrap();
            Box::new(rejected).fail(&FailureReason::msg("left says no")).unwrap();

            // ack well after the nack has been observed by the sender
            tokio::time::sleep(Duration::from_millis(20)).await;
            Box::new(accepted).ack()
        };

        let (sent, late_ack) = tokio::join!(output.send(json!("both")), receivers);

        match sent {
            Err(BridgeError::Nacked { reason, .. }) => assert_eq!(reason.message(), "left says no"),
            other => panic!("Expected Nacked, got {:?}", other),
        }
        assert!(late_ack.is_ok());
    }

    #[tokio::test]
    async fn test_fan_out_shares_one_deadline() {
        let first = InputPort::new("in", 4);
        let second = InputPort::new("in", 4);
        let output = OutputPort::new("out", "producer", Duration::from_millis(200));
        output.connect(&first, "left.in".to_string()).unwrap();
        output.connect(&second, "right.in".to_string()).unwrap();

        let started = Instant::now();
        let sent = output.send(json!("nobody answers")).await;

        assert!(matches!(sent, Err(BridgeError::AckTimeout { .. })));
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_send_without_connections_resolves() {
        let output = OutputPort::new("out", "producer", Duration::from_millis(10));
        assert!(output.send(json!("ignored")).await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_input_drains_then_ends() {
        let (output, input) = connected_pair(Duration::from_millis(10));
        let _ = output.send(json!("last")).await;

        output.close();
        input.close();

        assert!(input.recv().await.is_some());
        assert!(input.recv().await.is_none());
    }

    #[test]
    fn test_connect_to_closed_input_fails() {
        let input = InputPort::new("in", 1);
        input.close();
        let output = OutputPort::new("out", "producer", Duration::from_secs(1));

        let result = output.connect(&input, "consumer.in".to_string());
        assert!(matches!(result, Err(BridgeError::PortClosed { .. })));
        assert!(output.targets().is_empty());
    }
}
