// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;

use crossbeam::channel::{
	Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError, bounded,
};

use crate::types::EngineCommand;

/// Ingress Queue for passing gateway events to the matching loop
///
/// The Ingress Queue serves as the boundary between the multi-threaded
/// HTTP ingress layer and the single-threaded matching loop. It provides
/// a deterministic ordering of events entering the core.
///
/// Properties:
/// - Multiple Producers (HTTP handlers across worker threads)
/// - Single Consumer (matching loop)
/// - Bounded capacity for backpressure
/// - Explicit failure semantics when full
///
/// When the queue is full, it signals backpressure to the HTTP layer,
/// which answers with a retryable status so the transport redelivers.
pub struct IngressQueue {
	sender: Sender<EngineCommand>,
	receiver: Receiver<EngineCommand>,
}

impl IngressQueue {
	/// Create a new ingress queue with the specified capacity
	pub fn new(capacity: usize) -> Self {
		let (sender, receiver) = bounded(capacity);
		Self { sender, receiver }
	}

	/// Split the queue into sender and receiver ends
	///
	/// The sender can be cloned for multiple HTTP workers.
	/// The receiver must remain unique for the single matching loop.
	pub fn split(self) -> (QueueSender, QueueReceiver) {
		(
			QueueSender {
				sender: self.sender,
			},
			QueueReceiver {
				receiver: self.receiver,
			},
		)
	}
}

/// Sender end of the ingress queue (used by HTTP handlers)
///
/// This can be cloned and shared across multiple threads.
#[derive(Clone)]
pub struct QueueSender {
	sender: Sender<EngineCommand>,
}

impl QueueSender {
	/// Try to enqueue a command (non-blocking)
	///
	/// Returns error if the queue is full, indicating that the
	/// matching loop is overloaded and cannot accept new events.
	pub fn try_enqueue(&self, cmd: impl Into<EngineCommand>) -> Result<(), QueueError> {
		self.sender.try_send(cmd.into()).map_err(|e| match e {
			TrySendError::Full(_) => QueueError::Full,
			TrySendError::Disconnected(_) => QueueError::Disconnected,
		})
	}

	pub fn len(&self) -> usize {
		self.sender.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sender.is_empty()
	}
}

/// Receiver end of the ingress queue (used by matching loop)
///
/// This should NOT be cloned - only one matching loop should consume.
pub struct QueueReceiver {
	receiver: Receiver<EngineCommand>,
}

impl QueueReceiver {
	/// Receive a command, giving up after `timeout`
	///
	/// Lets the matching loop wake up periodically to observe shutdown.
	pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineCommand, QueueError> {
		self.receiver.recv_timeout(timeout).map_err(|e| match e {
			RecvTimeoutError::Timeout => QueueError::Empty,
			RecvTimeoutError::Disconnected => QueueError::Disconnected,
		})
	}

	/// Try to receive a command (non-blocking)
	pub fn try_recv(&self) -> Result<EngineCommand, QueueError> {
		self.receiver.try_recv().map_err(|e| match e {
			TryRecvError::Empty => QueueError::Empty,
			TryRecvError::Disconnected => QueueError::Disconnected,
		})
	}
}

/// Errors that can occur when interacting with the ingress queue
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
	#[error("Queue is full")]
	Full,
	#[error("Queue is empty")]
	Empty,
	#[error("Queue disconnected")]
	Disconnected,
}
