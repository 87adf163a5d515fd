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

use crossbeam::channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};
use veil_sdk::types::OutboundAction;

/// SPSC Outbox for passing actions from the matching loop to delivery
///
/// This buffer decouples action production (matching loop) from delivery
/// (gateway I/O), allowing the matching loop to run at full speed without
/// blocking on the network.
///
/// Properties:
/// - Single Producer (matching loop)
/// - Single Consumer (delivery worker)
/// - Bounded capacity
/// - Non-blocking push (returns error if full)
pub struct OutboxBuffer {
	sender: Sender<OutboundAction>,
	receiver: Receiver<OutboundAction>,
}

impl OutboxBuffer {
	pub fn new(capacity: usize) -> Self {
		let (sender, receiver) = bounded(capacity);
		Self { sender, receiver }
	}

	/// Split the buffer into producer and consumer ends
	pub fn split(self) -> (OutboxProducer, OutboxConsumer) {
		(
			OutboxProducer {
				sender: self.sender,
			},
			OutboxConsumer {
				receiver: self.receiver,
			},
		)
	}
}

/// Producer end of the outbox (used by matching loop)
pub struct OutboxProducer {
	sender: Sender<OutboundAction>,
}

impl OutboxProducer {
	/// Push an action to the outbox
	///
	/// Returns error if the outbox is full; the caller drops the action.
	pub fn push(&self, action: OutboundAction) -> Result<(), OutboxError> {
		self.sender.try_send(action).map_err(|e| match e {
			TrySendError::Full(_) => OutboxError::Full,
			TrySendError::Disconnected(_) => OutboxError::Disconnected,
		})
	}
}

/// Consumer end of the outbox (used by delivery worker)
pub struct OutboxConsumer {
	receiver: Receiver<OutboundAction>,
}

impl OutboxConsumer {
	/// Try to receive an action (non-blocking)
	pub fn try_recv(&self) -> Result<OutboundAction, OutboxError> {
		self.receiver.try_recv().map_err(|e| match e {
			TryRecvError::Empty => OutboxError::Empty,
			TryRecvError::Disconnected => OutboxError::Disconnected,
		})
	}

	/// Drain up to `max_count` actions without blocking
	pub fn drain(&self, max_count: usize) -> Vec<OutboundAction> {
		let mut actions = Vec::with_capacity(max_count.min(self.receiver.len()));
		for _ in 0..max_count {
			match self.try_recv() {
				Ok(action) => actions.push(action),
				Err(_) => break,
			}
		}
		actions
	}
}

/// Errors that can occur when interacting with the outbox
#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
	#[error("Outbox is full")]
	Full,
	#[error("Outbox is empty")]
	Empty,
	#[error("Outbox disconnected")]
	Disconnected,
}
