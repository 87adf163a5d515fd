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

//! Outbound delivery pipeline
//!
//! The matching loop pushes [`OutboundAction`]s into a bounded SPSC
//! [`OutboxBuffer`]; a [`DeliveryWorker`] thread drains it in batches and
//! hands each action to a [`Messenger`]. Delivery is fire-and-forget: the
//! loop never waits for it, failures are logged and never retried.

mod buffer;
mod worker;

pub use buffer::{OutboxBuffer, OutboxConsumer, OutboxError, OutboxProducer};
pub use worker::{DeliveryWorker, DeliveryWorkerConfig};

use std::sync::{Arc, Mutex};

use thiserror::Error;
use veil_sdk::types::OutboundAction;

/// Error types for delivery operations
#[derive(Debug, Error)]
pub enum DeliveryError {
	#[error("Recipient unreachable: {0}")]
	Unreachable(String),
	#[error("Messenger closed")]
	Closed,
}

/// Messenger trait - the gateway side of outbound delivery
///
/// Implementations should hand the action off quickly (e.g. to an async
/// task) rather than block on network I/O, and must preserve the order in
/// which actions are handed to them.
pub trait Messenger: Send {
	fn deliver(&mut self, action: OutboundAction) -> Result<(), DeliveryError>;
}

/// In-memory messenger that records every action
///
/// Suitable for tests and local runs; clones share the same log.
#[derive(Clone, Default)]
pub struct MemoryMessenger {
	delivered: Arc<Mutex<Vec<OutboundAction>>>,
}

impl MemoryMessenger {
	pub fn new() -> Self {
		Self::default()
	}

	/// Copy of every action delivered so far
	pub fn delivered(&self) -> Vec<OutboundAction> {
		self.delivered
			.lock()
			.map(|log| log.clone())
			.unwrap_or_default()
	}

	pub fn len(&self) -> usize {
		self.delivered.lock().map(|log| log.len()).unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Messenger for MemoryMessenger {
	fn deliver(&mut self, action: OutboundAction) -> Result<(), DeliveryError> {
		self.delivered
			.lock()
			.map_err(|_| DeliveryError::Closed)?
			.push(action);
		Ok(())
	}
}
