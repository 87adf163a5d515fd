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

use thiserror::Error;
use tokio::sync::oneshot;
use veil_matching::{EngineControlMessage, EngineStats, QueueError, QueueSender};
use veil_sdk::types::InboundEvent;

/// How long a health probe waits for the matching loop to answer
const STATS_TIMEOUT: Duration = Duration::from_secs(2);

/// Error types for dispatching operations
#[derive(Debug, Error)]
pub enum DispatcherError {
	#[error("Matching engine overloaded")]
	Overloaded,
	#[error("Matching engine unavailable")]
	Unavailable,
	#[error("Matching engine did not answer in time")]
	Timeout,
}

impl From<QueueError> for DispatcherError {
	fn from(e: QueueError) -> Self {
		match e {
			QueueError::Full => DispatcherError::Overloaded,
			QueueError::Empty | QueueError::Disconnected => DispatcherError::Unavailable,
		}
	}
}

/// Dispatcher that forwards inbound events to the matching loop
///
/// Cheap to clone; every HTTP worker holds one. Enqueueing never blocks:
/// a full ingress queue is reported as [`DispatcherError::Overloaded`].
#[derive(Clone)]
pub struct EngineDispatcher {
	sender: QueueSender,
}

impl EngineDispatcher {
	pub fn new(sender: QueueSender) -> Self {
		Self { sender }
	}

	pub fn dispatch(&self, event: InboundEvent) -> Result<(), DispatcherError> {
		let user = event.user();
		let kind = event.kind();
		self.sender.try_enqueue(event).map_err(|e| {
			tracing::warn!(
				target: "server::dispatcher",
				user = %user,
				kind,
				error = %e,
				"Failed to enqueue event"
			);
			DispatcherError::from(e)
		})
	}

	/// Ask the matching loop for its counters
	pub async fn stats(&self) -> Result<EngineStats, DispatcherError> {
		let (respond_to, response) = oneshot::channel();
		self.sender
			.try_enqueue(EngineControlMessage::Stats { respond_to })?;

		match tokio::time::timeout(STATS_TIMEOUT, response).await {
			Ok(Ok(stats)) => Ok(stats),
			Ok(Err(_)) => Err(DispatcherError::Unavailable),
			Err(_) => Err(DispatcherError::Timeout),
		}
	}

	pub fn queue_depth(&self) -> usize {
		self.sender.len()
	}
}
