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

mod control;
mod state;

pub use control::{EngineControlMessage, EngineStats};
pub use state::MatchingEngineState;

use std::{
	io,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	thread::{self, JoinHandle},
	time::Duration,
};

use thiserror::Error;
use tracing::{debug, error, info, warn};
use veil_sdk::types::OutboundAction;

use crate::{
	delivery::{OutboxError, OutboxProducer},
	matcher::DEFAULT_CANDIDATE_LIMIT,
	queue::{QueueError, QueueReceiver},
	types::EngineCommand,
};

/// How long the loop blocks on the ingress queue before re-checking shutdown
const IDLE_POLL: Duration = Duration::from_millis(50);

/// Error types for matching engine operations
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Engine shutdown")]
	Shutdown,
	#[error("Outbox full")]
	OutboxFull,
	#[error("Failed to spawn matching loop: {0}")]
	Spawn(#[from] io::Error),
}

/// Configuration for the matching engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
	/// Maximum candidates offered after registration
	pub candidate_limit: usize,
	pub verbose_logging: bool,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			candidate_limit: DEFAULT_CANDIDATE_LIMIT,
			verbose_logging: false,
		}
	}
}

/// Main matching engine with single-threaded event loop
///
/// The MatchingEngine runs the core loop in a dedicated thread, consuming
/// [`EngineCommand`]s from the ingress queue and pushing the resulting
/// outbound actions to the outbox.
///
/// Architecture:
/// - Single-threaded: every registration, pairing and reveal change happens here
/// - Ordered: events are handled one at a time in arrival order
/// - Non-blocking: uses channels for input/output
///
/// Because the loop owns [`MatchingEngineState`] outright, there is no
/// lock and no way for two events to interleave their effects.
pub struct MatchingEngine {
	thread_handle: Option<JoinHandle<()>>,
	shutdown: Arc<AtomicBool>,
}

impl MatchingEngine {
	/// Start the matching engine
	pub fn start(
		config: EngineConfig,
		queue_receiver: QueueReceiver,
		outbox: OutboxProducer,
	) -> Result<Self, EngineError> {
		let shutdown = Arc::new(AtomicBool::new(false));
		let shutdown_clone = shutdown.clone();

		let thread_handle = thread::Builder::new()
			.name("matching-loop".to_string())
			.spawn(move || {
				info!(
					target: "engine",
					candidate_limit = config.candidate_limit,
					"Matching engine started"
				);
				let mut state = MatchingEngineState::new(config.candidate_limit);
				Self::run_matching_loop(
					&mut state,
					&config,
					&queue_receiver,
					&outbox,
					&shutdown_clone,
				);
				info!(target: "engine", "Matching engine stopped");
			})?;

		Ok(Self {
			thread_handle: Some(thread_handle),
			shutdown,
		})
	}

	/// Main matching loop
	///
	/// This loop:
	/// 1. Dequeues an EngineCommand from the ingress queue
	/// 2. Applies it to the engine state
	/// 3. Pushes every resulting action to the outbox, in order
	fn run_matching_loop(
		state: &mut MatchingEngineState,
		config: &EngineConfig,
		queue_receiver: &QueueReceiver,
		outbox: &OutboxProducer,
		shutdown: &Arc<AtomicBool>,
	) {
		loop {
			if shutdown.load(Ordering::Relaxed) {
				break;
			}

			let cmd = match queue_receiver.recv_timeout(IDLE_POLL) {
				Ok(cmd) => cmd,
				Err(QueueError::Empty) => continue,
				Err(QueueError::Disconnected) => {
					info!(target: "engine", "Ingress queue disconnected");
					break;
				}
				Err(QueueError::Full) => {
					error!(target: "engine", "Unexpected Full error on receive");
					continue;
				}
			};

			match cmd {
				EngineCommand::Event(event) => {
					if config.verbose_logging {
						debug!(
							target: "engine",
							user = %event.user(),
							kind = event.kind(),
							"Processing event"
						);
					}
					let actions = state.handle(event);
					if let Err(e) = Self::publish(actions, outbox) {
						warn!(target: "engine", error = %e, "Dropped outbound actions");
					}
				}
				EngineCommand::Control(EngineControlMessage::Stats { respond_to }) => {
					if respond_to.send(state.stats()).is_err() {
						debug!(target: "engine", "Stats requester went away");
					}
				}
				EngineCommand::Control(EngineControlMessage::Shutdown) => {
					info!(target: "engine", "Shutdown requested via control message");
					break;
				}
			}
		}
	}

	/// Push actions to the outbox
	///
	/// A full outbox drops the remaining actions of this event rather than
	/// stalling the loop.
	fn publish(actions: Vec<OutboundAction>, outbox: &OutboxProducer) -> Result<(), EngineError> {
		let total = actions.len();
		for (index, action) in actions.into_iter().enumerate() {
			match outbox.push(action) {
				Ok(()) => {}
				Err(OutboxError::Full) => {
					warn!(
						target: "engine",
						dropped = total - index,
						"Outbox full"
					);
					return Err(EngineError::OutboxFull);
				}
				Err(_) => return Err(EngineError::Shutdown),
			}
		}
		Ok(())
	}

	/// Shutdown the matching engine gracefully
	pub fn shutdown(mut self) {
		info!(target: "engine", "Shutting down matching engine");
		self.stop();
	}

	fn stop(&mut self) {
		self.shutdown.store(true, Ordering::Relaxed);
		if let Some(handle) = self.thread_handle.take()
			&& let Err(e) = handle.join()
		{
			warn!(target: "engine", error = ?e, "Matching engine thread panicked");
		}
	}
}

impl Drop for MatchingEngine {
	fn drop(&mut self) {
		self.stop();
	}
}
