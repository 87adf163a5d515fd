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

use std::{
	io,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	thread::{self, JoinHandle},
	time::{Duration, Instant},
};

use tracing::{debug, info, warn};
use veil_sdk::types::OutboundAction;

use super::{Messenger, OutboxConsumer};

/// Configuration for the Delivery Worker
#[derive(Debug, Clone)]
pub struct DeliveryWorkerConfig {
	/// Maximum number of actions to hand off per batch
	pub batch_size: usize,
	/// Maximum time to hold a partial batch (milliseconds)
	pub batch_timeout_ms: u64,
	/// Whether to log every delivered action
	pub verbose_logging: bool,
}

impl Default for DeliveryWorkerConfig {
	fn default() -> Self {
		Self {
			batch_size: 64,
			batch_timeout_ms: 20,
			verbose_logging: false,
		}
	}
}

/// Delivery Worker - consumes actions from the outbox and delivers them
///
/// Runs in a separate thread so the matching loop never waits on the
/// messaging platform. Actions are handed to the [`Messenger`] in the exact
/// order the matching loop produced them. A failed delivery is logged and
/// dropped; the core does not retry.
pub struct DeliveryWorker {
	thread_handle: Option<JoinHandle<()>>,
	shutdown: Arc<AtomicBool>,
}

impl DeliveryWorker {
	/// Start the delivery worker with given configuration
	pub fn start(
		consumer: OutboxConsumer,
		mut messenger: Box<dyn Messenger>,
		config: DeliveryWorkerConfig,
	) -> io::Result<Self> {
		let shutdown = Arc::new(AtomicBool::new(false));
		let shutdown_clone = shutdown.clone();

		let thread_handle = thread::Builder::new()
			.name("delivery-worker".to_string())
			.spawn(move || {
				info!(target: "delivery", "Delivery worker started");
				Self::run_delivery_loop(&consumer, messenger.as_mut(), &config, &shutdown_clone);
				info!(target: "delivery", "Delivery worker stopped");
			})?;

		Ok(Self {
			thread_handle: Some(thread_handle),
			shutdown,
		})
	}

	fn run_delivery_loop(
		consumer: &OutboxConsumer,
		messenger: &mut dyn Messenger,
		config: &DeliveryWorkerConfig,
		shutdown: &Arc<AtomicBool>,
	) {
		let batch_size = config.batch_size.max(1);
		let batch_timeout = Duration::from_millis(config.batch_timeout_ms);
		let mut pending: Vec<OutboundAction> = Vec::with_capacity(batch_size);
		let mut last_flush = Instant::now();

		loop {
			if shutdown.load(Ordering::Relaxed) {
				// Flush everything still queued before exiting
				pending.extend(consumer.drain(usize::MAX));
				if !pending.is_empty() {
					let count = pending.len();
					Self::deliver_batch(messenger, &mut pending, config);
					info!(target: "delivery", batch_size = count, "Flushed final batch during shutdown");
				}
				break;
			}

			let drained = consumer.drain(batch_size - pending.len());
			let drained_count = drained.len();
			pending.extend(drained);

			if drained_count > batch_size / 2 && config.verbose_logging {
				debug!(
					target: "delivery",
					drained = drained_count,
					pending = pending.len(),
					"High outbox pressure"
				);
			}

			let should_flush = pending.len() >= batch_size
				|| (!pending.is_empty() && last_flush.elapsed() >= batch_timeout);

			if should_flush {
				Self::deliver_batch(messenger, &mut pending, config);
				last_flush = Instant::now();
			} else if pending.is_empty() {
				thread::sleep(Duration::from_millis(5));
			}
		}
	}

	/// Hand every pending action to the messenger, in order
	fn deliver_batch(
		messenger: &mut dyn Messenger,
		pending: &mut Vec<OutboundAction>,
		config: &DeliveryWorkerConfig,
	) {
		let start = Instant::now();
		let batch_size = pending.len();
		let mut failed = 0usize;

		for action in pending.drain(..) {
			let kind = action.kind();
			let recipient = action.recipient();
			match messenger.deliver(action) {
				Ok(()) => {
					if config.verbose_logging {
						debug!(target: "delivery", kind, recipient = ?recipient, "Action delivered");
					}
				}
				Err(e) => {
					failed += 1;
					warn!(
						target: "delivery",
						kind,
						recipient = ?recipient,
						error = %e,
						"Delivery failed, dropping action"
					);
				}
			}
		}

		if config.verbose_logging || batch_size > 50 {
			debug!(
				target: "delivery",
				batch_size,
				failed,
				latency_ms = start.elapsed().as_millis(),
				"Batch delivered"
			);
		}
	}

	/// Shutdown the delivery worker gracefully
	///
	/// Blocks until every action already in the outbox has been handed off.
	pub fn shutdown(mut self) {
		info!(target: "delivery", "Shutting down delivery worker");
		self.stop();
	}

	fn stop(&mut self) {
		self.shutdown.store(true, Ordering::Relaxed);
		if let Some(handle) = self.thread_handle.take()
			&& let Err(e) = handle.join()
		{
			warn!(target: "delivery", error = ?e, "Delivery worker thread panicked");
		}
	}
}

impl Drop for DeliveryWorker {
	fn drop(&mut self) {
		self.stop();
	}
}
