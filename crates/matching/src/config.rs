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

use serde::{Deserialize, Serialize};

use crate::{delivery::DeliveryWorkerConfig, engine::EngineConfig, matcher::DEFAULT_CANDIDATE_LIMIT};

/// Core runtime configuration
///
/// Every field can be overridden through `MATCHING_*` environment
/// variables, e.g. `MATCHING_CANDIDATE_LIMIT=5`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
	/// Ingress queue capacity (events waiting for the matching loop)
	pub ingress_queue_size: usize,
	/// Outbox capacity (actions waiting for delivery)
	pub outbox_size: usize,
	/// Maximum actions handed to the messenger per batch
	pub delivery_batch_size: usize,
	/// Maximum time to hold a partial delivery batch
	pub delivery_batch_timeout_ms: u64,
	/// Maximum candidates offered after registration
	pub candidate_limit: usize,
	/// Enable verbose logging in the matching loop and delivery worker
	pub verbose_logging: bool,
}

impl Default for MatchingConfig {
	fn default() -> Self {
		Self {
			ingress_queue_size: 4096,
			outbox_size: 8192,
			delivery_batch_size: 64,
			delivery_batch_timeout_ms: 20,
			candidate_limit: DEFAULT_CANDIDATE_LIMIT,
			verbose_logging: false,
		}
	}
}

impl MatchingConfig {
	/// Load configuration from environment variables
	///
	/// A present but malformed variable is an error, never a silent default.
	pub fn from_env() -> Result<Self, config::ConfigError> {
		Self::from_environment(config::Environment::with_prefix("MATCHING"))
	}

	fn from_environment(env: config::Environment) -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder().add_source(env).build()?;

		cfg.try_deserialize()
	}

	pub fn engine_config(&self) -> EngineConfig {
		EngineConfig {
			candidate_limit: self.candidate_limit,
			verbose_logging: self.verbose_logging,
		}
	}

	pub fn delivery_config(&self) -> DeliveryWorkerConfig {
		DeliveryWorkerConfig {
			batch_size: self.delivery_batch_size,
			batch_timeout_ms: self.delivery_batch_timeout_ms,
			verbose_logging: self.verbose_logging,
		}
	}
}
