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

use std::{env, net::SocketAddr, str::FromStr};

use anyhow::{Context, Result};
use veil_sdk::client::DEFAULT_API_BASE;

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log directory component name
pub const LOG_COMPONENT_NAME: &str = "gateway";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = false;

// Server configuration constants
/// Default HTTP server bind address (can be overridden by VEIL_BIND_ADDR environment variable)
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:10000";

/// Default webhook path (can be overridden by VEIL_WEBHOOK_PATH)
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook";

/// Default maximum HTTP request body size in bytes (can be overridden by VEIL_MAX_BODY_BYTES)
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

// Admission / anti-abuse configuration constants
/// Default updates-per-second limit per user (can be overridden by VEIL_RATE_LIMIT_RPS)
pub const DEFAULT_RATE_LIMIT_RPS: u32 = 5;

/// Default burst capacity per user (can be overridden by VEIL_RATE_LIMIT_BURST)
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

/// Default time an update id is remembered for deduplication (can be overridden by VEIL_UPDATE_TTL_SECS)
pub const DEFAULT_UPDATE_TTL_SECS: u64 = 300;

/// Default dedup cache maximum capacity in entries (can be overridden by VEIL_UPDATE_CACHE_MAX_CAPACITY)
/// This provides a strict upper bound on memory usage for deduplication.
pub const DEFAULT_UPDATE_CACHE_MAX_CAPACITY: u64 = 100_000;

/// Default Bot API request timeout in milliseconds (can be overridden by VEIL_DELIVERY_TIMEOUT_MS)
pub const DEFAULT_DELIVERY_TIMEOUT_MS: u64 = 10_000;

/// Gateway runtime configuration, read from the environment
#[derive(Debug, Clone)]
pub struct GatewayRuntimeConfig {
	pub bot_token: String,
	pub bind_addr: SocketAddr,
	pub webhook_path: String,
	pub webhook_secret: Option<String>,
	pub api_base: String,
	pub workers: usize,
	pub max_body_bytes: usize,
	pub rate_limit_rps: u32,
	pub rate_limit_burst: u32,
	pub update_ttl_secs: u64,
	pub update_cache_max_capacity: u64,
	pub delivery_timeout_ms: u64,
}

impl GatewayRuntimeConfig {
	pub fn from_env() -> Result<Self> {
		dotenv::dotenv().ok();

		let bot_token = env::var("VEIL_BOT_TOKEN")
			.ok()
			.filter(|t| !t.trim().is_empty())
			.context("VEIL_BOT_TOKEN must be set")?;

		let bind_addr_str =
			env::var("VEIL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
		let bind_addr = bind_addr_str
			.parse()
			.with_context(|| format!("Invalid bind address: {}", bind_addr_str))?;

		let webhook_path = normalize_path(
			&env::var("VEIL_WEBHOOK_PATH").unwrap_or_else(|_| DEFAULT_WEBHOOK_PATH.to_string()),
		);

		let webhook_secret = env::var("VEIL_WEBHOOK_SECRET")
			.ok()
			.filter(|s| !s.is_empty());

		let api_base = env::var("VEIL_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

		Ok(Self {
			bot_token,
			bind_addr,
			webhook_path,
			webhook_secret,
			api_base,
			workers: env_or("VEIL_WORKERS", num_cpus::get())?,
			max_body_bytes: env_or("VEIL_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
			rate_limit_rps: env_or("VEIL_RATE_LIMIT_RPS", DEFAULT_RATE_LIMIT_RPS)?,
			rate_limit_burst: env_or("VEIL_RATE_LIMIT_BURST", DEFAULT_RATE_LIMIT_BURST)?,
			update_ttl_secs: env_or("VEIL_UPDATE_TTL_SECS", DEFAULT_UPDATE_TTL_SECS)?,
			update_cache_max_capacity: env_or(
				"VEIL_UPDATE_CACHE_MAX_CAPACITY",
				DEFAULT_UPDATE_CACHE_MAX_CAPACITY,
			)?,
			delivery_timeout_ms: env_or("VEIL_DELIVERY_TIMEOUT_MS", DEFAULT_DELIVERY_TIMEOUT_MS)?,
		})
	}
}

/// Read a numeric variable, falling back to `default` when unset
fn env_or<T>(key: &str, default: T) -> Result<T>
where
	T: FromStr,
	T::Err: std::error::Error + Send + Sync + 'static,
{
	match env::var(key) {
		Ok(value) => value
			.trim()
			.parse()
			.with_context(|| format!("{} must be a valid number, got {:?}", key, value)),
		Err(_) => Ok(default),
	}
}

fn normalize_path(path: &str) -> String {
	let path = path.trim();
	if path.starts_with('/') {
		path.to_string()
	} else {
		format!("/{}", path)
	}
}
