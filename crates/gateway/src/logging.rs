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

//! Logging initialization for the webhook gateway
//!
//! File output is always on; console output is optional.
//!
//! # Configuration
//!
//! - `RUST_LOG`: filter directives (default: `info`),
//!   e.g. `RUST_LOG=veil_gateway=debug,engine=debug,actix_web=info`
//! - `LOG_DIR`: root directory for log files (default: `{workspace_root}/logs`).
//!   Files land in `{LOG_DIR}/gateway/`.
//! - `LOG_TO_CONSOLE`: `true`, `1` or `yes` mirrors every line to stderr
//!   with ANSI colors
//!
//! # Log File Format
//!
//! - Rotation: one file per day (UTC), `gateway.YYYY-MM-DD.log`
//! - Format: UTC RFC 3339 timestamp, thread ID, level, target, message
//!
//! Only user ids and event kinds are logged. Chat text exchanged between
//! users never reaches a log line.

use std::{
	env,
	path::{Path, PathBuf},
	sync::OnceLock,
};

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::{
	non_blocking,
	rolling::{self, Rotation},
};
use tracing_subscriber::{
	EnvFilter, fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt,
};

use crate::config::{DEFAULT_LOG_LEVEL, DEFAULT_LOG_TO_CONSOLE, LOG_COMPONENT_NAME};

// Keeps the non-blocking writer flushing until process exit
static LOG_GUARD: OnceLock<non_blocking::WorkerGuard> = OnceLock::new();

/// Walk up from `start` to the first directory whose Cargo.toml declares a workspace
fn find_workspace_root(start: &Path) -> Option<PathBuf> {
	start.ancestors().find_map(|dir| {
		let manifest = std::fs::read_to_string(dir.join("Cargo.toml")).ok()?;
		manifest
			.contains("[workspace]")
			.then(|| dir.to_path_buf())
	})
}

fn log_root() -> PathBuf {
	if let Ok(dir) = env::var("LOG_DIR") {
		return PathBuf::from(dir);
	}

	let start = env::var("CARGO_MANIFEST_DIR")
		.map(PathBuf::from)
		.or_else(|_| env::current_dir())
		.unwrap_or_else(|_| PathBuf::from("."));

	find_workspace_root(&start)
		.unwrap_or(start)
		.join("logs")
}

fn parse_flag(value: &str) -> bool {
	matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// Daily-rolling, non-blocking file writer in `log_dir`
fn setup_file_logging(log_dir: &Path) -> Result<non_blocking::NonBlocking> {
	let file_appender = rolling::RollingFileAppender::builder()
		.rotation(Rotation::DAILY)
		.filename_prefix(LOG_COMPONENT_NAME)
		.filename_suffix("log")
		.build(log_dir)
		.with_context(|| {
			format!(
				"Failed to create rolling file appender in {}",
				log_dir.display()
			)
		})?;

	let (file_writer, guard) = non_blocking(file_appender);
	LOG_GUARD.set(guard).ok();

	Ok(file_writer)
}

/// Initialize logging with file output and optional console output
///
/// Fails if the log directory cannot be created or a global subscriber is
/// already installed.
pub fn init_logging() -> Result<()> {
	dotenv::dotenv().ok();

	let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
	let log_dir = log_root().join(LOG_COMPONENT_NAME);
	std::fs::create_dir_all(&log_dir)
		.with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

	let file_writer = setup_file_logging(&log_dir)?;
	let log_to_console = env::var("LOG_TO_CONSOLE")
		.map(|v| parse_flag(&v))
		.unwrap_or(DEFAULT_LOG_TO_CONSOLE);

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

	let subscriber = Registry::default().with(filter).with(
		fmt::layer()
			.with_writer(file_writer)
			.with_timer(fmt::time::UtcTime::rfc_3339())
			.with_thread_ids(true)
			.with_target(true)
			.with_ansi(false),
	);

	let console = log_to_console.then(|| {
		fmt::layer()
			.with_writer(std::io::stderr)
			.with_timer(fmt::time::UtcTime::rfc_3339())
			.with_thread_ids(true)
			.with_target(true)
			.with_ansi(true)
	});

	subscriber
		.with(console)
		.try_init()
		.context("Failed to install tracing subscriber")?;

	info!(target: "server", "Log level: {}", log_level);
	info!(target: "server", "Log directory: {}", log_dir.display());
	if log_to_console {
		info!(target: "server", "Console output: enabled");
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_flag() {
		assert!(parse_flag("true"));
		assert!(parse_flag(" YES "));
		assert!(parse_flag("1"));
		assert!(!parse_flag("false"));
		assert!(!parse_flag(""));
	}

	#[test]
	fn test_find_workspace_root() {
		let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
		let root = find_workspace_root(&manifest_dir).unwrap();
		assert!(manifest_dir.starts_with(&root));
		assert!(root.join("crates").exists());
	}
}
