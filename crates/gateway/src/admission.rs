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

//! Admission control for inbound updates
//!
//! Two checks run before an update reaches the engine:
//! - Deduplication: Telegram redelivers an update until it gets a 2xx, so
//!   an `update_id` seen within the TTL is acknowledged but not re-enqueued
//! - Rate limiting: a token bucket per user, evicted once it has been idle
//!   long enough to refill completely
//!
//! Both are best-effort and local to one gateway process.

use std::{
	num::NonZeroU32,
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
	time::Duration,
};

use governor::{Quota, RateLimiter};
use moka::sync::Cache;
use thiserror::Error;
use veil_sdk::types::UserId;

/// Error types for admission control
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
	#[error("Rate limit exceeded")]
	RateLimitExceeded,
	#[error("Duplicate update: {0}")]
	DuplicateUpdate(i64),
	#[error("Invalid admission settings: {0}")]
	InvalidSettings(&'static str),
}

type UserRateLimiter = Arc<
	RateLimiter<
		governor::state::direct::NotKeyed,
		governor::state::InMemoryState,
		governor::clock::DefaultClock,
	>,
>;

/// Admission settings
#[derive(Debug, Clone, Copy)]
pub struct AdmissionSettings {
	pub rate_limit_rps: u32,
	pub rate_limit_burst: u32,
	pub update_ttl_secs: u64,
	/// Bounds both the update-id cache and the number of tracked limiters
	pub update_cache_max_capacity: u64,
}

/// Admission controller shared by all HTTP workers
pub struct AdmissionController {
	/// One limiter per recently active user
	rate_limiters: Cache<UserId, UserRateLimiter>,
	quota: Quota,
	seen_updates: UpdateCache,
}

impl AdmissionController {
	pub fn new(settings: AdmissionSettings) -> Result<Self, AdmissionError> {
		let rps = NonZeroU32::new(settings.rate_limit_rps)
			.ok_or(AdmissionError::InvalidSettings("rate limit must be > 0"))?;
		let burst = NonZeroU32::new(settings.rate_limit_burst)
			.ok_or(AdmissionError::InvalidSettings("burst must be > 0"))?;

		let quota = Quota::per_second(rps).allow_burst(burst);
		// An idle bucket this old is full again, so dropping it loses nothing
		let idle = quota.replenish_interval() * burst.get();
		let rate_limiters = Cache::builder()
			.max_capacity(settings.update_cache_max_capacity)
			.time_to_idle(idle)
			.build();

		Ok(Self {
			rate_limiters,
			quota,
			seen_updates: UpdateCache::new(
				settings.update_ttl_secs,
				settings.update_cache_max_capacity,
			),
		})
	}

	/// Check the per-user rate limit
	pub fn check_rate_limit(&self, user: UserId) -> Result<(), AdmissionError> {
		let limiter = self
			.rate_limiters
			.get_with(user, || Arc::new(RateLimiter::direct(self.quota)));

		limiter
			.check()
			.map_err(|_| AdmissionError::RateLimitExceeded)
	}

	/// Record an update id, failing if it was already seen within the TTL
	pub fn check_duplicate(&self, update_id: i64) -> Result<(), AdmissionError> {
		self.seen_updates.check_and_insert(update_id)
	}

	/// Drop an update id from the dedup cache
	///
	/// Used when an admitted update could not be enqueued, so Telegram's
	/// redelivery is not mistaken for a duplicate.
	pub fn forget(&self, update_id: i64) {
		self.seen_updates.cache.invalidate(&update_id);
	}

	/// Run both checks for one update
	///
	/// Duplicates are detected first so a redelivered update never consumes
	/// rate-limit tokens.
	pub fn admit(&self, update_id: i64, user: Option<UserId>) -> Result<(), AdmissionError> {
		self.check_duplicate(update_id)?;
		if let Some(user) = user {
			self.check_rate_limit(user)?;
		}
		Ok(())
	}
}

/// Bounded, TTL-based memory of recently seen update ids
///
/// `get_with` inserts a per-call token exactly once; getting our own token
/// back means this call saw the id first.
struct UpdateCache {
	cache: Cache<i64, u64>,
	next_token: AtomicU64,
}

impl UpdateCache {
	fn new(ttl_secs: u64, max_capacity: u64) -> Self {
		let cache = Cache::builder()
			.max_capacity(max_capacity)
			.time_to_live(Duration::from_secs(ttl_secs))
			.build();

		Self {
			cache,
			next_token: AtomicU64::new(1),
		}
	}

	fn check_and_insert(&self, update_id: i64) -> Result<(), AdmissionError> {
		let token = self.next_token.fetch_add(1, Ordering::Relaxed);
		let stored = self.cache.get_with(update_id, || token);
		if stored != token {
			return Err(AdmissionError::DuplicateUpdate(update_id));
		}
		Ok(())
	}
}
