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

use std::collections::HashMap;

use thiserror::Error;
use veil_sdk::types::UserId;

use crate::reveal::{RevealFlags, RevealOutcome, RevealState};

/// Error types for pairing operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
	#[error("User {0} cannot be paired with themself")]
	SelfPairing(UserId),
	#[error("User {0} has no active pairing")]
	NotPaired(UserId),
}

/// Unordered pairing key; `low` is always the smaller id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey {
	low: UserId,
	high: UserId,
}

impl PairKey {
	fn new(a: UserId, b: UserId) -> Self {
		if a <= b {
			Self { low: a, high: b }
		} else {
			Self { low: b, high: a }
		}
	}
}

/// Result of a pair operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairOutcome {
	/// The two users were already paired with each other; nothing changed
	pub unchanged: bool,
	/// Former partners whose pairing was ended to make room
	pub displaced: Vec<UserId>,
}

/// Symmetric pairing table with per-pairing reveal flags
///
/// Invariants, upheld by every operation:
/// - `partner_of(a) == Some(b)` iff `partner_of(b) == Some(a)`
/// - a user is in at most one pairing
/// - reveal flags exist exactly for the live pairings
#[derive(Debug, Clone, Default)]
pub struct PairingTable {
	partners: HashMap<UserId, UserId>,
	reveals: HashMap<PairKey, RevealFlags>,
}

impl PairingTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Pair `a` with `b`
	///
	/// Any other pairing either side is in is ended first, and the former
	/// partners are reported as displaced. Pairing two users who are already
	/// together keeps their reveal flags.
	pub fn pair(&mut self, a: UserId, b: UserId) -> Result<PairOutcome, PairingError> {
		if a == b {
			return Err(PairingError::SelfPairing(a));
		}
		if self.partner_of(a) == Some(b) {
			return Ok(PairOutcome {
				unchanged: true,
				displaced: Vec::new(),
			});
		}

		let mut displaced = Vec::new();
		for user in [a, b] {
			if let Some(former) = self.unpair(user) {
				displaced.push(former);
			}
		}

		self.partners.insert(a, b);
		self.partners.insert(b, a);
		self.reveals.insert(PairKey::new(a, b), RevealFlags::default());

		Ok(PairOutcome {
			unchanged: false,
			displaced,
		})
	}

	/// End `a`'s pairing, returning the former partner
	///
	/// Idempotent: returns `None` when `a` has no partner.
	pub fn unpair(&mut self, a: UserId) -> Option<UserId> {
		let b = self.partners.remove(&a)?;
		self.partners.remove(&b);
		self.reveals.remove(&PairKey::new(a, b));
		Some(b)
	}

	pub fn partner_of(&self, a: UserId) -> Option<UserId> {
		self.partners.get(&a).copied()
	}

	/// Current reveal state of `a`'s pairing
	pub fn reveal_state(&self, a: UserId) -> Option<RevealState> {
		let b = self.partner_of(a)?;
		self.reveals.get(&PairKey::new(a, b)).map(|f| f.state())
	}

	/// Whether `a` has revealed in their current pairing
	pub fn has_revealed(&self, a: UserId) -> bool {
		self.partner_of(a)
			.and_then(|b| {
				let key = PairKey::new(a, b);
				self.reveals.get(&key).map(|f| f.get(key.low == a))
			})
			.unwrap_or(false)
	}

	/// Record `a`'s consent to reveal in their current pairing
	pub fn reveal(&mut self, a: UserId) -> Result<RevealOutcome, PairingError> {
		let partner = self.partner_of(a).ok_or(PairingError::NotPaired(a))?;
		let key = PairKey::new(a, partner);
		let flags = self.reveals.entry(key).or_default();
		flags.set(key.low == a);

		Ok(RevealOutcome {
			partner,
			state: flags.state(),
		})
	}

	/// Number of live pairings
	pub fn len(&self) -> usize {
		self.reveals.len()
	}

	pub fn is_empty(&self) -> bool {
		self.reveals.is_empty()
	}
}
