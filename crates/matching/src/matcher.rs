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

use veil_sdk::types::{Profile, UserId};

use crate::profiles::ProfileStore;

/// Default number of candidates returned per search
pub const DEFAULT_CANDIDATE_LIMIT: usize = 3;

/// Stateless matchmaker over the profile store
///
/// Candidates are taken in store insertion order, not ranked:
/// - The caller is never its own candidate
/// - Compatibility is checked independently in both directions
/// - The first `limit` compatible profiles win
#[derive(Debug, Clone, Copy)]
pub struct Matchmaker {
	limit: usize,
}

impl Matchmaker {
	pub fn new(limit: usize) -> Self {
		Self { limit }
	}

	/// Find candidates for `user_id`
	///
	/// Returns an empty list when the caller has no committed profile.
	pub fn find(&self, store: &ProfileStore, user_id: UserId) -> Vec<UserId> {
		let Some(caller) = store.get(user_id) else {
			return Vec::new();
		};

		store
			.iter()
			.filter(|candidate| candidate.user_id != user_id)
			.filter(|candidate| is_compatible(caller, candidate))
			.take(self.limit)
			.map(|candidate| candidate.user_id)
			.collect()
	}
}

impl Default for Matchmaker {
	fn default() -> Self {
		Self::new(DEFAULT_CANDIDATE_LIMIT)
	}
}

/// Compatibility predicate between caller `p` and candidate `q`
///
/// `q`'s gender label must occur in `p`'s preference text and `p`'s gender
/// label must occur in `q`'s preference text. Plain case-sensitive substring
/// containment, so "Female" does not contain "Male" but "male" is ignored.
pub fn is_compatible(p: &Profile, q: &Profile) -> bool {
	p.preference.contains(q.gender.label()) && q.preference.contains(p.gender.label())
}

/// Human-readable summary line for a candidate list
pub fn summary_line(profile: &Profile) -> String {
	format!("• {}, {}, {}", profile.name, profile.age, profile.location)
}
