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

use veil_sdk::types::{Profile, UserId};

/// Keyed collection of committed profiles (single-threaded)
///
/// Iteration follows first-insertion order. Overwriting an existing entry
/// (re-registration) replaces the record in place and keeps its original
/// position, so candidate ordering stays stable across re-registrations.
///
/// Design characteristics:
/// - Owned by the matching loop, no locks
/// - Deterministic iteration order
/// - Entries are never removed
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
	/// User ids in insertion order
	order: Vec<UserId>,
	/// User id -> committed profile
	profiles: HashMap<UserId, Profile>,
}

impl ProfileStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or overwrite the profile keyed by its user id
	///
	/// Returns the replaced profile, if any.
	pub fn insert(&mut self, profile: Profile) -> Option<Profile> {
		let user_id = profile.user_id;
		let previous = self.profiles.insert(user_id, profile);
		if previous.is_none() {
			self.order.push(user_id);
		}
		previous
	}

	pub fn get(&self, user_id: UserId) -> Option<&Profile> {
		self.profiles.get(&user_id)
	}

	pub fn contains(&self, user_id: UserId) -> bool {
		self.profiles.contains_key(&user_id)
	}

	/// Iterate profiles in insertion order
	pub fn iter(&self) -> impl Iterator<Item = &Profile> {
		self.order.iter().filter_map(|id| self.profiles.get(id))
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use veil_sdk::types::Gender;

	fn create_test_profile(id: i64, name: &str) -> Profile {
		Profile {
			user_id: UserId(id),
			name: name.to_string(),
			age: 30,
			gender: Gender::Other,
			bio: "bio".to_string(),
			preference: "Other".to_string(),
			location: "Lisbon".to_string(),
			platform_handle: None,
			social_handle: None,
		}
	}

	#[test]
	fn test_insert_and_get() {
		let mut store = ProfileStore::new();
		assert!(store.is_empty());

		assert!(store.insert(create_test_profile(1, "Ana")).is_none());
		assert_eq!(store.len(), 1);
		assert!(store.contains(UserId(1)));
		assert_eq!(store.get(UserId(1)).unwrap().name, "Ana");
		assert!(store.get(UserId(2)).is_none());
	}

	#[test]
	fn test_insertion_order() {
		let mut store = ProfileStore::new();
		store.insert(create_test_profile(3, "C"));
		store.insert(create_test_profile(1, "A"));
		store.insert(create_test_profile(2, "B"));

		let names: Vec<_> = store.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, vec!["C", "A", "B"]);
	}

	#[test]
	fn test_overwrite_keeps_position() {
		let mut store = ProfileStore::new();
		store.insert(create_test_profile(1, "A"));
		store.insert(create_test_profile(2, "B"));

		let previous = store.insert(create_test_profile(1, "A2"));
		assert_eq!(previous.unwrap().name, "A");
		assert_eq!(store.len(), 2);

		let names: Vec<_> = store.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, vec!["A2", "B"]);
	}
}
