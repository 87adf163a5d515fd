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

//! Registration state machine
//!
//! Each user building a profile owns one [`Registration`]. The machine walks
//! a fixed sequence of steps, validating every input before it advances:
//!
//! | Step          | Accepts                              | On rejection  |
//! |---------------|--------------------------------------|---------------|
//! | Name          | non-empty trimmed text               | stay          |
//! | Age           | ASCII digits fitting in `u32`        | stay          |
//! | Gender        | Male / Female / Other, any case      | stay          |
//! | Bio           | non-empty trimmed text               | stay          |
//! | Preference    | non-empty trimmed text               | stay          |
//! | Location      | non-empty trimmed text               | stay          |
//! | ContactHandle | anything; skip/none/pass -> absent   | -             |
//!
//! Accepting the contact handle completes the draft. Retries are unbounded.

use thiserror::Error;
use veil_sdk::types::{Gender, Profile, UserId};

/// Inputs accepted at the contact step that mean "no handle"
const SKIP_WORDS: [&str; 3] = ["skip", "none", "pass"];

/// Registration step, in dialogue order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationStep {
	Name,
	Age,
	Gender,
	Bio,
	Preference,
	Location,
	ContactHandle,
}

impl RegistrationStep {
	/// Step that follows this one, `None` after the last step
	pub fn next(self) -> Option<Self> {
		match self {
			Self::Name => Some(Self::Age),
			Self::Age => Some(Self::Gender),
			Self::Gender => Some(Self::Bio),
			Self::Bio => Some(Self::Preference),
			Self::Preference => Some(Self::Location),
			Self::Location => Some(Self::ContactHandle),
			Self::ContactHandle => None,
		}
	}
}

/// Validation failures; the step is re-prompted, never surfaced as a failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
	#[error("Input must not be empty")]
	Empty,
	#[error("Age must be a non-negative whole number")]
	InvalidAge,
	#[error("Gender must be Male, Female or Other")]
	InvalidGender,
	#[error("Draft is missing field: {0}")]
	Incomplete(&'static str),
}

/// Partial profile under construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
	pub name: Option<String>,
	pub age: Option<u32>,
	pub gender: Option<Gender>,
	pub bio: Option<String>,
	pub preference: Option<String>,
	pub location: Option<String>,
	pub social_handle: Option<String>,
}

impl Draft {
	/// Merge the completed draft with the gateway-supplied display handle
	pub fn into_profile(
		self,
		user_id: UserId,
		platform_handle: Option<String>,
	) -> Result<Profile, RegistrationError> {
		Ok(Profile {
			user_id,
			name: self.name.ok_or(RegistrationError::Incomplete("name"))?,
			age: self.age.ok_or(RegistrationError::Incomplete("age"))?,
			gender: self.gender.ok_or(RegistrationError::Incomplete("gender"))?,
			bio: self.bio.ok_or(RegistrationError::Incomplete("bio"))?,
			preference: self
				.preference
				.ok_or(RegistrationError::Incomplete("preference"))?,
			location: self
				.location
				.ok_or(RegistrationError::Incomplete("location"))?,
			platform_handle: platform_handle.filter(|h| !h.is_empty()),
			social_handle: self.social_handle,
		})
	}
}

/// Result of feeding one input to the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
	/// Input stored, machine now waits at the given step
	Advanced(RegistrationStep),
	/// Input rejected, machine stays at the given step
	Rejected {
		step: RegistrationStep,
		reason: RegistrationError,
	},
	/// Last step accepted; the draft is ready to commit
	Completed(Draft),
}

/// Per-user registration dialogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
	step: RegistrationStep,
	draft: Draft,
}

impl Registration {
	/// Fresh machine waiting for the name
	pub fn new() -> Self {
		Self {
			step: RegistrationStep::Name,
			draft: Draft::default(),
		}
	}

	pub fn step(&self) -> RegistrationStep {
		self.step
	}

	pub fn draft(&self) -> &Draft {
		&self.draft
	}

	/// Apply one text input to the current step
	///
	/// On [`Transition::Completed`] the draft has been moved out and the
	/// machine must be discarded by the caller.
	pub fn advance(&mut self, input: &str) -> Transition {
		let input = input.trim();
		let result = match self.step {
			RegistrationStep::Name => non_empty(input).map(|v| self.draft.name = Some(v)),
			RegistrationStep::Age => parse_age(input).map(|v| self.draft.age = Some(v)),
			RegistrationStep::Gender => Gender::parse_label(input)
				.ok_or(RegistrationError::InvalidGender)
				.map(|v| self.draft.gender = Some(v)),
			RegistrationStep::Bio => non_empty(input).map(|v| self.draft.bio = Some(v)),
			RegistrationStep::Preference => {
				non_empty(input).map(|v| self.draft.preference = Some(v))
			}
			RegistrationStep::Location => non_empty(input).map(|v| self.draft.location = Some(v)),
			RegistrationStep::ContactHandle => {
				self.draft.social_handle = normalize_handle(input);
				Ok(())
			}
		};

		if let Err(reason) = result {
			return Transition::Rejected {
				step: self.step,
				reason,
			};
		}

		match self.step.next() {
			Some(next) => {
				self.step = next;
				Transition::Advanced(next)
			}
			None => Transition::Completed(std::mem::take(&mut self.draft)),
		}
	}
}

impl Default for Registration {
	fn default() -> Self {
		Self::new()
	}
}

fn non_empty(input: &str) -> Result<String, RegistrationError> {
	if input.is_empty() {
		Err(RegistrationError::Empty)
	} else {
		Ok(input.to_string())
	}
}

fn parse_age(input: &str) -> Result<u32, RegistrationError> {
	if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
		return Err(RegistrationError::InvalidAge);
	}
	input.parse().map_err(|_| RegistrationError::InvalidAge)
}

/// Normalize a social handle: lowercase, skip words mean absent, strip "@"
pub fn normalize_handle(input: &str) -> Option<String> {
	let handle = input.trim().to_lowercase();
	if SKIP_WORDS.contains(&handle.as_str()) {
		return None;
	}
	let handle = handle.strip_prefix('@').unwrap_or(&handle).trim();
	if handle.is_empty() {
		None
	} else {
		Some(handle.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fill_until_contact(reg: &mut Registration) {
		for input in ["Ana", "27", "female", "Loves hiking", "Male", "Porto"] {
			assert!(matches!(reg.advance(input), Transition::Advanced(_)));
		}
		assert_eq!(reg.step(), RegistrationStep::ContactHandle);
	}

	#[test]
	fn test_full_dialogue() {
		let mut reg = Registration::new();
		assert_eq!(reg.step(), RegistrationStep::Name);
		fill_until_contact(&mut reg);

		let draft = match reg.advance("@Ana.Insta") {
			Transition::Completed(draft) => draft,
			other => panic!("unexpected transition: {:?}", other),
		};

		let profile = draft
			.into_profile(UserId(7), Some("ana_tg".to_string()))
			.unwrap();
		assert_eq!(profile.name, "Ana");
		assert_eq!(profile.age, 27);
		assert_eq!(profile.gender, Gender::Female);
		assert_eq!(profile.bio, "Loves hiking");
		assert_eq!(profile.preference, "Male");
		assert_eq!(profile.location, "Porto");
		assert_eq!(profile.platform_handle.as_deref(), Some("ana_tg"));
		assert_eq!(profile.social_handle.as_deref(), Some("ana.insta"));
	}

	#[test]
	fn test_invalid_age_stays_on_age() {
		let mut reg = Registration::new();
		reg.advance("Ana");

		assert_eq!(
			reg.advance("abc"),
			Transition::Rejected {
				step: RegistrationStep::Age,
				reason: RegistrationError::InvalidAge,
			}
		);
		assert_eq!(reg.step(), RegistrationStep::Age);

		for bad in ["-3", "+5", "2.5", "", "99999999999"] {
			assert!(matches!(reg.advance(bad), Transition::Rejected { .. }));
		}

		assert_eq!(
			reg.advance(" 27 "),
			Transition::Advanced(RegistrationStep::Gender)
		);
		assert_eq!(reg.draft().age, Some(27));
	}

	#[test]
	fn test_zero_age_is_accepted() {
		let mut reg = Registration::new();
		reg.advance("Ana");
		assert_eq!(reg.advance("0"), Transition::Advanced(RegistrationStep::Gender));
	}

	#[test]
	fn test_invalid_gender_stays_on_gender() {
		let mut reg = Registration::new();
		reg.advance("Ana");
		reg.advance("27");

		assert!(matches!(
			reg.advance("dragon"),
			Transition::Rejected {
				step: RegistrationStep::Gender,
				reason: RegistrationError::InvalidGender,
			}
		));
		assert_eq!(reg.advance("OTHER"), Transition::Advanced(RegistrationStep::Bio));
		assert_eq!(reg.draft().gender, Some(Gender::Other));
	}

	#[test]
	fn test_empty_text_is_rejected() {
		let mut reg = Registration::new();
		assert!(matches!(
			reg.advance("   "),
			Transition::Rejected {
				reason: RegistrationError::Empty,
				..
			}
		));
		assert_eq!(reg.step(), RegistrationStep::Name);
	}

	#[test]
	fn test_skip_words_clear_handle() {
		for word in ["skip", "NONE", " Pass ", "@"] {
			let mut reg = Registration::new();
			fill_until_contact(&mut reg);
			match reg.advance(word) {
				Transition::Completed(draft) => assert_eq!(draft.social_handle, None),
				other => panic!("unexpected transition: {:?}", other),
			}
		}
	}

	#[test]
	fn test_missing_platform_handle() {
		let mut reg = Registration::new();
		fill_until_contact(&mut reg);
		let Transition::Completed(draft) = reg.advance("skip") else {
			panic!("expected completion");
		};
		let profile = draft.into_profile(UserId(1), None).unwrap();
		assert_eq!(profile.platform_handle, None);
		assert_eq!(profile.social_handle, None);
	}

	#[test]
	fn test_incomplete_draft() {
		let draft = Draft {
			name: Some("Ana".to_string()),
			..Default::default()
		};
		assert_eq!(
			draft.into_profile(UserId(1), None),
			Err(RegistrationError::Incomplete("age"))
		);
	}
}
