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

//! Reveal protocol
//!
//! Every active pairing carries one consent flag per participant. Flags start
//! false, only ever flip to true, and are dropped together with the pairing.
//! The pairing-level state is derived from the two flags.

use veil_sdk::types::{Profile, UserId};

/// Label used for relayed text until both sides have revealed
pub const ANONYMOUS_LABEL: &str = "Anonymous Crush";

/// Derived reveal state of a pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
	/// Neither participant revealed
	Hidden,
	/// Exactly one participant revealed
	OneRevealed,
	/// Both participants revealed
	MutualRevealed,
}

/// Per-pairing consent flags, one per participant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealFlags {
	low: bool,
	high: bool,
}

impl RevealFlags {
	/// Set the flag of the participant on the given side (monotonic)
	pub(crate) fn set(&mut self, low_side: bool) {
		if low_side {
			self.low = true;
		} else {
			self.high = true;
		}
	}

	pub(crate) fn get(&self, low_side: bool) -> bool {
		if low_side { self.low } else { self.high }
	}

	pub fn state(&self) -> RevealState {
		match (self.low, self.high) {
			(false, false) => RevealState::Hidden,
			(true, true) => RevealState::MutualRevealed,
			_ => RevealState::OneRevealed,
		}
	}
}

/// Result of a successful reveal call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealOutcome {
	pub partner: UserId,
	pub state: RevealState,
}

/// Prefix applied to relayed text under the current reveal state
pub fn display_prefix(state: RevealState, sender: Option<&Profile>) -> String {
	match (state, sender) {
		(RevealState::MutualRevealed, Some(profile)) => format!("{}: ", profile.name),
		_ => format!("{}: ", ANONYMOUS_LABEL),
	}
}

/// Framing of a reveal card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardVoice {
	/// The revealer introducing themself ("I'm ...")
	FirstPerson,
	/// Describing the other participant ("They're ...")
	ThirdPerson,
}

/// Full identity card shared on reveal
///
/// Absent handles render as explicit placeholders. A missing profile renders
/// as a placeholder identity rather than failing the reveal.
pub fn identity_card(profile: Option<&Profile>, voice: CardVoice) -> String {
	let opener = match voice {
		CardVoice::FirstPerson => "I'm",
		CardVoice::ThirdPerson => "They're",
	};

	let Some(profile) = profile else {
		return format!(
			"{} Mystery Person, ?, from ?. Bio: ...\nTelegram: not set\nInstagram: not shared",
			opener
		);
	};

	let platform = profile
		.platform_handle
		.as_deref()
		.map(|h| format!("@{}", h))
		.unwrap_or_else(|| "not set".to_string());
	let social = profile
		.social_handle
		.as_deref()
		.map(|h| format!("@{}", h))
		.unwrap_or_else(|| "not shared".to_string());

	format!(
		"{} {}, {}, from {}. Bio: {}\nTelegram: {}\nInstagram: {}",
		opener, profile.name, profile.age, profile.location, profile.bio, platform, social
	)
}
