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

//! User-facing copy
//!
//! Every text the core sends lives here so wording can change without
//! touching the state machines.

use crate::registration::{RegistrationError, RegistrationStep};

pub fn prompt(step: RegistrationStep) -> &'static str {
	match step {
		RegistrationStep::Name => "Let's build your profile!\n\nWhat's your name?",
		RegistrationStep::Age => "Nice name. How old are you?",
		RegistrationStep::Gender => "Got it! What's your gender? (Male/Female/Other)",
		RegistrationStep::Bio => "Perfect! Tell me about yourself (bio)?",
		RegistrationStep::Preference => "Sounds intriguing! What are you looking for (Male/Female/Other)?",
		RegistrationStep::Location => "Got your vibe! Where are you located?",
		RegistrationStep::ContactHandle => {
			"Almost done! Your Instagram handle? (e.g. @yourhandle, or 'skip')"
		}
	}
}

pub fn reprompt(step: RegistrationStep, reason: &RegistrationError) -> &'static str {
	match (step, reason) {
		(_, RegistrationError::InvalidAge) => "That doesn't look like a valid age. Try again?",
		(_, RegistrationError::InvalidGender) => {
			"Keep it simple: Male, Female, or Other? (Case doesn't matter!)"
		}
		(RegistrationStep::Name, _) => "I need at least a name to go on. What's your name?",
		_ => "Please send a short text answer.",
	}
}

pub const REGISTRATION_CANCELLED: &str = "No worries! Start over with /start anytime.";
pub const NOTHING_TO_CANCEL: &str = "Nothing to cancel. Use /start to build your profile.";
pub const REGISTRATION_FAILED: &str = "Something went wrong saving your profile. Please /start again.";

pub fn profile_saved(name: &str, summary: &[String]) -> String {
	format!(
		"Profile saved, {}! Found some matches:\n\n{}",
		name,
		summary.join("\n")
	)
}

pub fn profile_saved_no_matches(name: &str) -> String {
	format!("Profile saved, {}! No matches yet, spread the word!", name)
}

pub fn candidate_label(name: &str) -> String {
	format!("Chat with {}", name)
}

pub const INVALID_SELECTION: &str = "Invalid match selection. Try again!";
pub const UNKNOWN_CANDIDATE: &str = "That match is no longer available.";

pub fn chat_starting(name: &str) -> String {
	format!(
		"Starting anonymous chat with {}! Say hi. (Use /reveal to share your real info when ready, /end to stop)",
		name
	)
}

pub const CHAT_REQUEST: &str = "Someone wants to chat anonymously! Reply away. (/reveal to share your profile when you're ready, /end to stop)";
pub const NOT_IN_CHAT: &str = "Not in an active chat? Use /start to begin!";
pub const NO_CHAT_TO_END: &str = "No active chat to end.";
pub const CHAT_ENDED: &str = "Chat ended safely. Till next time!";
pub const PARTNER_ENDED: &str = "Your chat partner ended the convo. Stay safe! New matches await.";
pub const NO_ONE_TO_REVEAL: &str = "No one to reveal to yet! Start a chat first.";

pub fn partner_revealed(card: &str) -> String {
	format!(
		"Your chat partner revealed their real self!\n{}\n\nReply here or /reveal to share yours too.",
		card
	)
}

pub fn mutual_reveal(card: &str) -> String {
	format!(
		"Mutual reveal unlocked! Their full details:\n{}\n\nConnect directly now, chat's open here too! /end when done.",
		card
	)
}

pub const HELP: &str = "/start - build your profile\n/cancel - stop building your profile\n/reveal - share your real profile with your chat partner\n/end - end the current chat";

pub fn unknown_command(name: &str) -> String {
	format!("Unknown command /{}. Try /help.", name)
}
