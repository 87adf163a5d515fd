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

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix carried by every candidate button payload
pub const CANDIDATE_PAYLOAD_PREFIX: &str = "chat_with_";

/// Opaque user identity supplied by the messaging gateway
///
/// The core never interprets the value; it is only compared, hashed and
/// echoed back to the gateway as a delivery address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for UserId {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.parse().map(UserId)
	}
}

impl From<i64> for UserId {
	fn from(id: i64) -> Self {
		UserId(id)
	}
}

/// Gender label (fixed enumeration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
	Male,
	Female,
	Other,
}

impl Gender {
	pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

	/// Canonical title-case label, also used by the matchmaker
	pub fn label(&self) -> &'static str {
		match self {
			Gender::Male => "Male",
			Gender::Female => "Female",
			Gender::Other => "Other",
		}
	}

	/// Case-normalized parse of user input ("fEMALE " -> Female)
	pub fn parse_label(input: &str) -> Option<Self> {
		let input = input.trim();
		Self::ALL
			.into_iter()
			.find(|g| g.label().eq_ignore_ascii_case(input))
	}
}

impl fmt::Display for Gender {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Committed user profile
///
/// Immutable once stored; a re-registration replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
	pub user_id: UserId,
	pub name: String,
	pub age: u32,
	pub gender: Gender,
	pub bio: String,
	/// Free text, expected to mention one or more gender labels
	pub preference: String,
	pub location: String,
	/// Handle on the messaging platform itself (absent when the user has none)
	pub platform_handle: Option<String>,
	/// Secondary social handle (absent when skipped)
	pub social_handle: Option<String>,
}

/// Bot command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
	Start,
	Cancel,
	End,
	Reveal,
	Help,
	Unknown(String),
}

impl Command {
	/// Parse a command line such as `/start`, `/Reveal@veil_bot` or `/end now`.
	///
	/// Returns the command and the (trimmed) remainder of the line, or `None`
	/// if the text is not a command at all.
	pub fn parse(text: &str) -> Option<(Command, String)> {
		let text = text.trim_start();
		let rest = text.strip_prefix('/')?;
		let (head, args) = match rest.split_once(char::is_whitespace) {
			Some((head, args)) => (head, args.trim()),
			None => (rest, ""),
		};
		let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();
		if name.is_empty() {
			return None;
		}

		let command = match name.as_str() {
			"start" => Command::Start,
			"cancel" => Command::Cancel,
			"end" => Command::End,
			"reveal" => Command::Reveal,
			"help" => Command::Help,
			_ => Command::Unknown(name),
		};
		Some((command, args.to_string()))
	}
}

/// Reference to the message that carried an inline keyboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
	pub chat_id: i64,
	pub message_id: i64,
}

/// Button-press interaction handle
///
/// Opaque to the core; handed back in acknowledge/edit actions so the
/// gateway can address the original interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
	pub id: String,
	pub message: Option<MessageRef>,
}

/// Inbound event delivered by the gateway
///
/// `handle` is the sender's display handle on the platform, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundEvent {
	Command {
		user: UserId,
		command: Command,
		args: String,
		handle: Option<String>,
	},
	Text {
		user: UserId,
		text: String,
		handle: Option<String>,
	},
	ButtonPress {
		user: UserId,
		interaction: Interaction,
		payload: String,
		handle: Option<String>,
	},
}

impl InboundEvent {
	/// Identity of the user who triggered the event
	pub fn user(&self) -> UserId {
		match self {
			InboundEvent::Command { user, .. }
			| InboundEvent::Text { user, .. }
			| InboundEvent::ButtonPress { user, .. } => *user,
		}
	}

	/// Short event kind for logging (never includes message text)
	pub fn kind(&self) -> &'static str {
		match self {
			InboundEvent::Command { .. } => "command",
			InboundEvent::Text { .. } => "text",
			InboundEvent::ButtonPress { .. } => "button_press",
		}
	}
}

/// Selectable candidate button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateButton {
	pub label: String,
	pub payload: String,
}

/// Outbound action performed on the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundAction {
	SendText {
		to: UserId,
		text: String,
	},
	AcknowledgeButton {
		interaction: Interaction,
		text: Option<String>,
	},
	EditInteraction {
		interaction: Interaction,
		text: String,
	},
	PresentCandidates {
		to: UserId,
		text: String,
		candidates: Vec<CandidateButton>,
	},
}

impl OutboundAction {
	/// Recipient user, when the action addresses one directly
	pub fn recipient(&self) -> Option<UserId> {
		match self {
			OutboundAction::SendText { to, .. } | OutboundAction::PresentCandidates { to, .. } => {
				Some(*to)
			}
			OutboundAction::AcknowledgeButton { .. } | OutboundAction::EditInteraction { .. } => {
				None
			}
		}
	}

	/// Text body, when the action carries one
	pub fn text(&self) -> Option<&str> {
		match self {
			OutboundAction::SendText { text, .. }
			| OutboundAction::EditInteraction { text, .. }
			| OutboundAction::PresentCandidates { text, .. } => Some(text),
			OutboundAction::AcknowledgeButton { text, .. } => text.as_deref(),
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			OutboundAction::SendText { .. } => "send_text",
			OutboundAction::AcknowledgeButton { .. } => "acknowledge_button",
			OutboundAction::EditInteraction { .. } => "edit_interaction",
			OutboundAction::PresentCandidates { .. } => "present_candidates",
		}
	}
}

/// Error decoding a candidate button payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
	#[error("Payload is missing the candidate prefix")]
	MissingPrefix,
	#[error("Invalid candidate id: {0}")]
	InvalidId(String),
}

/// Candidate button payload codec (`chat_with_<id>`)
pub struct CandidatePayload;

impl CandidatePayload {
	pub fn encode(target: UserId) -> String {
		format!("{}{}", CANDIDATE_PAYLOAD_PREFIX, target)
	}

	pub fn decode(payload: &str) -> Result<UserId, PayloadError> {
		let id = payload
			.strip_prefix(CANDIDATE_PAYLOAD_PREFIX)
			.ok_or(PayloadError::MissingPrefix)?;
		id.parse()
			.map_err(|_| PayloadError::InvalidId(id.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_gender_parse_is_case_insensitive() {
		assert_eq!(Gender::parse_label("male"), Some(Gender::Male));
		assert_eq!(Gender::parse_label("  FEMALE "), Some(Gender::Female));
		assert_eq!(Gender::parse_label("oThEr"), Some(Gender::Other));
		assert_eq!(Gender::parse_label("robot"), None);
		assert_eq!(Gender::parse_label(""), None);
	}

	#[test]
	fn test_command_parse() {
		assert_eq!(
			Command::parse("/start"),
			Some((Command::Start, String::new()))
		);
		assert_eq!(
			Command::parse("/Reveal@veil_bot"),
			Some((Command::Reveal, String::new()))
		);
		assert_eq!(
			Command::parse("/end right now "),
			Some((Command::End, "right now".to_string()))
		);
		assert_eq!(
			Command::parse("/dance"),
			Some((Command::Unknown("dance".to_string()), String::new()))
		);
		assert_eq!(Command::parse("hello"), None);
		assert_eq!(Command::parse("/"), None);
	}

	#[test]
	fn test_candidate_payload() {
		let payload = CandidatePayload::encode(UserId(42));
		assert_eq!(payload, "chat_with_42");
		assert_eq!(CandidatePayload::decode(&payload), Ok(UserId(42)));
		assert_eq!(CandidatePayload::decode("chat_with_-7"), Ok(UserId(-7)));
		assert_eq!(
			CandidatePayload::decode("chat_with_abc"),
			Err(PayloadError::InvalidId("abc".to_string()))
		);
		assert_eq!(
			CandidatePayload::decode("garbage"),
			Err(PayloadError::MissingPrefix)
		);
	}

	#[test]
	fn test_inbound_event_serde_tag() {
		let event = InboundEvent::Text {
			user: UserId(1),
			text: "hi".to_string(),
			handle: None,
		};
		let json = serde_json::to_value(&event).unwrap();
		assert_eq!(json["kind"], "text");
		assert_eq!(json["user"], 1);
	}
}
