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

//! Telegram webhook payloads
//!
//! Only the fields the core consumes are modelled; everything else in an
//! update is ignored by serde.

use serde::Deserialize;
use veil_sdk::types::{Command, InboundEvent, Interaction, MessageRef, UserId};

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
	pub update_id: i64,
	#[serde(default)]
	pub message: Option<Message>,
	#[serde(default)]
	pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
	pub id: i64,
	#[serde(default)]
	pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
	pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
	pub message_id: i64,
	pub chat: Chat,
	#[serde(default)]
	pub from: Option<User>,
	#[serde(default)]
	pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
	pub id: String,
	pub from: User,
	#[serde(default)]
	pub message: Option<Message>,
	#[serde(default)]
	pub data: Option<String>,
}

impl Update {
	/// User the update originates from, if any
	pub fn sender(&self) -> Option<UserId> {
		if let Some(query) = &self.callback_query {
			return Some(UserId(query.from.id));
		}
		self.message
			.as_ref()
			.and_then(|m| m.from.as_ref())
			.map(|u| UserId(u.id))
	}

	/// Translate into a core event
	///
	/// Returns `None` for updates the core does not consume (stickers,
	/// photos, channel posts, callbacks without data, ...).
	pub fn into_event(self) -> Option<InboundEvent> {
		if let Some(query) = self.callback_query {
			let payload = query.data?;
			let user = UserId(query.from.id);
			return Some(InboundEvent::ButtonPress {
				user,
				interaction: Interaction {
					id: query.id,
					message: query.message.map(|m| MessageRef {
						chat_id: m.chat.id,
						message_id: m.message_id,
					}),
				},
				payload,
				handle: query.from.username,
			});
		}

		let message = self.message?;
		let from = message.from?;
		let text = message.text?;
		let user = UserId(from.id);

		Some(match Command::parse(&text) {
			Some((command, args)) => InboundEvent::Command {
				user,
				command,
				args,
				handle: from.username,
			},
			None => InboundEvent::Text {
				user,
				text,
				handle: from.username,
			},
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(json: &str) -> Update {
		serde_json::from_str(json).unwrap()
	}

	#[test]
	fn test_text_message() {
		let update = parse(
			r#"{"update_id":1,"message":{"message_id":10,"chat":{"id":42},
			"from":{"id":42,"is_bot":false,"first_name":"A","username":"ana"},"text":"hello"}}"#,
		);
		assert_eq!(update.sender(), Some(UserId(42)));
		assert_eq!(
			update.into_event(),
			Some(InboundEvent::Text {
				user: UserId(42),
				text: "hello".to_string(),
				handle: Some("ana".to_string()),
			})
		);
	}

	#[test]
	fn test_command_message() {
		let update = parse(
			r#"{"update_id":2,"message":{"message_id":11,"chat":{"id":42},
			"from":{"id":42,"first_name":"A"},"text":"/Start@veil_bot"}}"#,
		);
		assert_eq!(
			update.into_event(),
			Some(InboundEvent::Command {
				user: UserId(42),
				command: Command::Start,
				args: String::new(),
				handle: None,
			})
		);
	}

	#[test]
	fn test_callback_query() {
		let update = parse(
			r#"{"update_id":3,"callback_query":{"id":"cb1","from":{"id":7,"username":"bo"},
			"message":{"message_id":99,"chat":{"id":7}},"data":"chat_with_42"}}"#,
		);
		assert_eq!(update.sender(), Some(UserId(7)));
		assert_eq!(
			update.into_event(),
			Some(InboundEvent::ButtonPress {
				user: UserId(7),
				interaction: Interaction {
					id: "cb1".to_string(),
					message: Some(MessageRef {
						chat_id: 7,
						message_id: 99,
					}),
				},
				payload: "chat_with_42".to_string(),
				handle: Some("bo".to_string()),
			})
		);
	}

	#[test]
	fn test_ignored_updates() {
		let sticker = parse(
			r#"{"update_id":4,"message":{"message_id":12,"chat":{"id":1},"from":{"id":1},"sticker":{}}}"#,
		);
		assert_eq!(sticker.into_event(), None);

		let empty = parse(r#"{"update_id":5}"#);
		assert_eq!(empty.sender(), None);
		assert_eq!(empty.into_event(), None);
	}
}
