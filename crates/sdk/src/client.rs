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

use std::time::Duration;

use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::types::{CandidateButton, MessageRef, UserId};

/// Default Bot API base URL
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Network error: {0}")]
	Network(String),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Server error: {0}")]
	Server(String),
	#[error("Bot API error: {0}")]
	Api(String),
}

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
struct ApiResponse {
	ok: bool,
	#[serde(default)]
	description: Option<String>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton<'a> {
	text: &'a str,
	callback_data: &'a str,
}

/// Client for the Telegram Bot API
///
/// This is an async client interface using reqwest for HTTP communication.
/// Every method posts a JSON body to `{base}/bot{token}/{method}`.
#[derive(Clone)]
pub struct BotClient {
	base_url: String,
	token: String,
	client: ReqwestClient,
}

impl BotClient {
	/// Create a new client against the public Bot API
	pub fn new(token: impl Into<String>) -> Result<Self, ClientError> {
		Self::with_config(DEFAULT_API_BASE, token, Duration::from_secs(30))
	}

	/// Create a new client with custom base URL and timeout
	pub fn with_config(
		base_url: impl Into<String>,
		token: impl Into<String>,
		timeout: Duration,
	) -> Result<Self, ClientError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			base_url: base_url.into().trim_end_matches('/').to_string(),
			token: token.into(),
			client,
		})
	}

	fn method_url(&self, method: &str) -> String {
		format!("{}/bot{}/{}", self.base_url, self.token, method)
	}

	async fn call(&self, method: &str, body: serde_json::Value) -> Result<(), ClientError> {
		let response = self
			.client
			.post(self.method_url(method))
			.json(&body)
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e.without_url())))?;

		let status = response.status();
		if status.is_server_error() {
			return Err(ClientError::Server(format!("HTTP {}", status)));
		}

		let api: ApiResponse = response
			.json()
			.await
			.map_err(|e| ClientError::Serialization(format!("Failed to parse response: {}", e)))?;

		if !api.ok {
			return Err(ClientError::Api(
				api.description
					.unwrap_or_else(|| format!("{} failed with HTTP {}", method, status)),
			));
		}

		Ok(())
	}

	/// Send a plain text message to a user
	pub async fn send_message(&self, to: UserId, text: &str) -> Result<(), ClientError> {
		self.call("sendMessage", json!({ "chat_id": to.0, "text": text }))
			.await
	}

	/// Send a message with one inline button per candidate (one per row)
	pub async fn send_candidates(
		&self,
		to: UserId,
		text: &str,
		candidates: &[CandidateButton],
	) -> Result<(), ClientError> {
		let keyboard: Vec<Vec<InlineKeyboardButton<'_>>> = candidates
			.iter()
			.map(|c| {
				vec![InlineKeyboardButton {
					text: &c.label,
					callback_data: &c.payload,
				}]
			})
			.collect();

		self.call(
			"sendMessage",
			json!({
				"chat_id": to.0,
				"text": text,
				"reply_markup": { "inline_keyboard": keyboard },
			}),
		)
		.await
	}

	/// Acknowledge a button press, optionally with a short toast text
	pub async fn answer_callback_query(
		&self,
		callback_query_id: &str,
		text: Option<&str>,
	) -> Result<(), ClientError> {
		let mut body = json!({ "callback_query_id": callback_query_id });
		if let Some(text) = text {
			body["text"] = json!(text);
		}
		self.call("answerCallbackQuery", body).await
	}

	/// Replace the text of a previously sent message
	pub async fn edit_message_text(
		&self,
		message: &MessageRef,
		text: &str,
	) -> Result<(), ClientError> {
		self.call(
			"editMessageText",
			json!({
				"chat_id": message.chat_id,
				"message_id": message.message_id,
				"text": text,
			}),
		)
		.await
	}
}
