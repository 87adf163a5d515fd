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

//! Webhook authentication
//!
//! Telegram echoes the secret configured with `setWebhook` in the
//! `X-Telegram-Bot-Api-Secret-Token` header of every delivery. When a secret
//! is configured, requests without the matching header are rejected.
//!
//! Both sides are reduced to SHA-256 digests and compared in full, so the
//! time taken does not depend on how long a guessed prefix matches.

use actix_web::http::header::HeaderMap;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Header carrying the webhook secret
pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Error types for authentication operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
	#[error("Missing webhook secret")]
	MissingSecret,
	#[error("Invalid webhook secret")]
	InvalidSecret,
}

/// Verifies the webhook secret header
#[derive(Clone)]
pub struct WebhookAuth {
	expected: Option<[u8; 32]>,
}

impl WebhookAuth {
	/// `None` disables the check (every request is accepted)
	pub fn new(secret: Option<&str>) -> Self {
		Self {
			expected: secret.map(digest),
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.expected.is_some()
	}

	/// Check the secret header of an HTTP request
	pub fn verify_headers(&self, headers: &HeaderMap) -> Result<(), AuthError> {
		let provided = headers
			.get(SECRET_HEADER)
			.map(|v| v.to_str().map_err(|_| AuthError::InvalidSecret))
			.transpose()?;
		self.verify(provided)
	}

	pub fn verify(&self, provided: Option<&str>) -> Result<(), AuthError> {
		let Some(expected) = &self.expected else {
			return Ok(());
		};
		let provided = provided.ok_or(AuthError::MissingSecret)?;

		let actual = digest(provided);
		let diff = expected
			.iter()
			.zip(actual.iter())
			.fold(0u8, |acc, (a, b)| acc | (a ^ b));

		if diff == 0 {
			Ok(())
		} else {
			Err(AuthError::InvalidSecret)
		}
	}
}

fn digest(value: &str) -> [u8; 32] {
	Sha256::digest(value.as_bytes()).into()
}
