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

use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use thiserror::Error;
use tracing::debug;

use crate::{
	admission::AdmissionError,
	auth::AuthError,
	dispatcher::DispatcherError,
	server::GatewayState,
	telegram::Update,
};

/// Error types for gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
	#[error("Authentication error: {0}")]
	Auth(#[from] AuthError),
	#[error("Admission error: {0}")]
	Admission(#[from] AdmissionError),
	#[error("Dispatch error: {0}")]
	Dispatch(#[from] DispatcherError),
	#[error("Malformed update: {0}")]
	BadRequest(String),
}

impl actix_web::ResponseError for GatewayError {
	fn status_code(&self) -> StatusCode {
		match self {
			GatewayError::Auth(_) => StatusCode::UNAUTHORIZED,
			GatewayError::Admission(AdmissionError::RateLimitExceeded) => {
				StatusCode::TOO_MANY_REQUESTS
			}
			GatewayError::Admission(_) => StatusCode::INTERNAL_SERVER_ERROR,
			GatewayError::Dispatch(_) => StatusCode::SERVICE_UNAVAILABLE,
			GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
		}
	}

	fn error_response(&self) -> HttpResponse {
		HttpResponse::build(self.status_code()).json(serde_json::json!({
			"error": self.to_string()
		}))
	}
}

/// Health check endpoint
///
/// Reports the core counters; a stalled or stopped matching loop turns
/// into a 503.
pub async fn health(state: web::Data<GatewayState>) -> Result<HttpResponse, GatewayError> {
	let stats = state.dispatcher.stats().await?;

	Ok(HttpResponse::Ok().json(serde_json::json!({
		"status": "ok",
		"service": "veil-gateway",
		"profiles": stats.profiles,
		"drafts": stats.drafts,
		"pairings": stats.pairings,
		"queue_depth": state.dispatcher.queue_depth(),
	})))
}

/// Telegram webhook
///
/// The body is parsed only after the secret header is verified. Updates
/// the core does not consume, and redeliveries of an update already
/// enqueued, are acknowledged with 200 so Telegram stops retrying them.
pub async fn webhook(
	state: web::Data<GatewayState>,
	req: HttpRequest,
	body: web::Bytes,
) -> Result<HttpResponse, GatewayError> {
	state.auth.verify_headers(req.headers())?;

	let update: Update =
		serde_json::from_slice(&body).map_err(|e| GatewayError::BadRequest(e.to_string()))?;
	let update_id = update.update_id;

	match state.admission.admit(update_id, update.sender()) {
		Ok(()) => {}
		Err(AdmissionError::DuplicateUpdate(_)) => {
			debug!(target: "server::webhook", update_id, "Duplicate update dropped");
			return Ok(HttpResponse::Ok().finish());
		}
		Err(e) => {
			// Let Telegram redeliver once the user's bucket refills
			state.admission.forget(update_id);
			return Err(e.into());
		}
	}

	let Some(event) = update.into_event() else {
		debug!(target: "server::webhook", update_id, "Update ignored");
		return Ok(HttpResponse::Ok().finish());
	};

	if let Err(e) = state.dispatcher.dispatch(event) {
		state.admission.forget(update_id);
		return Err(e.into());
	}

	Ok(HttpResponse::Ok().finish())
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use actix_web::{App, test};
	use veil_matching::{EngineCommand, IngressQueue, QueueReceiver};
	use veil_sdk::types::{InboundEvent, UserId};

	use super::*;
	use crate::{
		admission::{AdmissionController, AdmissionSettings},
		auth::{SECRET_HEADER, WebhookAuth},
		dispatcher::EngineDispatcher,
		routes::configure_routes,
	};

	const UPDATE: &str = r#"{"update_id":1,"message":{"message_id":1,"chat":{"id":5},"from":{"id":5},"text":"hello"}}"#;

	fn state(secret: Option<&str>, queue_size: usize, burst: u32) -> (GatewayState, QueueReceiver) {
		let (sender, receiver) = IngressQueue::new(queue_size).split();
		let admission = AdmissionController::new(AdmissionSettings {
			rate_limit_rps: 1,
			rate_limit_burst: burst,
			update_ttl_secs: 60,
			update_cache_max_capacity: 100,
		})
		.unwrap();
		let state = GatewayState {
			auth: WebhookAuth::new(secret),
			admission: Arc::new(admission),
			dispatcher: EngineDispatcher::new(sender),
		};
		(state, receiver)
	}

	fn update(id: i64, user: i64) -> String {
		format!(
			r#"{{"update_id":{},"message":{{"message_id":1,"chat":{{"id":{}}},"from":{{"id":{}}},"text":"hello"}}}}"#,
			id, user, user
		)
	}

	#[actix_web::test]
	async fn test_webhook_enqueues_event() {
		let (state, receiver) = state(Some("s3cret"), 8, 10);
		let app = test::init_service(
			App::new()
				.app_data(web::Data::new(state))
				.configure(|cfg| configure_routes(cfg, "/webhook")),
		)
		.await;

		let req = test::TestRequest::post()
			.uri("/webhook")
			.insert_header((SECRET_HEADER, "s3cret"))
			.set_payload(UPDATE)
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);

		match receiver.try_recv() {
			Ok(EngineCommand::Event(InboundEvent::Text { user, text, .. })) => {
				assert_eq!(user, UserId(5));
				assert_eq!(text, "hello");
			}
			_ => panic!("expected a text event"),
		}
	}

	#[actix_web::test]
	async fn test_webhook_rejects_bad_secret() {
		let (state, receiver) = state(Some("s3cret"), 8, 10);
		let app = test::init_service(
			App::new()
				.app_data(web::Data::new(state))
				.configure(|cfg| configure_routes(cfg, "/webhook")),
		)
		.await;

		let req = test::TestRequest::post()
			.uri("/webhook")
			.insert_header((SECRET_HEADER, "wrong"))
			.set_payload(UPDATE)
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
		assert!(receiver.try_recv().is_err());
	}

	#[actix_web::test]
	async fn test_webhook_drops_duplicates() {
		let (state, receiver) = state(None, 8, 10);
		let app = test::init_service(
			App::new()
				.app_data(web::Data::new(state))
				.configure(|cfg| configure_routes(cfg, "/webhook")),
		)
		.await;

		for _ in 0..2 {
			let req = test::TestRequest::post()
				.uri("/webhook")
				.set_payload(update(7, 5))
				.to_request();
			let resp = test::call_service(&app, req).await;
			assert_eq!(resp.status(), StatusCode::OK);
		}

		assert!(receiver.try_recv().is_ok());
		assert!(receiver.try_recv().is_err());
	}

	#[actix_web::test]
	async fn test_webhook_rate_limited() {
		let (state, _receiver) = state(None, 8, 1);
		let app = test::init_service(
			App::new()
				.app_data(web::Data::new(state))
				.configure(|cfg| configure_routes(cfg, "/webhook")),
		)
		.await;

		let first = test::TestRequest::post()
			.uri("/webhook")
			.set_payload(update(1, 5))
			.to_request();
		assert_eq!(test::call_service(&app, first).await.status(), StatusCode::OK);

		let second = test::TestRequest::post()
			.uri("/webhook")
			.set_payload(update(2, 5))
			.to_request();
		assert_eq!(
			test::call_service(&app, second).await.status(),
			StatusCode::TOO_MANY_REQUESTS
		);
	}

	#[actix_web::test]
	async fn test_webhook_overloaded_allows_redelivery() {
		let (state, receiver) = state(None, 1, 10);
		let app = test::init_service(
			App::new()
				.app_data(web::Data::new(state))
				.configure(|cfg| configure_routes(cfg, "/webhook")),
		)
		.await;

		let fill = test::TestRequest::post()
			.uri("/webhook")
			.set_payload(update(1, 5))
			.to_request();
		assert_eq!(test::call_service(&app, fill).await.status(), StatusCode::OK);

		let overloaded = test::TestRequest::post()
			.uri("/webhook")
			.set_payload(update(2, 6))
			.to_request();
		assert_eq!(
			test::call_service(&app, overloaded).await.status(),
			StatusCode::SERVICE_UNAVAILABLE
		);

		// Once the queue drains, the redelivered update goes through
		assert!(receiver.try_recv().is_ok());
		let retry = test::TestRequest::post()
			.uri("/webhook")
			.set_payload(update(2, 6))
			.to_request();
		assert_eq!(test::call_service(&app, retry).await.status(), StatusCode::OK);
	}

	#[actix_web::test]
	async fn test_webhook_malformed_body() {
		let (state, _receiver) = state(None, 8, 10);
		let app = test::init_service(
			App::new()
				.app_data(web::Data::new(state))
				.configure(|cfg| configure_routes(cfg, "/webhook")),
		)
		.await;

		let req = test::TestRequest::post()
			.uri("/webhook")
			.set_payload("not json")
			.to_request();
		assert_eq!(
			test::call_service(&app, req).await.status(),
			StatusCode::BAD_REQUEST
		);
	}

	#[actix_web::test]
	async fn test_health_without_engine() {
		let (state, receiver) = state(None, 8, 10);
		drop(receiver);
		let app = test::init_service(
			App::new()
				.app_data(web::Data::new(state))
				.configure(|cfg| configure_routes(cfg, "/webhook")),
		)
		.await;

		let req = test::TestRequest::get().uri("/health").to_request();
		assert_eq!(
			test::call_service(&app, req).await.status(),
			StatusCode::SERVICE_UNAVAILABLE
		);
	}
}
