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

use actix_web::web;

use crate::handlers;

/// Configure HTTP routes for the gateway
///
/// - `POST {webhook_path}` - Telegram update delivery
/// - `GET /health` - liveness plus core counters
pub fn configure_routes(cfg: &mut web::ServiceConfig, webhook_path: &str) {
	cfg.route(webhook_path, web::post().to(handlers::webhook))
		.route("/health", web::get().to(handlers::health));
}
