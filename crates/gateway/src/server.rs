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

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use tracing::info;

use crate::{
	admission::AdmissionController,
	auth::WebhookAuth,
	config::GatewayRuntimeConfig,
	dispatcher::EngineDispatcher,
	middleware::LoggingMiddleware,
	routes::configure_routes,
};

/// State shared by every HTTP worker
#[derive(Clone)]
pub struct GatewayState {
	pub auth: WebhookAuth,
	pub admission: Arc<AdmissionController>,
	pub dispatcher: EngineDispatcher,
}

/// Webhook HTTP server
pub struct GatewayServer {
	state: GatewayState,
	config: GatewayRuntimeConfig,
}

impl GatewayServer {
	pub fn new(state: GatewayState, config: GatewayRuntimeConfig) -> Self {
		Self { state, config }
	}

	/// Run until the server receives a stop signal (SIGINT/SIGTERM)
	pub async fn serve(self) -> Result<()> {
		let state = web::Data::new(self.state);
		let webhook_path = self.config.webhook_path.clone();
		let max_body_bytes = self.config.max_body_bytes;

		info!(
			target: "server",
			addr = %self.config.bind_addr,
			workers = self.config.workers,
			webhook_path = %webhook_path,
			"Starting HTTP server"
		);

		HttpServer::new(move || {
			let webhook_path = webhook_path.clone();
			App::new()
				.app_data(state.clone())
				.app_data(web::PayloadConfig::new(max_body_bytes))
				.wrap(LoggingMiddleware)
				.configure(move |cfg| configure_routes(cfg, &webhook_path))
		})
		.workers(self.config.workers.max(1))
		.bind(self.config.bind_addr)
		.with_context(|| format!("Failed to bind {}", self.config.bind_addr))?
		.run()
		.await
		.context("HTTP server error")?;

		info!(target: "server", "HTTP server stopped");
		Ok(())
	}
}
