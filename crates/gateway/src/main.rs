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

//! Veil webhook gateway
//!
//! Wires the anonymous matchmaking core to Telegram:
//! - HTTP ingress (actix-web) receives webhook updates, authenticates and
//!   admits them, and translates them into core events
//! - Ingress Queue (MPSC) carries events to the single matching loop
//! - Outbox (SPSC) carries outbound actions to the delivery worker
//! - The delivery worker hands actions to the Bot API client
//!
//! All matchmaking state lives in process memory and is lost on restart.

mod admission;
mod auth;
mod config;
mod delivery;
mod dispatcher;
mod handlers;
mod logging;
mod middleware;
mod routes;
mod server;
mod telegram;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tracing::{info, warn};
use veil_matching::{DeliveryWorker, IngressQueue, MatchingConfig, MatchingEngine, OutboxBuffer};
use veil_sdk::BotClient;

use crate::{
	admission::{AdmissionController, AdmissionSettings},
	auth::WebhookAuth,
	config::GatewayRuntimeConfig,
	delivery::TelegramMessenger,
	dispatcher::EngineDispatcher,
	logging::init_logging,
	server::{GatewayServer, GatewayState},
};

#[actix_rt::main]
async fn main() -> Result<()> {
	// Initialize logging first
	init_logging()?;

	let config = GatewayRuntimeConfig::from_env().context("Invalid gateway configuration")?;
	let core_config = MatchingConfig::from_env().context("Invalid core configuration")?;

	info!(target: "server", "Starting Veil Gateway on {}", config.bind_addr);
	info!(target: "server", "Ingress queue size: {}", core_config.ingress_queue_size);
	info!(target: "server", "Outbox size: {}", core_config.outbox_size);
	let auth = WebhookAuth::new(config.webhook_secret.as_deref());
	if !auth.is_enabled() {
		warn!(target: "server", "VEIL_WEBHOOK_SECRET not set, webhook is unauthenticated");
	}

	// Phase 1: Queues between HTTP ingress, matching loop and delivery
	let (queue_sender, queue_receiver) = IngressQueue::new(core_config.ingress_queue_size).split();
	let (outbox_producer, outbox_consumer) = OutboxBuffer::new(core_config.outbox_size).split();

	// Phase 2: Bot API delivery
	let client = BotClient::with_config(
		config.api_base.clone(),
		config.bot_token.clone(),
		Duration::from_millis(config.delivery_timeout_ms),
	)
	.context("Failed to build Bot API client")?;
	let (messenger, delivery_task) = TelegramMessenger::spawn(client);
	let delivery_worker = DeliveryWorker::start(
		outbox_consumer,
		Box::new(messenger),
		core_config.delivery_config(),
	)
	.context("Failed to start delivery worker")?;

	// Phase 3: Matching loop (single-threaded core)
	let engine = MatchingEngine::start(core_config.engine_config(), queue_receiver, outbox_producer)
		.context("Failed to start matching engine")?;

	// Phase 4: HTTP server
	let admission = AdmissionController::new(AdmissionSettings {
		rate_limit_rps: config.rate_limit_rps,
		rate_limit_burst: config.rate_limit_burst,
		update_ttl_secs: config.update_ttl_secs,
		update_cache_max_capacity: config.update_cache_max_capacity,
	})
	.context("Invalid admission settings")?;
	let state = GatewayState {
		auth,
		admission: Arc::new(admission),
		dispatcher: EngineDispatcher::new(queue_sender),
	};
	let result = GatewayServer::new(state, config).serve().await;

	// Graceful shutdown: stop the loop, then flush whatever it produced
	info!(target: "server", "Shutting down components...");
	engine.shutdown();
	delivery_worker.shutdown();
	if let Err(e) = delivery_task.await {
		warn!(target: "server", error = %e, "Delivery task ended abnormally");
	}

	info!(target: "server", "Shutdown complete");
	result
}
