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

//! Veil Matching Core
//!
//! This crate holds the whole anonymous matchmaking core: the registration
//! state machine, the profile store, the matchmaker, the pairing table with
//! its reveal protocol, and the chat relay.
//!
//! Architecture:
//! - Single-threaded matching loop owning all mutable state
//! - MPSC ingress queue for multi-threaded HTTP ingress
//! - SPSC outbox plus a delivery worker for non-blocking sends
//! - Pure, synchronous handlers that turn one inbound event into an
//!   ordered list of outbound actions

pub mod config;
pub mod delivery;
pub mod engine;
pub mod matcher;
pub mod messages;
pub mod pairing;
pub mod profiles;
pub mod queue;
pub mod registration;
pub mod relay;
pub mod reveal;
pub mod types;

pub use config::MatchingConfig;
pub use delivery::{
	DeliveryError, DeliveryWorker, DeliveryWorkerConfig, MemoryMessenger, Messenger, OutboxBuffer,
	OutboxConsumer, OutboxProducer,
};
pub use engine::{
	EngineConfig, EngineControlMessage, EngineError, EngineStats, MatchingEngine,
	MatchingEngineState,
};
pub use matcher::Matchmaker;
pub use pairing::{PairingError, PairingTable};
pub use profiles::ProfileStore;
pub use queue::{IngressQueue, QueueError, QueueReceiver, QueueSender};
pub use registration::{Registration, RegistrationStep, Transition};
pub use reveal::RevealState;
pub use types::*;
