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

use serde::Serialize;
use tokio::sync::oneshot;

/// Snapshot of core counters, served by the health endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
	/// Committed profiles
	pub profiles: usize,
	/// Registrations in flight
	pub drafts: usize,
	/// Live pairings
	pub pairings: usize,
}

/// Control messages for the matching engine
///
/// These messages allow external components to interact with the matching engine
/// without blocking the matching loop or requiring shared mutable state.
///
/// The matching engine processes these messages in its main loop alongside
/// inbound events, ensuring thread-safe access to engine state.
#[derive(Debug)]
pub enum EngineControlMessage {
	/// Request the current counters
	///
	/// The matching loop answers via the oneshot channel; the requester can
	/// await it without blocking the loop.
	Stats {
		respond_to: oneshot::Sender<EngineStats>,
	},

	/// Request the engine to shut down gracefully
	Shutdown,
}
