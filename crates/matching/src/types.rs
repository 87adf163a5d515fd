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

use veil_sdk::types::InboundEvent;

use crate::engine::EngineControlMessage;

/// Command received by the matching loop from the ingress queue
///
/// Inbound gateway events and control requests share one queue, so they
/// are observed in a single total order.
#[derive(Debug)]
pub enum EngineCommand {
	Event(InboundEvent),
	Control(EngineControlMessage),
}

impl From<InboundEvent> for EngineCommand {
	fn from(event: InboundEvent) -> Self {
		EngineCommand::Event(event)
	}
}

impl From<EngineControlMessage> for EngineCommand {
	fn from(msg: EngineControlMessage) -> Self {
		EngineCommand::Control(msg)
	}
}
