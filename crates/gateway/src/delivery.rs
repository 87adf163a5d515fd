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

//! Outbound delivery through the Telegram Bot API
//!
//! The delivery worker thread is synchronous; [`TelegramMessenger`] bridges
//! it to the async world by pushing actions onto an unbounded channel that a
//! single task drains. One task means one request at a time, so actions
//! reach Telegram in the order the core produced them.

use tokio::{
	sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
	task::JoinHandle,
};
use tracing::{debug, info, warn};
use veil_matching::{DeliveryError, Messenger};
use veil_sdk::{BotClient, ClientError, types::OutboundAction};

/// [`Messenger`] that hands actions to the Bot API delivery task
pub struct TelegramMessenger {
	sender: UnboundedSender<OutboundAction>,
}

impl TelegramMessenger {
	/// Spawn the delivery task on the current runtime
	///
	/// The task ends once the messenger is dropped and the channel drains.
	pub fn spawn(client: BotClient) -> (Self, JoinHandle<()>) {
		let (sender, receiver) = mpsc::unbounded_channel();
		let handle = tokio::spawn(run_delivery(client, receiver));
		(Self { sender }, handle)
	}
}

impl Messenger for TelegramMessenger {
	fn deliver(&mut self, action: OutboundAction) -> Result<(), DeliveryError> {
		self.sender.send(action).map_err(|_| DeliveryError::Closed)
	}
}

async fn run_delivery(client: BotClient, mut receiver: UnboundedReceiver<OutboundAction>) {
	info!(target: "delivery", "Bot API delivery task started");
	while let Some(action) = receiver.recv().await {
		let kind = action.kind();
		let recipient = action.recipient();
		match execute(&client, &action).await {
			Ok(()) => debug!(target: "delivery", kind, recipient = ?recipient, "Sent"),
			Err(e) => warn!(
				target: "delivery",
				kind,
				recipient = ?recipient,
				error = %e,
				"Bot API call failed"
			),
		}
	}
	info!(target: "delivery", "Bot API delivery task stopped");
}

/// Perform one outbound action against the Bot API
pub async fn execute(client: &BotClient, action: &OutboundAction) -> Result<(), ClientError> {
	match action {
		OutboundAction::SendText { to, text } => client.send_message(*to, text).await,
		OutboundAction::AcknowledgeButton { interaction, text } => {
			client
				.answer_callback_query(&interaction.id, text.as_deref())
				.await
		}
		OutboundAction::EditInteraction { interaction, text } => match &interaction.message {
			Some(message) => client.edit_message_text(message, text).await,
			None => {
				debug!(target: "delivery", "Interaction has no message to edit");
				Ok(())
			}
		},
		OutboundAction::PresentCandidates {
			to,
			text,
			candidates,
		} => client.send_candidates(*to, text, candidates).await,
	}
}
