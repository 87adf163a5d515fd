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

use veil_sdk::types::{OutboundAction, UserId};

use crate::{
	pairing::{PairingError, PairingTable},
	profiles::ProfileStore,
	reveal::{RevealState, display_prefix},
};

/// Forward `text` from `sender` to their current partner
///
/// The text is prefixed according to the pairing's reveal state. Nothing is
/// echoed back to the sender.
pub fn relay(
	pairings: &PairingTable,
	profiles: &ProfileStore,
	sender: UserId,
	text: &str,
) -> Result<OutboundAction, PairingError> {
	let partner = pairings
		.partner_of(sender)
		.ok_or(PairingError::NotPaired(sender))?;
	let state = pairings
		.reveal_state(sender)
		.unwrap_or(RevealState::Hidden);

	Ok(OutboundAction::SendText {
		to: partner,
		text: format!("{}{}", display_prefix(state, profiles.get(sender)), text),
	})
}
