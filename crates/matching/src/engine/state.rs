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

use std::collections::HashMap;

use tracing::{debug, error, info};
use veil_sdk::types::{
	CandidateButton, CandidatePayload, Command, InboundEvent, Interaction, OutboundAction, Profile,
	UserId,
};

use crate::{
	engine::control::EngineStats,
	matcher::{Matchmaker, summary_line},
	messages,
	pairing::PairingTable,
	profiles::ProfileStore,
	registration::{Registration, Transition},
	relay::relay,
	reveal::{CardVoice, RevealState, identity_card},
};

/// Matching engine state
///
/// This structure holds the complete state of the core:
/// - Profile store (committed profiles)
/// - In-flight registrations (one per user)
/// - Pairing table with reveal flags
///
/// The state is owned by the matching loop; every inbound event is handled
/// to completion before the next one, so no locking is needed. Handling an
/// event never fails: user mistakes become informational replies.
pub struct MatchingEngineState {
	pub profiles: ProfileStore,
	pub registrations: HashMap<UserId, Registration>,
	pub pairings: PairingTable,
	matchmaker: Matchmaker,
}

impl MatchingEngineState {
	pub fn new(candidate_limit: usize) -> Self {
		Self {
			profiles: ProfileStore::new(),
			registrations: HashMap::new(),
			pairings: PairingTable::new(),
			matchmaker: Matchmaker::new(candidate_limit),
		}
	}

	pub fn stats(&self) -> EngineStats {
		EngineStats {
			profiles: self.profiles.len(),
			drafts: self.registrations.len(),
			pairings: self.pairings.len(),
		}
	}

	/// Dispatch one inbound event and return the outbound actions it caused
	pub fn handle(&mut self, event: InboundEvent) -> Vec<OutboundAction> {
		let mut out = Vec::new();

		match event {
			InboundEvent::Command { user, command, .. } => match command {
				Command::Start => self.start_registration(user, &mut out),
				Command::Cancel => self.cancel_registration(user, &mut out),
				Command::End => self.end_chat(user, &mut out),
				Command::Reveal => self.reveal(user, &mut out),
				Command::Help => send(&mut out, user, messages::HELP),
				Command::Unknown(name) => send(&mut out, user, messages::unknown_command(&name)),
			},
			InboundEvent::Text { user, text, handle } => {
				if self.registrations.contains_key(&user) {
					self.registration_input(user, &text, handle, &mut out);
				} else {
					self.relay_text(user, &text, &mut out);
				}
			}
			InboundEvent::ButtonPress {
				user,
				interaction,
				payload,
				..
			} => self.select_candidate(user, interaction, &payload, &mut out),
		}

		out
	}

	/// Enter registration, replacing any draft already in flight
	fn start_registration(&mut self, user: UserId, out: &mut Vec<OutboundAction>) {
		let registration = Registration::new();
		let step = registration.step();
		if self.registrations.insert(user, registration).is_some() {
			debug!(target: "engine", user = %user, "Replaced in-flight registration");
		}
		info!(target: "engine", user = %user, "Registration started");
		send(out, user, messages::prompt(step));
	}

	fn cancel_registration(&mut self, user: UserId, out: &mut Vec<OutboundAction>) {
		if self.registrations.remove(&user).is_some() {
			info!(target: "engine", user = %user, "Registration cancelled");
			send(out, user, messages::REGISTRATION_CANCELLED);
		} else {
			send(out, user, messages::NOTHING_TO_CANCEL);
		}
	}

	fn registration_input(
		&mut self,
		user: UserId,
		text: &str,
		handle: Option<String>,
		out: &mut Vec<OutboundAction>,
	) {
		let Some(registration) = self.registrations.get_mut(&user) else {
			return;
		};

		match registration.advance(text) {
			Transition::Advanced(step) => send(out, user, messages::prompt(step)),
			Transition::Rejected { step, reason } => {
				debug!(target: "engine", user = %user, step = ?step, reason = %reason, "Registration input rejected");
				send(out, user, messages::reprompt(step, &reason));
			}
			Transition::Completed(draft) => {
				self.registrations.remove(&user);
				match draft.into_profile(user, handle) {
					Ok(profile) => self.commit_profile(profile, out),
					Err(e) => {
						error!(target: "engine", user = %user, error = %e, "Completed draft is incomplete");
						send(out, user, messages::REGISTRATION_FAILED);
					}
				}
			}
		}
	}

	/// Store the profile and present its candidates
	fn commit_profile(&mut self, profile: Profile, out: &mut Vec<OutboundAction>) {
		let user = profile.user_id;
		let name = profile.name.clone();
		if self.profiles.insert(profile).is_some() {
			info!(target: "engine", user = %user, "Profile overwritten");
		} else {
			info!(target: "engine", user = %user, "Profile committed");
		}

		let candidates: Vec<_> = self
			.matchmaker
			.find(&self.profiles, user)
			.into_iter()
			.filter_map(|id| self.profiles.get(id))
			.collect();

		debug!(target: "engine", user = %user, candidates = candidates.len(), "Candidate search");

		if candidates.is_empty() {
			send(out, user, messages::profile_saved_no_matches(&name));
			return;
		}

		let summary: Vec<String> = candidates.iter().map(|p| summary_line(p)).collect();
		let buttons = candidates
			.iter()
			.map(|p| CandidateButton {
				label: messages::candidate_label(&p.name),
				payload: CandidatePayload::encode(p.user_id),
			})
			.collect();

		out.push(OutboundAction::PresentCandidates {
			to: user,
			text: messages::profile_saved(&name, &summary),
			candidates: buttons,
		});
	}

	/// Pair the caller with the candidate bound to the pressed button
	fn select_candidate(
		&mut self,
		user: UserId,
		interaction: Interaction,
		payload: &str,
		out: &mut Vec<OutboundAction>,
	) {
		let target = match CandidatePayload::decode(payload) {
			Ok(target) if target != user => target,
			Ok(_) => {
				debug!(target: "engine", user = %user, "Self selection rejected");
				acknowledge(out, interaction, Some(messages::INVALID_SELECTION));
				return;
			}
			Err(e) => {
				debug!(target: "engine", user = %user, error = %e, "Malformed selection");
				acknowledge(out, interaction, Some(messages::INVALID_SELECTION));
				return;
			}
		};

		let Some(target_name) = self.profiles.get(target).map(|p| p.name.clone()) else {
			debug!(target: "engine", user = %user, target = %target, "Selected user has no profile");
			acknowledge(out, interaction, Some(messages::UNKNOWN_CANDIDATE));
			return;
		};

		let outcome = match self.pairings.pair(user, target) {
			Ok(outcome) => outcome,
			Err(e) => {
				debug!(target: "engine", user = %user, error = %e, "Pairing rejected");
				acknowledge(out, interaction, Some(messages::INVALID_SELECTION));
				return;
			}
		};

		acknowledge(out, interaction.clone(), None);
		for former in &outcome.displaced {
			info!(target: "engine", user = %former, "Pairing ended by re-pair");
			send(out, *former, messages::PARTNER_ENDED);
		}
		out.push(OutboundAction::EditInteraction {
			interaction,
			text: messages::chat_starting(&target_name),
		});

		if outcome.unchanged {
			debug!(target: "engine", user = %user, partner = %target, "Already paired");
		} else {
			info!(target: "engine", user = %user, partner = %target, "Pairing created");
			send(out, target, messages::CHAT_REQUEST);
		}
	}

	fn relay_text(&self, user: UserId, text: &str, out: &mut Vec<OutboundAction>) {
		match relay(&self.pairings, &self.profiles, user, text) {
			Ok(action) => out.push(action),
			Err(_) => send(out, user, messages::NOT_IN_CHAT),
		}
	}

	fn end_chat(&mut self, user: UserId, out: &mut Vec<OutboundAction>) {
		match self.pairings.unpair(user) {
			Some(partner) => {
				info!(target: "engine", user = %user, partner = %partner, "Pairing ended");
				send(out, user, messages::CHAT_ENDED);
				send(out, partner, messages::PARTNER_ENDED);
			}
			None => send(out, user, messages::NO_CHAT_TO_END),
		}
	}

	/// Reveal the caller's identity to their partner
	///
	/// One-sided: a single notification to the partner. Once both flags are
	/// set, each side additionally receives the other's card.
	fn reveal(&mut self, user: UserId, out: &mut Vec<OutboundAction>) {
		let outcome = match self.pairings.reveal(user) {
			Ok(outcome) => outcome,
			Err(_) => {
				send(out, user, messages::NO_ONE_TO_REVEAL);
				return;
			}
		};
		let partner = outcome.partner;
		let own = self.profiles.get(user);
		let theirs = self.profiles.get(partner);

		info!(target: "engine", user = %user, partner = %partner, state = ?outcome.state, "Reveal");

		let card = identity_card(own, CardVoice::FirstPerson);
		send(out, partner, messages::partner_revealed(&card));

		if outcome.state == RevealState::MutualRevealed {
			send(
				out,
				user,
				messages::mutual_reveal(&identity_card(theirs, CardVoice::ThirdPerson)),
			);
			send(
				out,
				partner,
				messages::mutual_reveal(&identity_card(own, CardVoice::ThirdPerson)),
			);
		}
	}
}

fn send(out: &mut Vec<OutboundAction>, to: UserId, text: impl Into<String>) {
	out.push(OutboundAction::SendText {
		to,
		text: text.into(),
	});
}

fn acknowledge(out: &mut Vec<OutboundAction>, interaction: Interaction, text: Option<&str>) {
	out.push(OutboundAction::AcknowledgeButton {
		interaction,
		text: text.map(str::to_string),
	});
}
