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

use std::{
	thread,
	time::{Duration, Instant},
};

use veil_matching::{
	DeliveryWorker, DeliveryWorkerConfig, EngineConfig, EngineControlMessage, IngressQueue,
	MatchingEngine, MatchingEngineState, MemoryMessenger, OutboxBuffer, RegistrationStep,
	RevealState, messages,
};
use veil_sdk::types::{
	CandidatePayload, Command, InboundEvent, Interaction, MessageRef, OutboundAction, UserId,
};

const ALICE: UserId = UserId(100);
const BOB: UserId = UserId(200);
const CAROL: UserId = UserId(300);

fn command(user: UserId, command: Command) -> InboundEvent {
	InboundEvent::Command {
		user,
		command,
		args: String::new(),
		handle: None,
	}
}

fn text(user: UserId, body: &str) -> InboundEvent {
	InboundEvent::Text {
		user,
		text: body.to_string(),
		handle: None,
	}
}

fn press(user: UserId, payload: String) -> InboundEvent {
	InboundEvent::ButtonPress {
		user,
		interaction: Interaction {
			id: format!("cb-{}", user),
			message: Some(MessageRef {
				chat_id: user.0,
				message_id: 1,
			}),
		},
		payload,
		handle: None,
	}
}

/// Walk a user through every registration step, returning the final actions
fn register(
	state: &mut MatchingEngineState,
	user: UserId,
	name: &str,
	gender: &str,
	preference: &str,
	contact: &str,
) -> Vec<OutboundAction> {
	state.handle(command(user, Command::Start));
	state.handle(text(user, name));
	state.handle(text(user, "27"));
	state.handle(text(user, gender));
	state.handle(text(user, "Loves hiking"));
	state.handle(text(user, preference));
	state.handle(text(user, "Lisbon"));
	state.handle(InboundEvent::Text {
		user,
		text: contact.to_string(),
		handle: Some(format!("{}_tg", name.to_lowercase())),
	})
}

fn texts_to(actions: &[OutboundAction], user: UserId) -> Vec<String> {
	actions
		.iter()
		.filter(|a| a.recipient() == Some(user))
		.filter_map(|a| a.text().map(str::to_string))
		.collect()
}

fn candidate_payloads(actions: &[OutboundAction]) -> Vec<String> {
	actions
		.iter()
		.filter_map(|a| match a {
			OutboundAction::PresentCandidates { candidates, .. } => Some(candidates),
			_ => None,
		})
		.flatten()
		.map(|c| c.payload.clone())
		.collect()
}

fn paired_state() -> MatchingEngineState {
	let mut state = MatchingEngineState::new(3);
	register(&mut state, ALICE, "Alice", "Female", "Male", "@Alice_IG");
	register(&mut state, BOB, "Bob", "Male", "Female", "skip");
	state.handle(press(ALICE, CandidatePayload::encode(BOB)));
	state
}

#[test]
fn test_compatible_users_see_each_other() {
	let mut state = MatchingEngineState::new(3);

	let alice_done = register(&mut state, ALICE, "Alice", "Female", "Male", "skip");
	assert!(candidate_payloads(&alice_done).is_empty());
	assert_eq!(
		texts_to(&alice_done, ALICE),
		vec![messages::profile_saved_no_matches("Alice")]
	);

	let bob_done = register(&mut state, BOB, "Bob", "Male", "Female", "skip");
	assert_eq!(
		candidate_payloads(&bob_done),
		vec![CandidatePayload::encode(ALICE)]
	);

	// Alice registering again now finds Bob
	let alice_again = register(&mut state, ALICE, "Alice", "Female", "Male", "skip");
	assert_eq!(
		candidate_payloads(&alice_again),
		vec![CandidatePayload::encode(BOB)]
	);
	assert_eq!(state.profiles.len(), 2);
	assert!(state.registrations.is_empty());
}

#[test]
fn test_pair_relay_and_mutual_reveal() {
	let mut state = MatchingEngineState::new(3);
	register(&mut state, ALICE, "Alice", "Female", "Male", "@Alice_IG");
	register(&mut state, BOB, "Bob", "Male", "Female", "skip");

	let actions = state.handle(press(ALICE, CandidatePayload::encode(BOB)));
	assert_eq!(state.pairings.partner_of(ALICE), Some(BOB));
	assert_eq!(state.pairings.partner_of(BOB), Some(ALICE));
	assert!(matches!(
		actions[0],
		OutboundAction::AcknowledgeButton { text: None, .. }
	));
	assert!(actions.iter().any(|a| matches!(
		a,
		OutboundAction::EditInteraction { text, .. } if *text == messages::chat_starting("Bob")
	)));
	assert_eq!(texts_to(&actions, BOB), vec![messages::CHAT_REQUEST]);

	let relayed = state.handle(text(ALICE, "hi"));
	assert_eq!(texts_to(&relayed, BOB), vec!["Anonymous Crush: hi"]);
	assert!(texts_to(&relayed, ALICE).is_empty());

	let first = state.handle(command(ALICE, Command::Reveal));
	let to_bob = texts_to(&first, BOB);
	assert_eq!(to_bob.len(), 1);
	assert!(to_bob[0].contains("I'm Alice, 27, from Lisbon"));
	assert!(to_bob[0].contains("Telegram: @alice_tg"));
	assert!(to_bob[0].contains("Instagram: @alice_ig"));
	assert!(texts_to(&first, ALICE).is_empty());
	assert_eq!(state.pairings.reveal_state(ALICE), Some(RevealState::OneRevealed));

	// Still anonymous until both have revealed
	let relayed = state.handle(text(ALICE, "still me"));
	assert_eq!(texts_to(&relayed, BOB), vec!["Anonymous Crush: still me"]);

	let second = state.handle(command(BOB, Command::Reveal));
	assert_eq!(second.len(), 3);
	let to_alice = texts_to(&second, ALICE);
	assert_eq!(to_alice.len(), 2);
	assert!(to_alice[0].contains("I'm Bob"));
	assert!(to_alice[0].contains("Instagram: not shared"));
	assert!(to_alice[1].contains("They're Bob"));
	let to_bob = texts_to(&second, BOB);
	assert_eq!(to_bob.len(), 1);
	assert!(to_bob[0].contains("They're Alice"));
	assert_eq!(
		state.pairings.reveal_state(BOB),
		Some(RevealState::MutualRevealed)
	);

	let relayed = state.handle(text(ALICE, "hello again"));
	assert_eq!(texts_to(&relayed, BOB), vec!["Alice: hello again"]);
	let relayed = state.handle(text(BOB, "hey"));
	assert_eq!(texts_to(&relayed, ALICE), vec!["Bob: hey"]);
}

#[test]
fn test_end_without_chat_changes_nothing() {
	let mut state = MatchingEngineState::new(3);
	register(&mut state, ALICE, "Alice", "Female", "Male", "skip");
	let before = state.stats();

	let actions = state.handle(command(ALICE, Command::End));
	assert_eq!(texts_to(&actions, ALICE), vec![messages::NO_CHAT_TO_END]);
	assert_eq!(actions.len(), 1);
	assert_eq!(state.stats(), before);
}

#[test]
fn test_invalid_age_reprompts() {
	let mut state = MatchingEngineState::new(3);
	state.handle(command(ALICE, Command::Start));
	state.handle(text(ALICE, "Alice"));

	let actions = state.handle(text(ALICE, "abc"));
	assert_eq!(actions.len(), 1);
	assert_eq!(state.registrations[&ALICE].step(), RegistrationStep::Age);

	let actions = state.handle(text(ALICE, "27"));
	assert_eq!(
		texts_to(&actions, ALICE),
		vec![messages::prompt(RegistrationStep::Gender)]
	);
	let registration = &state.registrations[&ALICE];
	assert_eq!(registration.step(), RegistrationStep::Gender);
	assert_eq!(registration.draft().age, Some(27));
}

#[test]
fn test_restart_discards_draft_in_flight() {
	let mut state = MatchingEngineState::new(3);
	state.handle(command(ALICE, Command::Start));
	state.handle(text(ALICE, "Ana"));
	state.handle(text(ALICE, "27"));
	assert_eq!(state.registrations[&ALICE].step(), RegistrationStep::Gender);

	let actions = state.handle(command(ALICE, Command::Start));
	assert_eq!(
		texts_to(&actions, ALICE),
		vec![messages::prompt(RegistrationStep::Name)]
	);

	let registration = &state.registrations[&ALICE];
	assert_eq!(registration.step(), RegistrationStep::Name);
	assert_eq!(registration.draft().name, None);
	assert_eq!(registration.draft().age, None);
	assert_eq!(state.stats().drafts, 1);
	assert!(state.profiles.is_empty());

	// The next answer is a name again, not a gender
	state.handle(text(ALICE, "Alice"));
	let registration = &state.registrations[&ALICE];
	assert_eq!(registration.step(), RegistrationStep::Age);
	assert_eq!(registration.draft().name.as_deref(), Some("Alice"));
}

#[test]
fn test_cancel_from_every_step() {
	let answers = ["Alice", "27", "Female", "bio", "Male", "Lisbon"];

	for depth in 0..=answers.len() {
		let mut state = MatchingEngineState::new(3);
		state.handle(command(ALICE, Command::Start));
		for answer in &answers[..depth] {
			state.handle(text(ALICE, answer));
		}

		let actions = state.handle(command(ALICE, Command::Cancel));
		assert_eq!(
			texts_to(&actions, ALICE),
			vec![messages::REGISTRATION_CANCELLED],
			"cancel after {} answers",
			depth
		);
		assert!(state.registrations.is_empty());
		assert!(state.profiles.is_empty());
	}
}

#[test]
fn test_cancel_without_draft() {
	let mut state = MatchingEngineState::new(3);
	let actions = state.handle(command(ALICE, Command::Cancel));
	assert_eq!(texts_to(&actions, ALICE), vec![messages::NOTHING_TO_CANCEL]);
}

#[test]
fn test_text_outside_chat_and_registration() {
	let mut state = MatchingEngineState::new(3);
	let actions = state.handle(text(ALICE, "anyone there?"));
	assert_eq!(texts_to(&actions, ALICE), vec![messages::NOT_IN_CHAT]);

	let actions = state.handle(command(ALICE, Command::Reveal));
	assert_eq!(texts_to(&actions, ALICE), vec![messages::NO_ONE_TO_REVEAL]);
}

#[test]
fn test_registration_input_wins_over_relay() {
	let mut state = paired_state();
	state.handle(command(ALICE, Command::Start));

	let actions = state.handle(text(ALICE, "Alicia"));
	assert!(texts_to(&actions, BOB).is_empty());
	assert_eq!(
		texts_to(&actions, ALICE),
		vec![messages::prompt(RegistrationStep::Age)]
	);
	// The pairing is untouched by a fresh registration
	assert_eq!(state.pairings.partner_of(ALICE), Some(BOB));
}

#[test]
fn test_end_notifies_both_sides() {
	let mut state = paired_state();

	let actions = state.handle(command(BOB, Command::End));
	assert_eq!(texts_to(&actions, BOB), vec![messages::CHAT_ENDED]);
	assert_eq!(texts_to(&actions, ALICE), vec![messages::PARTNER_ENDED]);
	assert_eq!(state.pairings.partner_of(ALICE), None);
	assert_eq!(state.pairings.partner_of(BOB), None);
	assert!(state.pairings.is_empty());
}

#[test]
fn test_repair_displaces_previous_partners() {
	let mut state = paired_state();
	register(&mut state, CAROL, "Carol", "Female", "Male", "skip");

	// Bob leaves Alice for Carol
	let actions = state.handle(press(BOB, CandidatePayload::encode(CAROL)));
	assert_eq!(texts_to(&actions, ALICE), vec![messages::PARTNER_ENDED]);
	assert_eq!(texts_to(&actions, CAROL), vec![messages::CHAT_REQUEST]);
	assert_eq!(state.pairings.partner_of(ALICE), None);
	assert_eq!(state.pairings.partner_of(BOB), Some(CAROL));
	assert_eq!(state.pairings.partner_of(CAROL), Some(BOB));
	assert_eq!(state.pairings.len(), 1);
	assert_eq!(state.pairings.reveal_state(BOB), Some(RevealState::Hidden));
}

#[test]
fn test_selecting_current_partner_keeps_reveal() {
	let mut state = paired_state();
	state.handle(command(ALICE, Command::Reveal));

	let actions = state.handle(press(ALICE, CandidatePayload::encode(BOB)));
	assert!(texts_to(&actions, BOB).is_empty());
	assert_eq!(
		state.pairings.reveal_state(ALICE),
		Some(RevealState::OneRevealed)
	);
}

#[test]
fn test_invalid_selections() {
	let mut state = paired_state();

	let actions = state.handle(press(ALICE, "garbage".to_string()));
	assert!(matches!(
		&actions[..],
		[OutboundAction::AcknowledgeButton { text: Some(t), .. }] if t == messages::INVALID_SELECTION
	));

	let actions = state.handle(press(ALICE, CandidatePayload::encode(ALICE)));
	assert!(matches!(
		&actions[..],
		[OutboundAction::AcknowledgeButton { text: Some(t), .. }] if t == messages::INVALID_SELECTION
	));

	let actions = state.handle(press(ALICE, CandidatePayload::encode(UserId(999))));
	assert!(matches!(
		&actions[..],
		[OutboundAction::AcknowledgeButton { text: Some(t), .. }] if t == messages::UNKNOWN_CANDIDATE
	));

	assert_eq!(state.pairings.partner_of(ALICE), Some(BOB));
}

#[test]
fn test_help_and_unknown_commands() {
	let mut state = MatchingEngineState::new(3);
	let actions = state.handle(command(ALICE, Command::Help));
	assert_eq!(texts_to(&actions, ALICE), vec![messages::HELP]);

	let actions = state.handle(command(ALICE, Command::Unknown("dance".to_string())));
	assert_eq!(
		texts_to(&actions, ALICE),
		vec![messages::unknown_command("dance")]
	);
}

#[test]
fn test_candidate_limit_respected() {
	let mut state = MatchingEngineState::new(2);
	for i in 0..4 {
		register(&mut state, UserId(10 + i), "Fem", "Female", "Male", "skip");
	}
	let actions = register(&mut state, BOB, "Bob", "Male", "Female", "skip");
	assert_eq!(
		candidate_payloads(&actions),
		vec![
			CandidatePayload::encode(UserId(10)),
			CandidatePayload::encode(UserId(11)),
		]
	);
}

fn wait_for(messenger: &MemoryMessenger, count: usize) -> Vec<OutboundAction> {
	let deadline = Instant::now() + Duration::from_secs(5);
	while messenger.len() < count && Instant::now() < deadline {
		thread::sleep(Duration::from_millis(5));
	}
	messenger.delivered()
}

#[test]
fn test_threaded_pipeline_delivers_in_order() {
	let (queue_sender, queue_receiver) = IngressQueue::new(100).split();
	let (outbox_producer, outbox_consumer) = OutboxBuffer::new(100).split();
	let messenger = MemoryMessenger::new();

	let worker = DeliveryWorker::start(
		outbox_consumer,
		Box::new(messenger.clone()),
		DeliveryWorkerConfig {
			batch_size: 8,
			batch_timeout_ms: 5,
			verbose_logging: false,
		},
	)
	.unwrap();
	let engine = MatchingEngine::start(EngineConfig::default(), queue_receiver, outbox_producer)
		.unwrap();

	queue_sender
		.try_enqueue(command(ALICE, Command::Start))
		.unwrap();
	queue_sender.try_enqueue(text(ALICE, "Alice")).unwrap();
	queue_sender.try_enqueue(text(ALICE, "abc")).unwrap();
	queue_sender.try_enqueue(text(ALICE, "27")).unwrap();

	let delivered = wait_for(&messenger, 4);
	let bodies: Vec<_> = delivered.iter().filter_map(|a| a.text()).collect();
	assert_eq!(
		bodies,
		vec![
			messages::prompt(RegistrationStep::Name),
			messages::prompt(RegistrationStep::Age),
			"That doesn't look like a valid age. Try again?",
			messages::prompt(RegistrationStep::Gender),
		]
	);

	let (respond_to, stats) = tokio::sync::oneshot::channel();
	queue_sender
		.try_enqueue(EngineControlMessage::Stats { respond_to })
		.unwrap();
	let stats = stats.blocking_recv().unwrap();
	assert_eq!(stats.drafts, 1);
	assert_eq!(stats.profiles, 0);

	queue_sender
		.try_enqueue(EngineControlMessage::Shutdown)
		.unwrap();
	engine.shutdown();
	worker.shutdown();
}
