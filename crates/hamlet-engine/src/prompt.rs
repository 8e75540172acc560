//! Prompt assembly for model-assisted social decisions.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use hamlet_contracts::{
    agent::CharacterProfile,
    message::{ChatMessage, ChatRole, CoordinatorMessage, GenerateRequest},
    world::WorldSnapshot,
};

/// The reply grammar the decision parser understands.
pub const ACTION_GRAMMAR: &str = "\
Reply with exactly one line, choosing one action:
SPEAK \"<what you say, at most 80 characters>\"
APPROACH <agent id>
ACTIVITY \"<what you start doing, at most 50 characters>\"
WANDER <zone>
IDLE";

pub fn system_prompt(character: &CharacterProfile, zones: &[String]) -> String {
    let mut prompt = format!("You are {}, a resident of a small town.", character.name);
    if !character.bio.trim().is_empty() {
        let _ = write!(prompt, " {}", character.bio.trim());
    }
    if !zones.is_empty() {
        let _ = write!(prompt, "\nKnown zones: {}.", zones.join(", "));
    }
    prompt.push_str("\nStay in character and keep it short.\n\n");
    prompt.push_str(ACTION_GRAMMAR);
    prompt
}

pub fn user_prompt(snapshot: &WorldSnapshot, now: DateTime<Utc>) -> String {
    let mut prompt = format!("You are in {}.", snapshot.zone);

    if snapshot.nearby_agents.is_empty() {
        prompt.push_str(" Nobody is around.");
    } else {
        let names: Vec<&str> = snapshot.nearby_agents.iter().map(|a| a.as_str()).collect();
        let _ = write!(prompt, " Nearby: {}.", names.join(", "));
    }

    match &snapshot.current_activity {
        Some(activity) if activity.until > now => {
            let _ = write!(prompt, " You are busy {}.", activity.description);
        }
        _ => prompt.push_str(" You are not doing anything in particular."),
    }

    prompt.push_str(" What do you do next?");
    prompt
}

/// Inbox messages become user turns, attributed to their sender.
pub fn history_from_inbox(messages: &[CoordinatorMessage]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|m| ChatMessage {
            role: ChatRole::User,
            content: format!("{}: {}", m.from, m.content),
        })
        .collect()
}

pub fn build_request(
    character: &CharacterProfile,
    snapshot: &WorldSnapshot,
    inbox: &[CoordinatorMessage],
    zones: &[String],
    max_tokens: u32,
    now: DateTime<Utc>,
) -> GenerateRequest {
    GenerateRequest {
        system_prompt: system_prompt(character, zones),
        user_prompt: user_prompt(snapshot, now),
        history: history_from_inbox(inbox),
        tools: None,
        max_tokens,
    }
}
