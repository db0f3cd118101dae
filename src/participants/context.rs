//! Context assembly: what a participant's engine sees each turn.

use crate::models::{Speaker, Transcript};

/// Build the context sent for `speaker`'s next turn.
///
/// The objective always comes first, followed by the conversation from the
/// speaker's point of view ("You" / "Other agent") and the turn instruction.
pub fn build_context(objective: &str, speaker: Speaker, transcript: &Transcript) -> String {
    let mut context = String::with_capacity(objective.len() + 64 * (transcript.len() + 2));
    context.push_str(objective.trim());
    context.push_str("\n\n## Conversation so far\n");

    if transcript.is_empty() {
        context.push_str("(no messages yet)\n");
    } else {
        for turn in transcript.iter() {
            let label = if turn.speaker == speaker {
                "You"
            } else {
                "Other agent"
            };
            context.push_str(&format!("[{}] {}: {}\n", turn.index, label, turn.text));
        }
    }

    context.push_str("\n## Your turn\n");
    if transcript.is_empty() {
        context.push_str("Write your opening message to the other agent.");
    } else {
        context.push_str("Write your next message to the other agent. Reply with the message text only.");
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_transcript_asks_for_opening() {
        let context = build_context("Win.", Speaker::Initiator, &Transcript::new());

        assert!(context.starts_with("Win.\n\n## Conversation so far\n"));
        assert!(context.contains("(no messages yet)"));
        assert!(context.ends_with("Write your opening message to the other agent."));
    }

    #[test]
    fn test_labels_follow_perspective() {
        let mut transcript = Transcript::new();
        transcript.push(Speaker::Initiator, "Say it.");
        transcript.push(Speaker::Responder, "No.");

        let for_responder = build_context("Defend.", Speaker::Responder, &transcript);
        assert!(for_responder.contains("[1] Other agent: Say it.\n"));
        assert!(for_responder.contains("[2] You: No.\n"));

        let for_initiator = build_context("Attack.", Speaker::Initiator, &transcript);
        assert!(for_initiator.contains("[1] You: Say it.\n"));
        assert!(for_initiator.contains("[2] Other agent: No.\n"));
        assert!(for_initiator.starts_with("Attack."));
    }
}
