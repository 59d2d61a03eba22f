//! Instruction payload for the rewrite model.

use crate::types::{Message, ToneAxes};

pub const SYSTEM_PROMPT: &str = "You are a helpful rewriting assistant focused on tone.";

/// Rules every rewrite must follow, whatever the axes.
pub const RULES: [&str; 4] = [
    "Preserve the original meaning.",
    "Do not add new facts.",
    "Do not translate; keep the same language as the original.",
    "Keep formatting simple (no markdown tables or complex layout).",
];

const TEXT_FENCE: &str = "\"\"\"";

/// Shortest run of at least three quotes that does not occur in `text`.
fn fence_for(text: &str) -> String {
    let mut fence = TEXT_FENCE.to_string();
    while text.contains(&fence) {
        fence.push('"');
    }
    fence
}

pub fn build_prompt(text: &str, axes: &ToneAxes) -> String {
    let fence = fence_for(text);
    let rules = RULES
        .iter()
        .map(|r| format!("- {}", r))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Rewrite the text in the requested tone.\n\
         \n\
         Tone:\n\
         - Formality: {formality}\n\
         - Length: {verbosity}\n\
         \n\
         Rules:\n\
         {rules}\n\
         \n\
         Text (between the {fence} lines):\n\
         {fence}\n{text}\n{fence}\n",
        formality = axes.formality.descriptor(),
        verbosity = axes.verbosity.descriptor(),
        rules = rules,
        fence = fence,
        text = text,
    )
}

pub fn build_messages(text: &str, axes: &ToneAxes) -> Vec<Message> {
    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(build_prompt(text, axes)),
    ]
}
