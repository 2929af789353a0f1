//! Flattening of chat turns into a plain completion prompt.

use crate::models::{Role, Turn};

/// Render turns as labeled lines, ending with an open `Assistant:` slot.
pub fn flatten_prompt(turns: &[Turn]) -> String {
    let mut prompt = String::new();
    for turn in turns {
        match turn.role {
            Role::System => {
                prompt.push_str("System: ");
                prompt.push_str(&turn.content);
                prompt.push_str("\n\n");
            }
            Role::User => {
                prompt.push_str("Human: ");
                prompt.push_str(&turn.content);
                prompt.push('\n');
            }
            Role::Assistant => {
                prompt.push_str("Assistant: ");
                prompt.push_str(&turn.content);
                prompt.push('\n');
            }
        }
    }
    prompt.push_str("Assistant:");
    prompt
}
