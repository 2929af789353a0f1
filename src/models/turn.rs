//! Conversation turns and the normalization applied before prompting.

use serde::{Deserialize, Serialize};

/// Speaker of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Rewrites caller turns into a shape the provider accepts.
pub trait TurnNormalizer: Send + Sync {
    fn normalize(&self, turns: &[Turn]) -> Vec<Turn>;
}

/// Strict user/assistant alternation, starting with a user turn.
///
/// - content is trimmed
/// - system turns become user turns prefixed with `SYSTEM: `
/// - back-to-back assistant turns are split by a `_` user turn
/// - other back-to-back turns of one role are merged with `\n`
/// - a `_` user turn leads if the first turn is not from the user
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictAlternation;

const FILLER: &str = "_";

impl TurnNormalizer for StrictAlternation {
    fn normalize(&self, turns: &[Turn]) -> Vec<Turn> {
        let mut out: Vec<Turn> = Vec::with_capacity(turns.len() + 1);

        for turn in turns {
            let mut turn = Turn {
                role: turn.role,
                content: turn.content.trim().to_string(),
            };
            if turn.role == Role::System {
                turn = Turn::user(format!("SYSTEM: {}", turn.content));
            }

            match out.last_mut() {
                Some(prev) if prev.role == turn.role && turn.role == Role::Assistant => {
                    out.push(Turn::user(FILLER));
                    out.push(turn);
                }
                Some(prev) if prev.role == turn.role => {
                    prev.content.push('\n');
                    prev.content.push_str(&turn.content);
                }
                _ => out.push(turn),
            }
        }

        if out.first().is_none_or(|t| t.role != Role::User) {
            out.insert(0, Turn::user(FILLER));
        }

        out
    }
}
