//! Output helpers for human and agent modes.

use serde::{Deserialize, Serialize};

/// Human (TTY) vs Agent (non-interactive) output selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Agent,
}

/// Agent-mode error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AgentError {
    pub fn new(error: impl Into<String>, code: i32) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

const DISPLAY_HEAD: usize = 6;
const DISPLAY_TAIL: usize = 4;

/// Shorten an SS58 address to `first6...last4` for tables and headers.
///
/// Addresses whose hidden middle would be shorter than the tail are
/// returned whole. Cut points are taken on char boundaries, so
/// non-base58 input never panics.
pub fn truncate_address(addr: &str) -> String {
    let s = addr.trim();
    let head = s.char_indices().nth(DISPLAY_HEAD).map(|(at, _)| at);
    let tail = s.char_indices().rev().nth(DISPLAY_TAIL - 1).map(|(at, _)| at);

    match (head, tail) {
        (Some(head), Some(tail))
            if s.get(head..tail)
                .is_some_and(|hidden| hidden.chars().count() > DISPLAY_TAIL) =>
        {
            format!("{}...{}", &s[..head], &s[tail..])
        }
        _ => s.to_string(),
    }
}
