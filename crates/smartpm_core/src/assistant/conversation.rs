//! Append-only assistant conversation log.
//!
//! # Responsibility
//! - Record user and assistant turns in chronological order.
//! - Reject blank user input before anything reaches the decomposer.
//!
//! # Invariants
//! - Turns are never removed, reordered or mutated once appended.
//! - Appends are serialized through one lock; timestamps never decrease.
//! - `all_turns` returns a snapshot detached from later appends.

use crate::model::task::TaskDraft;
use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for one conversation turn.
pub type TurnId = Uuid;

/// Opening message of a fresh assistant session.
pub const GREETING_TEXT: &str = "Hello! I'm your project management assistant. I can break features down into tasks, assess risks and estimate effort. What would you like to work on today?";

/// Quick actions offered with the greeting.
pub const GREETING_SUGGESTIONS: &[&str] = &[
    "Break down a feature into tasks",
    "Analyze project risks",
    "Generate task estimates",
    "Import Excel file",
];

/// Quick actions offered after each decomposition.
pub const FOLLOW_UP_SUGGESTIONS: &[&str] = &[
    "Create detailed task breakdown",
    "Assess technical risks",
    "Generate timeline estimates",
];

/// Turn author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

/// One entry of the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: TurnId,
    pub speaker: Speaker,
    pub text: String,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    pub suggestions: Option<Vec<String>>,
    /// Drafts owned by this turn until they are materialized.
    pub drafts: Option<Vec<TaskDraft>>,
}

/// Conversation log errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// User input was empty or whitespace only.
    EmptyInput,
}

impl Display for ConversationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "message must not be empty"),
        }
    }
}

impl Error for ConversationError {}

/// Builds the assistant reply text for a decomposition result.
pub fn assistant_reply_text(original_text: &str, draft_count: usize) -> String {
    format!(
        "I've analyzed your request: \"{original_text}\" and generated {draft_count} tasks with risk assessments and confidence scores."
    )
}

/// Ordered, append-only sequence of turns.
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: Mutex<Vec<ConversationTurn>>,
}

impl ConversationLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log whose first turn is the assistant greeting.
    pub fn with_greeting() -> Self {
        let log = Self::new();
        log.append_assistant(
            GREETING_TEXT,
            None,
            Some(to_owned_strings(GREETING_SUGGESTIONS)),
        );
        log
    }

    /// Appends a user turn.
    ///
    /// # Errors
    /// - `EmptyInput` when `text` is blank; nothing is appended.
    pub fn append_user(&self, text: impl Into<String>) -> Result<ConversationTurn, ConversationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ConversationError::EmptyInput);
        }
        Ok(self.push(Speaker::User, text, None, None))
    }

    /// Appends an assistant turn carrying optional drafts and suggestions.
    pub fn append_assistant(
        &self,
        text: impl Into<String>,
        drafts: Option<Vec<TaskDraft>>,
        suggestions: Option<Vec<String>>,
    ) -> ConversationTurn {
        self.push(Speaker::Assistant, text.into(), suggestions, drafts)
    }

    /// Returns every turn in append order.
    pub fn all_turns(&self) -> Vec<ConversationTurn> {
        self.lock().clone()
    }

    /// Looks one turn up by id.
    pub fn turn(&self, id: TurnId) -> Option<ConversationTurn> {
        self.lock().iter().find(|turn| turn.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(
        &self,
        speaker: Speaker,
        text: String,
        suggestions: Option<Vec<String>>,
        drafts: Option<Vec<TaskDraft>>,
    ) -> ConversationTurn {
        let mut turns = self.lock();
        let floor = turns.last().map_or(i64::MIN, |turn| turn.timestamp);
        let turn = ConversationTurn {
            id: Uuid::new_v4(),
            speaker,
            text,
            timestamp: now_epoch_ms().max(floor),
            suggestions,
            drafts,
        };
        turns.push(turn.clone());

        debug!(
            "event=conversation_append module=assistant status=ok speaker={:?} turns={} drafts={}",
            speaker,
            turns.len(),
            turn.drafts.as_ref().map_or(0, Vec::len)
        );
        turn
    }

    // `push` is the only mutation, so a poisoned vec is still consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<ConversationTurn>> {
        self.turns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

fn to_owned_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

pub(crate) fn follow_up_suggestions() -> Vec<String> {
    to_owned_strings(FOLLOW_UP_SUGGESTIONS)
}
