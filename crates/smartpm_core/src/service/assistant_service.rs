//! Assistant use-case service.
//!
//! # Responsibility
//! - Drive one exchange: user text in, decomposition reply with drafts out.
//! - Materialize the drafts owned by an assistant turn on request.
//!
//! # Invariants
//! - Blank input is rejected before the decomposer runs; nothing is appended.
//! - The reply's draft count always equals the number of drafts it carries.
//! - One accept call issues at most one materialization batch.
//! - A turn whose batch completed is never materialized again; rejected
//!   batches leave the turn acceptable.

use crate::assistant::conversation::{
    assistant_reply_text, follow_up_suggestions, ConversationError, ConversationLog,
    ConversationTurn, Speaker, TurnId,
};
use crate::assistant::decomposer::decompose_with_domain;
use crate::assistant::materializer::{MaterializeResult, TaskMaterializer};
use crate::assistant::templates::Domain;
use crate::model::project::ProjectId;
use crate::notify::Notifier;
use crate::repo::project_repo::ProjectLister;
use crate::repo::task_repo::TaskCreator;
use crate::repo::RepoError;
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

/// Errors from assistant use-cases.
#[derive(Debug)]
pub enum AssistantError {
    Conversation(ConversationError),
    /// No turn with this id exists in the log.
    TurnNotFound(TurnId),
    /// The turn exists but carries no drafts to accept.
    NoDrafts(TurnId),
    /// No assistant turn in the log carries drafts.
    NothingToAccept,
    /// The turn's drafts were already materialized by an earlier batch.
    AlreadyAccepted(TurnId),
    Repo(RepoError),
}

impl Display for AssistantError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conversation(err) => write!(f, "{err}"),
            Self::TurnNotFound(id) => write!(f, "conversation turn not found: {id}"),
            Self::NoDrafts(id) => write!(f, "conversation turn {id} has no generated tasks"),
            Self::NothingToAccept => write!(f, "no generated tasks to accept"),
            Self::AlreadyAccepted(id) => {
                write!(f, "generated tasks of turn {id} were already added")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AssistantError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Conversation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::TurnNotFound(_)
            | Self::NoDrafts(_)
            | Self::NothingToAccept
            | Self::AlreadyAccepted(_) => None,
        }
    }
}

impl From<ConversationError> for AssistantError {
    fn from(value: ConversationError) -> Self {
        Self::Conversation(value)
    }
}

impl From<RepoError> for AssistantError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// The two turns appended by one successful submit.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub user: ConversationTurn,
    pub reply: ConversationTurn,
    pub domain: Domain,
}

/// Conversation-driven task generation.
pub struct AssistantService<P, T, N> {
    log: ConversationLog,
    materializer: TaskMaterializer<P, T, N>,
    /// Turns whose batch completed. Kept beside the log, which stays append-only.
    accepted: Mutex<HashSet<TurnId>>,
}

impl<P: ProjectLister, T: TaskCreator, N: Notifier> AssistantService<P, T, N> {
    /// Starts a session whose log opens with the greeting turn.
    pub fn new(projects: P, tasks: T, notifier: N) -> Self {
        Self {
            log: ConversationLog::with_greeting(),
            materializer: TaskMaterializer::new(projects, tasks, notifier),
            accepted: Mutex::new(HashSet::new()),
        }
    }

    /// Appends the user's text, decomposes it, and appends the reply.
    ///
    /// # Errors
    /// - `Conversation(EmptyInput)` for blank text; the log is unchanged.
    pub fn submit(&self, text: impl Into<String>) -> Result<Exchange, AssistantError> {
        let user = self.log.append_user(text)?;
        let decomposition = decompose_with_domain(&user.text);
        let reply_text = assistant_reply_text(&user.text, decomposition.drafts.len());
        let reply = self.log.append_assistant(
            reply_text,
            Some(decomposition.drafts),
            Some(follow_up_suggestions()),
        );

        info!(
            "event=assistant_submit module=service status=ok domain={} turns={}",
            decomposition.domain.as_str(),
            self.log.len()
        );
        Ok(Exchange {
            user,
            reply,
            domain: decomposition.domain,
        })
    }

    /// Materializes every draft of one assistant turn.
    ///
    /// `target = None` falls back to the first listed project.
    ///
    /// # Errors
    /// - `AlreadyAccepted` when an earlier batch for this turn completed.
    /// - `TurnNotFound` / `NoDrafts` when the turn carries nothing to accept.
    pub fn accept(
        &self,
        turn_id: TurnId,
        target: Option<ProjectId>,
    ) -> Result<MaterializeResult, AssistantError> {
        let turn = self
            .log
            .turn(turn_id)
            .ok_or(AssistantError::TurnNotFound(turn_id))?;
        let drafts = match (turn.speaker, turn.drafts) {
            (Speaker::Assistant, Some(drafts)) if !drafts.is_empty() => drafts,
            _ => return Err(AssistantError::NoDrafts(turn_id)),
        };

        // Held across the batch so concurrent accepts of one turn cannot both run.
        let mut accepted = self.accepted_turns();
        if accepted.contains(&turn_id) {
            warn!(
                "event=assistant_accept module=service status=rejected error_code=already_accepted turn_id={}",
                turn_id
            );
            return Err(AssistantError::AlreadyAccepted(turn_id));
        }
        let result = self.materializer.materialize(&drafts, target)?;
        if matches!(result, MaterializeResult::Completed(_)) {
            accepted.insert(turn_id);
        }
        Ok(result)
    }

    /// Materializes the drafts of the most recent assistant turn that has any.
    ///
    /// A turn that was already accepted is reported as `AlreadyAccepted`, not skipped.
    pub fn accept_latest(
        &self,
        target: Option<ProjectId>,
    ) -> Result<MaterializeResult, AssistantError> {
        let turn_id = self
            .log
            .all_turns()
            .iter()
            .rev()
            .find(|turn| {
                turn.speaker == Speaker::Assistant
                    && turn.drafts.as_ref().is_some_and(|drafts| !drafts.is_empty())
            })
            .map(|turn| turn.id);
        match turn_id {
            Some(turn_id) => self.accept(turn_id, target),
            None => Err(AssistantError::NothingToAccept),
        }
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.log
    }

    fn accepted_turns(&self) -> MutexGuard<'_, HashSet<TurnId>> {
        self.accepted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
