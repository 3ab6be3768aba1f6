//! Storage collaborator contract and a basic in-memory implementation.
//!
//! Each trait method is one storage round trip; the core never assumes
//! atomicity across calls. Implementations surface their failures as
//! persistence-flavored [`ChatError`]s.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use pcommon::{BoxFuture, SessionId, TurnId, UserId};

use crate::{ChatError, NewTurn, SessionRecord, Turn};

pub type ChatFuture<'a, T> = BoxFuture<'a, T>;

pub trait TurnStore: Send + Sync {
    /// Looks up a session scoped to its owner; `None` when absent or owned
    /// by someone else.
    fn find_session<'a>(
        &'a self,
        session_id: &'a SessionId,
        user_id: &'a UserId,
    ) -> ChatFuture<'a, Result<Option<SessionRecord>, ChatError>>;

    fn insert_turn<'a>(&'a self, turn: NewTurn) -> ChatFuture<'a, Result<Turn, ChatError>>;

    fn delete_turn<'a>(&'a self, turn_id: &'a TurnId) -> ChatFuture<'a, Result<(), ChatError>>;

    /// Turns of a session ordered ascending by creation time; `limit` caps
    /// the result from the front, `None` returns everything.
    fn list_turns_ascending<'a>(
        &'a self,
        session_id: &'a SessionId,
        limit: Option<usize>,
    ) -> ChatFuture<'a, Result<Vec<Turn>, ChatError>>;

    fn update_session_title<'a>(
        &'a self,
        session_id: &'a SessionId,
        title: &'a str,
    ) -> ChatFuture<'a, Result<(), ChatError>>;

    fn increment_usage_counter<'a>(
        &'a self,
        user_id: &'a UserId,
    ) -> ChatFuture<'a, Result<(), ChatError>>;

    fn append_usage_log<'a>(
        &'a self,
        user_id: &'a UserId,
        action_type: &'a str,
    ) -> ChatFuture<'a, Result<(), ChatError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageLogEntry {
    pub user_id: UserId,
    pub action_type: String,
}

#[derive(Debug, Default)]
struct StoreState {
    sessions: HashMap<SessionId, SessionRecord>,
    turns: Vec<Turn>,
    usage_counts: HashMap<UserId, u64>,
    usage_log: Vec<UsageLogEntry>,
    next_turn: u64,
}

#[derive(Debug, Default)]
pub struct InMemoryTurnStore {
    state: Mutex<StoreState>,
}

impl InMemoryTurnStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_session(&self, record: SessionRecord) {
        self.lock_state().sessions.insert(record.id.clone(), record);
    }

    pub fn usage_count(&self, user_id: &UserId) -> u64 {
        self.lock_state()
            .usage_counts
            .get(user_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn session_title(&self, session_id: &SessionId) -> Option<String> {
        self.lock_state()
            .sessions
            .get(session_id)
            .and_then(|record| record.title.clone())
    }

    pub fn usage_log(&self) -> Vec<UsageLogEntry> {
        self.lock_state().usage_log.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        // Every write leaves the state coherent, so recover from poisoning.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TurnStore for InMemoryTurnStore {
    fn find_session<'a>(
        &'a self,
        session_id: &'a SessionId,
        user_id: &'a UserId,
    ) -> ChatFuture<'a, Result<Option<SessionRecord>, ChatError>> {
        Box::pin(async move {
            let state = self.lock_state();
            Ok(state
                .sessions
                .get(session_id)
                .filter(|record| &record.user_id == user_id)
                .cloned())
        })
    }

    fn insert_turn<'a>(&'a self, turn: NewTurn) -> ChatFuture<'a, Result<Turn, ChatError>> {
        Box::pin(async move {
            let mut state = self.lock_state();
            state.next_turn += 1;
            let stored = Turn {
                id: TurnId::new(format!("turn-{}", state.next_turn)),
                session_id: turn.session_id,
                role: turn.role,
                content: turn.content,
                model_used: turn.model_used,
                token_usage: turn.token_usage,
                created_at: SystemTime::now(),
            };

            state.turns.push(stored.clone());
            Ok(stored)
        })
    }

    fn delete_turn<'a>(&'a self, turn_id: &'a TurnId) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut state = self.lock_state();
            state.turns.retain(|turn| &turn.id != turn_id);
            Ok(())
        })
    }

    fn list_turns_ascending<'a>(
        &'a self,
        session_id: &'a SessionId,
        limit: Option<usize>,
    ) -> ChatFuture<'a, Result<Vec<Turn>, ChatError>> {
        Box::pin(async move {
            let state = self.lock_state();
            let mut turns = state
                .turns
                .iter()
                .filter(|turn| &turn.session_id == session_id)
                .cloned()
                .collect::<Vec<_>>();

            if let Some(limit) = limit {
                turns.truncate(limit);
            }

            Ok(turns)
        })
    }

    fn update_session_title<'a>(
        &'a self,
        session_id: &'a SessionId,
        title: &'a str,
    ) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut state = self.lock_state();
            match state.sessions.get_mut(session_id) {
                Some(record) => {
                    record.title = Some(title.to_string());
                    Ok(())
                }
                None => Err(ChatError::persistence("session does not exist")),
            }
        })
    }

    fn increment_usage_counter<'a>(
        &'a self,
        user_id: &'a UserId,
    ) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut state = self.lock_state();
            *state.usage_counts.entry(user_id.clone()).or_insert(0) += 1;
            Ok(())
        })
    }

    fn append_usage_log<'a>(
        &'a self,
        user_id: &'a UserId,
        action_type: &'a str,
    ) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut state = self.lock_state();
            state.usage_log.push(UsageLogEntry {
                user_id: user_id.clone(),
                action_type: action_type.to_string(),
            });
            Ok(())
        })
    }
}
