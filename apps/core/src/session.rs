//! Per-visitor session state: chat history and the mood log.
//!
//! Sessions live only in memory. A session is created when a visitor opens the
//! page, mutated through append/clear operations, and destroyed explicitly or
//! evicted when the store is full (least recently used first).

use crate::error::AppError;
use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

pub const MIN_MOOD: u8 = 1;
pub const MAX_MOOD: u8 = 5;

/// What happens to chat history when a new user turn arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryMode {
    /// History accumulates for the life of the session
    #[default]
    Persistent,
    /// History is cleared before every user turn; only the latest exchange is kept
    ResetPerTurn,
}

impl FromStr for HistoryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "persistent" => Ok(HistoryMode::Persistent),
            "reset-per-turn" | "reset_per_turn" => Ok(HistoryMode::ResetPerTurn),
            other => Err(format!(
                "unknown history mode '{}', expected 'persistent' or 'reset-per-turn'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single chat line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A single mood log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    pub timestamp: DateTime<Utc>,
    pub mood: u8,
}

/// Aggregate over a session's mood log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodSummary {
    pub count: usize,
    pub average: Option<f32>,
    pub latest: Option<u8>,
}

/// Serializable view of a session, returned by the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub history_mode: HistoryMode,
    pub messages: Vec<ChatMessage>,
    pub moods: Vec<MoodEntry>,
    pub mood_summary: MoodSummary,
}

#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    history_mode: HistoryMode,
    messages: Vec<ChatMessage>,
    moods: Vec<MoodEntry>,
}

impl Session {
    pub fn new(history_mode: HistoryMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            history_mode,
            messages: Vec::new(),
            moods: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    #[cfg(test)]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[cfg(test)]
    pub fn moods(&self) -> &[MoodEntry] {
        &self.moods
    }

    /// Records one user message and the reply it produced.
    pub fn record_exchange(&mut self, user_text: &str, reply: &str) {
        if self.history_mode == HistoryMode::ResetPerTurn {
            self.messages.clear();
        }
        let now = Utc::now();
        self.messages.push(ChatMessage {
            role: Role::User,
            content: user_text.to_string(),
            timestamp: now,
        });
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: reply.to_string(),
            timestamp: now,
        });
    }

    /// Appends a mood rating (1 to 5) to the log.
    pub fn log_mood(&mut self, mood: u8) -> Result<&MoodEntry, AppError> {
        self.log_mood_at(mood, Utc::now())
    }

    /// Appends a mood rating observed at `now`. A clock that stepped backwards is
    /// clamped to the previous entry so timestamps never decrease.
    pub(crate) fn log_mood_at(&mut self, mood: u8, now: DateTime<Utc>) -> Result<&MoodEntry, AppError> {
        if !(MIN_MOOD..=MAX_MOOD).contains(&mood) {
            return Err(AppError::Validation(format!(
                "mood must be between {} and {}, got {}",
                MIN_MOOD, MAX_MOOD, mood
            )));
        }

        let timestamp = match self.moods.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        self.moods.push(MoodEntry { timestamp, mood });
        debug!("Session {} logged mood {}", self.id, mood);

        Ok(&self.moods[self.moods.len() - 1])
    }

    /// Clears both the chat history and the mood log.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.moods.clear();
    }

    pub fn mood_summary(&self) -> MoodSummary {
        let count = self.moods.len();
        let average = if count == 0 {
            None
        } else {
            let total: u32 = self.moods.iter().map(|m| m.mood as u32).sum();
            Some(total as f32 / count as f32)
        };

        MoodSummary {
            count,
            average,
            latest: self.moods.last().map(|m| m.mood),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            created_at: self.created_at,
            history_mode: self.history_mode,
            messages: self.messages.clone(),
            moods: self.moods.clone(),
            mood_summary: self.mood_summary(),
        }
    }
}

/// Bounded in-memory session registry.
pub struct SessionStore {
    sessions: LruCache<Uuid, Session>,
    history_mode: HistoryMode,
}

impl SessionStore {
    pub fn new(capacity: usize, history_mode: HistoryMode) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: LruCache::new(capacity),
            history_mode,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Starts a new session and returns its snapshot.
    pub fn create(&mut self) -> SessionSnapshot {
        let session = Session::new(self.history_mode);
        let snapshot = session.snapshot();
        if let Some((evicted, _)) = self.sessions.push(session.id(), session) {
            info!("Session store full, evicted session {}", evicted);
        }
        debug!("Created session {}", snapshot.id);
        snapshot
    }

    pub fn get(&mut self, id: &Uuid) -> Result<&Session, AppError> {
        self.sessions
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("session {}", id)))
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Result<&mut Session, AppError> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("session {}", id)))
    }

    /// Ends a session and drops its state.
    pub fn destroy(&mut self, id: &Uuid) -> Result<(), AppError> {
        self.sessions
            .pop(id)
            .map(|_| debug!("Destroyed session {}", id))
            .ok_or_else(|| AppError::NotFound(format!("session {}", id)))
    }
}
