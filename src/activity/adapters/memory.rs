//! In-memory activity log for unit tests.
//!
//! Append-only: entries are pushed to a growing vector and never touched
//! again. Not suitable for production use.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::activity::{
    domain::{Activity, ActivityId, ActivityPayload, PersistedActivityData, Topic},
    ports::{ActivityLog, ActivityLogError, ActivityLogResult},
};
use crate::task::domain::UserId;

/// Thread-safe in-memory implementation of [`ActivityLog`].
#[derive(Clone)]
pub struct InMemoryActivityLog {
    state: Arc<RwLock<LogState>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

#[derive(Debug, Default)]
struct LogState {
    entries: Vec<Activity>,
    next_id: i64,
}

impl InMemoryActivityLog {
    /// Creates an empty log using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Creates an empty log with an injected clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            state: Arc::new(RwLock::new(LogState::default())),
            clock,
        }
    }

    /// Returns the total number of appended records across all topics.
    ///
    /// Returns `0` if the internal lock is poisoned, matching the fallback
    /// behaviour of an empty log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().map(|guard| guard.entries.len()).unwrap_or(0)
    }

    /// Returns `true` when nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryActivityLog")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn record(
        &self,
        topic: &Topic,
        payload: ActivityPayload,
        user_id: Option<UserId>,
    ) -> ActivityLogResult<Activity> {
        let created_at = self.clock.utc();
        let mut state = self.state.write().map_err(|err| {
            ActivityLogError::infrastructure(std::io::Error::other(err.to_string()))
        })?;

        state.next_id += 1;
        let activity = Activity::from_persisted(PersistedActivityData {
            id: ActivityId::from_raw(state.next_id),
            topic: topic.clone(),
            payload,
            user_id,
            created_at,
        });
        state.entries.push(activity.clone());
        Ok(activity)
    }

    async fn query(&self, topic: &Topic) -> ActivityLogResult<Vec<Activity>> {
        let state = self.state.read().map_err(|err| {
            ActivityLogError::infrastructure(std::io::Error::other(err.to_string()))
        })?;
        // Entries are appended in id order, so the filtered sequence is
        // already oldest-first.
        Ok(state
            .entries
            .iter()
            .filter(|activity| activity.topic() == topic)
            .cloned()
            .collect())
    }
}
