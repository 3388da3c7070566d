//! `PostgreSQL` implementation of the append-only activity log.

use super::{
    models::{ActivityRow, NewActivityRow},
    schema::activities,
};
use crate::activity::{
    domain::{Activity, ActivityId, ActivityPayload, PersistedActivityData, Topic},
    ports::{ActivityLog, ActivityLogError, ActivityLogResult},
};
use crate::task::domain::UserId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;

/// `PostgreSQL` connection pool type used by activity adapters.
pub type ActivityPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed activity log.
///
/// The table carries no update or delete paths; this adapter only ever
/// inserts and selects.
#[derive(Clone)]
pub struct PostgresActivityLog {
    pool: ActivityPgPool,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl PostgresActivityLog {
    /// Creates a new log from a connection pool, using the system clock.
    #[must_use]
    pub fn new(pool: ActivityPgPool) -> Self {
        Self::with_clock(pool, Arc::new(DefaultClock))
    }

    /// Creates a new log with an injected clock.
    #[must_use]
    pub fn with_clock(pool: ActivityPgPool, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { pool, clock }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ActivityLogResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ActivityLogResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ActivityLogError::infrastructure)?;
            f(&mut connection)
        })
        .await
        .map_err(ActivityLogError::infrastructure)?
    }
}

impl std::fmt::Debug for PostgresActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresActivityLog").finish_non_exhaustive()
    }
}

#[async_trait]
impl ActivityLog for PostgresActivityLog {
    async fn record(
        &self,
        topic: &Topic,
        payload: ActivityPayload,
        user_id: Option<UserId>,
    ) -> ActivityLogResult<Activity> {
        let new_row = NewActivityRow {
            topic: topic.as_str().to_owned(),
            payload: serde_json::to_value(&payload).map_err(ActivityLogError::infrastructure)?,
            user_id: user_id.map(UserId::into_inner),
            created_at: self.clock.utc(),
        };

        self.run_blocking(move |connection| {
            let row = diesel::insert_into(activities::table)
                .values(&new_row)
                .get_result::<ActivityRow>(connection)
                .map_err(ActivityLogError::infrastructure)?;
            row_to_activity(row)
        })
        .await
    }

    async fn query(&self, topic: &Topic) -> ActivityLogResult<Vec<Activity>> {
        let lookup_topic = topic.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = activities::table
                .filter(activities::topic.eq(&lookup_topic))
                .order(activities::id.asc())
                .select(ActivityRow::as_select())
                .load::<ActivityRow>(connection)
                .map_err(ActivityLogError::infrastructure)?;
            rows.into_iter().map(row_to_activity).collect()
        })
        .await
    }
}

fn row_to_activity(row: ActivityRow) -> ActivityLogResult<Activity> {
    let ActivityRow {
        id,
        topic,
        payload: persisted_payload,
        user_id,
        created_at,
    } = row;

    let payload = serde_json::from_value::<ActivityPayload>(persisted_payload)
        .map_err(ActivityLogError::infrastructure)?;

    Ok(Activity::from_persisted(PersistedActivityData {
        id: ActivityId::from_raw(id),
        topic: Topic::new(topic),
        payload,
        user_id: user_id.map(UserId::from_uuid),
        created_at,
    }))
}
