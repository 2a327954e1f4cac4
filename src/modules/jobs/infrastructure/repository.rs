/// Diesel-based implementation of the run store
///
/// Audit insert and lock acquisition happen in one statement so the two can
/// never diverge: every attempt that reaches the database leaves a row, and
/// no lock is ever taken without one.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::modules::jobs::domain::entities::JobAudit;
use crate::modules::jobs::domain::repository::{Run, RunStore};
use crate::modules::jobs::domain::value_objects::Space;
use crate::modules::jobs::infrastructure::models::JobAuditRow;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::infrastructure::database::Database;

/// Records the attempt and tries the space's advisory lock in a single
/// committed statement. `pg_try_advisory_lock` never blocks; its boolean
/// lands in the `granted` column and comes back through `RETURNING`.
/// `$1` is the space key, `$2` an optional timestamp override.
const START_RUN_SQL: &str = r#"
    INSERT INTO activity.job (owner, pid, oid, granted, timestamp)
    SELECT
        CURRENT_USER,
        pg_backend_pid(),
        $1,
        pg_try_advisory_lock($1),
        CASE WHEN $2 IS NULL THEN now() ELSE $2 END
    RETURNING id, owner, pid, oid, granted, timestamp, comment
"#;

/// Hands out runs backed by isolated (non-pooled) connections.
pub struct PgRunStore {
    database: Arc<Database>,
}

impl PgRunStore {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl RunStore for PgRunStore {
    async fn open_run(&self) -> AppResult<Box<dyn Run>> {
        let connection = self.database.open_isolated_connection()?;
        let run = PgRun {
            id: Uuid::new_v4(),
            connection,
        };

        log::debug!("Opened run {} on a dedicated connection", run.id);
        Ok(Box::new(run))
    }
}

/// A run bound to one dedicated PostgreSQL session.
///
/// The session is the lock scope: dropping this struct closes the
/// connection, and the server releases any advisory lock it held. That
/// holds on the success path, on work-unit failure and on panic unwind,
/// which is the only release mechanism this subsystem has.
pub struct PgRun {
    id: Uuid,
    connection: PgConnection,
}

#[async_trait]
impl Run for PgRun {
    fn id(&self) -> Uuid {
        self.id
    }

    async fn start(
        &mut self,
        space: Space,
        timestamp: Option<DateTime<Utc>>,
    ) -> AppResult<JobAudit> {
        let row: JobAuditRow = diesel::sql_query(START_RUN_SQL)
            .bind::<diesel::sql_types::BigInt, _>(space.oid())
            .bind::<diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>, _>(timestamp)
            .get_result(&mut self.connection)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to start run in space {}: {}", space, e))
            })?;

        Ok(row.into_audit())
    }
}

impl Drop for PgRun {
    fn drop(&mut self) {
        // The connection closes with the struct; the server drops any
        // advisory lock the session held.
        log::debug!("Closing run {}", self.id);
    }
}
