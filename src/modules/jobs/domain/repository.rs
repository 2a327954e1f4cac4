use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shared::errors::AppResult;

use super::entities::JobAudit;
use super::value_objects::Space;

/// One live coordination session against the database.
///
/// A run owns a dedicated connection for its whole lifetime. Any advisory
/// lock it acquires is scoped to that connection, so dropping the run is
/// what releases the space, on the success and failure paths alike. There
/// is no explicit unlock anywhere; teardown is the release.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Run: Send {
    /// Process-local identifier, used only to correlate log lines.
    fn id(&self) -> Uuid;

    /// Record the attempt and try to take the space's lock, atomically.
    ///
    /// Writes exactly one audit row whether or not the lock is granted;
    /// the returned record's `granted` flag is the verdict. `timestamp`
    /// overrides the audit row's timestamp when given (backfill tooling),
    /// otherwise the database clock is used.
    ///
    /// Calling this more than once on the same run is not part of the
    /// contract; each attempt gets a fresh run.
    async fn start(
        &mut self,
        space: Space,
        timestamp: Option<DateTime<Utc>>,
    ) -> AppResult<JobAudit>;
}

/// Opens coordination sessions.
///
/// Implementations must hand out an isolated connection per run, never a
/// pooled one: a pool would keep the session alive after the run is dropped
/// and the lock would silently outlive the work it was guarding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RunStore: Send + Sync {
    async fn open_run(&self) -> AppResult<Box<dyn Run>>;
}
