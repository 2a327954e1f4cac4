/// Exclusive-run coordination across processes
///
/// At most one work unit runs per space at any time, fleet-wide: whoever
/// wins the space's advisory lock runs, everyone else is turned away
/// immediately. There is no queueing and no retry here; a denied caller
/// decides for itself whether to come back later.
///
/// Recovery is connection teardown. A holder that crashes or loses its
/// network link takes its session down with it, and the server releases
/// the lock. Nothing else ever releases one: there is no lease or heartbeat
/// on top, so a hung process that keeps its connection open keeps its space
/// too. That tradeoff is accepted here; callers needing stronger liveness
/// must layer it themselves.
use std::future::Future;
use std::sync::Arc;

use crate::modules::jobs::domain::entities::RunOutcome;
use crate::modules::jobs::domain::repository::RunStore;
use crate::modules::jobs::domain::value_objects::Space;
use crate::modules::jobs::infrastructure::PgRunStore;
use crate::shared::errors::AppResult;
use crate::shared::infrastructure::database::Database;
use crate::{log_debug, log_info, log_warn};

/// Entry point for running work units exclusively within a space.
pub struct JobCoordinator {
    store: Arc<dyn RunStore>,
}

impl JobCoordinator {
    pub fn new(store: Arc<dyn RunStore>) -> Self {
        Self { store }
    }

    /// Production wiring: runs coordinate through PostgreSQL advisory locks.
    pub fn with_database(database: Arc<Database>) -> Self {
        Self::new(Arc::new(PgRunStore::new(database)))
    }

    /// Attempt to run `work` exclusively within `space`.
    ///
    /// Opens a dedicated session, records the attempt and tries the space's
    /// lock in one statement. When granted, `work` runs while the session
    /// (and with it the lock) stays open; the session closes before this
    /// method returns. When denied, `work` is never invoked and the caller
    /// gets [`RunOutcome::Denied`] back as an ordinary value.
    ///
    /// Every attempt that reaches the locking statement leaves exactly one
    /// audit row, granted or not. A connection failure beforehand leaves
    /// none and surfaces as [`AppError::ConnectionError`].
    ///
    /// [`AppError::ConnectionError`]: crate::shared::errors::AppError::ConnectionError
    pub async fn try_run_exclusive<F, Fut, T>(
        &self,
        space: Space,
        work: F,
    ) -> AppResult<RunOutcome<T>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
        T: Send,
    {
        let mut run = self.store.open_run().await?;
        log_debug!("Run {} requesting space {}", run.id(), space);

        let audit = run.start(space, None).await?;
        if !audit.granted {
            log_info!(
                "Run {} denied space {}: another session holds it",
                run.id(),
                space
            );
            return Ok(RunOutcome::Denied);
        }

        log_info!(
            "Run {} granted space {} (backend pid {})",
            run.id(),
            space,
            audit.pid
        );

        let result = work().await;

        // Closing the session is what releases the space, so the run must
        // outlive the work unit and nothing else.
        let run_id = run.id();
        drop(run);

        match result {
            Ok(value) => {
                log_debug!("Run {} completed space {}", run_id, space);
                Ok(RunOutcome::Completed(value))
            }
            Err(e) => {
                log_warn!("Run {} failed in space {}: {}", run_id, space, e);
                Err(e)
            }
        }
    }

    /// Like [`try_run_exclusive`](Self::try_run_exclusive), with denial
    /// flattened to `None`.
    ///
    /// The right default for periodic work, where "someone else is already
    /// on it" needs no handling beyond skipping this round.
    pub async fn run_exclusive<F, Fut, T>(&self, space: Space, work: F) -> AppResult<Option<T>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
        T: Send,
    {
        Ok(self.try_run_exclusive(space, work).await?.completed())
    }
}

/// A work unit permanently bound to its space.
///
/// Built once at wiring time, then invoked from schedulers or loops without
/// re-stating the space on every call. Each [`run`](Self::run) is a fresh
/// exclusive attempt with its own session and audit row.
pub struct ExclusiveJob<F> {
    coordinator: Arc<JobCoordinator>,
    space: Space,
    work: F,
}

impl<F> ExclusiveJob<F> {
    pub fn space(&self) -> Space {
        self.space
    }
}

impl<F, Fut, T> ExclusiveJob<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = AppResult<T>> + Send,
    T: Send,
{
    pub async fn run(&self) -> AppResult<Option<T>> {
        self.coordinator.run_exclusive(self.space, &self.work).await
    }
}

/// Bind `work` to `space` as a reusable [`ExclusiveJob`].
pub fn runs_exclusive<F>(
    coordinator: Arc<JobCoordinator>,
    space: Space,
    work: F,
) -> ExclusiveJob<F> {
    ExclusiveJob {
        coordinator,
        space,
        work,
    }
}
