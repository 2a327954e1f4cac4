/// Domain entities for exclusive runs
///
/// A run is one process-local attempt to execute exclusively within a
/// space; the audit record is its durable trace.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::Space;

/// One persisted record of an exclusive-run attempt (`activity.job` row).
///
/// Exactly one of these is written per attempt that reaches the locking
/// statement, granted or not. The subsystem never deletes them; they are the
/// forensic trail of who tried to run where, not part of the coordination
/// logic itself. `granted` records lock acquisition, not work success: a
/// work unit that fails after its lock was granted leaves the row untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAudit {
    pub id: i32,
    /// Database principal the attempt ran as.
    pub owner: String,
    /// Server backend process id that held the attempt.
    pub pid: i32,
    /// Advisory-lock key of the space.
    pub oid: i64,
    pub granted: bool,
    pub timestamp: DateTime<Utc>,
    /// Free-form operator note; never set by the coordinator.
    pub comment: Option<String>,
}

impl JobAudit {
    /// The space this attempt ran in, when the oid is a known key.
    pub fn space(&self) -> Option<Space> {
        Space::from_oid(self.oid)
    }
}

/// Outcome of one low-level exclusive-run attempt.
///
/// Denial is an expected, recoverable condition (another process simply got
/// there first), so it is modelled here instead of in the error taxonomy.
/// The convenience layer flattens it into `None`; callers that must branch
/// on it use [`JobCoordinator::try_run_exclusive`] and keep the distinction.
///
/// [`JobCoordinator::try_run_exclusive`]: crate::JobCoordinator::try_run_exclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome<T> {
    /// The lock was granted and the work unit ran to completion.
    Completed(T),
    /// Another session holds the space; the work unit was never invoked.
    Denied,
}

impl<T> RunOutcome<T> {
    pub fn is_denied(&self) -> bool {
        matches!(self, RunOutcome::Denied)
    }

    /// The work unit's value, or `None` when the run was denied.
    pub fn completed(self) -> Option<T> {
        match self {
            RunOutcome::Completed(value) => Some(value),
            RunOutcome::Denied => None,
        }
    }
}
