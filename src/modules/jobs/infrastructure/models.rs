use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::modules::jobs::domain::entities::JobAudit;
use crate::schema::job;

/// Database row of `activity.job`.
///
/// Loaded through `QueryableByName` by the raw locking statement's
/// `RETURNING` clause, and through the ordinary DSL when inspecting the
/// audit trail.
#[derive(Queryable, QueryableByName, Selectable, Debug, Clone)]
#[diesel(table_name = job)]
pub struct JobAuditRow {
    pub id: i32,
    pub owner: String,
    pub pid: i32,
    pub oid: i64,
    pub granted: bool,
    pub timestamp: DateTime<Utc>,
    pub comment: Option<String>,
}

impl JobAuditRow {
    pub fn into_audit(self) -> JobAudit {
        JobAudit {
            id: self.id,
            owner: self.owner,
            pid: self.pid,
            oid: self.oid,
            granted: self.granted,
            timestamp: self.timestamp,
            comment: self.comment,
        }
    }
}
