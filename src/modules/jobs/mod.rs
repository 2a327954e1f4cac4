//! Exclusive job coordination module
//!
//! Guarantees that certain maintenance jobs (crawling, model training, ...)
//! run at most once concurrently across every worker process sharing the
//! database, using PostgreSQL advisory locks as the mutual-exclusion
//! primitive.
//!
//! Architecture:
//! - Domain: spaces, the audit entity, and the run seam
//! - Infrastructure: diesel-based implementation of the seam
//! - Coordinator: the run lifecycle built on top of the seam

pub mod coordinator;
pub mod domain;
pub mod infrastructure;

// Re-exports for easy access
pub use coordinator::{runs_exclusive, ExclusiveJob, JobCoordinator};
pub use domain::{
    entities::{JobAudit, RunOutcome},
    repository::{Run, RunStore},
    value_objects::Space,
};
pub use infrastructure::{PgRun, PgRunStore};
