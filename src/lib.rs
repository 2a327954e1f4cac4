pub mod modules;
mod schema;
pub mod shared;

pub use modules::jobs::{
    runs_exclusive, ExclusiveJob, JobAudit, JobCoordinator, PgRun, PgRunStore, Run, RunOutcome,
    RunStore, Space,
};
pub use shared::errors::{AppError, AppResult};
pub use shared::infrastructure::database::{Database, DbConnection, DbPool};
pub use shared::utils::logger::init_logger;
