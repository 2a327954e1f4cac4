// Shared kernel: concerns used by every module of the crate.

pub mod errors;
pub mod infrastructure;
pub mod utils;

// Re-exports for convenience
pub use errors::{AppError, AppResult};
pub use infrastructure::database::Database;
