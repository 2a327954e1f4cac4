/// Shared infrastructure concerns
///
/// Connection handling for the whole crate: the pooled handle used for
/// ordinary queries and the non-pooled connections exclusive runs require.
pub mod database;

// Re-exports for convenience
pub use database::Database;
