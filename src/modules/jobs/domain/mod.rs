pub mod entities;
pub mod repository;
pub mod value_objects;

pub use entities::{JobAudit, RunOutcome};
pub use repository::{Run, RunStore};
pub use value_objects::Space;
