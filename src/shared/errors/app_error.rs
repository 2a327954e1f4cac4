use thiserror::Error;

/// Error taxonomy of the crate.
///
/// Lock denial is deliberately absent: a denied exclusive run is an expected
/// outcome, signalled as [`RunOutcome::Denied`](crate::RunOutcome) rather
/// than as an error. `ConnectionError` is kept distinct from `DatabaseError`
/// because a run that fails to connect never reaches the locking statement
/// and therefore leaves no audit row behind.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => {
                AppError::NotFound("Record not found in database".to_string())
            }
            _ => AppError::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for AppError {
    fn from(err: diesel::ConnectionError) -> Self {
        AppError::ConnectionError(err.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for AppError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        AppError::ConnectionError(format!("Database pool error: {}", err))
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::ConfigError(format!("Missing environment variable: {}", err))
    }
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
