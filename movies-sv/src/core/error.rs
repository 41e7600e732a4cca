use actix_web::error::BlockingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid value: {0}")]
    Invalid(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("error querying database: {0}")]
    DBQueryError(#[from] diesel::result::Error),
    #[error("error getting connection from pool: {0}")]
    PoolError(#[from] r2d2::Error),
    #[error("error running migrations: {0}")]
    MigrationError(#[from] diesel::migration::RunMigrationsError),
    #[error("blocking task was canceled")]
    Canceled,
}

impl Error {
    /// Whether the error is the caller's fault and safe to describe back to them.
    pub fn is_client_error(&self) -> bool {
        matches!(self,
            Error::MissingField(_)
            | Error::Invalid(_)
            | Error::NotFound(_)
            | Error::Conflict(_))
    }
}

impl From<BlockingError<Error>> for Error {
    fn from(err: BlockingError<Error>) -> Self {
        match err {
            BlockingError::Error(e) => e,
            BlockingError::Canceled => Error::Canceled,
        }
    }
}
