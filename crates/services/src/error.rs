//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `MentorService`.
///
/// `Blocked` is kept separate from `HttpStatus` so the caller can show a
/// "provider blocked/unauthorized" message instead of a generic failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MentorError {
    #[error("ai mentor is not configured")]
    Disabled,
    #[error("ai provider blocked the request (status {0}); check the API key")]
    Blocked(reqwest::StatusCode),
    #[error("ai mentor returned an empty response")]
    EmptyResponse,
    #[error("ai mentor request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("ai mentor returned an unstructured response")]
    Unstructured { raw: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `CorpusService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CorpusError {
    #[error("no corpus has been imported yet")]
    Missing,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
