//! Shared error types for the services crate.

use thiserror::Error;

use storage::kv::StorageError;
use training_core::model::SlideProgressError;

/// Errors emitted by `SlideSessionService`.
///
/// Rejected navigation is not an error: blocked keys, viewer page changes
/// and locked "next" attempts are expected input deviations reported
/// through the advisory notice instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrainingError {
    #[error(transparent)]
    Progress(#[from] SlideProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `VideoSessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VideoError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
