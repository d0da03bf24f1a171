//! The operation surface consumed by the host identity framework.
//!
//! One store per logical unit of work: the shared database handle is safe
//! for concurrent use, the store's own disposed flag and the entities it
//! mutates are not synchronized and must not be shared across concurrent
//! logical operations on the same entity.

pub mod role_store;
pub mod user_store;

pub use role_store::RoleStore;
pub use user_store::UserStore;

use std::future::Future;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::db::DbError;
use crate::document::DocumentError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("store has been disposed")]
    Disposed,

    #[error("operation was cancelled")]
    Cancelled,

    #[error("{0} is not supported by this store")]
    Unsupported(&'static str),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Runs one backend request under a cancellation token.
///
/// A token that is already cancelled fails the call before any I/O; after
/// the request is issued, cancellation is best-effort: the future is
/// abandoned but the backend may still complete the write.
pub(crate) async fn run_cancellable<T>(
    token: &CancellationToken,
    op: impl Future<Output = Result<T, DbError>>,
) -> Result<T, StoreError> {
    if token.is_cancelled() {
        return Err(StoreError::Cancelled);
    }

    tokio::select! {
        biased;
        () = token.cancelled() => Err(StoreError::Cancelled),
        result = op => Ok(result?),
    }
}
