use pagecraft_core::error::CoreError;

/// Failure of a repository workflow that mixes SQL with domain rules
/// (status transitions, component writes).
///
/// `Rejected` means a rule refused the operation and the transaction was
/// rolled back. `Database` is a plain sqlx failure.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Rejected(#[from] CoreError),
}
